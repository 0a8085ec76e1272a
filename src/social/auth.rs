//! Credential mechanics: password hashing and bearer-token sessions.
//!
//! Passwords are hashed with Argon2id into PHC strings; the raw secret is
//! held in a zeroizing wrapper and never stored or logged. Access tokens
//! are opaque random values; the issuer keeps only a SHA3-256 digest of
//! each token, so a leaked session table cannot be replayed.
//!
//! The engines never touch raw credentials: the boundary layer exchanges
//! them here for a [`CallerIdentity`] and passes that into every operation.

use crate::error::{Result, SociableError};
use crate::social::types::{current_timestamp_millis, UserId};
use crate::social::user::User;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::{rngs::OsRng, RngCore};
use sha3::{Digest, Sha3_256};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;
use tracing::debug;
use zeroize::Zeroize;

/// Number of random bytes in an access token.
const TOKEN_SIZE: usize = 32;

/// Default session lifetime: 24 hours.
pub const DEFAULT_TOKEN_TTL_MS: u64 = 24 * 60 * 60 * 1000;

/// Parameters for Argon2id password hashing.
const ARGON2_PARAMS: argon2::Params = match argon2::Params::new(
    19 * 1024, // 19 MiB memory cost
    2,         // 2 iterations
    1,         // 1 thread (single-threaded)
    None,
) {
    Ok(params) => params,
    Err(_) => panic!("Invalid Argon2 parameters"),
};

/// A raw password in transit. Zeroized on drop, redacted in `Debug`.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    /// Creates a new password from a string.
    pub fn new(password: String) -> Self {
        Self(password)
    }

    /// The raw secret. Crate-internal: only hashing and validation read it.
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the password is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Password(***)")
    }
}

/// Hashes a password with Argon2id, returning a PHC string.
pub fn hash_password(password: &Password) -> Result<String> {
    if password.is_empty() {
        return Err(SociableError::password("Password cannot be empty"));
    }
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ARGON2_PARAMS,
    );
    let hash = argon2
        .hash_password(password.as_str().as_bytes(), &salt)
        .map_err(|e| SociableError::password(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC string.
///
/// A mismatch is `Ok(false)`; only infrastructure failures (malformed hash
/// string) are errors.
pub fn verify_password(password: &Password, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| SociableError::password(format!("Malformed password hash: {}", e)))?;
    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ARGON2_PARAMS,
    );
    match argon2.verify_password(password.as_str().as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(SociableError::password(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

/// An opaque bearer token. The string form is handed to the client; the
/// issuer retains only its digest.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    /// The token string to return to the client.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken({}…)", &self.0[..8.min(self.0.len())])
    }
}

/// The resolved, authenticated user performing an operation.
///
/// Every engine operation takes this explicitly; there is no ambient
/// "current user" state anywhere in the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub id: UserId,
    pub user_name: String,
}

#[derive(Debug, Clone)]
struct Session {
    user_id: UserId,
    user_name: String,
    expires_at: u64,
}

/// Issues and resolves bearer tokens.
///
/// Sessions are keyed by the SHA3-256 digest of the token, with a fixed
/// time-to-live. Expired entries are dropped lazily on resolve and can be
/// swept eagerly with [`TokenIssuer::purge_expired`].
pub struct TokenIssuer {
    sessions: RwLock<HashMap<[u8; 32], Session>>,
    ttl_ms: u64,
}

impl Default for TokenIssuer {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenIssuer {
    /// Creates an issuer with the default 24-hour session lifetime.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TOKEN_TTL_MS)
    }

    /// Creates an issuer with a custom session lifetime in milliseconds.
    pub fn with_ttl(ttl_ms: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl_ms,
        }
    }

    /// Issues a fresh token for `user`.
    pub fn issue(&self, user: &User) -> AccessToken {
        let mut bytes = [0u8; TOKEN_SIZE];
        OsRng.fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let session = Session {
            user_id: user.id,
            user_name: user.user_name.clone(),
            expires_at: current_timestamp_millis() + self.ttl_ms,
        };
        self.sessions
            .write()
            .unwrap()
            .insert(digest_token(&token), session);
        debug!(user = %user.id, "issued access token");
        AccessToken(token)
    }

    /// Resolves a token into a caller identity.
    ///
    /// Unknown and expired tokens both fail with `Unauthorized`; expired
    /// entries are removed on the way out.
    pub fn resolve(&self, token: &str) -> Result<CallerIdentity> {
        let key = digest_token(token);
        let mut sessions = self.sessions.write().unwrap();
        let session = sessions
            .get(&key)
            .ok_or_else(|| SociableError::unauthorized("Invalid or missing access token"))?;
        if session.expires_at <= current_timestamp_millis() {
            sessions.remove(&key);
            return Err(SociableError::unauthorized("Access token has expired"));
        }
        Ok(CallerIdentity {
            id: session.user_id,
            user_name: session.user_name.clone(),
        })
    }

    /// Invalidates a token. Revoking an unknown token is a no-op.
    pub fn revoke(&self, token: &str) {
        let removed = self.sessions.write().unwrap().remove(&digest_token(token));
        if removed.is_some() {
            debug!("revoked access token");
        }
    }

    /// Drops all expired sessions, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = current_timestamp_millis();
        let mut sessions = self.sessions.write().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    /// Number of live sessions (including not-yet-purged expired ones).
    pub fn session_count(&self) -> usize {
        self.sessions.read().unwrap().len()
    }
}

fn digest_token(token: &str) -> [u8; 32] {
    let mut hasher = Sha3_256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}
