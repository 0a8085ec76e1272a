//! The user engine: registration, sign-in, the follow relation, and
//! profile queries.
//!
//! Registration and sign-in exchange raw credentials for an access token;
//! everything else takes a resolved [`CallerIdentity`]. The follow relation
//! is stored on both user records and mutated exclusively through the
//! store's atomic pair update, so no third party can ever observe a
//! half-applied follow.

use crate::error::{Result, SociableError};
use crate::social::auth::{
    hash_password, verify_password, AccessToken, CallerIdentity, Password, TokenIssuer,
};
use crate::social::store::UserStore;
use crate::social::types::{current_timestamp_millis, UserId};
use crate::social::user::{NewUser, User, UserProfile, UserUpdate};
use crate::validation::Validator;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// User and account operations over a shared identity store.
pub struct UserEngine<S> {
    store: Arc<S>,
    issuer: Arc<TokenIssuer>,
}

impl<S> UserEngine<S>
where
    S: UserStore,
{
    pub fn new(store: Arc<S>, issuer: Arc<TokenIssuer>) -> Self {
        Self { store, issuer }
    }

    /// Registers a new user and signs them in.
    ///
    /// Duplicate username/email are rejected up front with
    /// `InvalidOperation`; the store's unique constraints remain the
    /// backstop and surface `Conflict` if a concurrent registration wins
    /// the race.
    pub fn register(&self, new_user: NewUser) -> Result<(UserProfile, AccessToken)> {
        new_user.validate()?;
        if self.store.user_name_exists(&new_user.user_name)? {
            return Err(SociableError::invalid_operation(format!(
                "Username already exists: {}",
                new_user.user_name
            )));
        }
        if self.store.email_exists(&new_user.email)? {
            return Err(SociableError::invalid_operation(format!(
                "Email already exists: {}",
                new_user.email
            )));
        }

        let password_hash = hash_password(&new_user.password)?;
        let user = self.store.insert_user(User {
            id: UserId(0),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            user_name: new_user.user_name,
            email: new_user.email,
            password_hash,
            gender: new_user.gender,
            followers: HashSet::new(),
            followings: HashSet::new(),
            created_at: current_timestamp_millis(),
        })?;

        let token = self.issuer.issue(&user);
        info!(user = %user.id, user_name = %user.user_name, "registered user");
        Ok((user.profile(), token))
    }

    /// Signs a user in by username or email.
    ///
    /// The identifier is treated as an email when it contains `@`. Unknown
    /// identifiers and wrong passwords fail identically with
    /// `Unauthorized`, so sign-in does not reveal which accounts exist.
    pub fn sign_in(&self, identifier: &str, password: &Password) -> Result<AccessToken> {
        let lookup = if identifier.contains('@') {
            self.store.find_user_by_email(identifier)
        } else {
            self.store.find_user_by_name(identifier)
        };
        let user = match lookup {
            Ok(user) => user,
            Err(SociableError::NotFound(_)) => {
                return Err(SociableError::unauthorized("Invalid username or password"))
            }
            Err(e) => return Err(e),
        };

        if !verify_password(password, &user.password_hash)? {
            return Err(SociableError::unauthorized("Invalid username or password"));
        }

        debug!(user = %user.id, "signed in");
        Ok(self.issuer.issue(&user))
    }

    /// Resolves a bearer token into a caller identity.
    ///
    /// The session must be live and the user must still exist — tokens of
    /// deleted accounts stop resolving immediately.
    pub fn resolve(&self, token: &str) -> Result<CallerIdentity> {
        let caller = self.issuer.resolve(token)?;
        match self.store.find_user(caller.id) {
            Ok(_) => Ok(caller),
            Err(SociableError::NotFound(_)) => Err(SociableError::unauthorized(
                "Access token refers to a deleted account",
            )),
            Err(e) => Err(e),
        }
    }

    /// Makes the caller follow `target`.
    ///
    /// Self-follow fails with `InvalidOperation` and changes nothing. Both
    /// sides of the relation are written in one atomic unit of work.
    /// Following someone twice is a no-op (set semantics).
    pub fn follow(&self, caller: &CallerIdentity, target: UserId) -> Result<UserProfile> {
        if caller.id == target {
            return Err(SociableError::invalid_operation(
                "A user cannot follow themselves",
            ));
        }
        let (me, _) = self.store.update_user_pair(caller.id, target, |me, them| {
            me.followings.insert(them.id);
            them.followers.insert(me.id);
            Ok(())
        })?;
        info!(follower = %caller.id, target = %target, "followed user");
        Ok(me.profile())
    }

    /// Fetches a user's profile by id.
    pub fn get_user(&self, id: UserId) -> Result<UserProfile> {
        Ok(self.store.find_user(id)?.profile())
    }

    /// Fetches a user's profile by username.
    pub fn user_by_name(&self, user_name: &str) -> Result<UserProfile> {
        Ok(self.store.find_user_by_name(user_name)?.profile())
    }

    /// Fetches a user's profile by email.
    pub fn user_by_email(&self, email: &str) -> Result<UserProfile> {
        Ok(self.store.find_user_by_email(email)?.profile())
    }

    /// All user profiles in id order.
    pub fn all_users(&self) -> Result<Vec<UserProfile>> {
        Ok(self
            .store
            .all_users()?
            .iter()
            .map(User::profile)
            .collect())
    }

    /// Case-insensitive substring search over username, names, and email.
    pub fn search_users(&self, query: &str) -> Result<Vec<UserProfile>> {
        Validator::validate_search_query(query)?;
        Ok(self
            .store
            .search_users(query)?
            .iter()
            .map(User::profile)
            .collect())
    }

    /// Applies a partial update to the caller's own profile.
    ///
    /// Changing the email to one held by another user fails with
    /// `Conflict`.
    pub fn update_user(&self, caller: &CallerIdentity, update: UserUpdate) -> Result<UserProfile> {
        update.validate()?;

        if let Some(email) = &update.email {
            match self.store.find_user_by_email(email) {
                Ok(existing) if existing.id != caller.id => {
                    return Err(SociableError::conflict(format!(
                        "Email already taken: {}",
                        email
                    )));
                }
                Ok(_) | Err(SociableError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        let user = self.store.update_user(caller.id, |user| {
            if let Some(first_name) = update.first_name.clone() {
                user.first_name = first_name;
            }
            if let Some(last_name) = update.last_name.clone() {
                user.last_name = last_name;
            }
            if let Some(email) = update.email.clone() {
                user.email = email;
            }
            Ok(())
        })?;
        debug!(user = %user.id, "updated profile");
        Ok(user.profile())
    }

    /// Deletes the caller's own account.
    ///
    /// Outstanding tokens for the account stop resolving because
    /// [`UserEngine::resolve`] re-checks existence.
    pub fn delete_account(&self, caller: &CallerIdentity) -> Result<()> {
        self.store.delete_user(caller.id)?;
        info!(user = %caller.id, "deleted account");
        Ok(())
    }
}
