//! Error types for sociable operations.

use thiserror::Error;

/// Result type alias for sociable operations.
pub type Result<T> = std::result::Result<T, SociableError>;

/// Main error type for sociable operations.
///
/// The first five variants form the failure taxonomy surfaced to the
/// boundary layer; the remaining variants cover storage and credential
/// infrastructure. Raw store or library errors are never propagated
/// untyped.
#[derive(Error, Debug)]
pub enum SociableError {
    /// A post or user id did not resolve to a record.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller lacks ownership, or authentication is absent or invalid.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed or out-of-bounds input (blank caption, bad status, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An operation that is never legal (self-follow, duplicate
    /// registration fields).
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Unique constraint violation surfaced from the store.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persistence layer errors.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Password hashing or verification infrastructure errors.
    #[error("Password error: {0}")]
    Password(String),
}

impl SociableError {
    /// Creates a new not-found error.
    pub fn not_found<T: ToString>(msg: T) -> Self {
        Self::NotFound(msg.to_string())
    }

    /// Creates a new unauthorized error.
    pub fn unauthorized<T: ToString>(msg: T) -> Self {
        Self::Unauthorized(msg.to_string())
    }

    /// Creates a new invalid input error.
    pub fn invalid_input<T: ToString>(msg: T) -> Self {
        Self::InvalidInput(msg.to_string())
    }

    /// Creates a new invalid operation error.
    pub fn invalid_operation<T: ToString>(msg: T) -> Self {
        Self::InvalidOperation(msg.to_string())
    }

    /// Creates a new conflict error.
    pub fn conflict<T: ToString>(msg: T) -> Self {
        Self::Conflict(msg.to_string())
    }

    /// Creates a new storage error.
    pub fn storage<T: ToString>(msg: T) -> Self {
        Self::Storage(msg.to_string())
    }

    /// Creates a new serialization error.
    pub fn serialization<T: ToString>(msg: T) -> Self {
        Self::Serialization(msg.to_string())
    }

    /// Creates a new password error.
    pub fn password<T: ToString>(msg: T) -> Self {
        Self::Password(msg.to_string())
    }
}
