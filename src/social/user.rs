//! User records, registration input, and profile projections.
//!
//! A `User` is the full stored record, including the password hash and the
//! raw follower/following id sets. It never crosses the boundary layer:
//! callers see `UserProfile` projections instead.

use crate::error::Result;
use crate::social::auth::Password;
use crate::social::types::{Gender, UserId};
use crate::validation::Validator;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A stored user record.
///
/// Invariant: `id` never appears in `followers` or `followings` — a user
/// cannot follow themselves.
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    /// Unique handle, lowercase.
    pub user_name: String,
    /// Unique email address.
    pub email: String,
    /// Argon2id hash of the password in PHC string format.
    pub password_hash: String,
    pub gender: Option<Gender>,
    /// Ids of users following this user.
    pub followers: HashSet<UserId>,
    /// Ids of users this user follows.
    pub followings: HashSet<UserId>,
    /// Creation timestamp in milliseconds since the Unix epoch.
    pub created_at: u64,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("user_name", &self.user_name)
            .field("email", &self.email)
            .field("follower_count", &self.followers.len())
            .field("following_count", &self.followings.len())
            .finish()
    }
}

impl User {
    /// Returns true if this user follows `other`.
    pub fn follows(&self, other: UserId) -> bool {
        self.followings.contains(&other)
    }

    /// Returns true if `other` follows this user.
    pub fn followed_by(&self, other: UserId) -> bool {
        self.followers.contains(&other)
    }

    /// Builds the boundary-facing projection of this record.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            user_name: self.user_name.clone(),
            email: self.email.clone(),
            gender: self.gender,
            follower_count: self.followers.len(),
            following_count: self.followings.len(),
        }
    }

    /// Returns true if any identity or name field contains `query_lower`.
    ///
    /// `query_lower` must already be lowercased.
    pub fn matches_query(&self, query_lower: &str) -> bool {
        self.user_name.contains(query_lower)
            || self.first_name.to_lowercase().contains(query_lower)
            || self.last_name.to_lowercase().contains(query_lower)
            || self.email.to_lowercase().contains(query_lower)
    }
}

/// Registration input for a new user.
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub password: Password,
    pub gender: Option<Gender>,
}

impl NewUser {
    /// Validates all registration fields.
    pub fn validate(&self) -> Result<()> {
        Validator::validate_person_name("First name", &self.first_name)?;
        Validator::validate_person_name("Last name", &self.last_name)?;
        Validator::validate_user_name(&self.user_name)?;
        Validator::validate_email(&self.email)?;
        Validator::validate_password(self.password.as_str())?;
        Ok(())
    }
}

/// Partial update of a user's own profile. Only provided fields change.
#[derive(Debug, Default, Clone)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl UserUpdate {
    /// Validates the provided fields.
    pub fn validate(&self) -> Result<()> {
        if let Some(first_name) = &self.first_name {
            Validator::validate_person_name("First name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            Validator::validate_person_name("Last name", last_name)?;
        }
        if let Some(email) = &self.email {
            Validator::validate_email(email)?;
        }
        Ok(())
    }
}

/// Boundary-facing projection of a user record.
///
/// Carries relation counts instead of the raw id sets, and never the
/// password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub gender: Option<Gender>,
    pub follower_count: usize,
    pub following_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId(1),
            first_name: "Alice".to_string(),
            last_name: "Larsen".to_string(),
            user_name: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            gender: Some(Gender::Female),
            followers: HashSet::new(),
            followings: HashSet::new(),
            created_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_profile_projection_hides_relations() {
        let mut user = sample_user();
        user.followers.insert(UserId(2));
        user.followers.insert(UserId(3));
        user.followings.insert(UserId(2));

        let profile = user.profile();
        assert_eq!(profile.follower_count, 2);
        assert_eq!(profile.following_count, 1);
        assert_eq!(profile.user_name, "alice");
    }

    #[test]
    fn test_debug_redacts_password_hash() {
        let user = sample_user();
        let rendered = format!("{:?}", user);
        assert!(!rendered.contains("argon2id"));
        assert!(rendered.contains("alice"));
    }

    #[test]
    fn test_matches_query() {
        let user = sample_user();
        assert!(user.matches_query("ali"));
        assert!(user.matches_query("larsen"));
        assert!(user.matches_query("example.com"));
        assert!(!user.matches_query("bob"));
    }

    #[test]
    fn test_new_user_validation() {
        let new_user = NewUser {
            first_name: "Alice".to_string(),
            last_name: "Larsen".to_string(),
            user_name: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: Password::new("Str0ng!pass".to_string()),
            gender: None,
        };
        assert!(new_user.validate().is_ok());

        let bad = NewUser {
            user_name: "Alice!".to_string(),
            ..new_user
        };
        assert!(bad.validate().is_err());
    }
}
