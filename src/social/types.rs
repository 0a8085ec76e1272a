//! Identifier and enumeration types for the social domain.
//!
//! Ids are store-assigned sequential numbers wrapped in newtypes so that a
//! user id can never be passed where a post id is expected.

use crate::error::SociableError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier of a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of a post record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PostId(pub u64);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommentId(pub u64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visibility tier of a post.
///
/// The tier controls which viewers may retrieve the post:
/// - `Public`: visible to everyone, included in the global feed.
/// - `FriendsOnly`: visible to the author and to users who follow the author.
/// - `Deleted`: soft-deleted; excluded from all listings, retrievable only
///   by the author via direct fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    Public,
    FriendsOnly,
    Deleted,
}

impl PostStatus {
    /// Returns true for the soft-deleted tier.
    pub fn is_deleted(self) -> bool {
        matches!(self, PostStatus::Deleted)
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostStatus::Public => write!(f, "PUBLIC"),
            PostStatus::FriendsOnly => write!(f, "FRIENDS_ONLY"),
            PostStatus::Deleted => write!(f, "DELETED"),
        }
    }
}

impl FromStr for PostStatus {
    type Err = SociableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUBLIC" => Ok(PostStatus::Public),
            "FRIENDS_ONLY" => Ok(PostStatus::FriendsOnly),
            "DELETED" => Ok(PostStatus::Deleted),
            other => Err(SociableError::invalid_input(format!(
                "Unknown post status: {}",
                other
            ))),
        }
    }
}

/// Self-reported gender on a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Female,
    Male,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Female => write!(f, "FEMALE"),
            Gender::Male => write!(f, "MALE"),
            Gender::Other => write!(f, "OTHER"),
        }
    }
}

/// Returns the current UTC time in milliseconds since the Unix epoch.
///
/// All `created_at`/`updated_at` fields are stamped with this server-side.
pub fn current_timestamp_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_status_parsing() {
        assert_eq!("PUBLIC".parse::<PostStatus>().unwrap(), PostStatus::Public);
        assert_eq!(
            "FRIENDS_ONLY".parse::<PostStatus>().unwrap(),
            PostStatus::FriendsOnly
        );
        assert_eq!(
            "DELETED".parse::<PostStatus>().unwrap(),
            PostStatus::Deleted
        );
        assert!("public".parse::<PostStatus>().is_err());
        assert!("ARCHIVED".parse::<PostStatus>().is_err());
    }

    #[test]
    fn test_post_status_display_roundtrip() {
        for status in [PostStatus::Public, PostStatus::FriendsOnly, PostStatus::Deleted] {
            assert_eq!(status.to_string().parse::<PostStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_id_display() {
        assert_eq!(UserId(7).to_string(), "7");
        assert_eq!(PostId(42).to_string(), "42");
    }
}
