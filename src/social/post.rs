//! Post and comment records, mutation inputs, and projections.
//!
//! A `Post` owns its engagement relations (`liked_by`, `saved_by`) and its
//! comments. Comments exist only as part of a post: they are created by the
//! add-comment operation and removed only when the post is removed.

use crate::error::Result;
use crate::social::types::{CommentId, PostId, PostStatus, UserId};
use crate::social::user::{User, UserProfile};
use crate::validation::Validator;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Store-assigned identifier.
    pub id: CommentId,
    /// The post this comment belongs to.
    pub post_id: PostId,
    /// The user who wrote the comment.
    pub author_id: UserId,
    /// Comment body, non-empty.
    pub text: String,
    /// Creation timestamp in milliseconds since the Unix epoch.
    pub created_at: u64,
}

/// A stored post record.
///
/// Invariants:
/// - `liked_by` and `saved_by` have set semantics (no duplicates).
/// - `comments` preserve insertion order and are never edited or removed
///   individually.
/// - a `Deleted` post is retained with all engagement relations intact.
#[derive(Clone, Serialize, Deserialize)]
pub struct Post {
    /// Store-assigned identifier.
    pub id: PostId,
    /// The user who created the post. Only the author may mutate content,
    /// status, or location.
    pub author_id: UserId,
    /// Required, non-blank.
    pub caption: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub location: Option<String>,
    /// Visibility tier; `Deleted` means soft-deleted.
    pub status: PostStatus,
    /// Creation timestamp in milliseconds since the Unix epoch.
    pub created_at: u64,
    /// Last mutation timestamp, restamped on every write.
    pub updated_at: u64,
    /// Users who currently like this post.
    pub liked_by: HashSet<UserId>,
    /// Users who currently have this post saved.
    pub saved_by: HashSet<UserId>,
    /// Comments in insertion order.
    pub comments: Vec<Comment>,
    pub reported: bool,
    pub report_count: u32,
}

impl fmt::Debug for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Post")
            .field("id", &self.id)
            .field("author_id", &self.author_id)
            .field("status", &self.status)
            .field("caption_len", &self.caption.len())
            .field("like_count", &self.liked_by.len())
            .field("save_count", &self.saved_by.len())
            .field("comment_count", &self.comments.len())
            .finish()
    }
}

impl Post {
    /// Number of users who like this post.
    pub fn like_count(&self) -> usize {
        self.liked_by.len()
    }

    /// Number of users who have saved this post.
    pub fn save_count(&self) -> usize {
        self.saved_by.len()
    }

    /// Number of comments on this post.
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }

    /// Returns true if this post is soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.status.is_deleted()
    }

    /// Returns true if `user` currently likes this post.
    pub fn liked_by_user(&self, user: UserId) -> bool {
        self.liked_by.contains(&user)
    }

    /// Returns true if `user` currently has this post saved.
    pub fn saved_by_user(&self, user: UserId) -> bool {
        self.saved_by.contains(&user)
    }

    /// Comment bodies in insertion order.
    pub fn comment_texts(&self) -> Vec<String> {
        self.comments.iter().map(|c| c.text.clone()).collect()
    }
}

/// Content of a new post. Status is not part of the draft: every post is
/// created `Public` and retiered afterwards by its author.
#[derive(Debug, Default, Clone)]
pub struct PostDraft {
    pub caption: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub location: Option<String>,
}

impl PostDraft {
    /// Validates the draft fields.
    pub fn validate(&self) -> Result<()> {
        Validator::validate_caption(&self.caption)?;
        if let Some(url) = &self.image_url {
            Validator::validate_media_url(url)?;
        }
        if let Some(url) = &self.video_url {
            Validator::validate_media_url(url)?;
        }
        if let Some(location) = &self.location {
            Validator::validate_location(location)?;
        }
        Ok(())
    }
}

/// Partial update of a post by its author. Only provided fields change.
#[derive(Debug, Default, Clone)]
pub struct PostUpdate {
    pub caption: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub location: Option<String>,
    pub status: Option<PostStatus>,
}

impl PostUpdate {
    /// Validates the provided fields.
    pub fn validate(&self) -> Result<()> {
        if let Some(caption) = &self.caption {
            Validator::validate_caption(caption)?;
        }
        if let Some(url) = &self.image_url {
            Validator::validate_media_url(url)?;
        }
        if let Some(url) = &self.video_url {
            Validator::validate_media_url(url)?;
        }
        if let Some(location) = &self.location {
            Validator::validate_location(location)?;
        }
        Ok(())
    }
}

/// Boundary-facing projection of a post.
///
/// Engagement relations are reduced to counts; the author appears as a
/// profile projection.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: PostId,
    pub author: UserProfile,
    pub caption: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub location: Option<String>,
    pub status: PostStatus,
    pub created_at: u64,
    pub updated_at: u64,
    pub like_count: usize,
    pub save_count: usize,
    pub comment_count: usize,
}

impl PostView {
    /// Builds the projection from a post and its (already loaded) author.
    pub fn new(post: &Post, author: &User) -> Self {
        Self {
            id: post.id,
            author: author.profile(),
            caption: post.caption.clone(),
            image_url: post.image_url.clone(),
            video_url: post.video_url.clone(),
            location: post.location.clone(),
            status: post.status,
            created_at: post.created_at,
            updated_at: post.updated_at,
            like_count: post.like_count(),
            save_count: post.save_count(),
            comment_count: post.comment_count(),
        }
    }
}

/// Boundary-facing projection of a comment.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: CommentId,
    /// Username of the comment author.
    pub author_name: String,
    pub text: String,
    pub created_at: u64,
}

impl CommentView {
    pub fn new(comment: &Comment, author_name: String) -> Self {
        Self {
            id: comment.id,
            author_name,
            text: comment.text.clone(),
            created_at: comment.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> Post {
        Post {
            id: PostId(1),
            author_id: UserId(1),
            caption: "sunset".to_string(),
            image_url: None,
            video_url: None,
            location: None,
            status: PostStatus::Public,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
            liked_by: HashSet::new(),
            saved_by: HashSet::new(),
            comments: Vec::new(),
            reported: false,
            report_count: 0,
        }
    }

    #[test]
    fn test_comment_order_preserved() {
        let mut post = sample_post();
        for (i, text) in ["first", "second", "third"].iter().enumerate() {
            post.comments.push(Comment {
                id: CommentId(i as u64 + 1),
                post_id: post.id,
                author_id: UserId(2),
                text: text.to_string(),
                created_at: 1_700_000_000_000 + i as u64,
            });
        }
        assert_eq!(post.comment_texts(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_engagement_counts() {
        let mut post = sample_post();
        post.liked_by.insert(UserId(2));
        post.liked_by.insert(UserId(3));
        // Set semantics: re-inserting the same id does not grow the count.
        post.liked_by.insert(UserId(2));
        post.saved_by.insert(UserId(2));

        assert_eq!(post.like_count(), 2);
        assert_eq!(post.save_count(), 1);
        assert!(post.liked_by_user(UserId(3)));
        assert!(!post.saved_by_user(UserId(3)));
    }

    #[test]
    fn test_draft_validation() {
        let draft = PostDraft {
            caption: "sunset".to_string(),
            ..PostDraft::default()
        };
        assert!(draft.validate().is_ok());

        let blank = PostDraft {
            caption: "   ".to_string(),
            ..PostDraft::default()
        };
        assert!(blank.validate().is_err());

        let bad_url = PostDraft {
            caption: "sunset".to_string(),
            image_url: Some("not a url".to_string()),
            ..PostDraft::default()
        };
        assert!(bad_url.validate().is_err());
    }
}
