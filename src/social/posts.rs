//! The post engine: creation, mutation, toggles, comments, and the
//! visibility-filtered query surface.
//!
//! Every operation takes a resolved [`CallerIdentity`] plus primitive ids
//! and returns projections or a typed failure. Ids are resolved to records
//! before any authorization decision, so a missing post or user always
//! fails `NotFound` first. Mutations go through the store's atomic
//! `update_post`, which commits the closure's changes only on `Ok` — an
//! ownership failure inside the closure leaves the record untouched.

use crate::error::{Result, SociableError};
use crate::social::auth::CallerIdentity;
use crate::social::post::{Comment, CommentView, Post, PostDraft, PostUpdate, PostView};
use crate::social::store::{PostStore, UserStore};
use crate::social::types::{current_timestamp_millis, PostId, PostStatus, UserId};
use crate::social::visibility::{assert_owner, can_view, profile_statuses};
use crate::validation::Validator;
use std::sync::Arc;
use tracing::{debug, info};

/// Post operations over a shared store.
pub struct PostEngine<S> {
    store: Arc<S>,
}

impl<S> PostEngine<S>
where
    S: UserStore + PostStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn view(&self, post: &Post) -> Result<PostView> {
        let author = self.store.find_user(post.author_id)?;
        Ok(PostView::new(post, &author))
    }

    fn views(&self, posts: &[Post]) -> Result<Vec<PostView>> {
        posts.iter().map(|p| self.view(p)).collect()
    }

    /// Creates a post authored by the caller.
    ///
    /// Status is forced to `Public`, timestamps are stamped server-side,
    /// and the engagement relations start empty regardless of the draft.
    pub fn create_post(&self, caller: &CallerIdentity, draft: PostDraft) -> Result<PostView> {
        draft.validate()?;
        let author = self.store.find_user(caller.id)?;

        let now = current_timestamp_millis();
        let post = Post {
            id: PostId(0),
            author_id: author.id,
            caption: draft.caption,
            image_url: draft.image_url,
            video_url: draft.video_url,
            location: draft.location,
            status: PostStatus::Public,
            created_at: now,
            updated_at: now,
            liked_by: Default::default(),
            saved_by: Default::default(),
            comments: Vec::new(),
            reported: false,
            report_count: 0,
        };
        let post = self.store.insert_post(post)?;
        info!(post = %post.id, author = %author.id, "created post");
        Ok(PostView::new(&post, &author))
    }

    /// Fetches a single post the caller is allowed to see.
    pub fn get_post(&self, caller: &CallerIdentity, post_id: PostId) -> Result<PostView> {
        let viewer = self.store.find_user(caller.id)?;
        let post = self.store.find_post(post_id)?;
        if !can_view(&viewer, &post) {
            return Err(SociableError::unauthorized(format!(
                "You are not allowed to view post {}",
                post_id
            )));
        }
        self.view(&post)
    }

    /// Applies a partial update to the caller's own post.
    pub fn update_post(
        &self,
        caller: &CallerIdentity,
        post_id: PostId,
        update: PostUpdate,
    ) -> Result<PostView> {
        update.validate()?;
        let caller_id = caller.id;
        let post = self.store.update_post(post_id, |post| {
            assert_owner(caller_id, post)?;
            if let Some(caption) = update.caption.clone() {
                post.caption = caption;
            }
            if let Some(image_url) = update.image_url.clone() {
                post.image_url = Some(image_url);
            }
            if let Some(video_url) = update.video_url.clone() {
                post.video_url = Some(video_url);
            }
            if let Some(location) = update.location.clone() {
                post.location = Some(location);
            }
            if let Some(status) = update.status {
                post.status = status;
            }
            post.updated_at = current_timestamp_millis();
            Ok(())
        })?;
        debug!(post = %post.id, "updated post");
        self.view(&post)
    }

    /// Soft-deletes the caller's own post: the record and its engagement
    /// relations are retained under the `Deleted` tier.
    pub fn delete_post(&self, caller: &CallerIdentity, post_id: PostId) -> Result<()> {
        let caller_id = caller.id;
        self.store.update_post(post_id, |post| {
            assert_owner(caller_id, post)?;
            post.status = PostStatus::Deleted;
            post.updated_at = current_timestamp_millis();
            Ok(())
        })?;
        info!(post = %post_id, "soft-deleted post");
        Ok(())
    }

    /// Sets the status of the caller's own post.
    ///
    /// The transition table is deliberately unrestricted: any status is
    /// reachable from any other, including restoring a `Deleted` post.
    pub fn change_status(
        &self,
        caller: &CallerIdentity,
        post_id: PostId,
        new_status: PostStatus,
    ) -> Result<PostView> {
        let caller_id = caller.id;
        let post = self.store.update_post(post_id, |post| {
            assert_owner(caller_id, post)?;
            post.status = new_status;
            post.updated_at = current_timestamp_millis();
            Ok(())
        })?;
        info!(post = %post.id, status = %new_status, "changed post status");
        self.view(&post)
    }

    /// Toggles the caller's membership in the post's like set.
    ///
    /// An involution: calling twice with the same caller restores the
    /// original membership and count.
    pub fn toggle_like(&self, caller: &CallerIdentity, post_id: PostId) -> Result<PostView> {
        let caller_id = caller.id;
        let post = self.store.update_post(post_id, |post| {
            if !post.liked_by.remove(&caller_id) {
                post.liked_by.insert(caller_id);
            }
            post.updated_at = current_timestamp_millis();
            Ok(())
        })?;
        debug!(post = %post.id, user = %caller_id, likes = post.like_count(), "toggled like");
        self.view(&post)
    }

    /// Toggles the caller's membership in the post's save set.
    pub fn toggle_save(&self, caller: &CallerIdentity, post_id: PostId) -> Result<PostView> {
        let caller_id = caller.id;
        let post = self.store.update_post(post_id, |post| {
            if !post.saved_by.remove(&caller_id) {
                post.saved_by.insert(caller_id);
            }
            post.updated_at = current_timestamp_millis();
            Ok(())
        })?;
        debug!(post = %post.id, user = %caller_id, saves = post.save_count(), "toggled save");
        self.view(&post)
    }

    /// Appends a comment by the caller to the end of the post's comment
    /// sequence. Comments are never edited or removed individually.
    pub fn add_comment(
        &self,
        caller: &CallerIdentity,
        post_id: PostId,
        text: &str,
    ) -> Result<PostView> {
        Validator::validate_comment_text(text)?;
        let comment_id = self.store.allocate_comment_id()?;
        let caller_id = caller.id;
        let text = text.to_string();
        let post = self.store.update_post(post_id, |post| {
            post.comments.push(Comment {
                id: comment_id,
                post_id: post.id,
                author_id: caller_id,
                text: text.clone(),
                created_at: current_timestamp_millis(),
            });
            post.updated_at = current_timestamp_millis();
            Ok(())
        })?;
        debug!(post = %post.id, user = %caller_id, "added comment");
        self.view(&post)
    }

    /// Comment bodies of a post in insertion order.
    pub fn comment_texts(&self, post_id: PostId) -> Result<Vec<String>> {
        Ok(self.store.find_post(post_id)?.comment_texts())
    }

    /// Comments of a post with resolved author names, in insertion order.
    pub fn comments(&self, post_id: PostId) -> Result<Vec<CommentView>> {
        let post = self.store.find_post(post_id)?;
        post.comments
            .iter()
            .map(|comment| {
                let author_name = match self.store.find_user(comment.author_id) {
                    Ok(author) => author.user_name,
                    // Comment authors may have deleted their account.
                    Err(SociableError::NotFound(_)) => "[deleted]".to_string(),
                    Err(e) => return Err(e),
                };
                Ok(CommentView::new(comment, author_name))
            })
            .collect()
    }

    /// Current like count of a post.
    pub fn like_count(&self, post_id: PostId) -> Result<usize> {
        Ok(self.store.find_post(post_id)?.like_count())
    }

    /// Current comment count of a post.
    pub fn comment_count(&self, post_id: PostId) -> Result<usize> {
        Ok(self.store.find_post(post_id)?.comment_count())
    }

    /// All posts the caller has saved, in store iteration order.
    ///
    /// A full scan; saved-post lookup has no index.
    pub fn saved_posts(&self, caller: &CallerIdentity) -> Result<Vec<PostView>> {
        let user = self.store.find_user(caller.id)?;
        let posts: Vec<Post> = self
            .store
            .all_posts()?
            .into_iter()
            .filter(|p| p.saved_by_user(user.id))
            .collect();
        self.views(&posts)
    }

    /// The global public feed: every `Public` post across all authors.
    pub fn public_feed(&self) -> Result<Vec<PostView>> {
        let posts = self.store.posts_by_status(PostStatus::Public)?;
        self.views(&posts)
    }

    /// The posts on `owner`'s profile as seen by the caller.
    ///
    /// The owner sees every post except `Deleted` ones; a follower sees
    /// `Public` and `FriendsOnly`; anyone else sees `Public` only.
    pub fn visible_posts_for(
        &self,
        caller: &CallerIdentity,
        owner: UserId,
    ) -> Result<Vec<PostView>> {
        let viewer = self.store.find_user(caller.id)?;
        // Resolve the owner too: an unknown profile is NotFound, not an
        // empty listing.
        if viewer.id != owner {
            self.store.find_user(owner)?;
        }
        let posts = if viewer.id == owner {
            self.store
                .posts_by_author_and_status_not(owner, PostStatus::Deleted)?
        } else {
            let statuses = profile_statuses(&viewer, owner);
            self.store.posts_by_author_and_status_in(owner, &statuses)?
        };
        self.views(&posts)
    }

    /// Case-insensitive caption search. Soft-deleted posts are excluded
    /// from the results.
    pub fn search_posts(&self, keyword: &str) -> Result<Vec<PostView>> {
        Validator::validate_search_query(keyword)?;
        let posts: Vec<Post> = self
            .store
            .posts_by_caption_containing(keyword)?
            .into_iter()
            .filter(|p| !p.is_deleted())
            .collect();
        self.views(&posts)
    }
}
