//! Visibility and ownership rules.
//!
//! These are the pure decision functions applied to already-loaded records.
//! Existence is always checked before ownership: callers resolve ids to
//! records first (failing with `NotFound`), then apply these rules.
//!
//! `FriendsOnly` posts require the viewer to follow the author. The post's
//! status alone is never enough for the friends tier; this is deliberate —
//! see DESIGN.md for the visibility decisions.

use crate::error::{Result, SociableError};
use crate::social::post::Post;
use crate::social::types::{PostStatus, UserId};
use crate::social::user::User;

/// Decides whether `viewer` may read `post`.
///
/// - `Public` posts are visible to everyone.
/// - `FriendsOnly` posts are visible to the author and to viewers who
///   follow the author.
/// - `Deleted` posts are visible only to the author (direct fetch of one's
///   own deleted post is allowed; listings never include it).
pub fn can_view(viewer: &User, post: &Post) -> bool {
    if viewer.id == post.author_id {
        return true;
    }
    match post.status {
        PostStatus::Public => true,
        PostStatus::FriendsOnly => viewer.follows(post.author_id),
        PostStatus::Deleted => false,
    }
}

/// Fails with `Unauthorized` unless `caller` is the post's author.
///
/// Performs no state change; mutating operations call this before touching
/// the record.
pub fn assert_owner(caller: UserId, post: &Post) -> Result<()> {
    if post.author_id != caller {
        return Err(SociableError::unauthorized(format!(
            "Only the author may modify post {}",
            post.id
        )));
    }
    Ok(())
}

/// The status tiers visible on `owner`'s profile to `viewer`.
///
/// - the owner sees everything except `Deleted`;
/// - a follower sees `Public` and `FriendsOnly`;
/// - anyone else sees `Public` only.
pub fn profile_statuses(viewer: &User, owner: UserId) -> Vec<PostStatus> {
    if viewer.id == owner || viewer.follows(owner) {
        vec![PostStatus::Public, PostStatus::FriendsOnly]
    } else {
        vec![PostStatus::Public]
    }
}
