//! Store contracts and the in-memory store.
//!
//! The engines consume two collaborator interfaces: the identity store
//! ([`UserStore`]) and the post store ([`PostStore`]). The closure-based
//! `update_*` methods are the transaction boundary: the closure's mutations
//! are committed only when it returns `Ok`, and `update_user_pair` commits
//! both records or neither. This is what makes toggles safe under
//! concurrency and keeps the follow relation free of partial state.
//!
//! [`MemoryStore`] is the reference implementation, used by the engine test
//! suites. For persistence, see the `storage` module in this crate and the
//! RocksDB-backed store in [`crate::social::storage`].

use crate::error::{Result, SociableError};
use crate::social::post::Post;
use crate::social::types::{CommentId, PostId, PostStatus, UserId};
use crate::social::user::User;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// The identity store: user records and the follower/following relation.
pub trait UserStore {
    /// Inserts a new user, assigning a fresh id (any id on the input is
    /// ignored). Fails with `Conflict` when the username or email is
    /// already taken.
    fn insert_user(&self, user: User) -> Result<User>;

    /// Looks up a user by id.
    fn find_user(&self, id: UserId) -> Result<User>;

    /// Looks up a user by exact username.
    fn find_user_by_name(&self, user_name: &str) -> Result<User>;

    /// Looks up a user by email (case-insensitive).
    fn find_user_by_email(&self, email: &str) -> Result<User>;

    /// Returns true if a user with this username exists.
    fn user_name_exists(&self, user_name: &str) -> Result<bool>;

    /// Returns true if a user with this email exists.
    fn email_exists(&self, email: &str) -> Result<bool>;

    /// All users in id order.
    fn all_users(&self) -> Result<Vec<User>>;

    /// Case-insensitive substring search over username, names, and email.
    fn search_users(&self, query: &str) -> Result<Vec<User>>;

    /// Atomically mutates one user record. The closure's changes are
    /// committed only when it returns `Ok`.
    fn update_user<F>(&self, id: UserId, f: F) -> Result<User>
    where
        F: FnOnce(&mut User) -> Result<()>,
        Self: Sized;

    /// Atomically mutates two distinct user records as one unit of work:
    /// both are committed, or neither.
    fn update_user_pair<F>(&self, first: UserId, second: UserId, f: F) -> Result<(User, User)>
    where
        F: FnOnce(&mut User, &mut User) -> Result<()>,
        Self: Sized;

    /// Removes a user record.
    fn delete_user(&self, id: UserId) -> Result<()>;
}

/// The post store: post records with their embedded engagement relations.
pub trait PostStore {
    /// Inserts a new post, assigning a fresh id (any id on the input is
    /// ignored).
    fn insert_post(&self, post: Post) -> Result<Post>;

    /// Looks up a post by id.
    fn find_post(&self, id: PostId) -> Result<Post>;

    /// All posts with the given status, in id order.
    fn posts_by_status(&self, status: PostStatus) -> Result<Vec<Post>>;

    /// All posts by an author, in id order, regardless of status.
    fn posts_by_author(&self, author: UserId) -> Result<Vec<Post>>;

    /// All posts by an author excluding one status.
    fn posts_by_author_and_status_not(
        &self,
        author: UserId,
        excluded: PostStatus,
    ) -> Result<Vec<Post>>;

    /// All posts by an author whose status is in the given set.
    fn posts_by_author_and_status_in(
        &self,
        author: UserId,
        statuses: &[PostStatus],
    ) -> Result<Vec<Post>>;

    /// Case-insensitive substring match over captions, all statuses.
    fn posts_by_caption_containing(&self, keyword: &str) -> Result<Vec<Post>>;

    /// Every post in the store, in id order.
    fn all_posts(&self) -> Result<Vec<Post>>;

    /// Atomically mutates one post record (single read-modify-write). The
    /// closure's changes are committed only when it returns `Ok`.
    fn update_post<F>(&self, id: PostId, f: F) -> Result<Post>
    where
        F: FnOnce(&mut Post) -> Result<()>,
        Self: Sized;

    /// Allocates a fresh comment id.
    fn allocate_comment_id(&self) -> Result<CommentId>;

    /// Removes a post record outright. The engines soft-delete instead;
    /// this exists for store maintenance.
    fn delete_post(&self, id: PostId) -> Result<()>;
}

fn user_not_found(id: UserId) -> SociableError {
    SociableError::not_found(format!("User not found with id: {}", id))
}

fn post_not_found(id: PostId) -> SociableError {
    SociableError::not_found(format!("Post not found with id: {}", id))
}

/// In-memory store backing both collaborator interfaces.
///
/// Records live in `BTreeMap`s so iteration order is ascending id, which
/// is creation order. Every mutating method takes the write lock for the
/// whole read-modify-write, so closures never observe or leave partial
/// state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<BTreeMap<UserId, User>>,
    posts: RwLock<BTreeMap<PostId, Post>>,
    next_user_id: AtomicU64,
    next_post_id: AtomicU64,
    next_comment_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of user records.
    pub fn user_count(&self) -> usize {
        self.users.read().unwrap().len()
    }

    /// Number of post records (including soft-deleted ones).
    pub fn post_count(&self) -> usize {
        self.posts.read().unwrap().len()
    }
}

impl UserStore for MemoryStore {
    fn insert_user(&self, mut user: User) -> Result<User> {
        let mut users = self.users.write().unwrap();
        if users.values().any(|u| u.user_name == user.user_name) {
            return Err(SociableError::conflict(format!(
                "Username already taken: {}",
                user.user_name
            )));
        }
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(SociableError::conflict(format!(
                "Email already taken: {}",
                user.email
            )));
        }
        let id = UserId(self.next_user_id.fetch_add(1, Ordering::SeqCst) + 1);
        user.id = id;
        users.insert(id, user.clone());
        Ok(user)
    }

    fn find_user(&self, id: UserId) -> Result<User> {
        self.users
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| user_not_found(id))
    }

    fn find_user_by_name(&self, user_name: &str) -> Result<User> {
        self.users
            .read()
            .unwrap()
            .values()
            .find(|u| u.user_name == user_name)
            .cloned()
            .ok_or_else(|| {
                SociableError::not_found(format!("User not found with username: {}", user_name))
            })
    }

    fn find_user_by_email(&self, email: &str) -> Result<User> {
        self.users
            .read()
            .unwrap()
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
            .ok_or_else(|| {
                SociableError::not_found(format!("User not found with email: {}", email))
            })
    }

    fn user_name_exists(&self, user_name: &str) -> Result<bool> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .any(|u| u.user_name == user_name))
    }

    fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email)))
    }

    fn all_users(&self) -> Result<Vec<User>> {
        Ok(self.users.read().unwrap().values().cloned().collect())
    }

    fn search_users(&self, query: &str) -> Result<Vec<User>> {
        let query_lower = query.to_lowercase();
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .filter(|u| u.matches_query(&query_lower))
            .cloned()
            .collect())
    }

    fn update_user<F>(&self, id: UserId, f: F) -> Result<User>
    where
        F: FnOnce(&mut User) -> Result<()>,
    {
        let mut users = self.users.write().unwrap();
        let mut user = users.get(&id).cloned().ok_or_else(|| user_not_found(id))?;
        f(&mut user)?;
        users.insert(id, user.clone());
        Ok(user)
    }

    fn update_user_pair<F>(&self, first: UserId, second: UserId, f: F) -> Result<(User, User)>
    where
        F: FnOnce(&mut User, &mut User) -> Result<()>,
    {
        if first == second {
            return Err(SociableError::invalid_operation(
                "Cannot update a user pair against itself",
            ));
        }
        let mut users = self.users.write().unwrap();
        let mut a = users
            .get(&first)
            .cloned()
            .ok_or_else(|| user_not_found(first))?;
        let mut b = users
            .get(&second)
            .cloned()
            .ok_or_else(|| user_not_found(second))?;
        f(&mut a, &mut b)?;
        users.insert(first, a.clone());
        users.insert(second, b.clone());
        Ok((a, b))
    }

    fn delete_user(&self, id: UserId) -> Result<()> {
        self.users
            .write()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| user_not_found(id))
    }
}

impl PostStore for MemoryStore {
    fn insert_post(&self, mut post: Post) -> Result<Post> {
        let id = PostId(self.next_post_id.fetch_add(1, Ordering::SeqCst) + 1);
        post.id = id;
        self.posts.write().unwrap().insert(id, post.clone());
        Ok(post)
    }

    fn find_post(&self, id: PostId) -> Result<Post> {
        self.posts
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| post_not_found(id))
    }

    fn posts_by_status(&self, status: PostStatus) -> Result<Vec<Post>> {
        Ok(self
            .posts
            .read()
            .unwrap()
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect())
    }

    fn posts_by_author(&self, author: UserId) -> Result<Vec<Post>> {
        Ok(self
            .posts
            .read()
            .unwrap()
            .values()
            .filter(|p| p.author_id == author)
            .cloned()
            .collect())
    }

    fn posts_by_author_and_status_not(
        &self,
        author: UserId,
        excluded: PostStatus,
    ) -> Result<Vec<Post>> {
        Ok(self
            .posts
            .read()
            .unwrap()
            .values()
            .filter(|p| p.author_id == author && p.status != excluded)
            .cloned()
            .collect())
    }

    fn posts_by_author_and_status_in(
        &self,
        author: UserId,
        statuses: &[PostStatus],
    ) -> Result<Vec<Post>> {
        Ok(self
            .posts
            .read()
            .unwrap()
            .values()
            .filter(|p| p.author_id == author && statuses.contains(&p.status))
            .cloned()
            .collect())
    }

    fn posts_by_caption_containing(&self, keyword: &str) -> Result<Vec<Post>> {
        let keyword_lower = keyword.to_lowercase();
        Ok(self
            .posts
            .read()
            .unwrap()
            .values()
            .filter(|p| p.caption.to_lowercase().contains(&keyword_lower))
            .cloned()
            .collect())
    }

    fn all_posts(&self) -> Result<Vec<Post>> {
        Ok(self.posts.read().unwrap().values().cloned().collect())
    }

    fn update_post<F>(&self, id: PostId, f: F) -> Result<Post>
    where
        F: FnOnce(&mut Post) -> Result<()>,
    {
        let mut posts = self.posts.write().unwrap();
        let mut post = posts.get(&id).cloned().ok_or_else(|| post_not_found(id))?;
        f(&mut post)?;
        posts.insert(id, post.clone());
        Ok(post)
    }

    fn allocate_comment_id(&self) -> Result<CommentId> {
        Ok(CommentId(
            self.next_comment_id.fetch_add(1, Ordering::SeqCst) + 1,
        ))
    }

    fn delete_post(&self, id: PostId) -> Result<()> {
        self.posts
            .write()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| post_not_found(id))
    }
}
