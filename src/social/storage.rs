//! Persistent social store backed by RocksDB.
//!
//! ## Storage layout
//!
//! Column families:
//! - `users`: big-endian user id -> bincode `User`
//! - `posts`: big-endian post id -> bincode `Post`
//! - `meta`: counter name -> big-endian `u64` (id sequences)
//! - `idx_usernames`: username -> big-endian user id
//! - `idx_emails`: lowercased email -> big-endian user id
//!
//! Ids are sequential and big-endian encoded, so key order is creation
//! order and full scans come back sorted without a comparator.
//!
//! Every read-modify-write sequence (uniqueness check + insert, closure
//! update, pair update) runs under a single write mutex; multi-key commits
//! go through a `WriteBatch` so a user record and its index entries — or
//! both sides of a pair update — land atomically.

use crate::error::{Result, SociableError};
use crate::social::post::Post;
use crate::social::store::{PostStore, UserStore};
use crate::social::types::{CommentId, PostId, PostStatus, UserId};
use crate::social::user::User;
use crate::storage::{RocksDbConfig, RocksDbHandle};
use rocksdb::WriteBatch;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

const CF_USERS: &str = "users";
const CF_POSTS: &str = "posts";
const CF_META: &str = "meta";
const CF_IDX_USERNAMES: &str = "idx_usernames";
const CF_IDX_EMAILS: &str = "idx_emails";

const COLUMN_FAMILIES: &[&str] = &[CF_USERS, CF_POSTS, CF_META, CF_IDX_USERNAMES, CF_IDX_EMAILS];

const META_NEXT_USER_ID: &[u8] = b"next_user_id";
const META_NEXT_POST_ID: &[u8] = b"next_post_id";
const META_NEXT_COMMENT_ID: &[u8] = b"next_comment_id";

fn id_key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

fn decode_id(bytes: &[u8]) -> Result<u64> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| SociableError::serialization("Malformed id bytes in index"))?;
    Ok(u64::from_be_bytes(arr))
}

fn user_not_found(id: UserId) -> SociableError {
    SociableError::not_found(format!("User not found with id: {}", id))
}

fn post_not_found(id: PostId) -> SociableError {
    SociableError::not_found(format!("Post not found with id: {}", id))
}

/// RocksDB-backed implementation of [`UserStore`] and [`PostStore`].
pub struct SocialStorage {
    db: RocksDbHandle,
    /// Serializes read-modify-write sequences across all records.
    write_lock: Mutex<()>,
}

impl SocialStorage {
    /// Opens (or creates) the store at `path` with default tuning.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, &RocksDbConfig::default())
    }

    /// Opens (or creates) the store at `path`.
    pub fn open_with_config(path: impl AsRef<Path>, config: &RocksDbConfig) -> Result<Self> {
        let db = RocksDbHandle::open(&path, config, COLUMN_FAMILIES)?;
        info!(path = %path.as_ref().display(), "opened social store");
        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    /// Bumps and returns an id counter. Caller must hold the write lock.
    fn next_id(&self, counter: &[u8]) -> Result<u64> {
        let current = match self.db.get_raw(CF_META, counter)? {
            Some(bytes) => decode_id(&bytes)?,
            None => 0,
        };
        let next = current + 1;
        self.db.put_raw(CF_META, counter, &id_key(next))?;
        Ok(next)
    }

    fn load_user(&self, id: UserId) -> Result<Option<User>> {
        self.db.get(CF_USERS, &id_key(id.0))
    }

    fn load_post(&self, id: PostId) -> Result<Option<Post>> {
        self.db.get(CF_POSTS, &id_key(id.0))
    }

    fn user_id_by_name(&self, user_name: &str) -> Result<Option<UserId>> {
        Ok(self
            .db
            .get_raw(CF_IDX_USERNAMES, user_name.as_bytes())?
            .map(|bytes| decode_id(&bytes))
            .transpose()?
            .map(UserId))
    }

    fn user_id_by_email(&self, email: &str) -> Result<Option<UserId>> {
        Ok(self
            .db
            .get_raw(CF_IDX_EMAILS, email.to_lowercase().as_bytes())?
            .map(|bytes| decode_id(&bytes))
            .transpose()?
            .map(UserId))
    }

    /// Queues index updates for a changed user record, checking that a new
    /// username/email is not already taken. Caller must hold the write
    /// lock.
    fn queue_index_changes(&self, batch: &mut WriteBatch, old: &User, new: &User) -> Result<()> {
        if old.user_name != new.user_name {
            if self.user_id_by_name(&new.user_name)?.is_some() {
                return Err(SociableError::conflict(format!(
                    "Username already taken: {}",
                    new.user_name
                )));
            }
            batch.delete_cf(&self.db.cf(CF_IDX_USERNAMES)?, old.user_name.as_bytes());
            batch.put_cf(
                &self.db.cf(CF_IDX_USERNAMES)?,
                new.user_name.as_bytes(),
                id_key(new.id.0),
            );
        }
        let old_email = old.email.to_lowercase();
        let new_email = new.email.to_lowercase();
        if old_email != new_email {
            if let Some(holder) = self.user_id_by_email(&new_email)? {
                if holder != new.id {
                    return Err(SociableError::conflict(format!(
                        "Email already taken: {}",
                        new.email
                    )));
                }
            }
            batch.delete_cf(&self.db.cf(CF_IDX_EMAILS)?, old_email.as_bytes());
            batch.put_cf(
                &self.db.cf(CF_IDX_EMAILS)?,
                new_email.as_bytes(),
                id_key(new.id.0),
            );
        }
        Ok(())
    }
}

impl UserStore for SocialStorage {
    fn insert_user(&self, mut user: User) -> Result<User> {
        let _guard = self.write_lock.lock().unwrap();

        if self.user_id_by_name(&user.user_name)?.is_some() {
            return Err(SociableError::conflict(format!(
                "Username already taken: {}",
                user.user_name
            )));
        }
        if self.user_id_by_email(&user.email)?.is_some() {
            return Err(SociableError::conflict(format!(
                "Email already taken: {}",
                user.email
            )));
        }

        user.id = UserId(self.next_id(META_NEXT_USER_ID)?);

        let mut batch = WriteBatch::default();
        batch.put_cf(
            &self.db.cf(CF_USERS)?,
            id_key(user.id.0),
            RocksDbHandle::encode(&user)?,
        );
        batch.put_cf(
            &self.db.cf(CF_IDX_USERNAMES)?,
            user.user_name.as_bytes(),
            id_key(user.id.0),
        );
        batch.put_cf(
            &self.db.cf(CF_IDX_EMAILS)?,
            user.email.to_lowercase().as_bytes(),
            id_key(user.id.0),
        );
        self.db.write(batch)?;
        Ok(user)
    }

    fn find_user(&self, id: UserId) -> Result<User> {
        self.load_user(id)?.ok_or_else(|| user_not_found(id))
    }

    fn find_user_by_name(&self, user_name: &str) -> Result<User> {
        let id = self.user_id_by_name(user_name)?.ok_or_else(|| {
            SociableError::not_found(format!("User not found with username: {}", user_name))
        })?;
        self.find_user(id)
    }

    fn find_user_by_email(&self, email: &str) -> Result<User> {
        let id = self.user_id_by_email(email)?.ok_or_else(|| {
            SociableError::not_found(format!("User not found with email: {}", email))
        })?;
        self.find_user(id)
    }

    fn user_name_exists(&self, user_name: &str) -> Result<bool> {
        Ok(self.user_id_by_name(user_name)?.is_some())
    }

    fn email_exists(&self, email: &str) -> Result<bool> {
        Ok(self.user_id_by_email(email)?.is_some())
    }

    fn all_users(&self) -> Result<Vec<User>> {
        self.db.values(CF_USERS)
    }

    fn search_users(&self, query: &str) -> Result<Vec<User>> {
        let query_lower = query.to_lowercase();
        Ok(self
            .all_users()?
            .into_iter()
            .filter(|u| u.matches_query(&query_lower))
            .collect())
    }

    fn update_user<F>(&self, id: UserId, f: F) -> Result<User>
    where
        F: FnOnce(&mut User) -> Result<()>,
    {
        let _guard = self.write_lock.lock().unwrap();
        let old = self.load_user(id)?.ok_or_else(|| user_not_found(id))?;
        let mut user = old.clone();
        f(&mut user)?;

        let mut batch = WriteBatch::default();
        self.queue_index_changes(&mut batch, &old, &user)?;
        batch.put_cf(
            &self.db.cf(CF_USERS)?,
            id_key(id.0),
            RocksDbHandle::encode(&user)?,
        );
        self.db.write(batch)?;
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
        let _guard = self.write_lock.lock().unwrap();
        let old_a = self.load_user(first)?.ok_or_else(|| user_not_found(first))?;
        let old_b = self
            .load_user(second)?
            .ok_or_else(|| user_not_found(second))?;
        let mut a = old_a.clone();
        let mut b = old_b.clone();
        f(&mut a, &mut b)?;

        // Both records land in one batch: a crash or failure between the
        // two updates can never leave a half-applied pair.
        let mut batch = WriteBatch::default();
        self.queue_index_changes(&mut batch, &old_a, &a)?;
        self.queue_index_changes(&mut batch, &old_b, &b)?;
        batch.put_cf(
            &self.db.cf(CF_USERS)?,
            id_key(first.0),
            RocksDbHandle::encode(&a)?,
        );
        batch.put_cf(
            &self.db.cf(CF_USERS)?,
            id_key(second.0),
            RocksDbHandle::encode(&b)?,
        );
        self.db.write(batch)?;
        Ok((a, b))
    }

    fn delete_user(&self, id: UserId) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        let user = self.load_user(id)?.ok_or_else(|| user_not_found(id))?;

        let mut batch = WriteBatch::default();
        batch.delete_cf(&self.db.cf(CF_USERS)?, id_key(id.0));
        batch.delete_cf(&self.db.cf(CF_IDX_USERNAMES)?, user.user_name.as_bytes());
        batch.delete_cf(
            &self.db.cf(CF_IDX_EMAILS)?,
            user.email.to_lowercase().as_bytes(),
        );
        self.db.write(batch)
    }
}

impl PostStore for SocialStorage {
    fn insert_post(&self, mut post: Post) -> Result<Post> {
        let _guard = self.write_lock.lock().unwrap();
        post.id = PostId(self.next_id(META_NEXT_POST_ID)?);
        self.db.put(CF_POSTS, &id_key(post.id.0), &post)?;
        Ok(post)
    }

    fn find_post(&self, id: PostId) -> Result<Post> {
        self.load_post(id)?.ok_or_else(|| post_not_found(id))
    }

    fn posts_by_status(&self, status: PostStatus) -> Result<Vec<Post>> {
        Ok(self
            .all_posts()?
            .into_iter()
            .filter(|p| p.status == status)
            .collect())
    }

    fn posts_by_author(&self, author: UserId) -> Result<Vec<Post>> {
        Ok(self
            .all_posts()?
            .into_iter()
            .filter(|p| p.author_id == author)
            .collect())
    }

    fn posts_by_author_and_status_not(
        &self,
        author: UserId,
        excluded: PostStatus,
    ) -> Result<Vec<Post>> {
        Ok(self
            .all_posts()?
            .into_iter()
            .filter(|p| p.author_id == author && p.status != excluded)
            .collect())
    }

    fn posts_by_author_and_status_in(
        &self,
        author: UserId,
        statuses: &[PostStatus],
    ) -> Result<Vec<Post>> {
        Ok(self
            .all_posts()?
            .into_iter()
            .filter(|p| p.author_id == author && statuses.contains(&p.status))
            .collect())
    }

    fn posts_by_caption_containing(&self, keyword: &str) -> Result<Vec<Post>> {
        let keyword_lower = keyword.to_lowercase();
        Ok(self
            .all_posts()?
            .into_iter()
            .filter(|p| p.caption.to_lowercase().contains(&keyword_lower))
            .collect())
    }

    fn all_posts(&self) -> Result<Vec<Post>> {
        self.db.values(CF_POSTS)
    }

    fn update_post<F>(&self, id: PostId, f: F) -> Result<Post>
    where
        F: FnOnce(&mut Post) -> Result<()>,
    {
        let _guard = self.write_lock.lock().unwrap();
        let mut post = self.load_post(id)?.ok_or_else(|| post_not_found(id))?;
        f(&mut post)?;
        self.db.put(CF_POSTS, &id_key(id.0), &post)?;
        Ok(post)
    }

    fn allocate_comment_id(&self) -> Result<CommentId> {
        let _guard = self.write_lock.lock().unwrap();
        Ok(CommentId(self.next_id(META_NEXT_COMMENT_ID)?))
    }

    fn delete_post(&self, id: PostId) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap();
        if self.load_post(id)?.is_none() {
            return Err(post_not_found(id));
        }
        self.db.delete(CF_POSTS, &id_key(id.0))
    }
}
