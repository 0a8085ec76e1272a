//! The social domain: users, posts, visibility, and interactions.
//!
//! ## Structure
//!
//! - [`types`]: ids, statuses, and the timestamp helper.
//! - [`user`] / [`post`]: entity records, mutation inputs, projections.
//! - [`visibility`]: the pure read/ownership rules.
//! - [`auth`]: password hashing, bearer tokens, caller identities.
//! - [`store`]: the identity/post store contracts and the in-memory store.
//! - [`storage`]: the RocksDB-backed store.
//! - [`posts`] / [`users`]: the engines exposed to the boundary layer.
//!
//! ## Calling convention
//!
//! The boundary layer resolves credentials into a [`CallerIdentity`] once
//! (via [`users::UserEngine::resolve`]) and passes it explicitly into every
//! engine operation. Nothing in this module reads ambient authentication
//! state.
//!
//! ## Visibility tiers
//!
//! Posts carry one of three tiers: `PUBLIC` (everyone, global feed),
//! `FRIENDS_ONLY` (author and followers of the author), and `DELETED`
//! (soft-deleted: retained with all engagement relations, hidden from
//! every listing, restorable by the author).

pub mod auth;
pub mod post;
pub mod posts;
pub mod store;
pub mod storage;
pub mod types;
pub mod user;
pub mod users;
pub mod visibility;

pub use auth::{AccessToken, CallerIdentity, Password, TokenIssuer};
pub use post::{Comment, CommentView, Post, PostDraft, PostUpdate, PostView};
pub use posts::PostEngine;
pub use store::{MemoryStore, PostStore, UserStore};
pub use storage::SocialStorage;
pub use types::{current_timestamp_millis, CommentId, Gender, PostId, PostStatus, UserId};
pub use user::{NewUser, User, UserProfile, UserUpdate};
pub use users::UserEngine;
