//! # sociable
//!
//! A social-networking backend core: who may see a post, who may change
//! it, and how toggle-style social actions (like, save, follow) are
//! applied consistently.
//!
//! ## Design
//!
//! - **Explicit caller identity**: every operation takes a resolved
//!   [`social::CallerIdentity`]; credentials are exchanged for one at the
//!   boundary and never travel further in.
//! - **Visibility tiers**: posts are `PUBLIC`, `FRIENDS_ONLY`, or
//!   `DELETED` (soft-deleted). Deleted posts are retained with their
//!   engagement relations and hidden from every listing.
//! - **Toggle semantics**: like and save flip set membership; applying a
//!   toggle twice restores the original state.
//! - **Atomic relations**: each toggle is one read-modify-write of a
//!   single post; a follow writes both user records in one unit of work,
//!   so no partial state is ever observable.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sociable::social::{
//!     MemoryStore, NewUser, Password, PostDraft, PostEngine, TokenIssuer, UserEngine,
//! };
//!
//! # fn main() -> sociable::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let issuer = Arc::new(TokenIssuer::new());
//! let users = UserEngine::new(store.clone(), issuer);
//! let posts = PostEngine::new(store);
//!
//! let (profile, token) = users.register(NewUser {
//!     first_name: "Alice".into(),
//!     last_name: "Larsen".into(),
//!     user_name: "alice".into(),
//!     email: "alice@example.com".into(),
//!     password: Password::new("Str0ng!pass".into()),
//!     gender: None,
//! })?;
//!
//! let caller = users.resolve(token.as_str())?;
//! let post = posts.create_post(&caller, PostDraft {
//!     caption: "sunset".into(),
//!     ..PostDraft::default()
//! })?;
//! assert_eq!(post.author.id, profile.id);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod social;
pub mod storage;
pub mod validation;

pub use error::{Result, SociableError};
