//! End-to-end tests for the social backend core.
//!
//! These tests run complete workflows through the public engine API:
//! registration and sign-in, posting, toggling likes and saves,
//! commenting, following, visibility filtering, and soft deletion.

use sociable::social::{
    CallerIdentity, MemoryStore, NewUser, Password, PostDraft, PostEngine, PostStatus, PostStore,
    PostUpdate, TokenIssuer, UserEngine, UserId,
};
use sociable::SociableError;
use std::sync::Arc;

const TEST_PASSWORD: &str = "Str0ng!pass";

struct TestApp {
    store: Arc<MemoryStore>,
    users: UserEngine<MemoryStore>,
    posts: PostEngine<MemoryStore>,
}

fn test_app() -> TestApp {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });

    let store = Arc::new(MemoryStore::new());
    let issuer = Arc::new(TokenIssuer::new());
    TestApp {
        store: store.clone(),
        users: UserEngine::new(store.clone(), issuer),
        posts: PostEngine::new(store),
    }
}

impl TestApp {
    /// Registers a user and resolves their registration token into a
    /// caller identity, the way the boundary layer would.
    fn sign_up(&self, user_name: &str) -> CallerIdentity {
        let (_, token) = self
            .users
            .register(NewUser {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                user_name: user_name.to_string(),
                email: format!("{}@example.com", user_name),
                password: Password::new(TEST_PASSWORD.to_string()),
                gender: None,
            })
            .expect("Failed to register user");
        self.users
            .resolve(token.as_str())
            .expect("Failed to resolve registration token")
    }

    fn post(&self, caller: &CallerIdentity, caption: &str) -> sociable::social::PostView {
        self.posts
            .create_post(
                caller,
                PostDraft {
                    caption: caption.to_string(),
                    ..PostDraft::default()
                },
            )
            .expect("Failed to create post")
    }
}

// =============================================================================
// Account Workflow Tests
// =============================================================================

/// Complete account workflow: register -> sign in -> resolve -> operate.
#[test]
fn test_register_sign_in_and_post() {
    let app = test_app();
    let alice = app.sign_up("alice");

    // Sign in again by username and use the fresh token.
    let token = app
        .users
        .sign_in("alice", &Password::new(TEST_PASSWORD.to_string()))
        .expect("Failed to sign in");
    let caller = app.users.resolve(token.as_str()).expect("Failed to resolve");
    assert_eq!(caller.id, alice.id);

    let view = app.post(&caller, "first light");
    assert_eq!(view.status, PostStatus::Public);
    assert_eq!(view.author.user_name, "alice");
}

#[test]
fn test_sign_in_by_email_and_bad_credentials() {
    let app = test_app();
    app.sign_up("alice");

    assert!(app
        .users
        .sign_in("alice@example.com", &Password::new(TEST_PASSWORD.to_string()))
        .is_ok());

    assert!(matches!(
        app.users
            .sign_in("alice", &Password::new("Wr0ng!pass".to_string())),
        Err(SociableError::Unauthorized(_))
    ));
    assert!(matches!(
        app.users
            .sign_in("ghost@example.com", &Password::new(TEST_PASSWORD.to_string())),
        Err(SociableError::Unauthorized(_))
    ));
}

#[test]
fn test_duplicate_registration_rejected() {
    let app = test_app();
    app.sign_up("alice");

    let result = app.users.register(NewUser {
        first_name: "Other".to_string(),
        last_name: "Person".to_string(),
        user_name: "alice".to_string(),
        email: "different@example.com".to_string(),
        password: Password::new(TEST_PASSWORD.to_string()),
        gender: None,
    });
    assert!(matches!(result, Err(SociableError::InvalidOperation(_))));
}

// =============================================================================
// Toggle Semantics
// =============================================================================

/// A full like round-trip: one user posts "sunset" (PUBLIC), another
/// likes it (count 1), then likes it again (count back to 0).
#[test]
fn test_like_toggle_scenario() {
    let app = test_app();
    let alice = app.sign_up("alice");
    let bob = app.sign_up("bob");

    let post = app.post(&alice, "sunset");
    assert_eq!(post.status, PostStatus::Public);

    let liked = app.posts.toggle_like(&bob, post.id).unwrap();
    assert_eq!(liked.like_count, 1);

    let unliked = app.posts.toggle_like(&bob, post.id).unwrap();
    assert_eq!(unliked.like_count, 0);
}

#[test]
fn test_toggles_are_independent_per_caller() {
    let app = test_app();
    let alice = app.sign_up("alice");
    let bob = app.sign_up("bob");
    let carol = app.sign_up("carol");

    let post = app.post(&alice, "sunset");
    app.posts.toggle_like(&bob, post.id).unwrap();
    app.posts.toggle_like(&carol, post.id).unwrap();
    // Bob un-liking does not disturb Carol's like.
    let view = app.posts.toggle_like(&bob, post.id).unwrap();
    assert_eq!(view.like_count, 1);

    let stored = app.store.find_post(post.id).unwrap();
    assert!(stored.liked_by_user(carol.id));
    assert!(!stored.liked_by_user(bob.id));
}

#[test]
fn test_save_toggle_and_saved_posts() {
    let app = test_app();
    let alice = app.sign_up("alice");
    let bob = app.sign_up("bob");

    let p1 = app.post(&alice, "first");
    let p2 = app.post(&alice, "second");

    app.posts.toggle_save(&bob, p1.id).unwrap();
    app.posts.toggle_save(&bob, p2.id).unwrap();
    app.posts.toggle_save(&bob, p1.id).unwrap(); // un-save the first

    let saved = app.posts.saved_posts(&bob).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, p2.id);
}

// =============================================================================
// Comments
// =============================================================================

#[test]
fn test_comments_append_in_order() {
    let app = test_app();
    let alice = app.sign_up("alice");
    let bob = app.sign_up("bob");

    let post = app.post(&alice, "sunset");
    app.posts.add_comment(&bob, post.id, "wow").unwrap();
    app.posts.add_comment(&alice, post.id, "thanks").unwrap();
    app.posts.add_comment(&bob, post.id, "hello").unwrap();

    assert_eq!(
        app.posts.comment_texts(post.id).unwrap(),
        vec!["wow", "thanks", "hello"]
    );

    let comments = app.posts.comments(post.id).unwrap();
    assert_eq!(comments.len(), 3);
    assert_eq!(comments[0].author_name, "bob");
    assert_eq!(comments[1].author_name, "alice");
}

#[test]
fn test_blank_comment_rejected() {
    let app = test_app();
    let alice = app.sign_up("alice");
    let post = app.post(&alice, "sunset");

    assert!(matches!(
        app.posts.add_comment(&alice, post.id, "  \t "),
        Err(SociableError::InvalidInput(_))
    ));
    assert_eq!(app.posts.comment_count(post.id).unwrap(), 0);
}

// =============================================================================
// Ownership and Soft Delete
// =============================================================================

/// A non-owner trying to delete someone else's post fails with
/// Unauthorized and the status is unchanged.
#[test]
fn test_non_owner_cannot_change_status() {
    let app = test_app();
    let alice = app.sign_up("alice");
    let bob = app.sign_up("bob");

    let post = app.post(&alice, "sunset");
    assert!(matches!(
        app.posts.change_status(&bob, post.id, PostStatus::Deleted),
        Err(SociableError::Unauthorized(_))
    ));
    assert_eq!(
        app.store.find_post(post.id).unwrap().status,
        PostStatus::Public
    );
}

/// A non-owner update fails with Unauthorized and the stored caption is
/// unmodified.
#[test]
fn test_non_owner_update_leaves_caption_unmodified() {
    let app = test_app();
    let alice = app.sign_up("alice");
    let bob = app.sign_up("bob");

    let post = app.post(&alice, "sunset");
    let result = app.posts.update_post(
        &bob,
        post.id,
        PostUpdate {
            caption: Some("defaced".to_string()),
            ..PostUpdate::default()
        },
    );
    assert!(matches!(result, Err(SociableError::Unauthorized(_))));
    assert_eq!(app.store.find_post(post.id).unwrap().caption, "sunset");
}

#[test]
fn test_soft_delete_hides_post_but_keeps_record() {
    let app = test_app();
    let alice = app.sign_up("alice");
    let bob = app.sign_up("bob");

    let post = app.post(&alice, "sunset");
    app.posts.toggle_like(&bob, post.id).unwrap();
    app.posts.delete_post(&alice, post.id).unwrap();

    // Hidden from the feed, from the author's profile, and from a
    // non-owner's view of the profile.
    assert!(app.posts.public_feed().unwrap().is_empty());
    assert!(app.posts.visible_posts_for(&alice, alice.id).unwrap().is_empty());
    assert!(app.posts.visible_posts_for(&bob, alice.id).unwrap().is_empty());

    // But the record survives with its engagement intact, and the author
    // can still fetch and restore it.
    let stored = app.store.find_post(post.id).unwrap();
    assert_eq!(stored.like_count(), 1);
    assert!(app.posts.get_post(&alice, post.id).is_ok());
    assert!(matches!(
        app.posts.get_post(&bob, post.id),
        Err(SociableError::Unauthorized(_))
    ));

    let restored = app
        .posts
        .change_status(&alice, post.id, PostStatus::Public)
        .unwrap();
    assert_eq!(restored.status, PostStatus::Public);
    assert_eq!(restored.like_count, 1);
}

// =============================================================================
// Follow Relation
// =============================================================================

/// follow(a, b) then follow(b, a): both directions hold independently.
#[test]
fn test_mutual_follow() {
    let app = test_app();
    let alice = app.sign_up("alice");
    let bob = app.sign_up("bob");

    app.users.follow(&alice, bob.id).unwrap();
    app.users.follow(&bob, alice.id).unwrap();

    let alice_profile = app.users.get_user(alice.id).unwrap();
    let bob_profile = app.users.get_user(bob.id).unwrap();
    assert_eq!(alice_profile.follower_count, 1);
    assert_eq!(alice_profile.following_count, 1);
    assert_eq!(bob_profile.follower_count, 1);
    assert_eq!(bob_profile.following_count, 1);
}

#[test]
fn test_self_follow_fails_and_changes_nothing() {
    let app = test_app();
    let alice = app.sign_up("alice");

    assert!(matches!(
        app.users.follow(&alice, alice.id),
        Err(SociableError::InvalidOperation(_))
    ));
    let profile = app.users.get_user(alice.id).unwrap();
    assert_eq!(profile.follower_count, 0);
    assert_eq!(profile.following_count, 0);
}

// =============================================================================
// Visibility
// =============================================================================

#[test]
fn test_friends_only_visible_to_followers_only() {
    let app = test_app();
    let alice = app.sign_up("alice");
    let bob = app.sign_up("bob");
    let carol = app.sign_up("carol");

    app.post(&alice, "for everyone");
    let friends = app.post(&alice, "for friends");
    app.posts
        .change_status(&alice, friends.id, PostStatus::FriendsOnly)
        .unwrap();

    app.users.follow(&bob, alice.id).unwrap();

    // Bob follows Alice and sees both tiers; Carol sees only PUBLIC.
    assert_eq!(app.posts.visible_posts_for(&bob, alice.id).unwrap().len(), 2);
    let for_carol = app.posts.visible_posts_for(&carol, alice.id).unwrap();
    assert_eq!(for_carol.len(), 1);
    assert_eq!(for_carol[0].caption, "for everyone");

    // The friends-only post never reaches the global feed.
    assert_eq!(app.posts.public_feed().unwrap().len(), 1);
}

#[test]
fn test_deleted_posts_never_listed_for_non_owners() {
    let app = test_app();
    let alice = app.sign_up("alice");
    let bob = app.sign_up("bob");
    app.users.follow(&bob, alice.id).unwrap();

    let post = app.post(&alice, "ephemeral");
    app.posts.delete_post(&alice, post.id).unwrap();

    let visible = app.posts.visible_posts_for(&bob, alice.id).unwrap();
    assert!(visible.iter().all(|p| p.id != post.id));
}

#[test]
fn test_profile_of_unknown_user_is_not_found() {
    let app = test_app();
    let alice = app.sign_up("alice");
    assert!(matches!(
        app.posts.visible_posts_for(&alice, UserId(404)),
        Err(SociableError::NotFound(_))
    ));
}

// =============================================================================
// Search
// =============================================================================

#[test]
fn test_caption_search_is_case_insensitive_and_skips_deleted() {
    let app = test_app();
    let alice = app.sign_up("alice");

    app.post(&alice, "Golden Sunset over the bay");
    let gone = app.post(&alice, "sunset rerun");
    app.posts.delete_post(&alice, gone.id).unwrap();
    app.post(&alice, "city lights");

    let found = app.posts.search_posts("SUNSET").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].caption, "Golden Sunset over the bay");
}

#[test]
fn test_user_search() {
    let app = test_app();
    app.sign_up("alice");
    app.sign_up("alina");
    app.sign_up("bob");

    let found = app.users.search_users("ali").unwrap();
    assert_eq!(found.len(), 2);
}

// =============================================================================
// Token Lifecycle
// =============================================================================

#[test]
fn test_deleted_account_tokens_stop_resolving() {
    let app = test_app();
    let alice = app.sign_up("alice");

    let token = app
        .users
        .sign_in("alice", &Password::new(TEST_PASSWORD.to_string()))
        .unwrap();
    app.users.delete_account(&alice).unwrap();

    assert!(matches!(
        app.users.resolve(token.as_str()),
        Err(SociableError::Unauthorized(_))
    ));
}
