//! Integration tests for the friend-and-voting workflow
//!
//! These tests run against a real PostgreSQL instance (DATABASE_URL) and are
//! ignored by default; run them with `cargo test -- --ignored`. Each test
//! registers its own throwaway users so runs do not interfere, and the suite
//! is serialized because the leaderboard test observes global state.

use api::error::ApiError;
use api::repositories::{UserRepository, friends::FriendRepository, posts::PostRepository};
use chrono::Utc;
use common::database::{DatabaseConfig, init_pool};
use serial_test::serial;
use sqlx::PgPool;
use uuid::Uuid;

async fn setup() -> PgPool {
    let config = DatabaseConfig::from_env().expect("database config");
    let pool = init_pool(&config).await.expect("database pool");
    sqlx::migrate!().run(&pool).await.expect("migrations");
    pool
}

fn unique(name: &str) -> String {
    // Usernames are capped at 32 chars, so use a short random suffix
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}", name, &suffix[..12])
}

async fn register(users: &UserRepository, name: &str) -> api::models::user::UserProfile {
    let username = unique(name);
    users
        .create(&username, &format!("{}@example.com", username), "hunter22hunter22")
        .await
        .expect("register user")
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_accept_creates_symmetric_friendship() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let friends = FriendRepository::new(pool.clone());

    let a = register(&users, "alice").await;
    let b = register(&users, "bob").await;

    friends.send_request(a.id, &b.username).await.unwrap();
    friends.accept_request(b.id, a.id).await.unwrap();

    let a = users.find_by_id(a.id).await.unwrap().unwrap();
    let b = users.find_by_id(b.id).await.unwrap().unwrap();

    assert!(a.friends.contains(&b.id));
    assert!(b.friends.contains(&a.id));
    assert!(!b.friend_requests.contains(&a.id));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_duplicate_send_does_not_duplicate_entry() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let friends = FriendRepository::new(pool.clone());

    let a = register(&users, "alice").await;
    let b = register(&users, "bob").await;

    friends.send_request(a.id, &b.username).await.unwrap();

    // The repeat is rejected the same way every time and leaves the set alone
    for _ in 0..2 {
        let err = friends.send_request(a.id, &b.username).await.unwrap_err();
        assert!(matches!(err, ApiError::AlreadyRequested));
    }

    let b = users.find_by_id(b.id).await.unwrap().unwrap();
    assert_eq!(b.friend_requests.iter().filter(|id| **id == a.id).count(), 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_send_request_failure_modes() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let friends = FriendRepository::new(pool.clone());

    let a = register(&users, "alice").await;
    let b = register(&users, "bob").await;

    let err = friends.send_request(a.id, "no_such_user_here").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = friends.send_request(a.id, &a.username).await.unwrap_err();
    assert!(matches!(err, ApiError::SelfReference));

    // Lookup is case-insensitive
    friends
        .send_request(a.id, &b.username.to_uppercase())
        .await
        .unwrap();

    // B now has a pending request from A, so B gets told to accept instead
    let err = friends.send_request(b.id, &a.username).await.unwrap_err();
    assert!(matches!(err, ApiError::ReciprocalPending));

    friends.accept_request(b.id, a.id).await.unwrap();
    let err = friends.send_request(a.id, &b.username).await.unwrap_err();
    assert!(matches!(err, ApiError::AlreadyFriends));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_decline_and_remove_friend() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let friends = FriendRepository::new(pool.clone());

    let a = register(&users, "alice").await;
    let b = register(&users, "bob").await;

    friends.send_request(a.id, &b.username).await.unwrap();
    friends.decline_request(b.id, a.id).await.unwrap();

    let b_row = users.find_by_id(b.id).await.unwrap().unwrap();
    assert!(b_row.friend_requests.is_empty());
    assert!(b_row.friends.is_empty());

    friends.send_request(a.id, &b.username).await.unwrap();
    friends.accept_request(b.id, a.id).await.unwrap();
    friends.remove_friend(a.id, b.id).await.unwrap();

    let a_row = users.find_by_id(a.id).await.unwrap().unwrap();
    let b_row = users.find_by_id(b.id).await.unwrap().unwrap();
    assert!(a_row.friends.is_empty());
    assert!(b_row.friends.is_empty());
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_vote_flow_with_cooldown() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let friends = FriendRepository::new(pool.clone());

    let a = register(&users, "alice").await;
    let bob = register(&users, "bob").await;

    friends.send_request(a.id, &bob.username).await.unwrap();
    friends.accept_request(bob.id, a.id).await.unwrap();

    let now = Utc::now();
    users.cast_vote(a.id, bob.id, now).await.unwrap();

    let bob_row = users.find_by_id(bob.id).await.unwrap().unwrap();
    assert_eq!(bob_row.votes, 1);

    let a_row = users.find_by_id(a.id).await.unwrap().unwrap();
    assert_eq!(a_row.last_vote_at.map(|t| t.timestamp_millis()), Some(now.timestamp_millis()));

    // A second vote within 24 hours is rejected
    let err = users.cast_vote(a.id, bob.id, now).await.unwrap_err();
    assert!(matches!(err, ApiError::CooldownActive(_)));

    let bob_row = users.find_by_id(bob.id).await.unwrap().unwrap();
    assert_eq!(bob_row.votes, 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_leaderboard_filters_and_orders() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());

    let five = register(&users, "five").await;
    let zero = register(&users, "zero").await;
    let twelve = register(&users, "twelve").await;

    sqlx::query("UPDATE users SET votes = 5 WHERE id = $1")
        .bind(five.id)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE users SET votes = 12 WHERE id = $1")
        .bind(twelve.id)
        .execute(&pool)
        .await
        .unwrap();

    let board = users.leaderboard(1).await.unwrap();
    let ours: Vec<_> = board
        .into_iter()
        .filter(|u| [five.id, zero.id, twelve.id].contains(&u.id))
        .collect();

    assert_eq!(ours.len(), 2);
    assert_eq!(ours[0].id, twelve.id);
    assert_eq!(ours[0].votes, 12);
    assert_eq!(ours[1].id, five.id);
    assert_eq!(ours[1].votes, 5);

    // Boost one user past anything earlier runs left behind, so the global
    // number one is deterministic, then clean the outlier up
    let runaway = Utc::now().timestamp() as i32;
    sqlx::query("UPDATE users SET votes = $2 WHERE id = $1")
        .bind(twelve.id)
        .bind(runaway)
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(users.top_ranked().await.unwrap(), Some(twelve.id));

    users.delete_user(twelve.id).await.unwrap();
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_top_ranked_ignores_users_without_votes() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());

    let unsung = register(&users, "unsung").await;

    let top = users.top_ranked().await.unwrap();
    assert_ne!(top, Some(unsung.id));
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_toggle_like_alternates_and_keeps_count_consistent() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let posts = PostRepository::new(pool.clone());

    let author = register(&users, "author").await;
    let fan = register(&users, "fan").await;

    let post = posts.create(author.id, Some("a joke")).await.unwrap();

    for round in 0..4 {
        let updated = posts.toggle_like(post.id, fan.id).await.unwrap();
        let liked = round % 2 == 0;
        assert_eq!(updated.liked_by.contains(&fan.id), liked);
        assert_eq!(updated.likes as usize, updated.liked_by.len());
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_delete_user_scrubs_all_references() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());
    let friends = FriendRepository::new(pool.clone());
    let posts = PostRepository::new(pool.clone());

    let doomed = register(&users, "doomed").await;
    let friend = register(&users, "friend").await;
    let stranger = register(&users, "stranger").await;

    friends.send_request(doomed.id, &friend.username).await.unwrap();
    friends.accept_request(friend.id, doomed.id).await.unwrap();
    friends.send_request(doomed.id, &stranger.username).await.unwrap();

    let own_post = posts.create(doomed.id, Some("soon gone")).await.unwrap();
    let other_post = posts.create(friend.id, Some("stays")).await.unwrap();
    posts.toggle_like(other_post.id, doomed.id).await.unwrap();

    users.delete_user(doomed.id).await.unwrap();

    assert!(users.find_by_id(doomed.id).await.unwrap().is_none());
    assert!(posts.find_by_id(own_post.id).await.unwrap().is_none());

    let friend_row = users.find_by_id(friend.id).await.unwrap().unwrap();
    assert!(!friend_row.friends.contains(&doomed.id));

    let stranger_row = users.find_by_id(stranger.id).await.unwrap().unwrap();
    assert!(!stranger_row.friend_requests.contains(&doomed.id));

    let other_post = posts.find_by_id(other_post.id).await.unwrap().unwrap();
    assert!(!other_post.liked_by.contains(&doomed.id));
    assert_eq!(other_post.likes, 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_change_username_cooldown_and_uniqueness() {
    let pool = setup().await;
    let users = UserRepository::new(pool.clone());

    let a = register(&users, "alice").await;
    let b = register(&users, "bob").await;

    let now = Utc::now();

    // Taken names are rejected case-insensitively
    let err = users
        .change_username(a.id, &b.username.to_uppercase(), now)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::UsernameTaken));

    let fresh = unique("renamed");
    let updated = users.change_username(a.id, &fresh, now).await.unwrap();
    assert_eq!(updated.username, fresh);

    // A second change inside the window is on cooldown
    let err = users.change_username(a.id, &unique("again"), now).await.unwrap_err();
    assert!(matches!(err, ApiError::CooldownActive(_)));
}
