//! Friend repository for the request/accept workflow
//!
//! A pending request is membership of the sender's id in the recipient's
//! `friend_requests` set; the `friends` relation is symmetric. Operations
//! touching both rows run in one transaction so the relation can never be
//! left asymmetric.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::user::UserProfile;
use crate::repositories::UserRepository;

/// Friend repository for database operations
#[derive(Clone)]
pub struct FriendRepository {
    pool: PgPool,
    users: UserRepository,
}

impl FriendRepository {
    /// Create a new friend repository
    pub fn new(pool: PgPool) -> Self {
        let users = UserRepository::new(pool.clone());
        Self { pool, users }
    }

    /// Send a friend request to a user by username
    ///
    /// Fails when the target does not exist, is the caller, is already a
    /// friend, already has a pending request from the caller, or has a
    /// pending request *towards* the caller (the caller should accept that
    /// one instead). On success the caller's id joins the target's
    /// `friend_requests` set; repeating the send never duplicates the entry.
    pub async fn send_request(&self, from_id: Uuid, to_username: &str) -> ApiResult<()> {
        let target = self
            .users
            .find_by_username(to_username)
            .await?
            .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

        if target.id == from_id {
            return Err(ApiError::SelfReference);
        }

        let requester = self
            .users
            .find_by_id(from_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

        if requester.friends.contains(&target.id) {
            return Err(ApiError::AlreadyFriends);
        }

        if target.friend_requests.contains(&from_id) {
            return Err(ApiError::AlreadyRequested);
        }

        if requester.friend_requests.contains(&target.id) {
            return Err(ApiError::ReciprocalPending);
        }

        // Conditional append: a concurrent duplicate send becomes a no-op
        sqlx::query(
            r#"
            UPDATE users
            SET friend_requests = array_append(friend_requests, $2), updated_at = now()
            WHERE id = $1 AND NOT ($2 = ANY(friend_requests))
            "#,
        )
        .bind(target.id)
        .bind(from_id)
        .execute(&self.pool)
        .await?;

        info!("User {} requested friendship with {}", from_id, target.id);
        Ok(())
    }

    /// Accept a pending friend request
    ///
    /// Consumes the pending entry and adds each user to the other's
    /// `friends` set. Both rows are updated in the same transaction.
    pub async fn accept_request(&self, self_id: Uuid, from_id: Uuid) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        let accepted = sqlx::query(
            r#"
            UPDATE users
            SET friend_requests = array_remove(friend_requests, $2),
                friends = CASE WHEN $2 = ANY(friends) THEN friends
                               ELSE array_append(friends, $2) END,
                updated_at = now()
            WHERE id = $1 AND $2 = ANY(friend_requests)
            "#,
        )
        .bind(self_id)
        .bind(from_id)
        .execute(&mut *tx)
        .await?;

        if accepted.rows_affected() == 0 {
            return Err(ApiError::NotFound("Friend request".to_string()));
        }

        let reciprocated = sqlx::query(
            r#"
            UPDATE users
            SET friends = CASE WHEN $2 = ANY(friends) THEN friends
                               ELSE array_append(friends, $2) END,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(from_id)
        .bind(self_id)
        .execute(&mut *tx)
        .await?;

        if reciprocated.rows_affected() == 0 {
            return Err(ApiError::NotFound("User".to_string()));
        }

        tx.commit().await?;

        info!("User {} accepted friend request from {}", self_id, from_id);
        Ok(())
    }

    /// Decline a pending friend request; no other side effect
    pub async fn decline_request(&self, self_id: Uuid, from_id: Uuid) -> ApiResult<()> {
        let updated = sqlx::query(
            r#"
            UPDATE users
            SET friend_requests = array_remove(friend_requests, $2), updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(self_id)
        .bind(from_id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(ApiError::NotFound("User".to_string()));
        }

        info!("User {} declined friend request from {}", self_id, from_id);
        Ok(())
    }

    /// Remove a friendship from both sides, in one transaction
    pub async fn remove_friend(&self, self_id: Uuid, other_id: Uuid) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        for (a, b) in [(self_id, other_id), (other_id, self_id)] {
            let updated = sqlx::query(
                r#"
                UPDATE users
                SET friends = array_remove(friends, $2), updated_at = now()
                WHERE id = $1
                "#,
            )
            .bind(a)
            .bind(b)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(ApiError::NotFound("User".to_string()));
            }
        }

        tx.commit().await?;

        info!("User {} removed friend {}", self_id, other_id);
        Ok(())
    }

    /// Resolve the caller's friends to profiles
    pub async fn friends(&self, user_id: Uuid) -> ApiResult<Vec<UserProfile>> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

        self.users.find_many(&user.friends).await
    }

    /// Resolve the caller's pending incoming requests to profiles
    pub async fn pending_requests(&self, user_id: Uuid) -> ApiResult<Vec<UserProfile>> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

        self.users.find_many(&user.friend_requests).await
    }
}
