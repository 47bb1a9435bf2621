//! Repositories for database operations
//!
//! All multi-row operations (vote, username change, user cleanup) run in a
//! single transaction, and set-valued columns are only ever mutated with
//! conditional `array_append` / `array_remove` so that concurrent clients
//! cannot lose updates.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cooldown;
use crate::error::{ApiError, ApiResult};
use crate::models::avatar::ProfilePicture;
use crate::models::user::UserProfile;
use crate::models::UpdateProfileRequest;

pub mod friends;
pub mod posts;
pub mod reports;

const USER_COLUMNS: &str = "id, username, email, password_hash, roles, friends, friend_requests, \
                            votes, profile_picture, bio, location, last_username_change, \
                            last_vote_at, created_at, updated_at";

/// Map a database row onto a [`UserProfile`]
fn user_from_row(row: &PgRow) -> ApiResult<UserProfile> {
    let profile_picture: Option<serde_json::Value> = row.try_get("profile_picture")?;
    let profile_picture = profile_picture.and_then(|value| {
        serde_json::from_value::<ProfilePicture>(value)
            .map_err(|e| warn!("Discarding malformed stored profile picture: {}", e))
            .ok()
    });

    Ok(UserProfile {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        roles: row.try_get("roles")?,
        friends: row.try_get("friends")?,
        friend_requests: row.try_get("friend_requests")?,
        votes: row.try_get("votes")?,
        profile_picture,
        bio: row.try_get("bio")?,
        location: row.try_get("location")?,
        last_username_change: row.try_get("last_username_change")?,
        last_vote_at: row.try_get("last_vote_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Whether an error is a unique violation on the given constraint
fn violates(error: &sqlx::Error, constraint: &str) -> bool {
    match error {
        sqlx::Error::Database(db) => db.constraint() == Some(constraint),
        _ => false,
    }
}

/// User repository for identity, profile, voting, and leaderboard operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new user with a hashed password
    pub async fn create(&self, username: &str, email: &str, password: &str) -> ApiResult<UserProfile> {
        info!("Creating new user: {}", username);

        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {}", e);
                ApiError::Internal
            })?
            .to_string();

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "users_username_lower_idx") {
                ApiError::UsernameTaken
            } else if violates(&e, "users_email_key") {
                ApiError::BadRequest("Email is already registered".to_string())
            } else {
                ApiError::Database(e)
            }
        })?;

        user_from_row(&row)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<UserProfile>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Find a user by username (case-insensitive)
    pub async fn find_by_username(&self, username: &str) -> ApiResult<Option<UserProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(username) = lower($1)"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Find a user by username or email, for login
    pub async fn find_by_username_or_email(&self, identifier: &str) -> ApiResult<Option<UserProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE lower(username) = lower($1) OR lower(email) = lower($1)"
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Batch-resolve a set of user ids to profiles, username order
    pub async fn find_many(&self, ids: &[Uuid]) -> ApiResult<Vec<UserProfile>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1) ORDER BY lower(username) ASC"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    /// Verify a user's password
    pub fn verify_password(&self, user: &UserProfile, password: &str) -> ApiResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|e| {
            tracing::error!("Failed to parse stored password hash: {}", e);
            ApiError::Internal
        })?;

        let argon2 = Argon2::default();
        Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    /// Cast the caller's daily vote for `target_id`
    ///
    /// The voter's row is locked so that two concurrent votes from the same
    /// user cannot both pass the cooldown check, and the target's count is
    /// incremented in place rather than read back and rewritten.
    pub async fn cast_vote(
        &self,
        voter_id: Uuid,
        target_id: Uuid,
        now: DateTime<Utc>,
    ) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        let voter = sqlx::query("SELECT last_vote_at FROM users WHERE id = $1 FOR UPDATE")
            .bind(voter_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ApiError::NotFound("Voter".to_string()))?;

        let last_vote_at: Option<DateTime<Utc>> = voter.try_get("last_vote_at")?;
        if !cooldown::can_act(last_vote_at, now) {
            let remaining = cooldown::remaining_ms(last_vote_at, now);
            return Err(ApiError::CooldownActive(cooldown::format_remaining(remaining)));
        }

        let updated = sqlx::query(
            "UPDATE users SET votes = votes + 1, updated_at = now() WHERE id = $1",
        )
        .bind(target_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(ApiError::NotFound("User".to_string()));
        }

        sqlx::query("UPDATE users SET last_vote_at = $2, updated_at = now() WHERE id = $1")
            .bind(voter_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("User {} voted for {}", voter_id, target_id);
        Ok(())
    }

    /// Users with at least `min_votes` votes, best first
    ///
    /// Ties are broken by username ascending so the ranking is deterministic.
    pub async fn leaderboard(&self, min_votes: i32) -> ApiResult<Vec<UserProfile>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE votes >= $1 \
             ORDER BY votes DESC, lower(username) ASC"
        ))
        .bind(min_votes)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    /// Id of the current number-one user, if anyone has votes
    pub async fn top_ranked(&self) -> ApiResult<Option<Uuid>> {
        let row = sqlx::query(
            "SELECT id FROM users WHERE votes >= 1 \
             ORDER BY votes DESC, lower(username) ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get("id")))
    }

    /// Change the caller's username, rate limited to once per 24 hours
    pub async fn change_username(
        &self,
        user_id: Uuid,
        new_username: &str,
        now: DateTime<Utc>,
    ) -> ApiResult<UserProfile> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query("SELECT last_username_change FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

        let last_change: Option<DateTime<Utc>> = user.try_get("last_username_change")?;
        if !cooldown::can_act(last_change, now) {
            let remaining = cooldown::remaining_ms(last_change, now);
            return Err(ApiError::CooldownActive(cooldown::format_remaining(remaining)));
        }

        // The unique index on lower(username) closes the check-then-set race
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET username = $2, last_username_change = $3, updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(new_username)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if violates(&e, "users_username_lower_idx") {
                ApiError::UsernameTaken
            } else {
                ApiError::Database(e)
            }
        })?;

        let user = user_from_row(&row)?;
        tx.commit().await?;

        info!("User {} renamed to {}", user_id, new_username);
        Ok(user)
    }

    /// Update bio, location, and profile picture; absent fields are kept
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: &UpdateProfileRequest,
    ) -> ApiResult<UserProfile> {
        let picture = update
            .profile_picture
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| {
                tracing::error!("Failed to serialize profile picture: {}", e);
                ApiError::Internal
            })?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET bio = COALESCE($2, bio),
                location = COALESCE($3, location),
                profile_picture = COALESCE($4, profile_picture),
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&update.bio)
        .bind(&update.location)
        .bind(picture)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

        user_from_row(&row)
    }

    /// Delete a user and scrub every reference to them, in one transaction
    ///
    /// Removes the user's posts, their id from every other user's friend and
    /// request sets, and their likes (with the matching count decrement) from
    /// every post they had liked.
    pub async fn delete_user(&self, user_id: Uuid) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        let posts = sqlx::query("DELETE FROM posts WHERE author_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE users
            SET friends = array_remove(friends, $1),
                friend_requests = array_remove(friend_requests, $1),
                updated_at = now()
            WHERE $1 = ANY(friends) OR $1 = ANY(friend_requests)
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let liked = sqlx::query(
            r#"
            UPDATE posts
            SET liked_by = array_remove(liked_by, $1),
                likes = GREATEST(likes - 1, 0)
            WHERE $1 = ANY(liked_by)
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(ApiError::NotFound("User".to_string()));
        }

        tx.commit().await?;

        info!(
            "Deleted user {}: removed {} posts, unliked {} posts",
            user_id,
            posts.rows_affected(),
            liked.rows_affected()
        );
        Ok(())
    }
}
