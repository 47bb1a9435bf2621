//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::avatar::ProfilePicture;

/// User entity as stored in the database
///
/// `friends` is a symmetric relation: if A lists B, B lists A. A pending
/// friend request lives only on the recipient's row, in `friend_requests`.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub friends: Vec<Uuid>,
    pub friend_requests: Vec<Uuid>,
    pub votes: i32,
    pub profile_picture: Option<ProfilePicture>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub last_username_change: Option<DateTime<Utc>>,
    pub last_vote_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user, safe to return to any caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub votes: i32,
    pub profile_picture: Option<ProfilePicture>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserProfile> for UserResponse {
    fn from(user: UserProfile) -> Self {
        Self {
            id: user.id,
            username: user.username,
            votes: user.votes,
            profile_picture: user.profile_picture,
            bio: user.bio,
            location: user.location,
            created_at: user.created_at,
        }
    }
}

/// View of the caller's own profile
#[derive(Debug, Clone, Serialize)]
pub struct OwnProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub friends: Vec<Uuid>,
    pub friend_requests: Vec<Uuid>,
    pub votes: i32,
    pub profile_picture: Option<ProfilePicture>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub last_username_change: Option<DateTime<Utc>>,
    pub last_vote_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<UserProfile> for OwnProfileResponse {
    fn from(user: UserProfile) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            friends: user.friends,
            friend_requests: user.friend_requests,
            votes: user.votes,
            profile_picture: user.profile_picture,
            bio: user.bio,
            location: user.location,
            last_username_change: user.last_username_change,
            last_vote_at: user.last_vote_at,
            created_at: user.created_at,
        }
    }
}

/// One row of the leaderboard; rank is positional, not stored
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub user: UserResponse,
}
