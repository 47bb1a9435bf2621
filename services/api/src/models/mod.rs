//! API models for request and response payloads

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod avatar;
pub mod post;
pub mod report;
pub mod user;

use avatar::ProfilePicture;

/// Request for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Response for token generation
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Request for token refresh
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Response for token refresh
#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Request to update the caller's profile
#[derive(Debug, Deserialize, Default)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub location: Option<String>,
    pub profile_picture: Option<ProfilePicture>,
}

/// Request to change the caller's username
#[derive(Debug, Deserialize)]
pub struct ChangeUsernameRequest {
    pub username: String,
}

/// Request to send a friend request by username
#[derive(Debug, Deserialize)]
pub struct SendFriendRequest {
    pub username: String,
}

/// Request to cast the daily vote
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub user_id: Uuid,
}

/// Request to create a post
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub text: Option<String>,
}

/// Request to submit a problem report
#[derive(Debug, Deserialize)]
pub struct SubmitReportRequest {
    pub text: String,
}

/// Query parameters for the leaderboard
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub min_votes: Option<i32>,
}
