//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service
///
/// Domain failures carry their own variants so handlers and repositories
/// can surface them without string matching; each maps onto an HTTP status
/// in [`IntoResponse`].
#[derive(Error, Debug)]
pub enum ApiError {
    /// The referenced user or post does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// A user tried to friend-request themselves
    #[error("You cannot send a friend request to yourself")]
    SelfReference,

    /// The symmetric friendship already exists
    #[error("You are already friends with this user")]
    AlreadyFriends,

    /// A request to this user is already pending
    #[error("Friend request already sent")]
    AlreadyRequested,

    /// The target already has a pending request towards the caller
    #[error("This user already sent you a friend request; accept it instead")]
    ReciprocalPending,

    /// Another user already holds the requested username
    #[error("Username is already taken")]
    UsernameTaken,

    /// The action is rate limited; the payload is the remaining wait time
    #[error("You must wait {0} before doing this again")]
    CooldownActive(String),

    /// No authenticated session
    #[error("Authentication required")]
    Unauthenticated,

    /// The session lacks the required role
    #[error("You are not allowed to do this")]
    Forbidden,

    /// Invalid input
    #[error("{0}")]
    BadRequest(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal server error
    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::SelfReference | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AlreadyFriends
            | ApiError::AlreadyRequested
            | ApiError::ReciprocalPending
            | ApiError::UsernameTaken => StatusCode::CONFLICT,
            ApiError::CooldownActive(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Database(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Storage failures are reported generically and logged here
        let error_message = match &self {
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            ApiError::Internal => {
                tracing::error!("Internal server error");
                self.to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_expected_statuses() {
        let cases = [
            (
                ApiError::NotFound("user".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (ApiError::SelfReference, StatusCode::BAD_REQUEST),
            (ApiError::AlreadyFriends, StatusCode::CONFLICT),
            (ApiError::AlreadyRequested, StatusCode::CONFLICT),
            (ApiError::ReciprocalPending, StatusCode::CONFLICT),
            (ApiError::UsernameTaken, StatusCode::CONFLICT),
            (
                ApiError::CooldownActive("1h 5m".to_string()),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (ApiError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden, StatusCode::FORBIDDEN),
        ];

        for (error, expected) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_database_error_is_not_leaked() {
        let error = ApiError::Database(sqlx::Error::RowNotFound);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
