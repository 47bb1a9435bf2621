//! Authentication middleware for JWT token validation

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{error::ApiError, jwt::TokenType, state::AppState};

/// Authenticated caller, extracted from a validated access token
///
/// Handlers receive this explicitly instead of reading any ambient
/// current-user global.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub roles: Vec<String>,
}

impl AuthUser {
    /// Whether the caller holds the admin role
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == "admin")
    }

    /// Require the admin role
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() { Ok(()) } else { Err(ApiError::Forbidden) }
    }
}

/// Authentication middleware
///
/// Validates the bearer token, requires it to be an access token, and
/// inserts the [`AuthUser`] into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ApiError::Unauthenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthenticated)?;

    let claims = state
        .jwt_service
        .validate_token(token)
        .map_err(|_| ApiError::Unauthenticated)?;

    if claims.token_type != TokenType::Access {
        return Err(ApiError::Unauthenticated);
    }

    let user = AuthUser {
        id: claims.sub,
        roles: claims.roles,
    };

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
