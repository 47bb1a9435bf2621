//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware},
    models::{
        ChangeUsernameRequest, CreatePostRequest, LeaderboardQuery, LoginRequest,
        RefreshTokenRequest, RefreshTokenResponse, RegisterRequest, SendFriendRequest,
        SubmitReportRequest, TokenResponse, UpdateProfileRequest, VoteRequest,
        avatar::ProfilePicture,
        user::{LeaderboardEntry, OwnProfileResponse, UserResponse},
    },
    state::AppState,
    validation,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/users/me", get(me))
        .route("/users/me", axum::routing::patch(update_me))
        .route("/users/me/username", put(change_username))
        .route("/users/:id", get(get_user))
        .route("/leaderboard", get(leaderboard))
        .route("/leaderboard/top", get(top_ranked))
        .route("/friends", get(list_friends))
        .route("/friends/:id", delete(remove_friend))
        .route("/friends/requests", get(list_friend_requests))
        .route("/friends/requests", post(send_friend_request))
        .route("/friends/requests/:from_id/accept", post(accept_friend_request))
        .route("/friends/requests/:from_id", delete(decline_friend_request))
        .route("/votes", post(cast_vote))
        .route("/posts", post(create_post))
        .route("/posts/:id", delete(delete_post))
        .route("/posts/:id/like", post(toggle_like))
        .route("/feed", get(feed))
        .route("/reports", post(submit_report))
        .route("/reports", get(list_reports))
        .route("/reports/mine", get(my_reports))
        .route("/admin/users/:id", delete(admin_delete_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "witwar-api"
    }))
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_username(&payload.username).map_err(ApiError::BadRequest)?;
    validation::validate_email(&payload.email).map_err(ApiError::BadRequest)?;
    validation::validate_password(&payload.password).map_err(ApiError::BadRequest)?;

    let user = state
        .user_repository
        .create(&payload.username, &payload.email, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Log in and receive access and refresh tokens
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Login attempt for {}", payload.username_or_email);

    let user = state
        .user_repository
        .find_by_username_or_email(&payload.username_or_email)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    if !state.user_repository.verify_password(&user, &payload.password)? {
        return Err(ApiError::Unauthenticated);
    }

    let access_token = state
        .jwt_service
        .generate_access_token(user.id, &user.roles)
        .map_err(|e| {
            tracing::error!("Failed to generate access token: {}", e);
            ApiError::Internal
        })?;

    let refresh_token = state
        .jwt_service
        .generate_refresh_token(user.id)
        .map_err(|e| {
            tracing::error!("Failed to generate refresh token: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    }))
}

/// Exchange a valid refresh token for a new access token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> ApiResult<impl IntoResponse> {
    let claims = state
        .jwt_service
        .validate_token(&payload.refresh_token)
        .map_err(|_| ApiError::Unauthenticated)?;

    if claims.token_type != crate::jwt::TokenType::Refresh {
        return Err(ApiError::Unauthenticated);
    }

    // Roles come from the current user row, not the old token
    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    let access_token = state
        .jwt_service
        .generate_access_token(user.id, &user.roles)
        .map_err(|e| {
            tracing::error!("Failed to generate access token: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(RefreshTokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    }))
}

/// Get the caller's own profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_id(auth.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

    Ok(Json(OwnProfileResponse::from(user)))
}

/// Update the caller's bio, location, or profile picture
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    if let Some(bio) = &payload.bio {
        validation::validate_profile_field("Bio", bio).map_err(ApiError::BadRequest)?;
    }
    if let Some(location) = &payload.location {
        validation::validate_profile_field("Location", location).map_err(ApiError::BadRequest)?;
    }
    if let Some(ProfilePicture::Url(url)) = &payload.profile_picture {
        validation::validate_picture_url(url).map_err(ApiError::BadRequest)?;
    }

    let user = state.user_repository.update_profile(auth.id, &payload).await?;

    Ok(Json(OwnProfileResponse::from(user)))
}

/// Change the caller's username (once per 24 hours)
pub async fn change_username(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ChangeUsernameRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_username(&payload.username).map_err(ApiError::BadRequest)?;

    let user = state
        .user_repository
        .change_username(auth.id, &payload.username, Utc::now())
        .await?;

    Ok(Json(OwnProfileResponse::from(user)))
}

/// Get a user's public profile by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}

/// Ranked users by vote count; rank is positional
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<impl IntoResponse> {
    let min_votes = query.min_votes.unwrap_or(1);

    let users = state.user_repository.leaderboard(min_votes).await?;

    let entries: Vec<LeaderboardEntry> = users
        .into_iter()
        .enumerate()
        .map(|(index, user)| LeaderboardEntry {
            rank: index + 1,
            user: UserResponse::from(user),
        })
        .collect();

    Ok(Json(entries))
}

/// The current number-one user, or null if nobody has votes yet
pub async fn top_ranked(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let top = match state.user_repository.top_ranked().await? {
        Some(id) => {
            let user = state
                .user_repository
                .find_by_id(id)
                .await?
                .ok_or_else(|| ApiError::NotFound("User".to_string()))?;
            Some(UserResponse::from(user))
        }
        None => None,
    };

    Ok(Json(json!({ "top": top })))
}

/// List the caller's friends
pub async fn list_friends(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let friends = state.friend_repository.friends(auth.id).await?;

    let friends: Vec<UserResponse> = friends.into_iter().map(UserResponse::from).collect();
    Ok(Json(friends))
}

/// List the caller's pending incoming friend requests
pub async fn list_friend_requests(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let requests = state.friend_repository.pending_requests(auth.id).await?;

    let requests: Vec<UserResponse> = requests.into_iter().map(UserResponse::from).collect();
    Ok(Json(requests))
}

/// Send a friend request by username
pub async fn send_friend_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<SendFriendRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .friend_repository
        .send_request(auth.id, &payload.username)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Friend request sent"})),
    ))
}

/// Accept a pending friend request
pub async fn accept_friend_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(from_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.friend_repository.accept_request(auth.id, from_id).await?;

    Ok(Json(json!({"message": "Friend request accepted"})))
}

/// Decline a pending friend request
pub async fn decline_friend_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(from_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.friend_repository.decline_request(auth.id, from_id).await?;

    Ok(Json(json!({"message": "Friend request declined"})))
}

/// Remove a friend from both sides
pub async fn remove_friend(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.friend_repository.remove_friend(auth.id, id).await?;

    Ok(Json(json!({"message": "Friend removed"})))
}

/// Cast the caller's daily vote
pub async fn cast_vote(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<VoteRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .user_repository
        .cast_vote(auth.id, payload.user_id, Utc::now())
        .await?;

    Ok(Json(json!({"message": "Vote recorded"})))
}

/// Create a post
pub async fn create_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreatePostRequest>,
) -> ApiResult<impl IntoResponse> {
    let text = payload.text.as_deref().unwrap_or("");
    validation::validate_text(text).map_err(ApiError::BadRequest)?;

    let post = state.post_repository.create(auth.id, Some(text)).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// Delete one of the caller's posts
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.post_repository.delete(id, auth.id).await?;

    Ok(Json(json!({"message": "Post deleted"})))
}

/// Toggle the caller's like on a post
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let post = state.post_repository.toggle_like(id, auth.id).await?;

    Ok(Json(post))
}

/// Posts by the caller and their friends, newest first
pub async fn feed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_id(auth.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

    let mut author_ids = user.friends;
    author_ids.push(user.id);

    let posts = state.post_repository.by_authors(&author_ids).await?;

    Ok(Json(posts))
}

/// Submit a problem report
pub async fn submit_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<SubmitReportRequest>,
) -> ApiResult<impl IntoResponse> {
    validation::validate_text(&payload.text).map_err(ApiError::BadRequest)?;

    let user = state
        .user_repository
        .find_by_id(auth.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

    let report = state
        .report_repository
        .submit(user.id, &user.username, &payload.text)
        .await?;

    Ok((StatusCode::CREATED, Json(report)))
}

/// All problem reports, for admin review
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    let reports = state.report_repository.list_all().await?;

    Ok(Json(reports))
}

/// The caller's own problem reports
pub async fn my_reports(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let reports = state.report_repository.list_by_user(auth.id).await?;

    Ok(Json(reports))
}

/// Delete a user and scrub all references to them (admin only)
pub async fn admin_delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    auth.require_admin()?;

    state.user_repository.delete_user(id).await?;

    Ok(Json(json!({"message": "User deleted"})))
}
