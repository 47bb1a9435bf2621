//! Application state shared across handlers

use sqlx::PgPool;

use crate::jwt::JwtService;
use crate::repositories::{
    UserRepository, friends::FriendRepository, posts::PostRepository, reports::ReportRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub friend_repository: FriendRepository,
    pub post_repository: PostRepository,
    pub report_repository: ReportRepository,
}

impl AppState {
    /// Build the application state from a connection pool and JWT service
    pub fn new(pool: PgPool, jwt_service: JwtService) -> Self {
        Self {
            user_repository: UserRepository::new(pool.clone()),
            friend_repository: FriendRepository::new(pool.clone()),
            post_repository: PostRepository::new(pool.clone()),
            report_repository: ReportRepository::new(pool.clone()),
            db_pool: pool,
            jwt_service,
        }
    }
}
