//! Post model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity
///
/// Invariant: `likes == liked_by.len()`. Both fields are always adjusted in
/// the same statement by the post repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub text: Option<String>,
    pub likes: i32,
    pub liked_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}
