//! Problem report repository for database operations

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::report::{Report, ReportStatus};

fn report_from_row(row: &PgRow) -> ApiResult<Report> {
    let status: String = row.try_get("status")?;
    let status: ReportStatus = status.parse().map_err(|e: String| {
        tracing::error!("Stored report has invalid status: {}", e);
        ApiError::Internal
    })?;

    Ok(Report {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        report_text: row.try_get("report_text")?,
        status,
        created_at: row.try_get("created_at")?,
    })
}

/// Problem report repository for database operations
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    /// Create a new report repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Submit a problem report; status starts out pending
    pub async fn submit(&self, user_id: Uuid, username: &str, text: &str) -> ApiResult<Report> {
        let row = sqlx::query(
            r#"
            INSERT INTO reports (user_id, username, report_text, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, username, report_text, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(username)
        .bind(text)
        .bind(ReportStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;

        info!("User {} submitted a problem report", user_id);
        report_from_row(&row)
    }

    /// All reports for admin review, newest first
    pub async fn list_all(&self) -> ApiResult<Vec<Report>> {
        let rows = sqlx::query(
            "SELECT id, user_id, username, report_text, status, created_at \
             FROM reports ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(report_from_row).collect()
    }

    /// Reports filed by one user, newest first
    pub async fn list_by_user(&self, user_id: Uuid) -> ApiResult<Vec<Report>> {
        let rows = sqlx::query(
            "SELECT id, user_id, username, report_text, status, created_at \
             FROM reports WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(report_from_row).collect()
    }
}
