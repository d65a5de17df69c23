//! Database operations for the `monitoring_sessions` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `monitoring_sessions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub brand_names: Vec<String>,
    pub competitors: Vec<String>,
    pub category: String,
    pub platforms: Vec<String>,
    pub time_range: String,
    pub status: String,
    pub progress_percentage: f64,
    pub current_task: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Fields required to register a new session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub id: Uuid,
    pub brand_names: Vec<String>,
    pub competitors: Vec<String>,
    pub category: String,
    pub platforms: Vec<String>,
    pub time_range: String,
}

/// Insert an accepted session in `pending` state.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_session(pool: &PgPool, session: &NewSession) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO monitoring_sessions \
             (id, brand_names, competitors, category, platforms, time_range, status) \
         VALUES ($1, $2, $3, $4, $5, $6, 'pending')",
    )
    .bind(session.id)
    .bind(&session.brand_names)
    .bind(&session.competitors)
    .bind(&session.category)
    .bind(&session.platforms)
    .bind(&session.time_range)
    .execute(pool)
    .await?;
    Ok(())
}

/// Update a running session's status, progress, and current task.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_session_progress(
    pool: &PgPool,
    id: Uuid,
    status: &str,
    progress_percentage: f64,
    current_task: &str,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE monitoring_sessions \
         SET status = $2, progress_percentage = $3, current_task = $4 \
         WHERE id = $1",
    )
    .bind(id)
    .bind(status)
    .bind(progress_percentage)
    .bind(current_task)
    .execute(pool)
    .await?;
    Ok(())
}

/// Mark a session terminal, recording its final progress, task, error, and
/// completion timestamp.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn complete_session(
    pool: &PgPool,
    id: Uuid,
    status: &str,
    progress_percentage: f64,
    current_task: &str,
    error_message: Option<&str>,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE monitoring_sessions \
         SET status = $2, progress_percentage = $3, current_task = $4, \
             error_message = $5, completed_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(status)
    .bind(progress_percentage)
    .bind(current_task)
    .bind(error_message)
    .execute(pool)
    .await?;
    Ok(())
}

/// Fetch one session by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] for an unknown id, [`DbError::Sqlx`] on
/// query failure.
pub async fn find_session(pool: &PgPool, id: Uuid) -> Result<SessionRow, DbError> {
    sqlx::query_as::<_, SessionRow>(
        "SELECT id, brand_names, competitors, category, platforms, time_range, status, \
                progress_percentage, current_task, error_message, created_at, completed_at \
         FROM monitoring_sessions WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// List recent sessions, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_sessions(pool: &PgPool, limit: i64) -> Result<Vec<SessionRow>, DbError> {
    let rows = sqlx::query_as::<_, SessionRow>(
        "SELECT id, brand_names, competitors, category, platforms, time_range, status, \
                progress_percentage, current_task, error_message, created_at, completed_at \
         FROM monitoring_sessions \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
