//! Database operations for the `query_results` and `citations` tables.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `query_results` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QueryResultRow {
    pub id: i64,
    pub session_id: Uuid,
    pub platform: String,
    pub query_text: String,
    pub response_text: String,
    pub issued_at: DateTime<Utc>,
    pub latency_ms: i64,
    pub succeeded: bool,
    pub error_kind: Option<String>,
    pub error_message: Option<String>,
}

/// Fields for inserting one platform's query result.
#[derive(Debug, Clone)]
pub struct NewQueryResult {
    pub session_id: Uuid,
    pub platform: String,
    pub query_text: String,
    pub response_text: String,
    pub issued_at: DateTime<Utc>,
    pub latency_ms: i64,
    pub succeeded: bool,
    pub error_kind: Option<String>,
    pub error_message: Option<String>,
}

/// A row from the `citations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CitationRow {
    pub id: i64,
    pub query_result_id: i64,
    pub brand_name: String,
    pub mentioned: bool,
    pub position: Option<i64>,
    pub context: String,
    pub sentence: String,
    pub mention_kinds: Vec<String>,
    pub sentiment_score: Option<f64>,
    pub prominence_score: Option<f64>,
    pub confidence_score: f64,
}

/// Fields for inserting one citation.
#[derive(Debug, Clone)]
pub struct NewCitation {
    pub brand_name: String,
    pub mentioned: bool,
    pub position: Option<i64>,
    pub context: String,
    pub sentence: String,
    pub mention_kinds: Vec<String>,
    pub sentiment_score: Option<f64>,
    pub prominence_score: Option<f64>,
    pub confidence_score: f64,
}

/// Insert a query result and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including a duplicate
/// (session, platform) pair).
pub async fn insert_query_result(pool: &PgPool, result: &NewQueryResult) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO query_results \
             (session_id, platform, query_text, response_text, issued_at, latency_ms, \
              succeeded, error_kind, error_message) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING id",
    )
    .bind(result.session_id)
    .bind(&result.platform)
    .bind(&result.query_text)
    .bind(&result.response_text)
    .bind(result.issued_at)
    .bind(result.latency_ms)
    .bind(result.succeeded)
    .bind(&result.error_kind)
    .bind(&result.error_message)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Insert one platform's citation batch inside a single transaction, so
/// readers never observe a partially-written batch.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; the transaction rolls
/// back as a whole.
pub async fn insert_citation_batch(
    pool: &PgPool,
    query_result_id: i64,
    citations: &[NewCitation],
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;
    for citation in citations {
        sqlx::query(
            "INSERT INTO citations \
                 (query_result_id, brand_name, mentioned, position, context, sentence, \
                  mention_kinds, sentiment_score, prominence_score, confidence_score) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(query_result_id)
        .bind(&citation.brand_name)
        .bind(citation.mentioned)
        .bind(citation.position)
        .bind(&citation.context)
        .bind(&citation.sentence)
        .bind(&citation.mention_kinds)
        .bind(citation.sentiment_score)
        .bind(citation.prominence_score)
        .bind(citation.confidence_score)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// All citations for a session, joined through its query results, ordered
/// by platform then position.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_citations_for_session(
    pool: &PgPool,
    session_id: Uuid,
) -> Result<Vec<CitationRow>, DbError> {
    let rows = sqlx::query_as::<_, CitationRow>(
        "SELECT c.id, c.query_result_id, c.brand_name, c.mentioned, c.position, \
                c.context, c.sentence, c.mention_kinds, c.sentiment_score, \
                c.prominence_score, c.confidence_score \
         FROM citations c \
         JOIN query_results qr ON c.query_result_id = qr.id \
         WHERE qr.session_id = $1 \
         ORDER BY qr.platform ASC, c.position ASC NULLS LAST, c.id ASC",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
