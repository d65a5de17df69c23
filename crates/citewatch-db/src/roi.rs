//! Database operations for the `roi_investments` and `roi_metrics` tables.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `roi_investments` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvestmentRow {
    pub id: Uuid,
    pub platform: String,
    pub amount: Decimal,
    pub currency: String,
    pub investment_date: NaiveDate,
    pub expected_roi: Option<Decimal>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for registering a new investment.
#[derive(Debug, Clone)]
pub struct NewInvestment {
    pub id: Uuid,
    pub platform: String,
    pub amount: Decimal,
    pub currency: String,
    pub investment_date: NaiveDate,
    pub expected_roi: Option<Decimal>,
    pub description: Option<String>,
}

/// A row from the `roi_metrics` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MetricRow {
    pub id: i64,
    pub investment_id: Uuid,
    pub metric_date: NaiveDate,
    pub mentions_generated: i64,
    pub estimated_traffic_value: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Fields for appending one performance metric.
#[derive(Debug, Clone)]
pub struct NewMetric {
    pub investment_id: Uuid,
    pub metric_date: NaiveDate,
    pub mentions_generated: i64,
    pub estimated_traffic_value: Decimal,
}

/// Insert a new investment.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_investment(pool: &PgPool, investment: &NewInvestment) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO roi_investments \
             (id, platform, amount, currency, investment_date, expected_roi, description) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(investment.id)
    .bind(&investment.platform)
    .bind(investment.amount)
    .bind(&investment.currency)
    .bind(investment.investment_date)
    .bind(investment.expected_roi)
    .bind(&investment.description)
    .execute(pool)
    .await?;
    Ok(())
}

/// Fetch one investment by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] for an unknown id, [`DbError::Sqlx`] on
/// query failure.
pub async fn get_investment(pool: &PgPool, id: Uuid) -> Result<InvestmentRow, DbError> {
    sqlx::query_as::<_, InvestmentRow>(
        "SELECT id, platform, amount, currency, investment_date, expected_roi, \
                description, created_at \
         FROM roi_investments WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// List investments, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_investments(pool: &PgPool, limit: i64) -> Result<Vec<InvestmentRow>, DbError> {
    let rows = sqlx::query_as::<_, InvestmentRow>(
        "SELECT id, platform, amount, currency, investment_date, expected_roi, \
                description, created_at \
         FROM roi_investments \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Append a performance metric and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including an unknown
/// investment id, rejected by the foreign key).
pub async fn insert_metric(pool: &PgPool, metric: &NewMetric) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO roi_metrics \
             (investment_id, metric_date, mentions_generated, estimated_traffic_value) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(metric.investment_id)
    .bind(metric.metric_date)
    .bind(metric.mentions_generated)
    .bind(metric.estimated_traffic_value)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// All metrics for an investment in `metric_date` order — the order the
/// ROI calculator consumes them in.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_metrics(pool: &PgPool, investment_id: Uuid) -> Result<Vec<MetricRow>, DbError> {
    let rows = sqlx::query_as::<_, MetricRow>(
        "SELECT id, investment_id, metric_date, mentions_generated, \
                estimated_traffic_value, created_at \
         FROM roi_metrics \
         WHERE investment_id = $1 \
         ORDER BY metric_date ASC, id ASC",
    )
    .bind(investment_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
