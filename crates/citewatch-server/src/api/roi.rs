use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use citewatch_roi::{RoiInvestment, RoiMetric, RoiReport};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct CreateInvestmentRequest {
    pub platform: String,
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub investment_date: NaiveDate,
    #[serde(default)]
    pub expected_roi: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Serialize)]
pub(super) struct InvestmentResponse {
    pub investment_id: Uuid,
    pub platform: String,
    pub amount: Decimal,
    pub currency: String,
    pub investment_date: NaiveDate,
    pub expected_roi: Option<Decimal>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AddMetricRequest {
    pub metric_date: NaiveDate,
    #[serde(default)]
    pub mentions_generated: i64,
    pub estimated_traffic_value: Decimal,
}

#[derive(Debug, Serialize)]
pub(super) struct MetricResponse {
    pub metric_id: i64,
    pub investment_id: Uuid,
    pub metric_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    pub limit: Option<i64>,
}

pub(super) async fn create_investment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<CreateInvestmentRequest>,
) -> Result<Json<ApiResponse<InvestmentResponse>>, ApiError> {
    let investment = citewatch_db::NewInvestment {
        id: Uuid::new_v4(),
        platform: request.platform,
        amount: request.amount,
        currency: request.currency,
        investment_date: request.investment_date,
        expected_roi: request.expected_roi,
        description: request.description,
    };
    citewatch_db::insert_investment(&state.pool, &investment)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(investment = %investment.id, platform = %investment.platform, "investment registered");

    Ok(Json(ApiResponse {
        data: InvestmentResponse {
            investment_id: investment.id,
            platform: investment.platform,
            amount: investment.amount,
            currency: investment.currency,
            investment_date: investment.investment_date,
            expected_roi: investment.expected_roi,
            description: investment.description,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_investments(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<InvestmentResponse>>>, ApiError> {
    let rows = citewatch_db::list_investments(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| InvestmentResponse {
            investment_id: row.id,
            platform: row.platform,
            amount: row.amount,
            currency: row.currency,
            investment_date: row.investment_date,
            expected_roi: row.expected_roi,
            description: row.description,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn add_metric(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(investment_id): Path<Uuid>,
    Json(request): Json<AddMetricRequest>,
) -> Result<Json<ApiResponse<MetricResponse>>, ApiError> {
    // Surface a clean 404 for unknown investments instead of a foreign-key
    // violation.
    citewatch_db::get_investment(&state.pool, investment_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let metric = citewatch_db::NewMetric {
        investment_id,
        metric_date: request.metric_date,
        mentions_generated: request.mentions_generated,
        estimated_traffic_value: request.estimated_traffic_value,
    };
    let metric_id = citewatch_db::insert_metric(&state.pool, &metric)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: MetricResponse {
            metric_id,
            investment_id,
            metric_date: metric.metric_date,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn investment_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(investment_id): Path<Uuid>,
) -> Result<Json<ApiResponse<RoiReport>>, ApiError> {
    let row = citewatch_db::get_investment(&state.pool, investment_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let metrics = citewatch_db::list_metrics(&state.pool, investment_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let investment = RoiInvestment {
        investment_id: row.id,
        platform: row.platform,
        amount: row.amount,
        currency: row.currency,
        investment_date: row.investment_date,
        expected_roi: row.expected_roi,
    };
    let metrics: Vec<RoiMetric> = metrics
        .into_iter()
        .map(|m| RoiMetric {
            metric_date: m.metric_date,
            mentions_generated: m.mentions_generated,
            estimated_traffic_value: m.estimated_traffic_value,
        })
        .collect();

    let report = citewatch_roi::calculate(&investment, &metrics);

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}
