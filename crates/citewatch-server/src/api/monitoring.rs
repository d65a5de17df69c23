use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use citewatch_core::{BrandSpec, PlatformId, SessionSpec, SessionStatus, TimeRange};
use citewatch_monitor::{estimate_completion, CombinedAnalytics, MonitorError};

use crate::middleware::RequestId;
use crate::persist;

use super::{
    map_db_error, map_monitor_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct StartMonitoringRequest {
    pub brand_names: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub competitors: Vec<String>,
    pub platforms: Vec<String>,
    #[serde(default)]
    pub time_range: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct StartMonitoringResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub estimated_completion: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(super) struct SessionStatusResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub progress_percentage: f64,
    pub current_task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct HistoryItem {
    pub session_id: Uuid,
    pub brands: Vec<String>,
    pub category: String,
    pub platforms: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

fn parse_request(request: StartMonitoringRequest) -> Result<SessionSpec, String> {
    let mut platforms = BTreeSet::new();
    for raw in &request.platforms {
        let platform: PlatformId = raw.parse()?;
        platforms.insert(platform);
    }

    let time_range = match request.time_range.as_deref() {
        None => TimeRange::default(),
        Some("day") => TimeRange::Day,
        Some("week") => TimeRange::Week,
        Some("month") => TimeRange::Month,
        Some(other) => return Err(format!("unknown time range: '{other}'")),
    };

    Ok(SessionSpec {
        brands: request.brand_names.iter().map(BrandSpec::new).collect(),
        competitors: request.competitors.iter().map(BrandSpec::new).collect(),
        category: request.category,
        platforms,
        time_range,
    })
}

pub(super) async fn start_monitoring(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<StartMonitoringRequest>,
) -> Result<Json<ApiResponse<StartMonitoringResponse>>, ApiError> {
    let spec = parse_request(request)
        .map_err(|message| ApiError::new(req_id.0.clone(), "invalid_request", message))?;
    let estimated_completion = estimate_completion(&spec);

    let session_id = state
        .orchestrator
        .start(spec.clone())
        .map_err(|e| map_monitor_error(req_id.0.clone(), &e))?;

    let record = citewatch_db::NewSession {
        id: session_id,
        brand_names: spec.brands.iter().map(|b| b.canonical_name.clone()).collect(),
        competitors: spec
            .competitors
            .iter()
            .map(|b| b.canonical_name.clone())
            .collect(),
        category: spec.category.clone(),
        platforms: spec.platforms.iter().map(ToString::to_string).collect(),
        time_range: format!("{:?}", spec.time_range).to_lowercase(),
    };
    if let Err(e) = citewatch_db::insert_session(&state.pool, &record).await {
        // The session is already running in memory; losing the history row
        // must not fail the accept.
        tracing::error!(session = %session_id, error = %e, "failed to persist session record");
    }

    tokio::spawn(persist::persist_when_terminal(
        state.orchestrator.clone(),
        state.pool.clone(),
        session_id,
    ));

    Ok(Json(ApiResponse {
        data: StartMonitoringResponse {
            session_id,
            status: SessionStatus::Pending,
            estimated_completion,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn session_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionStatusResponse>>, ApiError> {
    match state.orchestrator.status(session_id) {
        Ok(snapshot) => Ok(Json(ApiResponse {
            data: SessionStatusResponse {
                session_id,
                status: snapshot.status,
                progress_percentage: snapshot.progress_percentage,
                current_task: snapshot.current_task,
                error_message: snapshot.error_message,
            },
            meta: ResponseMeta::new(req_id.0),
        })),
        // Sessions from a previous process live only in the database.
        Err(MonitorError::SessionNotFound(_)) => {
            let row = citewatch_db::find_session(&state.pool, session_id)
                .await
                .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
            let status: SessionStatus = row
                .status
                .parse()
                .map_err(|e: String| ApiError::new(req_id.0.clone(), "internal_error", e))?;
            Ok(Json(ApiResponse {
                data: SessionStatusResponse {
                    session_id,
                    status,
                    progress_percentage: row.progress_percentage,
                    current_task: row.current_task.unwrap_or_default(),
                    error_message: row.error_message,
                },
                meta: ResponseMeta::new(req_id.0),
            }))
        }
        Err(e) => Err(map_monitor_error(req_id.0, &e)),
    }
}

pub(super) async fn session_results(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<CombinedAnalytics>>, ApiError> {
    let analytics = state
        .orchestrator
        .results(session_id)
        .map_err(|e| map_monitor_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse {
        data: analytics,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn cancel_session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionStatusResponse>>, ApiError> {
    let snapshot = state
        .orchestrator
        .cancel(session_id)
        .map_err(|e| map_monitor_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse {
        data: SessionStatusResponse {
            session_id,
            status: snapshot.status,
            progress_percentage: snapshot.progress_percentage,
            current_task: snapshot.current_task,
            error_message: snapshot.error_message,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<HistoryItem>>>, ApiError> {
    let rows = citewatch_db::list_recent_sessions(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| HistoryItem {
            session_id: row.id,
            brands: row.brand_names,
            category: row.category,
            platforms: row.platforms,
            status: row.status,
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
