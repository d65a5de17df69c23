//! Writes finished sessions to the database.
//!
//! The orchestrator owns live session state; once a session's watch
//! channel reports a terminal status, this task copies the query results
//! and citation batches into Postgres and closes out the session row.
//! Persistence failures are logged, never propagated — the in-memory
//! session remains queryable either way.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use citewatch_monitor::{Orchestrator, SessionExport};

/// Wait for `session_id` to reach a terminal status, then persist it.
pub async fn persist_when_terminal(
    orchestrator: Arc<Orchestrator>,
    pool: PgPool,
    session_id: Uuid,
) {
    let Ok(mut rx) = orchestrator.subscribe(session_id) else {
        tracing::error!(session = %session_id, "cannot persist: session unknown to orchestrator");
        return;
    };

    loop {
        if rx.borrow().is_terminal() {
            break;
        }
        if rx.changed().await.is_err() {
            tracing::warn!(session = %session_id, "status channel closed before terminal state");
            return;
        }
    }

    let export = match orchestrator.export(session_id) {
        Ok(export) => export,
        Err(e) => {
            tracing::error!(session = %session_id, error = %e, "cannot export terminal session");
            return;
        }
    };

    if let Err(e) = persist_export(&pool, &export).await {
        tracing::error!(session = %session_id, error = %e, "failed to persist session");
    }
}

async fn persist_export(
    pool: &PgPool,
    export: &SessionExport,
) -> Result<(), citewatch_db::DbError> {
    for (platform, result) in &export.results {
        let query_result_id = citewatch_db::insert_query_result(
            pool,
            &citewatch_db::NewQueryResult {
                session_id: export.session_id,
                platform: platform.to_string(),
                query_text: result.query_text.clone(),
                response_text: result.response_text.clone(),
                issued_at: result.issued_at,
                latency_ms: i64::try_from(result.latency_ms).unwrap_or(i64::MAX),
                succeeded: result.succeeded,
                error_kind: result.error.map(|k| k.as_str().to_string()),
                error_message: result.error_message.clone(),
            },
        )
        .await?;

        if let Some(citations) = export.citations.get(platform) {
            let batch: Vec<citewatch_db::NewCitation> = citations
                .iter()
                .map(|c| citewatch_db::NewCitation {
                    brand_name: c.brand.clone(),
                    mentioned: c.mentioned,
                    position: c.position.map(|p| i64::try_from(p).unwrap_or(i64::MAX)),
                    context: c.context.clone(),
                    sentence: c.sentence.clone(),
                    mention_kinds: c
                        .mention_kinds
                        .iter()
                        .map(|k| k.as_str().to_string())
                        .collect(),
                    sentiment_score: c.sentiment_score,
                    prominence_score: c.prominence_score,
                    confidence_score: c.confidence_score,
                })
                .collect();
            citewatch_db::insert_citation_batch(pool, query_result_id, &batch).await?;
        }
    }

    citewatch_db::complete_session(
        pool,
        export.session_id,
        export.snapshot.status.as_str(),
        export.snapshot.progress_percentage,
        &export.snapshot.current_task,
        export.snapshot.error_message.as_deref(),
    )
    .await?;

    tracing::info!(
        session = %export.session_id,
        platforms = export.results.len(),
        "session persisted"
    );
    Ok(())
}
