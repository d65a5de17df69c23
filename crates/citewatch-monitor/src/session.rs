//! In-memory session state shared between the orchestrator's writer units
//! and concurrent status readers.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use citewatch_core::{
    Citation, PlatformId, PlatformQueryResult, QueryErrorKind, SessionSnapshot, SessionSpec,
    SessionStatus,
};

/// Contained per-platform failure category, mirroring the session-level
/// error taxonomy without the synchronous kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    RateLimitExceeded,
    PlatformUnavailable,
    ExtractionError,
}

impl FailureKind {
    /// Categorize a provider-side query error.
    #[must_use]
    pub fn from_query_error(kind: QueryErrorKind) -> Self {
        match kind {
            QueryErrorKind::RateLimited => FailureKind::RateLimitExceeded,
            QueryErrorKind::Timeout | QueryErrorKind::Provider | QueryErrorKind::Malformed => {
                FailureKind::PlatformUnavailable
            }
        }
    }
}

/// Terminal outcome of one platform unit within a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlatformOutcome {
    Succeeded { latency_ms: u64 },
    Failed { kind: FailureKind, message: String },
    Skipped,
}

#[derive(Default)]
pub(crate) struct SessionInner {
    pub current_task: String,
    pub error_message: Option<String>,
    pub results: BTreeMap<PlatformId, PlatformQueryResult>,
    pub outcomes: BTreeMap<PlatformId, PlatformOutcome>,
    pub citations: BTreeMap<PlatformId, Vec<Citation>>,
}

/// One session's live state.
///
/// Status and progress live in atomics so concurrent status reads never
/// block a writer; progress uses `fetch_max` so it is monotonically
/// non-decreasing no matter how unit completions interleave. The string
/// and collection fields sit behind a short-critical-section mutex, and a
/// platform's citations enter `inner` as one batch under a single lock —
/// readers never observe a partially-extracted citation set.
pub(crate) struct SessionHandle {
    pub id: Uuid,
    pub spec: SessionSpec,
    pub created_at: DateTime<Utc>,
    status: AtomicU8,
    progress_bp: AtomicU32,
    cancelled: AtomicBool,
    status_tx: watch::Sender<SessionStatus>,
    inner: Mutex<SessionInner>,
}

fn status_to_u8(status: SessionStatus) -> u8 {
    match status {
        SessionStatus::Pending => 0,
        SessionStatus::Running => 1,
        SessionStatus::Completed => 2,
        SessionStatus::Failed => 3,
    }
}

fn status_from_u8(raw: u8) -> SessionStatus {
    match raw {
        1 => SessionStatus::Running,
        2 => SessionStatus::Completed,
        3 => SessionStatus::Failed,
        _ => SessionStatus::Pending,
    }
}

impl SessionHandle {
    pub(crate) fn new(id: Uuid, spec: SessionSpec) -> Self {
        let (status_tx, _) = watch::channel(SessionStatus::Pending);
        Self {
            id,
            spec,
            created_at: Utc::now(),
            status: AtomicU8::new(status_to_u8(SessionStatus::Pending)),
            progress_bp: AtomicU32::new(0),
            cancelled: AtomicBool::new(false),
            status_tx,
            inner: Mutex::new(SessionInner {
                current_task: "waiting to start".to_string(),
                ..SessionInner::default()
            }),
        }
    }

    pub(crate) fn status(&self) -> SessionStatus {
        status_from_u8(self.status.load(Ordering::Acquire))
    }

    pub(crate) fn set_status(&self, status: SessionStatus) {
        self.status.store(status_to_u8(status), Ordering::Release);
        self.status_tx.send_replace(status);
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Record that `completed` of `total` units have finished. `fetch_max`
    /// keeps the percentage monotonic under any completion interleaving.
    pub(crate) fn record_progress(&self, completed: usize, total: usize) {
        if total == 0 {
            return;
        }
        #[allow(clippy::cast_possible_truncation)]
        let bp = ((completed * 10_000) / total) as u32;
        self.progress_bp.fetch_max(bp, Ordering::AcqRel);
    }

    pub(crate) fn progress_percentage(&self) -> f64 {
        f64::from(self.progress_bp.load(Ordering::Acquire)) / 100.0
    }

    pub(crate) fn set_task(&self, task: impl Into<String>) {
        let mut inner = self.inner.lock().expect("session lock poisoned");
        inner.current_task = task.into();
    }

    pub(crate) fn set_error_message(&self, message: impl Into<String>) {
        let mut inner = self.inner.lock().expect("session lock poisoned");
        inner.error_message = Some(message.into());
    }

    /// Append a platform's query result and its full citation batch in one
    /// critical section.
    pub(crate) fn record_success(
        &self,
        platform: PlatformId,
        result: PlatformQueryResult,
        citations: Vec<Citation>,
    ) {
        let mut inner = self.inner.lock().expect("session lock poisoned");
        inner.outcomes.insert(
            platform,
            PlatformOutcome::Succeeded {
                latency_ms: result.latency_ms,
            },
        );
        inner.results.insert(platform, result);
        inner.citations.insert(platform, citations);
    }

    pub(crate) fn record_failure(
        &self,
        platform: PlatformId,
        kind: FailureKind,
        message: impl Into<String>,
        result: Option<PlatformQueryResult>,
    ) {
        let mut inner = self.inner.lock().expect("session lock poisoned");
        inner.outcomes.insert(
            platform,
            PlatformOutcome::Failed {
                kind,
                message: message.into(),
            },
        );
        if let Some(result) = result {
            inner.results.insert(platform, result);
        }
    }

    pub(crate) fn record_skipped(&self, platform: PlatformId) {
        let mut inner = self.inner.lock().expect("session lock poisoned");
        inner.outcomes.insert(platform, PlatformOutcome::Skipped);
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock().expect("session lock poisoned");
        SessionSnapshot {
            session_id: self.id,
            status: self.status(),
            progress_percentage: self.progress_percentage(),
            current_task: inner.current_task.clone(),
            error_message: inner.error_message.clone(),
        }
    }

    pub(crate) fn outcomes(&self) -> BTreeMap<PlatformId, PlatformOutcome> {
        self.inner
            .lock()
            .expect("session lock poisoned")
            .outcomes
            .clone()
    }

    pub(crate) fn results(&self) -> BTreeMap<PlatformId, PlatformQueryResult> {
        self.inner
            .lock()
            .expect("session lock poisoned")
            .results
            .clone()
    }

    pub(crate) fn citations(&self) -> BTreeMap<PlatformId, Vec<Citation>> {
        self.inner
            .lock()
            .expect("session lock poisoned")
            .citations
            .clone()
    }

    pub(crate) fn succeeded_count(&self) -> usize {
        self.inner
            .lock()
            .expect("session lock poisoned")
            .outcomes
            .values()
            .filter(|o| matches!(o, PlatformOutcome::Succeeded { .. }))
            .count()
    }

    /// Union of per-platform failure messages, for the terminal error of an
    /// all-failed session.
    pub(crate) fn failure_summary(&self) -> String {
        let inner = self.inner.lock().expect("session lock poisoned");
        let mut parts: Vec<String> = Vec::new();
        for (platform, outcome) in &inner.outcomes {
            if let PlatformOutcome::Failed { message, .. } = outcome {
                parts.push(format!("{platform}: {message}"));
            }
        }
        parts.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use citewatch_core::BrandSpec;

    use super::*;

    fn handle() -> SessionHandle {
        let spec = SessionSpec {
            brands: vec![BrandSpec::new("Acme Corp")],
            competitors: Vec::new(),
            category: "crm".to_string(),
            platforms: BTreeSet::from([PlatformId::ChatGpt]),
            time_range: citewatch_core::TimeRange::Week,
        };
        SessionHandle::new(Uuid::new_v4(), spec)
    }

    #[test]
    fn progress_is_monotonic_under_out_of_order_updates() {
        let handle = handle();
        handle.record_progress(2, 3);
        let after_two = handle.progress_percentage();
        handle.record_progress(1, 3);
        assert!(
            handle.progress_percentage() >= after_two,
            "progress must never decrease"
        );
        handle.record_progress(3, 3);
        assert!((handle.progress_percentage() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn citation_batch_is_visible_atomically() {
        let handle = handle();
        let result = PlatformQueryResult::success(
            PlatformId::ChatGpt,
            "q",
            "Acme Corp is great.",
            Utc::now(),
            10,
        );
        let citations = vec![Citation::not_mentioned("Beta Inc")];
        handle.record_success(PlatformId::ChatGpt, result, citations);

        let stored = handle.citations();
        assert_eq!(stored.get(&PlatformId::ChatGpt).map(Vec::len), Some(1));
        assert_eq!(handle.succeeded_count(), 1);
    }

    #[test]
    fn failure_summary_joins_platform_messages() {
        let handle = handle();
        handle.record_failure(
            PlatformId::ChatGpt,
            FailureKind::PlatformUnavailable,
            "connection refused",
            None,
        );
        handle.record_failure(
            PlatformId::Reddit,
            FailureKind::RateLimitExceeded,
            "wait timed out",
            None,
        );
        let summary = handle.failure_summary();
        assert!(summary.contains("chatgpt: connection refused"));
        assert!(summary.contains("reddit: wait timed out"));
    }

    #[test]
    fn watch_subscribers_see_status_transitions() {
        let handle = handle();
        let rx = handle.subscribe();
        assert_eq!(*rx.borrow(), SessionStatus::Pending);
        handle.set_status(SessionStatus::Running);
        assert_eq!(*rx.borrow(), SessionStatus::Running);
        assert_eq!(handle.status(), SessionStatus::Running);
    }

    #[test]
    fn failure_kind_categorization() {
        assert_eq!(
            FailureKind::from_query_error(QueryErrorKind::RateLimited),
            FailureKind::RateLimitExceeded
        );
        assert_eq!(
            FailureKind::from_query_error(QueryErrorKind::Timeout),
            FailureKind::PlatformUnavailable
        );
        assert_eq!(
            FailureKind::from_query_error(QueryErrorKind::Malformed),
            FailureKind::PlatformUnavailable
        );
    }
}
