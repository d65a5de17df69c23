//! The monitoring orchestrator: session registry, per-platform fan-out,
//! and the session state machine `pending → running → {completed, failed}`.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tokio::sync::watch;
use uuid::Uuid;

use citewatch_core::{
    BrandSpec, Citation, PlatformId, PlatformQueryResult, SessionSnapshot, SessionSpec,
    SessionStatus,
};
use citewatch_extract::CitationExtractor;
use citewatch_platform::{monitoring_query, PlatformClient};

use crate::analytics::{aggregate, CombinedAnalytics};
use crate::error::MonitorError;
use crate::limiter::{RateLimitError, RateLimiter};
use crate::session::{FailureKind, PlatformOutcome, SessionHandle};

/// Tunables for session execution.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Timeout handed to every platform query.
    pub query_timeout: Duration,
    /// How long a unit may wait for a rate-limit token.
    pub rate_wait_timeout: Duration,
    /// Bound on concurrently running platform units per session.
    pub max_concurrent_platforms: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(30),
            rate_wait_timeout: Duration::from_secs(20),
            max_concurrent_platforms: 4,
        }
    }
}

/// Everything a terminal session produced, for persistence and display.
#[derive(Debug, Clone)]
pub struct SessionExport {
    pub session_id: Uuid,
    pub spec: SessionSpec,
    pub created_at: DateTime<Utc>,
    pub snapshot: SessionSnapshot,
    pub results: BTreeMap<PlatformId, PlatformQueryResult>,
    pub outcomes: BTreeMap<PlatformId, PlatformOutcome>,
    pub citations: BTreeMap<PlatformId, Vec<Citation>>,
}

/// Per-platform completion-time weights in minutes per tracked brand.
fn platform_minutes(platform: PlatformId) -> i64 {
    match platform {
        PlatformId::ChatGpt | PlatformId::Claude | PlatformId::Gemini => 2,
        PlatformId::Reddit => 3,
        PlatformId::ReviewSites => 4,
    }
}

/// Estimate when a session over `spec` should finish.
#[must_use]
pub fn estimate_completion(spec: &SessionSpec) -> DateTime<Utc> {
    let brand_count = i64::try_from(spec.brands.len() + spec.competitors.len()).unwrap_or(i64::MAX);
    let minutes: i64 = 1 + spec
        .platforms
        .iter()
        .map(|p| platform_minutes(*p).saturating_mul(brand_count))
        .sum::<i64>();
    Utc::now() + chrono::Duration::minutes(minutes)
}

/// Drives monitoring sessions over an injected map of platform clients.
///
/// All collaborators arrive at construction time; there is no process-wide
/// registry. Sessions are exclusively owned here — platform units are the
/// only writers, and they serialize appends through the session handle.
pub struct Orchestrator {
    clients: HashMap<PlatformId, Arc<dyn PlatformClient>>,
    limiter: Arc<RateLimiter>,
    extractor: Arc<CitationExtractor>,
    config: MonitorConfig,
    sessions: RwLock<HashMap<Uuid, Arc<SessionHandle>>>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        clients: HashMap<PlatformId, Arc<dyn PlatformClient>>,
        limiter: Arc<RateLimiter>,
        extractor: Arc<CitationExtractor>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            clients,
            limiter,
            extractor,
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Validate `spec`, register a pending session, and schedule one unit
    /// of work per requested platform.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidRequest`] — synchronously, before any
    /// session exists — when the spec fails validation or names a platform
    /// with no configured client.
    pub fn start(&self, spec: SessionSpec) -> Result<Uuid, MonitorError> {
        spec.validate().map_err(MonitorError::InvalidRequest)?;
        for platform in &spec.platforms {
            if !self.clients.contains_key(platform) {
                return Err(MonitorError::InvalidRequest(format!(
                    "no client configured for platform '{platform}'"
                )));
            }
        }

        let session_id = Uuid::new_v4();
        let handle = Arc::new(SessionHandle::new(session_id, spec));
        self.sessions
            .write()
            .expect("session registry lock poisoned")
            .insert(session_id, Arc::clone(&handle));

        let clients: HashMap<PlatformId, Arc<dyn PlatformClient>> = handle
            .spec
            .platforms
            .iter()
            .filter_map(|p| self.clients.get(p).map(|c| (*p, Arc::clone(c))))
            .collect();

        tokio::spawn(run_session(
            handle,
            clients,
            Arc::clone(&self.limiter),
            Arc::clone(&self.extractor),
            self.config.clone(),
        ));

        tracing::info!(session = %session_id, "monitoring session accepted");
        Ok(session_id)
    }

    /// Consistent point-in-time view of a session, safe against concurrent
    /// writers.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::SessionNotFound`] for an unknown id.
    pub fn status(&self, session_id: Uuid) -> Result<SessionSnapshot, MonitorError> {
        Ok(self.handle(session_id)?.snapshot())
    }

    /// Combined analytics for a terminal session.
    ///
    /// # Errors
    ///
    /// [`MonitorError::SessionNotFound`] for an unknown id;
    /// [`MonitorError::SessionNotReady`] while the session is still
    /// pending or running.
    pub fn results(&self, session_id: Uuid) -> Result<CombinedAnalytics, MonitorError> {
        let handle = self.handle(session_id)?;
        if !handle.status().is_terminal() {
            return Err(MonitorError::SessionNotReady(session_id));
        }
        let brands: Vec<BrandSpec> = handle.spec.tracked_brands().cloned().collect();
        Ok(aggregate(
            session_id,
            &brands,
            &handle.outcomes(),
            &handle.citations(),
        ))
    }

    /// Full session data for persistence, valid once terminal.
    ///
    /// # Errors
    ///
    /// Same contract as [`Orchestrator::results`].
    pub fn export(&self, session_id: Uuid) -> Result<SessionExport, MonitorError> {
        let handle = self.handle(session_id)?;
        if !handle.status().is_terminal() {
            return Err(MonitorError::SessionNotReady(session_id));
        }
        Ok(SessionExport {
            session_id,
            spec: handle.spec.clone(),
            created_at: handle.created_at,
            snapshot: handle.snapshot(),
            results: handle.results(),
            outcomes: handle.outcomes(),
            citations: handle.citations(),
        })
    }

    /// Cooperatively cancel a session: units not yet started are skipped,
    /// in-flight queries finish or hit their own timeout.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::SessionNotFound`] for an unknown id.
    pub fn cancel(&self, session_id: Uuid) -> Result<SessionSnapshot, MonitorError> {
        let handle = self.handle(session_id)?;
        handle.cancel();
        tracing::info!(session = %session_id, "session cancellation requested");
        Ok(handle.snapshot())
    }

    /// Watch status transitions without polling. The receiver immediately
    /// holds the current status.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::SessionNotFound`] for an unknown id.
    pub fn subscribe(
        &self,
        session_id: Uuid,
    ) -> Result<watch::Receiver<SessionStatus>, MonitorError> {
        Ok(self.handle(session_id)?.subscribe())
    }

    fn handle(&self, session_id: Uuid) -> Result<Arc<SessionHandle>, MonitorError> {
        self.sessions
            .read()
            .expect("session registry lock poisoned")
            .get(&session_id)
            .cloned()
            .ok_or(MonitorError::SessionNotFound(session_id))
    }
}

async fn run_session(
    handle: Arc<SessionHandle>,
    clients: HashMap<PlatformId, Arc<dyn PlatformClient>>,
    limiter: Arc<RateLimiter>,
    extractor: Arc<CitationExtractor>,
    config: MonitorConfig,
) {
    handle.set_status(SessionStatus::Running);
    handle.set_task("dispatching platform queries");

    let query = monitoring_query(&handle.spec);
    let brands: Vec<BrandSpec> = handle.spec.tracked_brands().cloned().collect();
    let platforms: Vec<PlatformId> = handle.spec.platforms.iter().copied().collect();
    let total = platforms.len();
    let completed = Arc::new(AtomicUsize::new(0));

    stream::iter(platforms)
        .map(|platform| {
            let handle = Arc::clone(&handle);
            let client = clients.get(&platform).cloned();
            let limiter = Arc::clone(&limiter);
            let extractor = Arc::clone(&extractor);
            let query = query.clone();
            let brands = brands.clone();
            let config = config.clone();
            let completed = Arc::clone(&completed);
            async move {
                // Client presence was validated in start(); a hole here is a bug.
                if let Some(client) = client {
                    run_platform_unit(&handle, platform, client, &limiter, &extractor, &query, &brands, &config)
                        .await;
                }
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                handle.record_progress(done, total);
            }
        })
        .buffer_unordered(config.max_concurrent_platforms.max(1))
        .collect::<Vec<()>>()
        .await;

    let succeeded = handle.succeeded_count();
    if succeeded == 0 {
        let summary = handle.failure_summary();
        handle.set_error_message(if summary.is_empty() {
            "all platform units were skipped".to_string()
        } else {
            summary
        });
        handle.set_task("monitoring failed");
        handle.set_status(SessionStatus::Failed);
        tracing::warn!(session = %handle.id, "session failed: zero platforms succeeded");
    } else {
        handle.set_task("monitoring completed");
        handle.set_status(SessionStatus::Completed);
        tracing::info!(
            session = %handle.id,
            succeeded,
            requested = total,
            "session completed"
        );
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_platform_unit(
    handle: &SessionHandle,
    platform: PlatformId,
    client: Arc<dyn PlatformClient>,
    limiter: &RateLimiter,
    extractor: &CitationExtractor,
    query: &str,
    brands: &[BrandSpec],
    config: &MonitorConfig,
) {
    if handle.is_cancelled() {
        tracing::debug!(session = %handle.id, platform = %platform, "unit skipped: session cancelled");
        handle.record_skipped(platform);
        return;
    }

    handle.set_task(format!("waiting for a {platform} slot"));
    match limiter.acquire(platform, config.rate_wait_timeout).await {
        Ok(()) => {}
        Err(error @ RateLimitError::Exceeded(_)) => {
            tracing::warn!(session = %handle.id, platform = %platform, error = %error, "rate limit wait timed out");
            handle.record_failure(
                platform,
                FailureKind::RateLimitExceeded,
                error.to_string(),
                None,
            );
            return;
        }
        Err(error @ RateLimitError::UnknownPlatform(_)) => {
            tracing::error!(session = %handle.id, platform = %platform, error = %error, "no bucket for platform");
            handle.record_failure(
                platform,
                FailureKind::PlatformUnavailable,
                error.to_string(),
                None,
            );
            return;
        }
    }

    handle.set_task(format!("querying {platform}"));
    let result = client.query(query, config.query_timeout).await;

    if !result.succeeded {
        let kind = result
            .error
            .map_or(FailureKind::PlatformUnavailable, FailureKind::from_query_error);
        let message = result
            .error_message
            .clone()
            .unwrap_or_else(|| "platform query failed".to_string());
        tracing::warn!(session = %handle.id, platform = %platform, message, "platform query failed");
        handle.record_failure(platform, kind, message, Some(result));
        return;
    }

    handle.set_task(format!("extracting citations from {platform}"));
    match extractor.extract(&result.response_text, query, brands) {
        Ok(citations) => {
            tracing::debug!(
                session = %handle.id,
                platform = %platform,
                citations = citations.len(),
                "platform unit finished"
            );
            handle.record_success(platform, result, citations);
        }
        Err(error) => {
            tracing::warn!(session = %handle.id, platform = %platform, error = %error, "extraction failed");
            handle.record_failure(
                platform,
                FailureKind::ExtractionError,
                error.to_string(),
                Some(result),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use async_trait::async_trait;
    use citewatch_core::{PlatformLimit, QueryErrorKind, TimeRange};
    use tokio::sync::Semaphore;

    use super::*;

    enum Behavior {
        Respond(&'static str),
        Fail(QueryErrorKind),
        /// Signal `entered` on arrival, then respond once `release` grants
        /// a permit. Lets tests act while a query is verifiably in flight.
        Gated {
            entered: Arc<Semaphore>,
            release: Arc<Semaphore>,
            text: &'static str,
        },
    }

    struct FakeClient {
        platform: PlatformId,
        behavior: Behavior,
    }

    #[async_trait]
    impl PlatformClient for FakeClient {
        fn platform(&self) -> PlatformId {
            self.platform
        }

        async fn query(&self, query_text: &str, _timeout: Duration) -> PlatformQueryResult {
            match &self.behavior {
                Behavior::Respond(text) => PlatformQueryResult::success(
                    self.platform,
                    query_text,
                    (*text).to_string(),
                    Utc::now(),
                    5,
                ),
                Behavior::Fail(kind) => PlatformQueryResult::failure(
                    self.platform,
                    query_text,
                    Utc::now(),
                    5,
                    *kind,
                    "simulated failure",
                ),
                Behavior::Gated {
                    entered,
                    release,
                    text,
                } => {
                    entered.add_permits(1);
                    let permit = release.acquire().await.expect("gate closed");
                    permit.forget();
                    PlatformQueryResult::success(
                        self.platform,
                        query_text,
                        (*text).to_string(),
                        Utc::now(),
                        5,
                    )
                }
            }
        }
    }

    fn generous_limiter(platforms: &[PlatformId]) -> Arc<RateLimiter> {
        let limits: Vec<PlatformLimit> = platforms
            .iter()
            .map(|p| PlatformLimit {
                platform: *p,
                capacity: 10,
                refill_per_sec: 100.0,
                endpoint: None,
            })
            .collect();
        Arc::new(RateLimiter::new(&limits))
    }

    fn orchestrator(
        clients: Vec<FakeClient>,
        limiter: Arc<RateLimiter>,
        config: MonitorConfig,
    ) -> Orchestrator {
        let map: HashMap<PlatformId, Arc<dyn PlatformClient>> = clients
            .into_iter()
            .map(|c| (c.platform, Arc::new(c) as Arc<dyn PlatformClient>))
            .collect();
        Orchestrator::new(
            map,
            limiter,
            Arc::new(CitationExtractor::with_default_scorer()),
            config,
        )
    }

    fn spec(brands: &[&str], platforms: &[PlatformId]) -> SessionSpec {
        SessionSpec {
            brands: brands.iter().map(|n| BrandSpec::new(*n)).collect(),
            competitors: Vec::new(),
            category: "crm".to_string(),
            platforms: platforms.iter().copied().collect(),
            time_range: TimeRange::Week,
        }
    }

    async fn wait_terminal(orchestrator: &Orchestrator, id: Uuid) -> SessionStatus {
        let mut rx = orchestrator.subscribe(id).expect("subscribe");
        loop {
            let status = *rx.borrow();
            if status.is_terminal() {
                return status;
            }
            rx.changed().await.expect("watch closed");
        }
    }

    #[tokio::test]
    async fn start_rejects_empty_brand_list() {
        let orch = orchestrator(
            vec![FakeClient {
                platform: PlatformId::ChatGpt,
                behavior: Behavior::Respond("ok"),
            }],
            generous_limiter(&[PlatformId::ChatGpt]),
            MonitorConfig::default(),
        );
        let result = orch.start(spec(&[], &[PlatformId::ChatGpt]));
        assert!(matches!(result, Err(MonitorError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn start_rejects_unconfigured_platform() {
        let orch = orchestrator(
            vec![FakeClient {
                platform: PlatformId::ChatGpt,
                behavior: Behavior::Respond("ok"),
            }],
            generous_limiter(&[PlatformId::ChatGpt]),
            MonitorConfig::default(),
        );
        let result = orch.start(spec(&["Acme Corp"], &[PlatformId::Reddit]));
        let err = result.unwrap_err();
        assert!(
            matches!(&err, MonitorError::InvalidRequest(m) if m.contains("reddit")),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn session_completes_and_reports_citations() {
        let orch = orchestrator(
            vec![
                FakeClient {
                    platform: PlatformId::ChatGpt,
                    behavior: Behavior::Respond("The best companies are Acme Corp and Beta Inc."),
                },
                FakeClient {
                    platform: PlatformId::Claude,
                    behavior: Behavior::Respond("Acme Corp is a solid option."),
                },
            ],
            generous_limiter(&[PlatformId::ChatGpt, PlatformId::Claude]),
            MonitorConfig::default(),
        );

        let id = orch
            .start(spec(
                &["Acme Corp", "Beta Inc"],
                &[PlatformId::ChatGpt, PlatformId::Claude],
            ))
            .expect("start");

        let status = wait_terminal(&orch, id).await;
        assert_eq!(status, SessionStatus::Completed);

        let snapshot = orch.status(id).expect("status");
        assert!((snapshot.progress_percentage - 100.0).abs() < f64::EPSILON);

        let analytics = orch.results(id).expect("results");
        assert_eq!(analytics.summary.platforms_succeeded, 2);
        assert_eq!(analytics.brand_breakdown["Acme Corp"].combined_mentions, 2);
        assert_eq!(analytics.brand_breakdown["Beta Inc"].combined_mentions, 1);
    }

    #[tokio::test]
    async fn partial_failure_still_completes() {
        let orch = orchestrator(
            vec![
                FakeClient {
                    platform: PlatformId::ChatGpt,
                    behavior: Behavior::Respond("Acme Corp leads the pack."),
                },
                FakeClient {
                    platform: PlatformId::Claude,
                    behavior: Behavior::Respond("Many teams choose Acme Corp."),
                },
                FakeClient {
                    platform: PlatformId::Reddit,
                    behavior: Behavior::Fail(QueryErrorKind::Timeout),
                },
            ],
            generous_limiter(&[PlatformId::ChatGpt, PlatformId::Claude, PlatformId::Reddit]),
            MonitorConfig::default(),
        );

        let id = orch
            .start(spec(
                &["Acme Corp"],
                &[PlatformId::ChatGpt, PlatformId::Claude, PlatformId::Reddit],
            ))
            .expect("start");

        let status = wait_terminal(&orch, id).await;
        assert_eq!(status, SessionStatus::Completed, "partial success is completed");

        let analytics = orch.results(id).expect("results");
        assert_eq!(analytics.summary.platforms_succeeded, 2);
        assert_eq!(analytics.summary.platforms_failed, 1);
        assert!(!analytics.platform_breakdown["reddit"].succeeded);

        let export = orch.export(id).expect("export");
        assert_eq!(export.citations.len(), 2, "two platforms contributed citations");
    }

    #[tokio::test]
    async fn all_platforms_failing_fails_the_session() {
        let orch = orchestrator(
            vec![
                FakeClient {
                    platform: PlatformId::ChatGpt,
                    behavior: Behavior::Fail(QueryErrorKind::Provider),
                },
                FakeClient {
                    platform: PlatformId::Gemini,
                    behavior: Behavior::Fail(QueryErrorKind::Timeout),
                },
            ],
            generous_limiter(&[PlatformId::ChatGpt, PlatformId::Gemini]),
            MonitorConfig::default(),
        );

        let id = orch
            .start(spec(&["Acme Corp"], &[PlatformId::ChatGpt, PlatformId::Gemini]))
            .expect("start");

        let status = wait_terminal(&orch, id).await;
        assert_eq!(status, SessionStatus::Failed);

        let snapshot = orch.status(id).expect("status");
        let message = snapshot.error_message.expect("error message");
        assert!(message.contains("chatgpt"), "union of failures: {message}");
        assert!(message.contains("gemini"), "union of failures: {message}");
    }

    #[tokio::test]
    async fn results_before_completion_is_not_ready() {
        let entered = Arc::new(Semaphore::new(0));
        let release = Arc::new(Semaphore::new(0));
        let orch = orchestrator(
            vec![FakeClient {
                platform: PlatformId::ChatGpt,
                behavior: Behavior::Gated {
                    entered: Arc::clone(&entered),
                    release: Arc::clone(&release),
                    text: "Acme Corp is fine.",
                },
            }],
            generous_limiter(&[PlatformId::ChatGpt]),
            MonitorConfig::default(),
        );

        let id = orch
            .start(spec(&["Acme Corp"], &[PlatformId::ChatGpt]))
            .expect("start");

        let early = orch.results(id);
        assert!(matches!(early, Err(MonitorError::SessionNotReady(_))));

        release.add_permits(1);
        let status = wait_terminal(&orch, id).await;
        assert_eq!(status, SessionStatus::Completed);
        assert!(orch.results(id).is_ok());
    }

    #[tokio::test]
    async fn cancel_skips_unstarted_units() {
        let entered = Arc::new(Semaphore::new(0));
        let release = Arc::new(Semaphore::new(0));
        let config = MonitorConfig {
            max_concurrent_platforms: 1,
            ..MonitorConfig::default()
        };

        let orch = orchestrator(
            vec![
                FakeClient {
                    platform: PlatformId::ChatGpt,
                    behavior: Behavior::Gated {
                        entered: Arc::clone(&entered),
                        release: Arc::clone(&release),
                        text: "Acme Corp shows up.",
                    },
                },
                FakeClient {
                    platform: PlatformId::Reddit,
                    behavior: Behavior::Respond("never reached"),
                },
            ],
            generous_limiter(&[PlatformId::ChatGpt, PlatformId::Reddit]),
            config,
        );

        let id = orch
            .start(spec(&["Acme Corp"], &[PlatformId::ChatGpt, PlatformId::Reddit]))
            .expect("start");

        // Wait until the first unit's query is verifiably in flight, then
        // cancel and release it.
        let permit = entered.acquire().await.expect("entered");
        permit.forget();
        orch.cancel(id).expect("cancel");
        release.add_permits(1);

        let status = wait_terminal(&orch, id).await;
        assert_eq!(status, SessionStatus::Completed, "in-flight unit finished");

        let export = orch.export(id).expect("export");
        assert_eq!(
            export.outcomes.get(&PlatformId::Reddit),
            Some(&PlatformOutcome::Skipped),
            "unstarted unit must be skipped"
        );
        assert!(matches!(
            export.outcomes.get(&PlatformId::ChatGpt),
            Some(PlatformOutcome::Succeeded { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_bucket_records_rate_limit_failure() {
        let limiter = Arc::new(RateLimiter::new(&[PlatformLimit {
            platform: PlatformId::ChatGpt,
            capacity: 1,
            refill_per_sec: 0.001,
            endpoint: None,
        }]));
        // Drain the only token before the session runs.
        limiter
            .acquire(PlatformId::ChatGpt, Duration::from_millis(10))
            .await
            .expect("drain");

        let config = MonitorConfig {
            rate_wait_timeout: Duration::from_millis(50),
            ..MonitorConfig::default()
        };

        let orch = orchestrator(
            vec![FakeClient {
                platform: PlatformId::ChatGpt,
                behavior: Behavior::Respond("unreachable"),
            }],
            limiter,
            config,
        );

        let id = orch
            .start(spec(&["Acme Corp"], &[PlatformId::ChatGpt]))
            .expect("start");

        let status = wait_terminal(&orch, id).await;
        assert_eq!(status, SessionStatus::Failed, "only platform was rate limited");

        let export = orch.export(id).expect("export");
        assert!(matches!(
            export.outcomes.get(&PlatformId::ChatGpt),
            Some(PlatformOutcome::Failed {
                kind: FailureKind::RateLimitExceeded,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn status_of_unknown_session_is_not_found() {
        let orch = orchestrator(Vec::new(), generous_limiter(&[]), MonitorConfig::default());
        let result = orch.status(Uuid::new_v4());
        assert!(matches!(result, Err(MonitorError::SessionNotFound(_))));
    }

    #[test]
    fn completion_estimate_scales_with_brands_and_platforms() {
        let small = spec(&["Acme Corp"], &[PlatformId::ChatGpt]);
        let large = spec(
            &["Acme Corp", "Beta Inc"],
            &[PlatformId::ChatGpt, PlatformId::ReviewSites],
        );
        let now = Utc::now();
        let small_est = estimate_completion(&small) - now;
        let large_est = estimate_completion(&large) - now;
        assert!(large_est > small_est);
        // 1 base + 2 min/brand for chatgpt × 1 brand = 3 minutes.
        assert_eq!(small_est.num_minutes(), 3);
    }
}
