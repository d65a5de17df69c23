//! One-off monitoring sessions from the command line.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;

use citewatch_core::{BrandSpec, PlatformId, SessionSpec, TimeRange};
use citewatch_extract::CitationExtractor;
use citewatch_monitor::{MonitorConfig, Orchestrator, RateLimiter};
use citewatch_platform::{HttpChatClient, HttpClientConfig, PlatformClient};

#[derive(Debug, Args)]
pub(crate) struct MonitorArgs {
    /// Brand to monitor; repeat for multiple brands.
    #[arg(long = "brand", required = true)]
    brands: Vec<String>,

    /// Competitor brand for comparison; repeatable.
    #[arg(long = "competitor")]
    competitors: Vec<String>,

    /// Industry category (e.g. crm, martech).
    #[arg(long)]
    category: String,

    /// Platform to query; repeatable. Defaults to every configured platform.
    #[arg(long = "platform")]
    platforms: Vec<String>,

    /// Look-back window for forum/review sources.
    #[arg(long, default_value = "week")]
    time_range: String,

    /// Platform limits file.
    #[arg(long, env = "CITEWATCH_PLATFORMS_PATH", default_value = "./config/platforms.yaml")]
    platforms_path: PathBuf,

    /// Per-platform query timeout in seconds.
    #[arg(long, default_value_t = 30)]
    query_timeout_secs: u64,
}

pub(crate) async fn run(args: MonitorArgs) -> anyhow::Result<()> {
    let limits = citewatch_core::load_platform_limits(&args.platforms_path)?;

    let mut clients: HashMap<PlatformId, Arc<dyn PlatformClient>> = HashMap::new();
    for limit in &limits.platforms {
        let Some(endpoint) = &limit.endpoint else {
            continue;
        };
        let api_key = endpoint
            .api_key_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok());
        let client = HttpChatClient::new(
            limit.platform,
            HttpClientConfig {
                base_url: endpoint.base_url.clone(),
                api_key,
                model: endpoint.model.clone().unwrap_or_else(|| "default".to_string()),
                max_retries: 2,
                backoff_base_ms: 1000,
            },
        )?;
        clients.insert(limit.platform, Arc::new(client));
    }

    let platforms: BTreeSet<PlatformId> = if args.platforms.is_empty() {
        clients.keys().copied().collect()
    } else {
        args.platforms
            .iter()
            .map(|raw| raw.parse::<PlatformId>().map_err(|e| anyhow::anyhow!(e)))
            .collect::<anyhow::Result<_>>()?
    };

    let time_range = match args.time_range.as_str() {
        "day" => TimeRange::Day,
        "month" => TimeRange::Month,
        _ => TimeRange::Week,
    };

    let spec = SessionSpec {
        brands: args.brands.iter().map(BrandSpec::new).collect(),
        competitors: args.competitors.iter().map(BrandSpec::new).collect(),
        category: args.category,
        platforms,
        time_range,
    };

    let orchestrator = Orchestrator::new(
        clients,
        Arc::new(RateLimiter::new(&limits.platforms)),
        Arc::new(CitationExtractor::with_default_scorer()),
        MonitorConfig {
            query_timeout: Duration::from_secs(args.query_timeout_secs),
            ..MonitorConfig::default()
        },
    );

    let session_id = orchestrator
        .start(spec)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    tracing::info!(session = %session_id, "monitoring session started");

    let mut rx = orchestrator
        .subscribe(session_id)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    loop {
        let status = *rx.borrow();
        if status.is_terminal() {
            break;
        }
        let snapshot = orchestrator
            .status(session_id)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        tracing::info!(
            progress = format!("{:.0}%", snapshot.progress_percentage),
            task = %snapshot.current_task,
            "session running"
        );
        if rx.changed().await.is_err() {
            anyhow::bail!("session state channel closed unexpectedly");
        }
    }

    let snapshot = orchestrator
        .status(session_id)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    if let Some(message) = &snapshot.error_message {
        tracing::warn!(error = %message, "session finished with errors");
    }

    let analytics = orchestrator
        .results(session_id)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    println!("{}", serde_json::to_string_pretty(&analytics)?);
    Ok(())
}
