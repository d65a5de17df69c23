mod api;
mod middleware;
mod persist;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use citewatch_core::{PlatformId, PlatformLimitsFile};
use citewatch_extract::CitationExtractor;
use citewatch_monitor::{MonitorConfig, Orchestrator, RateLimiter};
use citewatch_platform::{HttpChatClient, HttpClientConfig, PlatformClient};

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(citewatch_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = citewatch_db::PoolConfig::from_app_config(&config);
    let pool = citewatch_db::connect_pool(&config.database_url, pool_config).await?;
    citewatch_db::run_migrations(&pool).await?;

    let limits = citewatch_core::load_platform_limits(&config.platforms_path)?;
    let clients = build_platform_clients(&limits, &config)?;
    let limiter = Arc::new(RateLimiter::new(&limits.platforms));
    let extractor = Arc::new(CitationExtractor::with_default_scorer());
    let orchestrator = Arc::new(Orchestrator::new(
        clients,
        limiter,
        extractor,
        MonitorConfig {
            query_timeout: Duration::from_secs(config.query_timeout_secs),
            rate_wait_timeout: Duration::from_secs(config.rate_wait_timeout_secs),
            max_concurrent_platforms: config.max_concurrent_platforms,
        },
    ));

    let auth = AuthState::from_env(matches!(
        config.env,
        citewatch_core::Environment::Development
    ))?;
    let app = build_app(
        AppState { pool, orchestrator },
        auth,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "citewatch-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Build one HTTP chat client per platform that declares an endpoint in the
/// limits file. Platforms without an endpoint are still rate-limited but
/// cannot be queried, which `Orchestrator::start` rejects per request.
fn build_platform_clients(
    limits: &PlatformLimitsFile,
    config: &citewatch_core::AppConfig,
) -> anyhow::Result<HashMap<PlatformId, Arc<dyn PlatformClient>>> {
    let mut clients: HashMap<PlatformId, Arc<dyn PlatformClient>> = HashMap::new();
    for limit in &limits.platforms {
        let Some(endpoint) = &limit.endpoint else {
            tracing::warn!(platform = %limit.platform, "no endpoint configured; platform disabled");
            continue;
        };
        let api_key = endpoint
            .api_key_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok());
        if endpoint.api_key_env.is_some() && api_key.is_none() {
            tracing::warn!(
                platform = %limit.platform,
                "API key env var is not set; sending unauthenticated requests"
            );
        }
        let client = HttpChatClient::new(
            limit.platform,
            HttpClientConfig {
                base_url: endpoint.base_url.clone(),
                api_key,
                model: endpoint.model.clone().unwrap_or_else(|| "default".to_string()),
                max_retries: config.http_max_retries,
                backoff_base_ms: config.http_backoff_base_ms,
            },
        )?;
        clients.insert(limit.platform, Arc::new(client));
    }
    Ok(clients)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
