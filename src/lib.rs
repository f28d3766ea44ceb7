pub mod api; // HTTP surface: router, endpoints, server lifecycle
pub mod config;
pub mod models;
pub mod pipeline;
pub mod upstream; // Parser and plan-storage collaborators

use tracing_subscriber::EnvFilter;

use crate::api::{start_gateway_server, ApiContext, ServerError};
use crate::config::{ConfigError, GatewayConfig};
use crate::upstream::BackendFailure;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("HTTP client error: {0}")]
    Client(#[from] BackendFailure),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error("Failed to listen for shutdown signal: {0}")]
    Signal(#[source] std::io::Error),
}

/// Install the tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Load configuration from the environment, serve until Ctrl-C, then shut
/// down gracefully.
pub async fn run() -> Result<(), StartupError> {
    init_tracing();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = GatewayConfig::from_env()?;
    tracing::info!(
        mode = %config.mode,
        model = %config.llm_model,
        parser = %config.parser_url,
        storage = %config.plan_url,
        backend = %config.ollama_url,
        timeout_secs = config.upstream_timeout.as_secs(),
        "Configuration loaded"
    );

    let bind_addr = config.bind_addr;
    let ctx = ApiContext::new(config)?;
    let mut server = start_gateway_server(ctx, bind_addr).await?;
    tracing::info!(
        session_id = %server.session.session_id,
        addr = %server.session.server_addr,
        "Gateway listening"
    );

    let signal = tokio::signal::ctrl_c().await;
    server.shutdown();
    server.stopped().await;
    signal.map_err(StartupError::Signal)
}
