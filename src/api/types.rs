//! Shared state for the gateway router.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::pipeline::enrichment::OllamaClient;
use crate::upstream::{build_http_client, BackendFailure, ParserClient, PlanClient};

// ═════════════════════════════════════════════════════════
// ApiContext: collaborator clients shared by every route
// ═════════════════════════════════════════════════════════

/// Shared context for all API routes.
///
/// Every collaborator client holds a clone of the same `reqwest::Client`,
/// so the whole process shares one connection pool.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<GatewayConfig>,
    pub llm: OllamaClient,
    pub parser: Arc<ParserClient>,
    pub plans: PlanClient,
}

impl ApiContext {
    pub fn new(config: GatewayConfig) -> Result<Self, BackendFailure> {
        let http = build_http_client(&config)?;
        let parser = ParserClient::new(http.clone(), &config)?;
        Ok(Self {
            llm: OllamaClient::from_config(http.clone(), &config),
            parser: Arc::new(parser),
            plans: PlanClient::new(http, &config),
            config: Arc::new(config),
        })
    }
}
