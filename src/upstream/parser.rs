//! Image-to-vector parser collaborator.
//!
//! The parser's reply is relayed to the caller unchanged; the gateway never
//! inspects it. In demo mode a bundled fixture stands in for the service.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use super::BackendFailure;
use crate::config::{GatewayConfig, GatewayMode};

const DEMO_FLOORPLAN: &str = include_str!("../../demo/mock-floorplan.json");

/// Image upload forwarded to the parser.
#[derive(Debug, Clone)]
pub struct PlanImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub enum ParserClient {
    Live {
        http: reqwest::Client,
        url: String,
        timeout: Duration,
    },
    /// Returns the bundled demo plan for every image.
    Fixture(Value),
}

impl ParserClient {
    pub fn new(http: reqwest::Client, config: &GatewayConfig) -> Result<Self, BackendFailure> {
        match config.mode {
            GatewayMode::Live => Ok(Self::Live {
                http,
                url: format!("{}{}", config.parser_url, config.parser_path),
                timeout: config.upstream_timeout,
            }),
            GatewayMode::Demo => Self::demo(),
        }
    }

    pub fn demo() -> Result<Self, BackendFailure> {
        let plan = serde_json::from_str(DEMO_FLOORPLAN).map_err(|e| BackendFailure::Decode {
            url: "demo/mock-floorplan.json".into(),
            reason: e.to_string(),
        })?;
        Ok(Self::Fixture(plan))
    }

    pub async fn parse(&self, image: PlanImage) -> Result<Value, BackendFailure> {
        match self {
            Self::Fixture(plan) => {
                tracing::debug!(bytes = image.bytes.len(), "Demo parser: returning fixture plan");
                Ok(plan.clone())
            }
            Self::Live { http, url, timeout } => {
                let size = image.bytes.len();
                let part = Part::bytes(image.bytes).file_name(image.file_name);
                let form = Form::new().part("file", part);

                let response = http
                    .post(url.as_str())
                    .multipart(form)
                    .send()
                    .await
                    .map_err(|e| BackendFailure::from_send(e, url, *timeout))?;

                if !response.status().is_success() {
                    return Err(BackendFailure::from_status(response, url).await);
                }

                let plan: Value = response
                    .json()
                    .await
                    .map_err(|e| BackendFailure::from_body(e, url, *timeout))?;
                tracing::info!(bytes = size, "Parser returned plan");
                Ok(plan)
            }
        }
    }
}
