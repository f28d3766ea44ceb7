//! Plan-storage collaborator: paginated listing and plan creation.

use std::time::Duration;

use serde_json::Value;

use super::BackendFailure;
use crate::config::GatewayConfig;
use crate::models::{PageResponse, PlanRecord};

#[derive(Clone)]
pub struct PlanClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl PlanClient {
    pub fn new(http: reqwest::Client, config: &GatewayConfig) -> Self {
        Self {
            http,
            base_url: config.plan_url.clone(),
            timeout: config.upstream_timeout,
        }
    }

    /// `GET <storage>/plans?page=&size=`, relayed as-is.
    pub async fn list_plans(
        &self,
        page: u32,
        size: u32,
    ) -> Result<PageResponse<PlanRecord>, BackendFailure> {
        let url = format!("{}/plans", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("page", page), ("size", size)])
            .send()
            .await
            .map_err(|e| BackendFailure::from_send(e, &url, self.timeout))?;

        if !response.status().is_success() {
            return Err(BackendFailure::from_status(response, &url).await);
        }

        response
            .json()
            .await
            .map_err(|e| BackendFailure::from_body(e, &url, self.timeout))
    }

    /// `POST <storage>/plans`. The storage service answers with the new id as text.
    pub async fn create_plan(&self, plan: &Value) -> Result<String, BackendFailure> {
        let url = format!("{}/plans", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(plan)
            .send()
            .await
            .map_err(|e| BackendFailure::from_send(e, &url, self.timeout))?;

        if !response.status().is_success() {
            return Err(BackendFailure::from_status(response, &url).await);
        }

        let id = response
            .text()
            .await
            .map_err(|e| BackendFailure::from_body(e, &url, self.timeout))?;
        Ok(id.trim().trim_matches('"').to_string())
    }
}
