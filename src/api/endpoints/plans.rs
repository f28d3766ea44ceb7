//! Plan storage endpoints.
//!
//! - `GET /api/plans?page=&size=`: paginated listing, relayed unchanged
//! - `POST /api/plans`: store a plan, returns `{id}`

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{PageResponse, PlanCreated, PlanRecord};

pub const DEFAULT_PAGE: i64 = 0;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct PlanListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl PlanListQuery {
    /// Apply defaults and bounds, yielding `(page, size)`.
    fn resolve(&self) -> Result<(u32, u32), ApiError> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        if page < 0 {
            return Err(ApiError::BadRequest(
                "Page index must not be less than zero".into(),
            ));
        }
        let page = u32::try_from(page)
            .map_err(|_| ApiError::BadRequest(format!("Page index {page} is too large")))?;

        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(ApiError::BadRequest(format!(
                "Page size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok((page, size as u32))
    }
}

/// `GET /api/plans`: list stored plans.
pub async fn list(
    State(ctx): State<ApiContext>,
    query: Result<Query<PlanListQuery>, QueryRejection>,
) -> Result<Json<PageResponse<PlanRecord>>, ApiError> {
    let Query(query) = query?;
    let (page, size) = query.resolve()?;
    Ok(Json(ctx.plans.list_plans(page, size).await?))
}

/// `POST /api/plans`: forward a plan document to storage.
pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PlanCreated>, ApiError> {
    let Json(plan) = payload?;
    if !plan.is_object() {
        return Err(ApiError::BadRequest("Plan must be a JSON object".into()));
    }
    let id = ctx.plans.create_plan(&plan).await?;
    tracing::info!(%id, "Plan stored");
    Ok(Json(PlanCreated { id }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<i64>, size: Option<i64>) -> PlanListQuery {
        PlanListQuery { page, size }
    }

    #[test]
    fn defaults_apply() {
        assert_eq!(query(None, None).resolve().unwrap(), (0, 10));
    }

    #[test]
    fn negative_page_is_rejected() {
        match query(Some(-1), None).resolve() {
            Err(ApiError::BadRequest(msg)) => {
                assert_eq!(msg, "Page index must not be less than zero")
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn size_bounds_are_enforced() {
        assert!(query(None, Some(0)).resolve().is_err());
        assert!(query(None, Some(101)).resolve().is_err());
        assert_eq!(query(Some(3), Some(100)).resolve().unwrap(), (3, 100));
    }
}
