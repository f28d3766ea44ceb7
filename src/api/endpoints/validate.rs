//! Enrichment endpoints.
//!
//! - `POST /api/validate`: door completion followed by compliance validation
//! - `POST /api/doors`: door completion only

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{PlanDocument, ValidationReport};
use crate::pipeline::enrichment::EnrichmentPipeline;

/// `POST /api/validate`: run both stages and return the validation report.
pub async fn validate(
    State(ctx): State<ApiContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ValidationReport>, ApiError> {
    let Json(body) = payload?;
    let plan = plan_from_body(body)?;
    let pipeline = EnrichmentPipeline::new(&ctx.llm, &ctx.config.llm_model);
    Ok(Json(pipeline.run(&plan).await?))
}

/// `POST /api/doors`: return the door-completed plan without validating it.
pub async fn complete_doors(
    State(ctx): State<ApiContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PlanDocument>, ApiError> {
    let Json(body) = payload?;
    let plan = plan_from_body(body)?;
    let pipeline = EnrichmentPipeline::new(&ctx.llm, &ctx.config.llm_model);
    Ok(Json(pipeline.complete_doors(&plan).await?))
}

/// Accept either a bare plan or one wrapped as `{"plan": {...}}`.
fn plan_from_body(body: Value) -> Result<PlanDocument, ApiError> {
    let value = match body {
        Value::Object(mut object) if !object.contains_key("walls") && object.contains_key("plan") => {
            object.remove("plan").unwrap_or(Value::Null)
        }
        other => other,
    };
    PlanDocument::from_value(value).map_err(|e| ApiError::BadRequest(e.to_string()))
}
