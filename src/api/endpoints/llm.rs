//! Free-form chat endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::enrichment::{CompletionRequest, LlmClient};

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// `POST /api/llm`: one free-form completion, relayed verbatim.
pub async fn chat(
    State(ctx): State<ApiContext>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload?;
    let prompt = match req.prompt {
        Some(prompt) if !prompt.trim().is_empty() => prompt,
        _ => return Err(ApiError::BadRequest("Prompt cannot be empty".into())),
    };

    let request = CompletionRequest::free_form(&ctx.config.llm_model, prompt);
    let response = ctx.llm.complete(&request).await?;
    Ok(Json(ChatResponse { response }))
}
