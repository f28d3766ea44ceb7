//! API error types with structured JSON responses.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::enrichment::{EnrichmentError, PipelineFailure};
use crate::upstream::BackendFailure;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub status: u16,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(#[from] BackendFailure),
    #[error("Unusable completion: {0}")]
    UnusableCompletion(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "MALFORMED_INPUT", detail.clone())
            }
            ApiError::PayloadTooLarge(detail) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                detail.clone(),
            ),
            ApiError::BackendUnavailable(failure) if failure.is_timeout() => {
                tracing::warn!(error = %failure, "Upstream deadline expired");
                (StatusCode::GATEWAY_TIMEOUT, "BACKEND_TIMEOUT", failure.to_string())
            }
            ApiError::BackendUnavailable(failure) => {
                tracing::warn!(error = %failure, "Upstream call failed");
                (StatusCode::BAD_GATEWAY, "BACKEND_UNAVAILABLE", failure.to_string())
            }
            ApiError::UnusableCompletion(detail) => (
                StatusCode::BAD_GATEWAY,
                "UNUSABLE_COMPLETION",
                detail.clone(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                status: status.as_u16(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<EnrichmentError> for ApiError {
    fn from(err: EnrichmentError) -> Self {
        match err {
            EnrichmentError::MalformedInput(detail) => ApiError::BadRequest(detail),
            EnrichmentError::BackendUnavailable(failure) => ApiError::BackendUnavailable(failure),
            EnrichmentError::InvalidJson { diagnostic, excerpt } => {
                tracing::warn!(%diagnostic, %excerpt, "Completion JSON could not be parsed");
                ApiError::UnusableCompletion(format!("completion JSON is invalid: {diagnostic}"))
            }
            err @ (EnrichmentError::NoJsonFound | EnrichmentError::UnexpectedShape(_)) => {
                ApiError::UnusableCompletion(err.to_string())
            }
        }
    }
}

impl From<PipelineFailure> for ApiError {
    fn from(failure: PipelineFailure) -> Self {
        failure.source.into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge(rejection.body_text());
        }
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge(err.body_text());
        }
        ApiError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn bad_request_returns_400() {
        let response = ApiError::BadRequest("missing field `image`".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "MALFORMED_INPUT");
        assert_eq!(json["error"]["status"], 400);
        assert_eq!(json["error"]["message"], "missing field `image`");
    }

    #[tokio::test]
    async fn connection_failure_returns_502() {
        let response =
            ApiError::from(BackendFailure::Connection("http://localhost:11434".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BACKEND_UNAVAILABLE");
    }

    #[tokio::test]
    async fn timeout_returns_504() {
        let response = ApiError::from(BackendFailure::Timeout {
            url: "http://localhost:11434/api/generate".into(),
            secs: 30,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body_json(response).await["error"]["code"], "BACKEND_TIMEOUT");
    }

    #[tokio::test]
    async fn extraction_failure_returns_502_without_raw_text() {
        let err: ApiError = EnrichmentError::InvalidJson {
            diagnostic: "EOF while parsing an object at line 1 column 6".into(),
            excerpt: "{\"secret\":1".into(),
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "UNUSABLE_COMPLETION");
        assert!(!json["error"]["message"].as_str().unwrap().contains("secret"));
    }

    #[tokio::test]
    async fn no_json_found_returns_502() {
        let err: ApiError = EnrichmentError::NoJsonFound.into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn malformed_input_maps_to_400() {
        let err: ApiError = EnrichmentError::MalformedInput("Room id \"5\" appears more than once".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let response = ApiError::Internal("something broke".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }
}
