use std::fmt;
use std::future::Future;

use serde::Serialize;

use super::EnrichmentError;

/// Sampling temperature for schema-constrained calls.
pub const STRUCTURED_TEMPERATURE: f64 = 0.0;

/// Sampling temperature for open-ended chat.
pub const FREE_FORM_TEMPERATURE: f64 = 0.7;

/// How the completion backend is asked to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodingMode {
    /// JSON output constraint, deterministic sampling.
    Structured,
    /// No output constraint, creative sampling.
    FreeForm,
}

impl DecodingMode {
    pub fn temperature(self) -> f64 {
        match self {
            Self::Structured => STRUCTURED_TEMPERATURE,
            Self::FreeForm => FREE_FORM_TEMPERATURE,
        }
    }

    /// Value of the backend's `format` field, if any.
    pub fn format(self) -> Option<&'static str> {
        match self {
            Self::Structured => Some("json"),
            Self::FreeForm => None,
        }
    }
}

impl fmt::Display for DecodingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured => write!(f, "structured"),
            Self::FreeForm => write!(f, "free_form"),
        }
    }
}

/// One completion call. Streaming is never requested.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub mode: DecodingMode,
}

impl CompletionRequest {
    pub fn structured(model: &str, prompt: String) -> Self {
        Self {
            model: model.to_string(),
            prompt,
            mode: DecodingMode::Structured,
        }
    }

    pub fn free_form(model: &str, prompt: String) -> Self {
        Self {
            model: model.to_string(),
            prompt,
            mode: DecodingMode::FreeForm,
        }
    }
}

/// Text-completion backend abstraction (allows mocking).
pub trait LlmClient: Send + Sync {
    /// Single attempt; returns the backend's raw `response` text.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, EnrichmentError>> + Send;
}
