//! Two-stage plan enrichment: door completion, then code-compliance
//! validation, both driven through a JSON-constrained completion backend.

pub mod types;
pub mod prompt;
pub mod parser;
pub mod ollama;
pub mod orchestrator;

pub use types::*;
pub use prompt::*;
pub use parser::*;
pub use ollama::*;
pub use orchestrator::*;

use thiserror::Error;

use crate::models::ModelError;
use crate::upstream::BackendFailure;

#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Completion backend unavailable: {0}")]
    BackendUnavailable(#[from] BackendFailure),

    #[error("No JSON object found in completion")]
    NoJsonFound,

    #[error("Completion JSON is invalid: {diagnostic}")]
    InvalidJson { diagnostic: String, excerpt: String },

    #[error("Completion JSON has an unexpected shape: {0}")]
    UnexpectedShape(String),
}

impl From<ModelError> for EnrichmentError {
    fn from(err: ModelError) -> Self {
        EnrichmentError::MalformedInput(err.to_string())
    }
}
