//! Gateway endpoint handlers.
//!
//! Each handler validates its request, calls one collaborator client or the
//! enrichment pipeline, and relays the result. Failures surface as `ApiError`.

pub mod health;
pub mod llm;
pub mod parse;
pub mod plans;
pub mod validate;
