//! Outbound HTTP plumbing shared by every collaborator client.
//!
//! One `reqwest::Client` is built at startup and cloned into the completion
//! backend, parser and plan-storage clients. Clones share a single
//! connection pool and carry the configured per-call deadline.

pub mod parser;
pub mod plans;

pub use parser::ParserClient;
pub use plans::PlanClient;

use std::time::Duration;

use thiserror::Error;

use crate::config::GatewayConfig;

/// Longest slice of an upstream error body kept in messages and logs.
pub const BODY_EXCERPT_CHARS: usize = 200;

/// A collaborator call did not produce a usable reply.
#[derive(Error, Debug)]
pub enum BackendFailure {
    #[error("cannot connect to {0}")]
    Connection(String),

    #[error("request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("{url} returned status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("reply from {0} has no `response` field")]
    MissingResponse(String),

    #[error("reply from {url} could not be decoded: {reason}")]
    Decode { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Http(String),
}

impl BackendFailure {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Classify a transport error from `send()`.
    pub(crate) fn from_send(err: reqwest::Error, url: &str, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                secs: timeout.as_secs(),
            }
        } else if err.is_connect() {
            Self::Connection(url.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }

    /// Classify an error raised while reading a reply body. The client
    /// deadline also covers the body, so a stalled body is a `Timeout`.
    pub(crate) fn from_body(err: reqwest::Error, url: &str, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                secs: timeout.as_secs(),
            }
        } else {
            Self::Decode {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }

    /// Turn a non-success reply into `Status`, keeping a bounded body excerpt.
    pub(crate) async fn from_status(response: reqwest::Response, url: &str) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::Status {
            url: url.to_string(),
            status,
            body: excerpt(&body, BODY_EXCERPT_CHARS),
        }
    }
}

/// Build the process-wide HTTP client.
pub fn build_http_client(config: &GatewayConfig) -> Result<reqwest::Client, BackendFailure> {
    reqwest::Client::builder()
        .timeout(config.upstream_timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(format!("{}/{}", crate::config::APP_NAME, crate::config::APP_VERSION))
        .build()
        .map_err(|e| BackendFailure::Http(e.to_string()))
}

/// First `max_chars` characters of `text`, marked when cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_keeps_short_text() {
        assert_eq!(excerpt("short", 10), "short");
    }

    #[test]
    fn excerpt_cuts_on_char_boundary() {
        let text = "ЖК РФ compliance";
        let cut = excerpt(text, 2);
        assert_eq!(cut, "ЖК…");
    }

    #[test]
    fn timeout_failure_is_flagged() {
        let failure = BackendFailure::Timeout {
            url: "http://localhost:11434/api/generate".into(),
            secs: 5,
        };
        assert!(failure.is_timeout());
        assert!(failure.to_string().contains("timed out after 5s"));
    }

    #[test]
    fn http_client_builds_from_default_config() {
        assert!(build_http_client(&GatewayConfig::default()).is_ok());
    }
}
