use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::types::{CompletionRequest, LlmClient};
use super::EnrichmentError;
use crate::config::GatewayConfig;
use crate::upstream::BackendFailure;

/// Ollama HTTP client for the completion backend.
///
/// Holds a clone of the process-wide `reqwest::Client`; the per-call deadline
/// is configured on that client.
#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(client: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &GatewayConfig) -> Self {
        Self::new(client, &config.ollama_url, config.upstream_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    options: OllamaOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    stream: bool,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f64,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: Option<String>,
}

impl LlmClient for OllamaClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, EnrichmentError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &request.model,
            prompt: &request.prompt,
            options: OllamaOptions {
                temperature: request.mode.temperature(),
            },
            format: request.mode.format(),
            stream: false,
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendFailure::from_send(e, &url, self.timeout))?;

        if !response.status().is_success() {
            return Err(BackendFailure::from_status(response, &url).await.into());
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendFailure::from_body(e, &url, self.timeout))?;

        let text = parsed.response.ok_or(BackendFailure::MissingResponse(url))?;
        tracing::debug!(
            model = %request.model,
            mode = %request.mode,
            chars = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Completion received"
        );
        Ok(text)
    }
}

/// Scripted LLM client for testing : replays queued replies and records requests.
#[cfg(test)]
pub struct MockLlmClient {
    replies: std::sync::Mutex<std::collections::VecDeque<Result<String, BackendFailure>>>,
    requests: std::sync::Mutex<Vec<CompletionRequest>>,
}

#[cfg(test)]
impl MockLlmClient {
    pub fn new(replies: Vec<Result<String, BackendFailure>>) -> Self {
        Self {
            replies: std::sync::Mutex::new(replies.into()),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn replying(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, EnrichmentError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendFailure::Http("no scripted reply left".into())));
        reply.map_err(EnrichmentError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::enrichment::types::DecodingMode;

    #[test]
    fn ollama_client_trims_trailing_slash() {
        let client = OllamaClient::new(
            reqwest::Client::new(),
            "http://localhost:11434/",
            Duration::from_secs(60),
        );
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn structured_request_body_carries_json_format() {
        let body = OllamaGenerateRequest {
            model: "llama3",
            prompt: "p",
            options: OllamaOptions {
                temperature: DecodingMode::Structured.temperature(),
            },
            format: DecodingMode::Structured.format(),
            stream: false,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["format"], "json");
        assert_eq!(value["options"]["temperature"], 0.0);
        assert_eq!(value["stream"], false);
    }

    #[test]
    fn free_form_request_body_omits_format() {
        let body = OllamaGenerateRequest {
            model: "llama3",
            prompt: "hi",
            options: OllamaOptions {
                temperature: DecodingMode::FreeForm.temperature(),
            },
            format: DecodingMode::FreeForm.format(),
            stream: false,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("format").is_none());
        assert_eq!(value["options"]["temperature"], 0.7);
    }

    #[tokio::test]
    async fn connection_refused_is_backend_unavailable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = OllamaClient::new(
            reqwest::Client::new(),
            &format!("http://127.0.0.1:{port}"),
            Duration::from_secs(5),
        );
        let err = client
            .complete(&CompletionRequest::free_form("llama3", "hi".into()))
            .await
            .unwrap_err();
        assert!(
            matches!(err, EnrichmentError::BackendUnavailable(BackendFailure::Connection(_))),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn mock_client_replays_in_order() {
        let client = MockLlmClient::replying(&["first", "second"]);
        let req = CompletionRequest::structured("m", "p".into());
        assert_eq!(client.complete(&req).await.unwrap(), "first");
        assert_eq!(client.complete(&req).await.unwrap(), "second");
        assert!(client.complete(&req).await.is_err());
        assert_eq!(client.requests().len(), 3);
    }
}
