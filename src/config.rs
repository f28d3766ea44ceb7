//! Gateway configuration, read from the process environment.
//!
//! Every collaborator base URL is stored without a trailing slash so call
//! sites can always `format!("{base}/path")`.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "floorplan-gateway";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_PARSER_URL: &str = "http://localhost:8000";
const DEFAULT_PARSER_PATH: &str = "/plan_recognition";
const DEFAULT_PLAN_URL: &str = "http://localhost:8081";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_LLM_MODEL: &str = "llama3";
const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "floorplan_gateway_lib=info,floorplan_gateway=info,tower_http=warn"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{key}: invalid value {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Selects between live collaborators and the bundled fixture parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayMode {
    Live,
    Demo,
}

impl GatewayMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "live" | "prod" => Some(Self::Live),
            "demo" => Some(Self::Demo),
            _ => None,
        }
    }
}

impl fmt::Display for GatewayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Demo => write!(f, "demo"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub mode: GatewayMode,
    pub parser_url: String,
    /// Path on the parser service that accepts a multipart `file` part.
    pub parser_path: String,
    pub plan_url: String,
    pub ollama_url: String,
    pub llm_model: String,
    /// Per-call deadline for every outbound request.
    pub upstream_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            mode: GatewayMode::Live,
            parser_url: DEFAULT_PARSER_URL.to_string(),
            parser_path: DEFAULT_PARSER_PATH.to_string(),
            plan_url: DEFAULT_PLAN_URL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            upstream_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl GatewayConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset or blank keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = get("GATEWAY_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| invalid("GATEWAY_BIND_ADDR", &bind_raw, e))?;

        let mode = match get("GATEWAY_MODE") {
            Some(raw) => GatewayMode::parse(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "GATEWAY_MODE",
                value: raw.clone(),
                reason: "expected `live` or `demo`".into(),
            })?,
            None => GatewayMode::Live,
        };

        let parser_path = get("PARSER_PATH").unwrap_or_else(|| DEFAULT_PARSER_PATH.to_string());
        let parser_path = if parser_path.starts_with('/') {
            parser_path
        } else {
            format!("/{parser_path}")
        };

        Ok(Self {
            bind_addr,
            mode,
            parser_url: base_url(get("PARSER_URL"), DEFAULT_PARSER_URL),
            parser_path,
            plan_url: base_url(get("PLAN_URL"), DEFAULT_PLAN_URL),
            ollama_url: base_url(get("OLLAMA_URL"), DEFAULT_OLLAMA_URL),
            llm_model: get("LLM_MODEL")
                .map(|m| m.trim().to_string())
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            upstream_timeout: Duration::from_secs(positive_secs(
                "UPSTREAM_TIMEOUT_SECS",
                get("UPSTREAM_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?),
            connect_timeout: Duration::from_secs(positive_secs(
                "UPSTREAM_CONNECT_TIMEOUT_SECS",
                get("UPSTREAM_CONNECT_TIMEOUT_SECS"),
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?),
            max_upload_bytes: match get("MAX_UPLOAD_BYTES") {
                Some(raw) => raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|e| invalid("MAX_UPLOAD_BYTES", &raw, e))?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }
}

fn base_url(raw: Option<String>, default: &str) -> String {
    raw.as_deref()
        .unwrap_or(default)
        .trim()
        .trim_end_matches('/')
        .to_string()
}

fn positive_secs(key: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let secs = raw.trim().parse::<u64>().map_err(|e| invalid(key, &raw, e))?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: raw,
            reason: "must be greater than zero".into(),
        });
    }
    Ok(secs)
}

fn invalid(key: &'static str, value: &str, err: impl fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = GatewayConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.mode, GatewayMode::Live);
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert_eq!(config.parser_path, "/plan_recognition");
        assert_eq!(config.llm_model, "llama3");
        assert_eq!(config.upstream_timeout, Duration::from_secs(300));
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("OLLAMA_URL", "http://gpu-box:11434/"),
            ("PLAN_URL", "http://storage:9000//"),
        ]))
        .unwrap();
        assert_eq!(config.ollama_url, "http://gpu-box:11434");
        assert_eq!(config.plan_url, "http://storage:9000");
    }

    #[test]
    fn demo_mode_is_recognized() {
        let config = GatewayConfig::from_lookup(lookup(&[("GATEWAY_MODE", "Demo")])).unwrap();
        assert_eq!(config.mode, GatewayMode::Demo);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let err = GatewayConfig::from_lookup(lookup(&[("GATEWAY_MODE", "staging")])).unwrap_err();
        assert!(err.to_string().contains("GATEWAY_MODE"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err =
            GatewayConfig::from_lookup(lookup(&[("UPSTREAM_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn parser_path_gains_leading_slash() {
        let config = GatewayConfig::from_lookup(lookup(&[("PARSER_PATH", "recognize")])).unwrap();
        assert_eq!(config.parser_path, "/recognize");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = GatewayConfig::from_lookup(lookup(&[("LLM_MODEL", "  ")])).unwrap();
        assert_eq!(config.llm_model, "llama3");
    }

    #[test]
    fn app_name_is_gateway() {
        assert_eq!(APP_NAME, "floorplan-gateway");
    }
}
