//! Gateway server lifecycle: bind → spawn background task → return a handle
//! with session metadata and a shutdown channel.

use std::net::SocketAddr;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::api::router::gateway_router;
use crate::api::types::ApiContext;

// ═════════════════════════════════════════════════════════
// Error types
// ═════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind gateway on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to get server address: {0}")]
    LocalAddr(#[source] std::io::Error),
}

// ═════════════════════════════════════════════════════════
// Session handle
// ═════════════════════════════════════════════════════════

/// Session metadata for a running gateway.
#[derive(Debug, Clone)]
pub struct GatewaySession {
    pub session_id: String,
    pub server_addr: String,
    pub port: u16,
    pub started_at: String,
}

/// Handle to a running gateway server.
pub struct GatewayServer {
    pub session: GatewaySession,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl GatewayServer {
    /// Signal a graceful shutdown. In-flight requests are allowed to finish.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Gateway shutdown signal sent");
        }
    }

    /// Wait for the server task to exit.
    pub async fn stopped(self) {
        if let Err(e) = self.task.await {
            tracing::error!("Gateway task ended abnormally: {e}");
        }
    }
}

// ═════════════════════════════════════════════════════════
// Startup
// ═════════════════════════════════════════════════════════

/// Start the gateway on `addr`. Port 0 binds an ephemeral port.
pub async fn start_gateway_server(
    ctx: ApiContext,
    addr: SocketAddr,
) -> Result<GatewayServer, ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;

    let addr = listener.local_addr().map_err(ServerError::LocalAddr)?;

    let mode = ctx.config.mode;
    let app = gateway_router(ctx);

    let session = GatewaySession {
        session_id: Uuid::new_v4().to_string(),
        server_addr: addr.to_string(),
        port: addr.port(),
        started_at: chrono::Utc::now().to_rfc3339(),
    };

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Gateway received shutdown signal");
        };

        tracing::info!(%addr, %mode, "Gateway started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("Gateway server error: {e}");
        }

        tracing::info!("Gateway stopped");
    });

    Ok(GatewayServer {
        session,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    use crate::config::{GatewayConfig, GatewayMode};

    fn loopback() -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, 0))
    }

    fn demo_ctx() -> ApiContext {
        ApiContext::new(GatewayConfig {
            mode: GatewayMode::Demo,
            ..GatewayConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn start_and_stop_server() {
        let mut server = start_gateway_server(demo_ctx(), loopback())
            .await
            .expect("server should start");

        assert!(!server.session.session_id.is_empty());
        assert!(server.session.port > 0);

        let url = format!("http://127.0.0.1:{}/api/health", server.session.port);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["mode"], "demo");

        server.shutdown();
        server.stopped().await;
    }

    #[tokio::test]
    async fn server_serves_parse_in_demo_mode() {
        let mut server = start_gateway_server(demo_ctx(), loopback())
            .await
            .expect("server should start");
        let port = server.session.port;

        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/parse"))
            .json(&serde_json::json!({"image": "aGVsbG8="}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let plan: serde_json::Value = resp.json().await.unwrap();
        assert!(plan["walls"].is_array());

        let resp = reqwest::get(format!("http://127.0.0.1:{port}/nonexistent"))
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

        server.shutdown();
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let mut server = start_gateway_server(demo_ctx(), loopback())
            .await
            .expect("server should start");

        let resp = reqwest::Client::new()
            .get(format!("http://127.0.0.1:{}/api/health", server.session.port))
            .header("Origin", "http://example.com")
            .send()
            .await
            .unwrap();
        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );

        server.shutdown();
    }

    #[tokio::test]
    async fn binding_a_taken_port_fails() {
        let mut first = start_gateway_server(demo_ctx(), loopback()).await.unwrap();
        let taken = SocketAddr::from((Ipv4Addr::LOCALHOST, first.session.port));

        let err = start_gateway_server(demo_ctx(), taken).await.err().unwrap();
        assert!(matches!(err, ServerError::Bind { .. }));

        first.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let mut server = start_gateway_server(demo_ctx(), loopback())
            .await
            .expect("server should start");

        server.shutdown();
        server.shutdown();
    }
}
