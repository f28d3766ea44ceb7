//! Gateway router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Layers (outermost → innermost): CORS → access log → body limit → handler.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the gateway router from a pre-constructed `ApiContext`.
pub fn gateway_router(ctx: ApiContext) -> Router {
    let max_body = ctx.config.max_upload_bytes;

    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/parse", post(endpoints::parse::from_base64))
        .route("/parse/upload", post(endpoints::parse::upload))
        .route("/validate", post(endpoints::validate::validate))
        .route("/doors", post(endpoints::validate::complete_doors))
        .route("/llm", post(endpoints::llm::chat))
        .route(
            "/plans",
            get(endpoints::plans::list).post(endpoints::plans::create),
        )
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(axum::middleware::from_fn(middleware::access::log_access))
        .layer(CorsLayer::permissive())
}
