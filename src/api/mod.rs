//! HTTP gateway surface.
//!
//! `gateway_router()` mounts every endpoint under `/api/`;
//! `start_gateway_server()` binds it and runs it in a background task.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::gateway_router;
pub use server::{start_gateway_server, GatewayServer, GatewaySession, ServerError};
pub use types::ApiContext;
