//! Front API
//!
//! The client-facing HTTP surface of a node, served on its own listener next
//! to the peer endpoint.
//!
//! ## Endpoints
//! - **`GET /api?key=...`**: Read-through lookup in the node's configured group.
//!   Unlike the peer endpoint this may route the key to its owner.
//! - **`GET /api/stats`**: Counters and cache usage of every registered group.
//!
//! ## Submodules
//! - **`types`**: Query parameters and the stats payload.
//! - **`handlers`**: The axum handlers.

pub mod handlers;
pub mod types;

use axum::routing::get;
use axum::{Extension, Router};
use std::sync::Arc;

use crate::group::{Group, GroupRegistry};
use handlers::{handle_api_get, handle_stats};

pub const ENDPOINT_API: &str = "/api";
pub const ENDPOINT_STATS: &str = "/api/stats";

/// Builds the front API router serving `group`, reporting on every group in
/// `registry`.
pub fn router(group: Arc<Group>, registry: Arc<GroupRegistry>) -> Router {
    Router::new()
        .route(ENDPOINT_API, get(handle_api_get))
        .route(ENDPOINT_STATS, get(handle_stats))
        .layer(Extension(group))
        .layer(Extension(registry))
}
