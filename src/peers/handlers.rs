use axum::{
    extract::{Extension, Path},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::protocol::CONTENT_TYPE_OCTET_STREAM;
use crate::error::CacheError;
use crate::group::GroupRegistry;

/// `GET {base_path}:group/*key`: serves a value out of this node's groups.
///
/// Uses [`crate::group::Group::get_local`], so answering a peer never
/// triggers another peer request.
pub async fn handle_peer_get(
    Extension(registry): Extension<Arc<GroupRegistry>>,
    Path((group_name, key)): Path<(String, String)>,
) -> Response {
    tracing::info!("GET group={} key={}", group_name, key);

    let Some(group) = registry.get(&group_name) else {
        tracing::warn!("Peer asked for unknown group: {}", group_name);
        return (
            StatusCode::NOT_FOUND,
            CacheError::GroupNotFound(group_name).to_string(),
        )
            .into_response();
    };

    match group.get_local(&key).await {
        Ok(view) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, CONTENT_TYPE_OCTET_STREAM)],
            view.to_bytes(),
        )
            .into_response(),
        Err(e @ CacheError::InvalidArgument(_)) => {
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to load {}/{}: {}", group_name, key, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Anything under the base path that is not `group/key`.
pub async fn handle_bad_request() -> (StatusCode, &'static str) {
    (StatusCode::BAD_REQUEST, "bad request")
}
