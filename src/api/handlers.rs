use axum::Json;
use axum::extract::{Extension, Query};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use super::types::{ApiParams, StatsResponse};
use crate::error::CacheError;
use crate::group::{Group, GroupRegistry};
use crate::peers::protocol::CONTENT_TYPE_OCTET_STREAM;

pub async fn handle_api_get(
    Extension(group): Extension<Arc<Group>>,
    Query(params): Query<ApiParams>,
) -> Response {
    let Some(key) = params.key else {
        return (StatusCode::BAD_REQUEST, "missing query parameter: key").into_response();
    };

    match group.get(&key).await {
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
            tracing::debug!("API lookup of {} failed: {}", key, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub async fn handle_stats(
    Extension(registry): Extension<Arc<GroupRegistry>>,
) -> Json<StatsResponse> {
    let groups = registry
        .names()
        .iter()
        .filter_map(|name| registry.get(name))
        .map(|group| group.stats())
        .collect();

    Json(StatsResponse { groups })
}
