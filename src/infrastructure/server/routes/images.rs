use super::super::dto::{ErrorResponse, ImagesQuery};
use super::super::state::ServerState;
use crate::infrastructure::images::ImageSearchResponse;
use crate::infrastructure::model::ModelProvider;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{debug, error};

#[utoipa::path(
    get,
    path = "/api/tools/images/search",
    tag = "tools",
    params(
        ("q" = Option<String>, Query, description = "Object name or free-text query")
    ),
    responses(
        (status = 200, description = "Best image match, or a null hit", body = ImageSearchResponse),
        (status = 502, description = "Image service failure", body = ErrorResponse)
    )
)]
pub async fn images_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
    Query(query): Query<ImagesQuery>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let q = query.q.unwrap_or_default();
    debug!(query = q.as_str(), "Received /api/tools/images/search request");

    match state.images().search(&q).await {
        Ok(payload) => Ok((
            [(header::CACHE_CONTROL, "public, max-age=3600")],
            Json(payload),
        )
            .into_response()),
        Err(err) => {
            error!(error = %err, "Image search failed");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::with_detail("image search error", err.to_string())),
            ))
        }
    }
}
