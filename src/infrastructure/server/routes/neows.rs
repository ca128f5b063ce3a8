use super::super::dto::{ErrorResponse, NeoWsBrowseQuery};
use super::super::state::ServerState;
use crate::infrastructure::model::ModelProvider;
use crate::infrastructure::neows::NeoWsBrowse;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::error;

#[utoipa::path(
    get,
    path = "/api/tools/neows/browse",
    tag = "tools",
    params(
        ("page" = Option<u32>, Query, description = "Catalogue page (default 0)"),
        ("size" = Option<u32>, Query, description = "Page size (default 20)")
    ),
    responses(
        (status = 200, description = "One catalogue page", body = NeoWsBrowse),
        (status = 502, description = "NeoWs failure", body = ErrorResponse)
    )
)]
pub async fn neows_browse_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
    Query(query): Query<NeoWsBrowseQuery>,
) -> Result<Json<NeoWsBrowse>, (StatusCode, Json<ErrorResponse>)> {
    let page = query.page.unwrap_or(0);
    let size = query.size.unwrap_or(20);

    match state.neows().browse(page, size).await {
        Ok(browse) => Ok(Json(browse)),
        Err(err) => {
            error!(error = %err, "NeoWs browse failed");
            let status = err
                .status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            Err((
                status,
                Json(ErrorResponse::with_detail("NeoWs browse error", err.to_string())),
            ))
        }
    }
}
