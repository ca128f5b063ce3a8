use super::super::dto::{CadMeta, CadNormalizedResponse, ErrorResponse};
use super::super::state::ServerState;
use crate::infrastructure::cad::{CadError, CadQuery, CadResponse, normalize_rows};
use crate::infrastructure::model::ModelProvider;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

#[utoipa::path(
    get,
    path = "/api/tools/cad",
    tag = "tools",
    params(
        ("date-min" = Option<String>, Query, description = "Lower date bound (default now); snake_case alias accepted"),
        ("date-max" = Option<String>, Query, description = "Upper date bound (default +60)"),
        ("dist-max" = Option<String>, Query, description = "Distance ceiling in AU or <N>LD (default 0.05)"),
        ("body" = Option<String>, Query, description = "Reference body (default Earth)"),
        ("sort" = Option<String>, Query, description = "Sort key (default date)"),
        ("des" = Option<String>, Query, description = "Object designation filter"),
        ("normalize" = Option<String>, Query, description = "1/true/yes returns the normalized shape with metadata")
    ),
    responses(
        (status = 200, description = "Raw upstream response, or normalized rows when requested", body = CadNormalizedResponse),
        (status = 502, description = "Close-approach service failure", body = ErrorResponse)
    )
)]
pub async fn cad_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let normalize = params
        .get("normalize")
        .is_some_and(|v| ["1", "true", "yes"].iter().any(|ok| v.eq_ignore_ascii_case(ok)));

    let query = CadQuery::from_query_params(&params);
    info!(normalize, params = query.pairs().len(), "Received /api/tools/cad request");

    let fetched = state
        .cad()
        .fetch_raw(&query)
        .await
        .map_err(cad_failure)?;

    // Raw passthrough keeps the upstream body byte-compatible for callers
    // that parse the tabular shape themselves
    if !normalize {
        return Ok(Json(fetched.body).into_response());
    }

    let response: CadResponse = serde_json::from_value(fetched.body)
        .map_err(|e| cad_failure(CadError::InvalidResponse(e)))?;
    let data = normalize_rows(&response);

    Ok(Json(CadNormalizedResponse {
        ok: true,
        count: data.len(),
        meta: CadMeta {
            source: "JPL CNEOS CAD".to_string(),
            upstream_url: fetched.upstream_url,
            params: Value::Object(query.as_params_object()),
        },
        data,
    })
    .into_response())
}

fn cad_failure(error: CadError) -> (StatusCode, Json<ErrorResponse>) {
    error!(%error, "Close-approach proxy failed");
    let status = error
        .status()
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    let detail = match error {
        CadError::Upstream { body, .. } => body,
        other => other.to_string(),
    };
    (
        status,
        Json(ErrorResponse::with_detail("close-approach proxy error", detail)),
    )
}
