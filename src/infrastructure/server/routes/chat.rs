use super::super::dto::{ErrorResponse, RestChatRequest};
use super::super::state::ServerState;
use super::super::stream::relay_stream;
use crate::application::{ChatOutcome, ChatTurn, OrchestratorError};
use crate::infrastructure::model::{ModelError, ModelProvider};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::{error, info};

#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = RestChatRequest,
    responses(
        (status = 200, description = "Model reply, buffered JSON or chunked NDJSON stream"),
        (status = 502, description = "Upstream inference or data service failure", body = ErrorResponse)
    )
)]
pub async fn chat_handler<P: ModelProvider>(
    State(state): State<Arc<ServerState<P>>>,
    Json(payload): Json<RestChatRequest>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let stream = payload.stream.unwrap_or(true);
    info!(
        model = payload.model.as_deref(),
        messages = payload.messages.len(),
        stream,
        "Received /api/chat request"
    );

    let turn = ChatTurn {
        model: payload.model,
        messages: payload.messages,
        stream,
        options: payload.options,
    };

    match state.orchestrator().run(turn).await {
        Ok(ChatOutcome::Buffered(raw)) => Ok(Json(raw).into_response()),
        Ok(ChatOutcome::Streaming(upstream)) => Ok(relay_stream(upstream)),
        Err(error) => {
            error!(%error, "Chat orchestration failed");
            Err(orchestration_failure(error))
        }
    }
}

/// Map an orchestration failure to the caller-facing status and payload.
/// Upstream status codes and bodies are forwarded for diagnosability; no
/// retry is attempted on the caller's behalf.
fn orchestration_failure(error: OrchestratorError) -> (StatusCode, Json<ErrorResponse>) {
    match error {
        OrchestratorError::Model(ModelError::Upstream { status, body, .. }) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            Json(ErrorResponse::with_detail("inference upstream error", body)),
        ),
        OrchestratorError::Model(ModelError::EmptyStreamBody { .. }) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse::new("upstream has no body")),
        ),
        OrchestratorError::Model(model_error) => (
            model_error
                .status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            Json(ErrorResponse::with_detail(
                "inference upstream error",
                model_error.to_string(),
            )),
        ),
        OrchestratorError::Data(cad_error) => (
            cad_error
                .status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            Json(ErrorResponse::with_detail(
                "close-approach proxy error",
                cad_error.to_string(),
            )),
        ),
        OrchestratorError::Encode(encode_error) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::with_detail(
                "internal error",
                encode_error.to_string(),
            )),
        ),
    }
}
