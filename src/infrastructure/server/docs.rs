use super::dto::{
    CadMeta, CadNormalizedResponse, ErrorResponse, RestChatRequest,
};
use super::routes;
use crate::domain::types::{ChatMessage, MessageRole};
use crate::infrastructure::cad::CadNormalizedRow;
use crate::infrastructure::images::{ImageHit, ImageSearchResponse};
use crate::infrastructure::neows::NeoWsBrowse;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::chat::chat_handler,
        routes::cad::cad_handler,
        routes::images::images_handler,
        routes::neows::neows_browse_handler
    ),
    components(
        schemas(
            RestChatRequest,
            ErrorResponse,
            ChatMessage,
            MessageRole,
            CadNormalizedResponse,
            CadNormalizedRow,
            CadMeta,
            ImageSearchResponse,
            ImageHit,
            NeoWsBrowse
        )
    ),
    tags(
        (name = "chat", description = "Conversation with tool-call orchestration"),
        (name = "tools", description = "Close-approach, image, and catalogue proxies")
    )
)]
pub(super) struct ApiDoc;
