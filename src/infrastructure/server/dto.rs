use crate::domain::ChatMessage;
use crate::infrastructure::cad::CadNormalizedRow;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RestChatRequest {
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Streaming is the default transport, as with the upstream chat API
    pub stream: Option<bool>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub options: Map<String, Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: None,
        }
    }

    pub fn with_detail(error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CadMeta {
    pub source: String,
    pub upstream_url: String,
    #[schema(value_type = Object)]
    pub params: Value,
}

/// Normalized close-approach listing with echoed request metadata.
#[derive(Debug, Serialize, ToSchema)]
pub struct CadNormalizedResponse {
    pub ok: bool,
    pub count: usize,
    pub meta: CadMeta,
    pub data: Vec<CadNormalizedRow>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImagesQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NeoWsBrowseQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}
