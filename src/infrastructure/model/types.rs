//! Model types - Request, Response, Stream, and Error types

use crate::domain::{ChatMessage, MessageRole};
use bytes::Bytes;
use futures::stream::BoxStream;
use serde_json::{Map, Value};
use thiserror::Error;

/// Buffered chat request for the inference backend. Streaming is selected by
/// which provider method is called, not by a flag on the request.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub options: Map<String, Value>,
}

/// Fully-buffered model response.
///
/// `raw` keeps the upstream JSON exactly as received so the caller-facing
/// endpoint can relay it without reshaping; `message` is the parsed assistant
/// turn used for directive inspection.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub message: ChatMessage,
    pub raw: Value,
}

impl ModelResponse {
    pub fn new(content: String, raw: Value) -> Self {
        Self {
            message: ChatMessage::new(MessageRole::Assistant, content),
            raw,
        }
    }
}

/// An in-flight streaming model response: the upstream content type (if any)
/// plus the raw byte chunks in arrival order. Dropping the stream releases
/// the upstream connection.
pub struct ModelStream {
    pub content_type: Option<String>,
    pub bytes: BoxStream<'static, Result<Bytes, reqwest::Error>>,
}

impl std::fmt::Debug for ModelStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelStream")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Model errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("network error calling provider '{provider}': {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider '{provider}' returned status {status}: {body}")]
    Upstream {
        provider: String,
        status: u16,
        body: String,
    },
    #[error("provider '{provider}' returned invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
    #[error("provider '{provider}' declared a streaming response with no body")]
    EmptyStreamBody { provider: String },
}

impl ModelError {
    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.into(),
            source,
        }
    }

    pub fn upstream(provider: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.into(),
            status,
            body: body.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn empty_stream_body(provider: impl Into<String>) -> Self {
        Self::EmptyStreamBody {
            provider: provider.into(),
        }
    }

    /// Upstream HTTP status when one is known.
    pub fn status(&self) -> Option<u16> {
        match self {
            ModelError::Upstream { status, .. } => Some(*status),
            ModelError::Network { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
