//! Model traits

use super::types::{ModelError, ModelRequest, ModelResponse, ModelStream};
use async_trait::async_trait;

/// Trait for inference backend implementations.
///
/// The buffered and streaming calls are separate operations because the
/// backend's response shapes are mutually exclusive per call; the
/// orchestrator always probes with `chat` and only then decides which
/// transport the follow-up call uses.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider identifier used in logs and error messages
    fn id(&self) -> &str;

    /// Send a fully-buffered chat request
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;

    /// Send a chat request and return the incremental byte stream
    async fn chat_stream(&self, request: ModelRequest) -> Result<ModelStream, ModelError>;
}
