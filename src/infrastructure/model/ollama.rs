//! Ollama client implementation

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::domain::ChatMessage;
use crate::infrastructure::model::traits::ModelProvider;
use crate::infrastructure::model::types::{ModelError, ModelRequest, ModelResponse, ModelStream};

/// Ollama client for a local or remote `/api/chat` endpoint.
///
/// Ollama streams JSON Lines (one complete JSON object per line, `done`
/// marking the last chunk), not SSE; the streaming path hands the raw byte
/// stream through untouched so the caller sees the native framing.
#[derive(Clone)]
pub struct OllamaClient {
    id: String,
    endpoint: String,
    http: Client,
}

impl OllamaClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            id: "ollama".to_string(),
            endpoint: endpoint.into(),
            http: Client::new(),
        }
    }

    fn chat_url(&self) -> String {
        let base = self.endpoint.trim_end_matches('/');
        format!("{base}/api/chat")
    }

    async fn send(
        &self,
        payload: &OllamaChatPayload<'_>,
    ) -> Result<reqwest::Response, ModelError> {
        let response = self
            .http
            .post(self.chat_url())
            .json(payload)
            .send()
            .await
            .map_err(|e| ModelError::network(&self.id, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::upstream(&self.id, status.as_u16(), body));
        }
        Ok(response)
    }
}

#[async_trait]
impl ModelProvider for OllamaClient {
    fn id(&self) -> &str {
        &self.id
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        info!(
            provider = self.id.as_str(),
            model = request.model.as_str(),
            messages = request.messages.len(),
            "Sending buffered request to Ollama"
        );

        let payload = OllamaChatPayload {
            model: &request.model,
            messages: &request.messages,
            stream: false,
            options: &request.options,
        };

        let raw: Value = self
            .send(&payload)
            .await?
            .json()
            .await
            .map_err(|e| ModelError::network(&self.id, e))?;
        debug!(provider = self.id.as_str(), "Received buffered Ollama response");

        // A reply without message content is treated as empty text, not an
        // error; the model is an unreliable producer.
        let content = raw
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(ModelResponse::new(content, raw))
    }

    async fn chat_stream(&self, request: ModelRequest) -> Result<ModelStream, ModelError> {
        info!(
            provider = self.id.as_str(),
            model = request.model.as_str(),
            messages = request.messages.len(),
            "Sending streaming request to Ollama"
        );

        let payload = OllamaChatPayload {
            model: &request.model,
            messages: &request.messages,
            stream: true,
            options: &request.options,
        };

        let response = self.send(&payload).await?;
        if response.content_length() == Some(0) {
            return Err(ModelError::empty_stream_body(&self.id));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(ModelStream {
            content_type,
            bytes: response.bytes_stream().boxed(),
        })
    }
}

#[derive(Serialize)]
struct OllamaChatPayload<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: &'a Map<String, Value>,
}
