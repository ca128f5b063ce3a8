//! Tool-call orchestration
//!
//! One inbound chat turn runs through up to three inference calls: a forced
//! non-streaming probe to look for an embedded directive, then either a
//! replay of the original conversation or, when a directive is found, a data
//! fetch/compact cycle followed by a finalizing call that carries the
//! directive and its result as new turns. The follow-up call always uses the
//! caller's requested transport mode. No step retries; every collaborator
//! failure surfaces immediately.

use super::compact::{self, CompactResult};
use super::directive::{Directive, extract_directive};
use super::tuner::{MAX_ITEMS, apply_user_hints};
use crate::domain::{ChatMessage, MessageRole};
use crate::infrastructure::cad::{CadError, CadQuery, CloseApproachSource};
use crate::infrastructure::model::{
    ModelError, ModelProvider, ModelRequest, ModelResponse, ModelStream,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// System instruction describing the tool-use grammar, prepended to every
/// probe and follow-up call.
pub(crate) const TOOL_SYSTEM_PROMPT: &str = r#"You are an astronomy assistant for near-Earth close approaches.
If answering requires close-approach data, emit exactly ONE line:
CAD_CALL {"date_min":"now","date_max":"+60","dist_max":"0.05","body":"Earth","des":"","sort":"date","limit":50}
ADJUST the parameters to the request: for "7 days" or "this week" use "date_max":"+7"; for "10 LD" use "dist_max":"10LD"; when asked for the closest object use "sort":"dist".
Allowed keys: date_min, date_max, dist_max, body, des, sort, limit, v-rel-min, v-rel-max, h-min, h-max, pha, neo, diameter, fullname.
If no data is needed, answer normally.
When you receive CAD_RESULT, present a short list (12 at most) with: date (cd), distance (AU, km, LD), v_rel (km/s) and H; explain in plain language.
Emit the CAD_CALL order as a single line with no extra text when it applies."#;

/// Prefix of the synthetic user turn that carries compacted data back to the
/// model.
pub(crate) const RESULT_PREFIX: &str = "CAD_RESULT";

/// Deterministic-leaning probe temperature, unless the caller overrides it.
const DEFAULT_TEMPERATURE: f64 = 0.2;

/// One inbound caller chat turn.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub options: Map<String, Value>,
}

/// The orchestrated reply, in whichever transport the caller requested.
#[derive(Debug)]
pub enum ChatOutcome {
    /// Upstream JSON relayed as received
    Buffered(Value),
    /// Upstream byte stream to bridge to the caller
    Streaming(ModelStream),
}

/// Orchestration failures; collaborator detail is preserved for the caller.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Data(#[from] CadError),
    #[error("failed to encode tool result: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Ties the directive parser, tuner, data source, and compactor together
/// across two (or three) inference calls.
pub struct Orchestrator<P, S> {
    provider: Arc<P>,
    source: Arc<S>,
    default_model: String,
}

impl<P, S> Orchestrator<P, S>
where
    P: ModelProvider,
    S: CloseApproachSource,
{
    pub fn new(provider: Arc<P>, source: Arc<S>, default_model: impl Into<String>) -> Self {
        Self {
            provider,
            source,
            default_model: default_model.into(),
        }
    }

    pub async fn run(&self, turn: ChatTurn) -> Result<ChatOutcome, OrchestratorError> {
        let model = turn
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());
        let options = effective_options(&turn.options);

        let system = ChatMessage::new(MessageRole::System, TOOL_SYSTEM_PROMPT);
        let mut probe_messages = Vec::with_capacity(turn.messages.len() + 1);
        probe_messages.push(system);
        probe_messages.extend(turn.messages.iter().cloned());

        // Probe: forced non-streaming so the reply can be inspected
        info!(model = model.as_str(), stream = turn.stream, "Probing for tool directive");
        let probe = self
            .provider
            .chat(ModelRequest {
                model: model.clone(),
                messages: probe_messages.clone(),
                options: options.clone(),
            })
            .await?;

        match extract_directive(&probe.message.content) {
            None => {
                debug!("No directive in probe reply; replaying conversation");
                self.relay(model, probe_messages, options, turn.stream).await
            }
            Some(directive) => {
                info!(args = directive.args.len(), "Directive found; fetching data");
                let compact = self.fetch_compacted(&directive, &turn.messages).await?;
                info!(
                    returned = compact.returned,
                    total = compact.total,
                    "Close-approach data compacted"
                );

                let mut messages = probe_messages;
                messages.push(ChatMessage::new(MessageRole::Assistant, directive.raw));
                messages.push(ChatMessage::new(
                    MessageRole::User,
                    format!("{RESULT_PREFIX} {}", serde_json::to_string(&compact)?),
                ));

                self.relay(model, messages, options, turn.stream).await
            }
        }
    }

    /// Tune the directive from the latest user utterance, fetch, and bound
    /// the result. Fetch failures carry the upstream status and body.
    async fn fetch_compacted(
        &self,
        directive: &Directive,
        messages: &[ChatMessage],
    ) -> Result<CompactResult, OrchestratorError> {
        let user_text = last_user_text(messages);
        let tuned = apply_user_hints(&directive.args, user_text);
        let query = CadQuery::from_tuned(&tuned);

        let response = self.source.close_approaches(&query).await?;
        Ok(compact::compact(&response, MAX_ITEMS as usize))
    }

    /// Issue one inference call in the caller's requested transport mode.
    async fn relay(
        &self,
        model: String,
        messages: Vec<ChatMessage>,
        options: Map<String, Value>,
        stream: bool,
    ) -> Result<ChatOutcome, OrchestratorError> {
        let request = ModelRequest {
            model,
            messages,
            options,
        };
        if stream {
            let upstream = self.provider.chat_stream(request).await?;
            Ok(ChatOutcome::Streaming(upstream))
        } else {
            let ModelResponse { raw, .. } = self.provider.chat(request).await?;
            Ok(ChatOutcome::Buffered(raw))
        }
    }
}

/// Generation options with the probe temperature default underneath whatever
/// the caller supplied.
fn effective_options(caller: &Map<String, Value>) -> Map<String, Value> {
    let mut options = Map::new();
    options.insert("temperature".to_string(), Value::from(DEFAULT_TEMPERATURE));
    options.extend(caller.iter().map(|(k, v)| (k.clone(), v.clone())));
    options
}

/// Content of the most recent user turn, or empty when there is none.
fn last_user_text(messages: &[ChatMessage]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::User)
        .map(|m| m.content.as_str())
        .unwrap_or_default()
}
