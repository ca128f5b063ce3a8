use super::orchestrator::{
    ChatOutcome, ChatTurn, Orchestrator, OrchestratorError, RESULT_PREFIX, TOOL_SYSTEM_PROMPT,
};
use crate::domain::{ChatMessage, MessageRole};
use crate::infrastructure::cad::{CadError, CadQuery, CadResponse, CloseApproachSource};
use crate::infrastructure::model::{
    ModelError, ModelProvider, ModelRequest, ModelResponse, ModelStream,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
enum Scripted {
    Reply(&'static str),
    Upstream { status: u16, body: &'static str },
}

/// Inference stub that replays scripted buffered replies and records every
/// request it receives.
#[derive(Clone)]
struct ScriptedProvider {
    replies: Arc<Mutex<Vec<Scripted>>>,
    chats: Arc<Mutex<Vec<ModelRequest>>>,
    streams: Arc<Mutex<Vec<ModelRequest>>>,
    stream_has_body: bool,
}

impl ScriptedProvider {
    fn new(replies: Vec<Scripted>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies)),
            chats: Arc::new(Mutex::new(Vec::new())),
            streams: Arc::new(Mutex::new(Vec::new())),
            stream_has_body: true,
        }
    }

    fn without_stream_body(mut self) -> Self {
        self.stream_has_body = false;
        self
    }

    async fn chat_requests(&self) -> Vec<ModelRequest> {
        self.chats.lock().await.clone()
    }

    async fn stream_requests(&self) -> Vec<ModelRequest> {
        self.streams.lock().await.clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.chats.lock().await.push(request);
        let scripted = self.replies.lock().await.remove(0);
        match scripted {
            Scripted::Reply(content) => Ok(ModelResponse::new(
                content.to_string(),
                json!({"message": {"role": "assistant", "content": content}, "done": true}),
            )),
            Scripted::Upstream { status, body } => Err(ModelError::upstream("scripted", status, body)),
        }
    }

    async fn chat_stream(&self, request: ModelRequest) -> Result<ModelStream, ModelError> {
        self.streams.lock().await.push(request);
        if !self.stream_has_body {
            return Err(ModelError::empty_stream_body("scripted"));
        }
        let chunks = vec![
            Ok(Bytes::from_static(b"{\"message\":{\"content\":\"hel\"},\"done\":false}\n")),
            Ok(Bytes::from_static(b"{\"message\":{\"content\":\"lo\"},\"done\":true}\n")),
        ];
        Ok(ModelStream {
            content_type: Some("application/x-ndjson".to_string()),
            bytes: futures::stream::iter(chunks).boxed(),
        })
    }
}

/// Close-approach stub recording queries and replaying one scripted result.
struct StubSource {
    result: Result<CadResponse, (u16, &'static str)>,
    queries: Arc<Mutex<Vec<CadQuery>>>,
}

impl StubSource {
    fn ok(response: CadResponse) -> Self {
        Self {
            result: Ok(response),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing(status: u16, body: &'static str) -> Self {
        Self {
            result: Err((status, body)),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn queries(&self) -> Vec<CadQuery> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl CloseApproachSource for StubSource {
    async fn close_approaches(&self, query: &CadQuery) -> Result<CadResponse, CadError> {
        self.queries.lock().await.push(query.clone());
        match &self.result {
            Ok(response) => Ok(response.clone()),
            Err((status, body)) => Err(CadError::Upstream {
                status: *status,
                body: body.to_string(),
            }),
        }
    }
}

fn cad_rows(count: u64, rows: usize) -> CadResponse {
    let data: Vec<Value> = (0..rows)
        .map(|i| {
            json!([
                format!("obj-{i}"),
                "1",
                "2460000.5",
                "2025-Sep-01 12:00",
                "0.01",
                "0.01",
                "0.01",
                "5.0",
                "5.0",
                "< 00:01",
                "20.0",
            ])
        })
        .collect();
    serde_json::from_value(json!({
        "count": count,
        "fields": ["des", "orbit_id", "jd", "cd", "dist", "dist_min", "dist_max",
                   "v_rel", "v_inf", "t_sigma_f", "h"],
        "data": data,
    }))
    .expect("stub response parses")
}

fn turn(messages: Vec<ChatMessage>, stream: bool) -> ChatTurn {
    ChatTurn {
        model: None,
        messages,
        stream,
        options: Map::new(),
    }
}

fn user(content: &str) -> ChatMessage {
    ChatMessage::new(MessageRole::User, content)
}

fn query_value<'a>(query: &'a CadQuery, key: &str) -> Option<&'a str> {
    query
        .pairs()
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

#[tokio::test]
async fn no_directive_buffered_issues_exactly_one_replay_and_no_fetch() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Scripted::Reply("Clear skies tonight."),
        Scripted::Reply("Clear skies tonight, again."),
    ]));
    let source = Arc::new(StubSource::ok(cad_rows(0, 0)));
    let orchestrator = Orchestrator::new(provider.clone(), source.clone(), "llama3.2");

    let outcome = orchestrator
        .run(turn(vec![user("hi there")], false))
        .await
        .expect("run succeeds");

    let ChatOutcome::Buffered(raw) = outcome else {
        panic!("expected buffered outcome");
    };
    assert_eq!(raw["message"]["content"], "Clear skies tonight, again.");

    let chats = provider.chat_requests().await;
    assert_eq!(chats.len(), 2, "probe plus one replay");
    assert!(provider.stream_requests().await.is_empty());
    assert!(source.queries().await.is_empty(), "no data-service call");

    // both calls carry the tool grammar and the probe temperature default
    for request in &chats {
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert_eq!(request.messages[0].content, TOOL_SYSTEM_PROMPT);
        assert_eq!(request.options.get("temperature"), Some(&json!(0.2)));
    }
    // the replay repeats the probe's message list unchanged
    assert_eq!(chats[0].messages, chats[1].messages);
}

#[tokio::test]
async fn no_directive_streaming_replays_in_streaming_mode() {
    let provider = Arc::new(ScriptedProvider::new(vec![Scripted::Reply("All quiet.")]));
    let source = Arc::new(StubSource::ok(cad_rows(0, 0)));
    let orchestrator = Orchestrator::new(provider.clone(), source.clone(), "llama3.2");

    let outcome = orchestrator
        .run(turn(vec![user("hello")], true))
        .await
        .expect("run succeeds");

    assert!(matches!(outcome, ChatOutcome::Streaming(_)));
    assert_eq!(provider.chat_requests().await.len(), 1, "probe only");
    assert_eq!(provider.stream_requests().await.len(), 1);
    assert!(source.queries().await.is_empty());
}

#[tokio::test]
async fn directive_flow_tunes_fetches_and_finalizes_with_verbatim_replay() {
    let raw_line = r#"CAD_CALL {"date_max":"+60","dist_max":"0.05","body":"Earth","sort":"date","limit":50}"#;
    let probe_reply: &'static str =
        "Let me look that up.\nCAD_CALL {\"date_max\":\"+60\",\"dist_max\":\"0.05\",\"body\":\"Earth\",\"sort\":\"date\",\"limit\":50}";
    let provider = Arc::new(ScriptedProvider::new(vec![
        Scripted::Reply(probe_reply),
        Scripted::Reply("Here are the upcoming approaches."),
    ]));
    let source = Arc::new(StubSource::ok(cad_rows(100, 100)));
    let orchestrator = Orchestrator::new(provider.clone(), source.clone(), "llama3.2");

    let messages = vec![user("what's coming in the next 7 days")];
    let outcome = orchestrator
        .run(turn(messages.clone(), false))
        .await
        .expect("run succeeds");
    assert!(matches!(outcome, ChatOutcome::Buffered(_)));

    // tuned fetch: weekly scope forced, limit clamped to the ceiling
    let queries = source.queries().await;
    assert_eq!(queries.len(), 1);
    assert_eq!(query_value(&queries[0], "date-min"), Some("now"));
    assert_eq!(query_value(&queries[0], "date-max"), Some("+7"));
    assert_eq!(query_value(&queries[0], "dist-max"), Some("0.05"));
    assert_eq!(query_value(&queries[0], "limit"), Some("12"));

    let chats = provider.chat_requests().await;
    assert_eq!(chats.len(), 2, "probe plus finalize");
    let finalize = &chats[1];
    // system + caller turn + assistant directive + synthetic user result
    assert_eq!(finalize.messages.len(), 4);
    assert_eq!(finalize.messages[2].role, MessageRole::Assistant);
    assert_eq!(finalize.messages[2].content, raw_line, "directive replayed verbatim");

    let result_turn = &finalize.messages[3];
    assert_eq!(result_turn.role, MessageRole::User);
    let payload = result_turn
        .content
        .strip_prefix(&format!("{RESULT_PREFIX} "))
        .expect("fixed result prefix");
    let compact: Value = serde_json::from_str(payload).expect("compact payload is JSON");
    assert_eq!(compact["total"], 100);
    assert_eq!(compact["returned"], 12);
    assert_eq!(compact["items"].as_array().map(Vec::len), Some(12));
}

#[tokio::test]
async fn probe_failure_surfaces_detail_and_stops() {
    let provider = Arc::new(ScriptedProvider::new(vec![Scripted::Upstream {
        status: 500,
        body: "overload",
    }]));
    let source = Arc::new(StubSource::ok(cad_rows(0, 0)));
    let orchestrator = Orchestrator::new(provider.clone(), source.clone(), "llama3.2");

    let error = orchestrator
        .run(turn(vec![user("hi")], true))
        .await
        .expect_err("run fails");

    match &error {
        OrchestratorError::Model(model_error) => {
            assert_eq!(model_error.status(), Some(500));
            assert!(model_error.to_string().contains("overload"));
        }
        other => panic!("expected model error, got {other:?}"),
    }
    assert_eq!(provider.chat_requests().await.len(), 1, "no second call");
    assert!(provider.stream_requests().await.is_empty());
    assert!(source.queries().await.is_empty());
}

#[tokio::test]
async fn fetch_failure_preserves_upstream_status_and_body() {
    let provider = Arc::new(ScriptedProvider::new(vec![Scripted::Reply(
        "CAD_CALL {\"limit\":5}",
    )]));
    let source = Arc::new(StubSource::failing(503, "service down"));
    let orchestrator = Orchestrator::new(provider.clone(), source.clone(), "llama3.2");

    let error = orchestrator
        .run(turn(vec![user("close approaches?")], false))
        .await
        .expect_err("run fails");

    match &error {
        OrchestratorError::Data(cad_error) => {
            assert_eq!(cad_error.status(), Some(503));
            assert!(cad_error.to_string().contains("service down"));
        }
        other => panic!("expected data error, got {other:?}"),
    }
    assert_eq!(provider.chat_requests().await.len(), 1, "no finalize call");
}

#[tokio::test]
async fn caller_options_override_the_probe_temperature() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Scripted::Reply("ok"),
        Scripted::Reply("ok"),
    ]));
    let source = Arc::new(StubSource::ok(cad_rows(0, 0)));
    let orchestrator = Orchestrator::new(provider.clone(), source.clone(), "llama3.2");

    let mut options = Map::new();
    options.insert("temperature".to_string(), json!(0.9));
    options.insert("num_ctx".to_string(), json!(4096));
    let turn = ChatTurn {
        model: Some("mistral".to_string()),
        messages: vec![user("hi")],
        stream: false,
        options,
    };

    orchestrator.run(turn).await.expect("run succeeds");

    let chats = provider.chat_requests().await;
    assert_eq!(chats[0].model, "mistral");
    assert_eq!(chats[0].options.get("temperature"), Some(&json!(0.9)));
    assert_eq!(chats[0].options.get("num_ctx"), Some(&json!(4096)));
}

#[tokio::test]
async fn empty_stream_body_surfaces_as_a_distinct_failure() {
    let provider = Arc::new(
        ScriptedProvider::new(vec![Scripted::Reply("no directive here")]).without_stream_body(),
    );
    let source = Arc::new(StubSource::ok(cad_rows(0, 0)));
    let orchestrator = Orchestrator::new(provider.clone(), source.clone(), "llama3.2");

    let error = orchestrator
        .run(turn(vec![user("hi")], true))
        .await
        .expect_err("run fails");

    assert!(matches!(
        error,
        OrchestratorError::Model(ModelError::EmptyStreamBody { .. })
    ));
}
