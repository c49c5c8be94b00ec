//! In-process OpenAI-compatible endpoint for HTTP tests.
//!
//! Serves `GET /v1/models` from a fixed model list and answers
//! `POST /v1/chat/completions` with a canned reply (or a canned error
//! status). Every request is recorded for later assertions.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request seen by the mock server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone)]
struct MockState {
    models: Vec<String>,
    reply: String,
    chat_status: StatusCode,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockState {
    fn record(&self, path: &str, headers: &HeaderMap, body: Option<Value>) {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        if let Ok(mut recorded) = self.recorded.lock() {
            recorded.push(RecordedRequest {
                path: path.to_string(),
                authorization,
                body,
            });
        }
    }
}

/// A running mock endpoint bound to an ephemeral localhost port.
///
/// The server task is aborted when this value is dropped.
pub struct MockChatServer {
    base_url: String,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl MockChatServer {
    /// Serve `models` and answer every completion with `reply`.
    pub async fn start(models: &[&str], reply: &str) -> Self {
        Self::spawn(models, reply, StatusCode::OK).await
    }

    /// Serve `models` and fail every completion with `status`.
    pub async fn start_failing(models: &[&str], status: u16) -> Self {
        let status = StatusCode::from_u16(status).expect("invalid status code");
        Self::spawn(models, "", status).await
    }

    async fn spawn(models: &[&str], reply: &str, chat_status: StatusCode) -> Self {
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            models: models.iter().map(|m| m.to_string()).collect(),
            reply: reply.to_string(),
            chat_status,
            recorded: Arc::clone(&recorded),
        };

        let app = Router::new()
            .route("/v1/models", get(list_models))
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let addr = listener.local_addr().expect("mock server has no address");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            recorded,
            handle,
        }
    }

    /// Base URL without the `/v1` suffix, as `[llm] endpoint` expects.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// All recorded requests in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Recorded completion requests only.
    pub fn chat_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == "/v1/chat/completions")
            .collect()
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn list_models(State(state): State<MockState>, headers: HeaderMap) -> Json<Value> {
    state.record("/v1/models", &headers, None);
    let data: Vec<Value> = state
        .models
        .iter()
        .map(|id| json!({ "id": id, "object": "model", "owned_by": "mock" }))
        .collect();
    Json(json!({ "object": "list", "data": data }))
}

async fn chat_completions(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let model = body
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    state.record("/v1/chat/completions", &headers, Some(body));

    if !state.chat_status.is_success() {
        return (state.chat_status, "mock failure").into_response();
    }

    let prompt_tokens = 42;
    let completion_tokens = state.reply.split_whitespace().count() as u32;
    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": model,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": state.reply },
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens
        }
    }))
    .into_response()
}
