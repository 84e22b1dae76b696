//! Test utilities for cogs-core
//!
//! This module provides a mock OpenAI-compatible chat-completion server that
//! can be used for development and integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// What the mock server answers with
#[derive(Debug, Clone)]
enum Behavior {
    /// One choice carrying this message content
    Reply(String),
    /// A well-formed response with an empty `choices` array
    NoChoices,
    /// An error status with a JSON error body
    Fail(u16),
}

/// A request captured by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// `Authorization` header value, if sent
    pub authorization: Option<String>,
    /// Parsed JSON request body
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    behavior: Behavior,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Mock chat-completion server for testing and development
pub struct MockChatServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockChatServer {
    /// Start a server that replies with `content` as the assistant message
    pub async fn start(content: impl Into<String>) -> Self {
        Self::start_with(Behavior::Reply(content.into())).await
    }

    /// Start a server that returns no choices
    pub async fn start_without_choices() -> Self {
        Self::start_with(Behavior::NoChoices).await
    }

    /// Start a server that fails every request with `status`
    pub async fn start_failing(status: u16) -> Self {
        Self::start_with(Behavior::Fail(status)).await
    }

    async fn start_with(behavior: Behavior) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            behavior,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/v1/chat/completions", post(handle_chat_completion))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            requests,
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Chat completions endpoint
async fn handle_chat_completion(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let model = body["model"].as_str().unwrap_or("mock").to_string();
    state.requests.lock().unwrap().push(RecordedRequest {
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    match state.behavior {
        Behavior::Reply(content) => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        }))
        .into_response(),
        Behavior::NoChoices => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "model": model,
            "choices": []
        }))
        .into_response(),
        Behavior::Fail(code) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                Json(json!({"error": {"message": "mock failure", "code": code}})),
            )
                .into_response()
        }
    }
}
