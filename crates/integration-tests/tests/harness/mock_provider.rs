//! Mock OpenAI-compatible provider for integration tests
//!
//! Serves `/v1/chat/completions` with canned replies. Streaming replies are
//! written in small fragments with pauses in between, so the gateway sees
//! SSE lines split across transport reads.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use bytes::Bytes;
use futures_util::{StreamExt, stream};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Text produced by the default streaming reply
pub const STREAM_TEXT: &str = "Hello, wörld! ✓";

/// Text produced by the default non-streaming reply
pub const COMPLETION_TEXT: &str = "Hello from mock";

const FRAGMENT_SIZE: usize = 7;

/// What the mock answers with
#[derive(Debug, Clone)]
pub enum Reply {
    /// Canned completion, or the default token stream when streaming
    Default,
    /// Raw SSE body fragments, written as-is
    Raw(Vec<Bytes>),
    /// Error status with a body
    Status(StatusCode, String),
}

pub struct MockProvider {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    reply: Reply,
    requests: Mutex<Vec<Value>>,
}

impl MockProvider {
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(Reply::Default).await
    }

    /// Start a mock that fails every request with `status`
    pub async fn start_failing(status: StatusCode, body: &str) -> anyhow::Result<Self> {
        Self::start_with(Reply::Status(status, body.to_owned())).await
    }

    /// Start a mock that streams the given raw fragments
    pub async fn start_streaming(fragments: &[&str]) -> anyhow::Result<Self> {
        let fragments = fragments.iter().map(|f| Bytes::copy_from_slice(f.as_bytes())).collect();
        Self::start_with(Reply::Raw(fragments)).await
    }

    pub async fn start_with(reply: Reply) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            reply,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as a provider
    ///
    /// Includes `/v1` since the adapters append `/chat/completions`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Request bodies received so far
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }

    /// The most recent request body
    pub fn last_request(&self) -> Value {
        self.requests().pop().expect("mock received a request")
    }
}

impl Drop for MockProvider {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// A base URL on which nothing is listening
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/v1")
}

/// One OpenAI-style stream line
pub fn chunk(delta: &Value, finish_reason: Option<&str>) -> String {
    let chunk = json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion.chunk",
        "model": "mock-model",
        "choices": [{ "index": 0, "delta": delta, "finish_reason": finish_reason }]
    });
    format!("data: {chunk}\n\n")
}

fn default_stream_body() -> String {
    let mut body = chunk(&json!({ "role": "assistant", "content": "" }), None);

    let chars: Vec<char> = STREAM_TEXT.chars().collect();
    for piece in chars.chunks(3) {
        let text: String = piece.iter().collect();
        body.push_str(&chunk(&json!({ "content": text }), None));
    }

    body.push_str(&chunk(&json!({}), Some("stop")));
    body.push_str(&format!(
        "data: {}\n\n",
        json!({
            "id": "chatcmpl-mock",
            "choices": [],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        })
    ));
    body.push_str("data: [DONE]\n\n");
    body
}

/// Split into fixed-size byte fragments, ignoring character boundaries
fn fragment(body: &str) -> Vec<Bytes> {
    body.as_bytes()
        .chunks(FRAGMENT_SIZE)
        .map(Bytes::copy_from_slice)
        .collect()
}

fn sse_response(fragments: Vec<Bytes>) -> Response {
    let body = stream::iter(fragments).then(|fragment| async move {
        tokio::time::sleep(Duration::from_millis(1)).await;
        Ok::<_, Infallible>(fragment)
    });

    ([(header::CONTENT_TYPE, "text/event-stream")], Body::from_stream(body)).into_response()
}

async fn handle_chat_completions(State(state): State<Arc<MockState>>, Json(request): Json<Value>) -> Response {
    state.requests.lock().unwrap().push(request.clone());
    let stream = request["stream"].as_bool().unwrap_or(false);

    match (&state.reply, stream) {
        (Reply::Status(status, body), _) => (*status, body.clone()).into_response(),
        (Reply::Raw(fragments), true) => sse_response(fragments.clone()),
        (Reply::Default, true) => sse_response(fragment(&default_stream_body())),
        (_, false) => Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": request["model"],
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": COMPLETION_TEXT },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16 }
        }))
        .into_response(),
    }
}
