mod harness;

use eventsource_stream::{Event, Eventsource};
use futures_util::StreamExt;
use harness::config::ConfigBuilder;
use harness::mock_provider::{MockProvider, STREAM_TEXT, chunk};
use harness::server::TestServer;
use serde_json::{Value, json};

fn streaming_request(model: &str) -> Value {
    json!({
        "model": model,
        "max_tokens": 64,
        "stream": true,
        "messages": [{ "role": "user", "content": "Hello" }]
    })
}

/// Read the whole gateway stream and parse every frame
async fn read_events(resp: reqwest::Response) -> Vec<(String, Value)> {
    let events: Vec<Event> = resp
        .bytes_stream()
        .eventsource()
        .map(|event| event.expect("well-formed SSE from gateway"))
        .collect()
        .await;

    events
        .into_iter()
        .map(|event| (event.event, serde_json::from_str(&event.data).unwrap()))
        .collect()
}

fn types(events: &[(String, Value)]) -> Vec<&str> {
    events.iter().map(|(_, data)| data["type"].as_str().unwrap()).collect()
}

fn text(events: &[(String, Value)]) -> String {
    events
        .iter()
        .filter(|(_, data)| data["type"] == "content_block_delta")
        .map(|(_, data)| data["delta"]["text"].as_str().unwrap())
        .collect()
}

async fn start(mock: &MockProvider) -> TestServer {
    let config = ConfigBuilder::new()
        .with_openai_provider("mock", &mock.base_url())
        .build();
    TestServer::start(config).await.unwrap()
}

#[tokio::test]
async fn stream_headers() {
    let mock = MockProvider::start().await.unwrap();
    let server = start(&mock).await;

    let resp = server.messages(&streaming_request("mock-model")).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "text/event-stream");
    assert_eq!(resp.headers()["cache-control"], "no-cache");
    assert_eq!(resp.headers()["anthropic-ratelimit-tokens-reset"], "60");
}

#[tokio::test]
async fn fragmented_stream_is_reframed_in_order() {
    let mock = MockProvider::start().await.unwrap();
    let server = start(&mock).await;

    let resp = server.messages(&streaming_request("claude-3-5-sonnet-latest")).await;
    let events = read_events(resp).await;

    assert!(events.iter().all(|(name, _)| name == "message"));

    let kinds = types(&events);
    assert_eq!(kinds[0], "message_start");
    assert_eq!(kinds[1], "content_block_start");
    assert_eq!(&kinds[kinds.len() - 3..], ["content_block_stop", "message_delta", "message_stop"]);
    assert!(kinds[2..kinds.len() - 3].iter().all(|kind| *kind == "content_block_delta"));

    // Multi-byte characters split across transport fragments survive intact
    assert_eq!(text(&events), STREAM_TEXT);

    let (_, start) = &events[0];
    assert!(start["message"]["id"].as_str().unwrap().starts_with("msg_"));
    assert_eq!(start["message"]["model"], "claude-3-5-sonnet-latest");
    assert_eq!(start["message"]["role"], "assistant");

    let (_, delta) = &events[events.len() - 2];
    assert_eq!(delta["delta"]["stop_reason"], "end_turn");

    assert_eq!(mock.last_request()["stream"], true);
}

#[tokio::test]
async fn stream_without_sentinel_still_terminates() {
    let first = chunk(&json!({ "content": "partial" }), None);
    let mock = MockProvider::start_streaming(&[first.as_str()]).await.unwrap();
    let server = start(&mock).await;

    let events = read_events(server.messages(&streaming_request("m")).await).await;

    assert_eq!(
        types(&events),
        vec!["message_start", "content_block_start", "content_block_delta", "content_block_stop", "message_stop"]
    );
    assert_eq!(text(&events), "partial");
}

#[tokio::test]
async fn bytes_after_sentinel_are_ignored() {
    let first = chunk(&json!({ "content": "kept" }), None);
    let late = chunk(&json!({ "content": "dropped" }), None);
    let body = format!("{first}data: [DONE]\n\n{late}");
    let mock = MockProvider::start_streaming(&[body.as_str()]).await.unwrap();
    let server = start(&mock).await;

    let events = read_events(server.messages(&streaming_request("m")).await).await;

    assert_eq!(text(&events), "kept");
    let stops = types(&events).iter().filter(|kind| **kind == "message_stop").count();
    assert_eq!(stops, 1);
}

#[tokio::test]
async fn malformed_chunk_does_not_abort_stream() {
    let before = chunk(&json!({ "content": "a" }), None);
    let after = chunk(&json!({ "content": "b" }), None);
    let finish = chunk(&json!({}), Some("length"));
    let fragments = [
        before.as_str(),
        "data: {\"choices\": [tru",
        "ncated\n\n",
        after.as_str(),
        finish.as_str(),
        "data: [DONE]\n\n",
    ];
    let mock = MockProvider::start_streaming(&fragments).await.unwrap();
    let server = start(&mock).await;

    let events = read_events(server.messages(&streaming_request("m")).await).await;

    assert_eq!(text(&events), "ab");
    let (_, delta) = events
        .iter()
        .find(|(_, data)| data["type"] == "message_delta")
        .expect("message_delta present");
    assert_eq!(delta["delta"]["stop_reason"], "max_tokens");
    assert_eq!(types(&events).last(), Some(&"message_stop"));
}
