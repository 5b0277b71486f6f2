use std::net::SocketAddr;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use lifestyle::elf::{APOLOGY, ElfClient, SYSTEM_PROMPT, fallback_reply};
use lifestyle::settings::ChatSettings;

const PATH: &str = "/v1/chat/completions";

/// Echoes what it was sent so the client's request shape can be checked
/// from the reply alone.
async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let system_ok = body["messages"][0]["role"] == "system"
        && body["messages"][0]["content"] == SYSTEM_PROMPT;
    let content = format!(
        "{auth}|{}|{}|{}|{system_ok}|{}",
        body["model"].as_str().unwrap_or_default(),
        body["max_tokens"],
        body["messages"][1]["role"].as_str().unwrap_or_default(),
        body["messages"][1]["content"].as_str().unwrap_or_default(),
    );
    Json(json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }))
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn settings(addr: SocketAddr) -> ChatSettings {
    ChatSettings {
        endpoint: format!("http://{addr}{PATH}"),
        ..ChatSettings::default()
    }
}

#[tokio::test]
async fn stub_content_is_returned_verbatim() {
    let addr = serve(Router::new().route(PATH, post(echo))).await;
    let client = ElfClient::new(&settings(addr), Some("sk-test".into())).unwrap();

    let reply = client.reply("plan our weekend").await;
    assert_eq!(
        reply,
        "Bearer sk-test|deepseek-chat|200|user|true|plan our weekend"
    );
}

#[tokio::test]
async fn server_error_falls_back_to_canned_reply() {
    let app = Router::new().route(
        PATH,
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let addr = serve(app).await;
    let client = ElfClient::new(&settings(addr), Some("sk-test".into())).unwrap();

    let message = "what's the weather like";
    assert!(client.complete(message).await.is_err());
    assert_eq!(client.reply(message).await, fallback_reply(message));
}

#[tokio::test]
async fn malformed_body_falls_back() {
    let app = Router::new().route(PATH, post(|| async { Json(json!({ "nope": true })) }));
    let addr = serve(app).await;
    let client = ElfClient::new(&settings(addr), Some("sk-test".into())).unwrap();

    assert_eq!(client.reply("hello").await, fallback_reply("hello"));
}

#[tokio::test]
async fn empty_content_yields_apology() {
    let app = Router::new().route(
        PATH,
        post(|| async { Json(json!({ "choices": [{ "message": { "content": "" } }] })) }),
    );
    let addr = serve(app).await;
    let client = ElfClient::new(&settings(addr), Some("sk-test".into())).unwrap();

    assert_eq!(client.reply("hello").await, APOLOGY);
}

#[tokio::test]
async fn missing_key_never_calls_out() {
    // Without a key no request is made.
    let client = ElfClient::new(&ChatSettings::default(), None).unwrap();
    assert!(!client.has_api_key());
    assert_eq!(client.reply("谢谢").await, fallback_reply("谢谢"));
}
