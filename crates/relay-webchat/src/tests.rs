use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use relay_agent::{AgentEndpointConfig, AgentRequest, AgentTransport, RelayAgentError};
use relay_chat::{ChatDispatcher, StaticAuthProvider};
use relay_session::InMemoryChatSessionStore;
use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use super::{build_webchat_router, WebchatState};

struct QueuedTransport {
    replies: Mutex<Vec<Result<Value, RelayAgentError>>>,
}

#[async_trait]
impl AgentTransport for QueuedTransport {
    async fn send(&self, _request: &AgentRequest) -> Result<Value, RelayAgentError> {
        let mut replies = self.replies.lock().expect("replies lock");
        if replies.is_empty() {
            return Ok(json!({ "textView": "default reply" }));
        }
        replies.remove(0)
    }
}

fn endpoint_config() -> AgentEndpointConfig {
    AgentEndpointConfig {
        endpoint_url: "http://agent.invalid/chat".to_string(),
        api_key: "key".to_string(),
        user_id: "default-user".to_string(),
        agent_id: "agent-finops".to_string(),
        session_id: "session-static".to_string(),
    }
}

fn test_state(
    replies: Vec<Result<Value, RelayAgentError>>,
    auth: StaticAuthProvider,
) -> Arc<WebchatState> {
    let dispatcher = ChatDispatcher::new(
        endpoint_config(),
        Arc::new(QueuedTransport {
            replies: Mutex::new(replies),
        }),
        Arc::new(InMemoryChatSessionStore::new()),
        Arc::new(auth),
    )
    .with_welcome_text("Hi! Ask me about your cloud spend.");
    Arc::new(WebchatState::new(Arc::new(dispatcher)))
}

fn signed_in_state(replies: Vec<Result<Value, RelayAgentError>>) -> Arc<WebchatState> {
    test_state(replies, StaticAuthProvider::from_operator(Some("operator-1")))
}

async fn spawn_test_server(
    state: Arc<WebchatState>,
) -> Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind ephemeral listener")?;
    let addr = listener.local_addr().context("resolve listener addr")?;
    let app = build_webchat_router(state);
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    Ok((addr, handle))
}

fn client() -> Client {
    Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("build client")
}

async fn get_page(client: &Client, addr: SocketAddr) -> String {
    client
        .get(format!("http://{addr}/"))
        .send()
        .await
        .expect("page request")
        .text()
        .await
        .expect("page body")
}

async fn api_messages(client: &Client, addr: SocketAddr) -> Value {
    client
        .get(format!("http://{addr}/api/messages"))
        .send()
        .await
        .expect("messages request")
        .json::<Value>()
        .await
        .expect("messages json")
}

async fn post_form(client: &Client, addr: SocketAddr, path: &str, message: &str) {
    let response = client
        .post(format!("http://{addr}{path}"))
        .form(&[("message", message)])
        .send()
        .await
        .expect("form post");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get("location")
            .and_then(|value| value.to_str().ok()),
        Some("/")
    );
}

#[tokio::test]
async fn functional_chat_page_shows_welcome_and_composer() {
    let (addr, handle) = spawn_test_server(signed_in_state(Vec::new()))
        .await
        .expect("spawn server");
    let client = client();

    let page = get_page(&client, addr).await;
    assert!(page.contains("Hi! Ask me about your cloud spend."));
    assert!(page.contains(r#"data-message-id="welcome""#));
    assert!(page.contains(r#"data-signed-in-user="operator-1""#));
    assert!(page.contains(r#"action="/chat/send""#));

    let health = client
        .get(format!("http://{addr}/healthz"))
        .send()
        .await
        .expect("health request");
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(health.text().await.expect("health body"), "ok");

    handle.abort();
}

#[tokio::test]
async fn integration_send_persists_turns_and_renders_reply() {
    let replies = vec![Ok(json!({
        "textView": "Spend is **up** 12%",
        "dashboardView": {"recommendations": ["Pause idle VMs"]}
    }))];
    let (addr, handle) = spawn_test_server(signed_in_state(replies))
        .await
        .expect("spawn server");
    let client = client();

    post_form(&client, addr, "/chat/send", "How is spend trending?").await;

    let payload = api_messages(&client, addr).await;
    assert_eq!(payload["title"], "How is spend trending?");
    let messages = payload["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1]["sender"], "user");
    assert_eq!(messages[2]["sender"], "assistant");
    let stored: Value = serde_json::from_str(messages[2]["content"].as_str().expect("content"))
        .expect("assistant content is json");
    assert_eq!(stored["textView"], "Spend is **up** 12%");

    let page = get_page(&client, addr).await;
    assert!(page.contains("<strong>up</strong>"));
    assert!(page.contains("Show dashboard"));
    assert!(!page.contains(r#"id="relay-banner""#));

    handle.abort();
}

#[tokio::test]
async fn functional_failed_send_shows_banner_once() {
    let replies = vec![Err(RelayAgentError::HttpStatus {
        status: 503,
        body: "unavailable".to_string(),
    })];
    let (addr, handle) = spawn_test_server(signed_in_state(replies))
        .await
        .expect("spawn server");
    let client = client();

    post_form(&client, addr, "/chat/send", "hello").await;

    let page = get_page(&client, addr).await;
    assert!(page.contains(r#"id="relay-banner""#));
    assert!(page.contains("Failed to get a response from the agent"));
    assert!(page.contains("I&#x27;m sorry") || page.contains("I'm sorry"));

    let second = get_page(&client, addr).await;
    assert!(!second.contains(r#"id="relay-banner""#));

    handle.abort();
}

#[tokio::test]
async fn functional_toggle_switches_message_between_text_and_dashboard() {
    let replies = vec![Ok(json!({
        "textView": "summary text",
        "dashboardView": {"summaryCards": [{"title": "Spend", "value": 42}]}
    }))];
    let (addr, handle) = spawn_test_server(signed_in_state(replies))
        .await
        .expect("spawn server");
    let client = client();

    post_form(&client, addr, "/chat/send", "show spend").await;
    let payload = api_messages(&client, addr).await;
    let assistant_id = payload["messages"][2]["id"]
        .as_str()
        .expect("assistant id")
        .to_string();
    let toggle_path = format!("/chat/messages/{assistant_id}/toggle");

    let before = get_page(&client, addr).await;
    assert!(!before.contains(r#"data-component="SummaryCards""#));

    post_form(&client, addr, &toggle_path, "").await;
    let dashboard = get_page(&client, addr).await;
    assert!(dashboard.contains(r#"data-component="SummaryCards""#));
    assert!(dashboard.contains("Show text"));

    post_form(&client, addr, &toggle_path, "").await;
    let after = get_page(&client, addr).await;
    assert!(!after.contains(r#"data-component="SummaryCards""#));
    assert!(after.contains("summary text"));

    handle.abort();
}

#[tokio::test]
async fn functional_clear_and_new_reset_the_transcript() {
    let (addr, handle) = spawn_test_server(signed_in_state(Vec::new()))
        .await
        .expect("spawn server");
    let client = client();

    post_form(&client, addr, "/chat/send", "first").await;
    let first = api_messages(&client, addr).await;
    let first_session = first["session_id"].clone();
    assert_eq!(first["messages"].as_array().map(Vec::len), Some(3));

    post_form(&client, addr, "/chat/clear", "").await;
    let cleared = api_messages(&client, addr).await;
    assert_eq!(cleared["session_id"], first_session);
    assert_eq!(cleared["messages"].as_array().map(Vec::len), Some(1));
    assert_eq!(cleared["messages"][0]["id"], "welcome");

    post_form(&client, addr, "/chat/new", "").await;
    let fresh = api_messages(&client, addr).await;
    assert_ne!(fresh["session_id"], first_session);
    assert_eq!(fresh["title"], "New chat");

    handle.abort();
}

#[tokio::test]
async fn regression_signed_out_visitor_cannot_send() {
    let state = test_state(Vec::new(), StaticAuthProvider::signed_out());
    let (addr, handle) = spawn_test_server(state).await.expect("spawn server");
    let client = client();

    let page = get_page(&client, addr).await;
    assert!(page.contains("relay-signed-out"));
    assert!(!page.contains(r#"action="/chat/send""#));

    post_form(&client, addr, "/chat/send", "hello").await;
    let payload = api_messages(&client, addr).await;
    assert!(payload["session_id"].is_null());
    assert_eq!(payload["messages"].as_array().map(Vec::len), Some(0));

    handle.abort();
}
