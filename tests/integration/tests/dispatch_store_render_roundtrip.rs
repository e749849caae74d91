use std::sync::Arc;

use httpmock::prelude::*;
use relay_agent::{AgentEndpointConfig, HttpAgentClient, ReplySource, APOLOGY_TEXT};
use relay_chat::{AuthenticatedUser, ChatDispatcher, DispatchOutcome, StaticAuthProvider};
use relay_render::{
    classify_stored_content, render_chat_page, render_message, ChatPageContext, StoredContentShape,
    ViewMode, ViewModePreferences,
};
use relay_session::{ChatSessionStore, JsonlChatSessionStore};
use serde_json::json;
use tempfile::tempdir;

fn endpoint_config(server: &MockServer) -> AgentEndpointConfig {
    AgentEndpointConfig {
        endpoint_url: format!("{}/agent/chat", server.base_url()),
        api_key: "integration-key".to_string(),
        user_id: "analyst@example.com".to_string(),
        agent_id: "agent-finops".to_string(),
        session_id: "session-int".to_string(),
    }
}

fn dispatcher(
    server: &MockServer,
    store: Arc<dyn ChatSessionStore>,
) -> ChatDispatcher {
    let config = endpoint_config(server);
    let client = HttpAgentClient::new(&config).expect("agent client");
    ChatDispatcher::new(
        config,
        Arc::new(client),
        store,
        Arc::new(StaticAuthProvider::signed_in(AuthenticatedUser::new(
            "analyst@example.com",
        ))),
    )
    .with_welcome_text("Welcome to the spend assistant.")
}

#[tokio::test]
async fn integration_legacy_reply_flows_from_endpoint_to_rendered_dashboard() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/agent/chat")
            .header("x-api-key", "integration-key");
        then.status(200).json_body(json!({
            "response": "Spend rose **8%** this month.",
            "module_outputs": {
                "alerts": ["⚠️ watch spend"],
                "charts": [{
                    "type": "pie",
                    "title": "By service",
                    "data": {"labels": ["Compute", "Storage", "Network"], "values": [60, 30]}
                }]
            }
        }));
    });
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("sessions.jsonl");
    let store = Arc::new(JsonlChatSessionStore::load(&path).expect("open store"));
    let dispatcher = dispatcher(&server, store);

    let outcome = dispatcher.send_message("How is spend trending?").await;
    mock.assert();
    let (session_id, assistant) = match outcome {
        DispatchOutcome::Replied {
            session_id,
            assistant_message,
            source,
            ..
        } => {
            assert_eq!(source, ReplySource::LegacyText);
            (session_id, assistant_message)
        }
        other => panic!("expected a reply, got {other:?}"),
    };
    assert!(!dispatcher.is_in_flight());

    let reloaded = JsonlChatSessionStore::load(&path).expect("reload store");
    let session = reloaded
        .load_session(&session_id)
        .expect("load session")
        .expect("session persisted");
    assert_eq!(session.title, "How is spend trending?");
    assert_eq!(session.messages.len(), 3);
    let stored = session.messages.last().expect("assistant message");
    assert_eq!(stored.content, assistant.content);

    match classify_stored_content(&stored.content) {
        StoredContentShape::Canonical { text, dashboard } => {
            assert_eq!(text, "Spend rose **8%** this month.");
            assert!(dashboard.is_some());
        }
        other => panic!("stored reply should be canonical, got {other:?}"),
    }

    let text_html = render_message(stored, ViewMode::Text);
    assert!(text_html.contains("<strong>8%</strong>"));
    let dashboard_html = render_message(stored, ViewMode::Dashboard);
    assert!(dashboard_html.contains(r#"data-chart-renderer="pie""#));
    assert!(dashboard_html.contains(r#"data-point-count="3""#));
    assert!(dashboard_html.contains(r#"data-severity="destructive""#));
    assert!(dashboard_html.contains("watch spend"));
    assert!(!dashboard_html.contains("⚠️"));
}

#[tokio::test]
async fn integration_endpoint_failure_persists_apology_and_renders_it() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/agent/chat");
        then.status(502).body("bad gateway");
    });
    let temp = tempdir().expect("tempdir");
    let store = Arc::new(
        JsonlChatSessionStore::load(temp.path().join("sessions.jsonl")).expect("open store"),
    );
    let dispatcher = dispatcher(&server, store);

    let outcome = dispatcher.send_message("hello").await;

    mock.assert_hits(1);
    assert!(matches!(outcome, DispatchOutcome::Failed { .. }));
    assert!(outcome.notification().is_some());
    assert!(!dispatcher.is_in_flight());

    let session = dispatcher
        .active_session()
        .expect("load session")
        .expect("session exists");
    let mut view_modes = ViewModePreferences::new();
    let apology = session.messages.last().expect("apology stored");
    view_modes.toggle(&apology.id);

    let page = render_chat_page(&ChatPageContext {
        session_title: Some(session.title.clone()),
        signed_in_user: Some("analyst@example.com".to_string()),
        messages: session.messages.clone(),
        view_modes,
        banner: None,
        in_flight: false,
    });
    let apology_text = classify_stored_content(&apology.content).into_resolved().text;
    assert_eq!(apology_text, APOLOGY_TEXT);
    assert!(page.contains("Welcome to the spend assistant."));
    assert!(page.contains(r#"data-message-count="3""#));
}
