//! Full chat page: header, banner, transcript, and composer.
use leptos::prelude::*;
use relay_agent::ChatMessage;

use crate::message::message_view;
use crate::view_mode::ViewModePreferences;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Transient banner shown above the transcript.
pub struct ChatPageBanner {
    pub level: String,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Public struct `ChatPageContext` in `relay-render`.
pub struct ChatPageContext {
    pub session_title: Option<String>,
    pub signed_in_user: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub view_modes: ViewModePreferences,
    pub banner: Option<ChatPageBanner>,
    pub in_flight: bool,
}

const CHAT_PAGE_STYLE: &str = r#"
    :root { color-scheme: light; font-family: "IBM Plex Sans", "Segoe UI", sans-serif; }
    body { margin: 0; background: #f4f6f8; color: #13232f; }
    .relay-shell { max-width: 980px; margin: 0 auto; padding: 1.5rem; }
    .relay-header { display: flex; justify-content: space-between; align-items: baseline; }
    .relay-banner { border-radius: 8px; padding: 0.75rem 1rem; margin: 1rem 0; }
    .relay-banner[data-level="error"] { background: #fee2e2; color: #7f1d1d; }
    .relay-banner[data-level="info"] { background: #dbeafe; color: #1e3a8a; }
    .relay-transcript { display: flex; flex-direction: column; gap: 0.75rem; }
    .relay-message { background: #fff; border-radius: 10px; padding: 0.75rem 1rem; box-shadow: 0 1px 2px rgba(0,0,0,0.08); }
    .relay-message[data-sender="user"] { align-self: flex-end; background: #1d4ed8; color: #fff; max-width: 75%; }
    .relay-user-text { white-space: pre-wrap; margin: 0; }
    .relay-markdown table { border-collapse: collapse; }
    .relay-markdown th, .relay-markdown td, .relay-table th, .relay-table td { border: 1px solid #d0d7de; padding: 0.25rem 0.5rem; }
    .relay-summary-cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(180px, 1fr)); gap: 0.75rem; }
    .relay-summary-card { border: 1px solid #e5e7eb; border-radius: 8px; padding: 0.75rem; }
    .relay-summary-card[data-status="positive"] .relay-summary-card-value { color: #15803d; }
    .relay-summary-card[data-status="negative"] .relay-summary-card-value { color: #b91c1c; }
    .relay-summary-card-value { font-size: 1.5rem; font-weight: 600; margin: 0.25rem 0; }
    .relay-chart-card { border: 1px solid #e5e7eb; border-radius: 8px; padding: 0.75rem; margin-top: 0.75rem; }
    .relay-bar-chart-plot { position: relative; display: flex; align-items: flex-end; gap: 0.5rem; height: 220px; padding-bottom: 1.5rem; }
    .relay-bar-grid-line { position: absolute; left: 0; right: 0; border-top: 1px dashed #d0d7de; }
    .relay-bar-grid-tick { position: absolute; left: -2.5rem; top: -0.6rem; font-size: 0.7rem; color: #6b7280; }
    .relay-bar { position: relative; flex: 1; height: 100%; display: flex; flex-direction: column; justify-content: flex-end; }
    .relay-bar-fill { background: #2563eb; border-radius: 4px 4px 0 0; }
    .relay-bar:hover .relay-bar-fill { background: #1e40af; }
    .relay-bar-label { position: absolute; bottom: -1.4rem; width: 100%; text-align: center; font-size: 0.75rem; }
    .relay-pie-chart { display: flex; gap: 1rem; align-items: center; }
    .relay-pie { width: 180px; height: 180px; border-radius: 50%; }
    .relay-pie-legend { list-style: none; padding: 0; }
    .relay-pie-swatch { display: inline-block; width: 0.75rem; height: 0.75rem; margin-right: 0.4rem; border-radius: 2px; }
    .relay-alert { border-radius: 6px; padding: 0.5rem 0.75rem; margin-top: 0.5rem; background: #eff6ff; }
    .relay-alert[data-severity="destructive"] { background: #fee2e2; color: #7f1d1d; }
    .relay-recommendations ul { list-style: none; padding-left: 0; }
    .relay-check { color: #15803d; margin-right: 0.4rem; }
    .relay-view-toggle { margin-top: 0.5rem; }
    .relay-composer { display: flex; gap: 0.5rem; margin-top: 1rem; }
    .relay-composer textarea { flex: 1; min-height: 3rem; }
"#;

/// Render the complete chat page document.
pub fn render_chat_page(context: &ChatPageContext) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Relay Chat</title>
  <style>{CHAT_PAGE_STYLE}</style>
</head>
<body>
{}
</body>
</html>
"#,
        render_chat_transcript(context)
    )
}

/// Render the page body without the document wrapper.
pub fn render_chat_transcript(context: &ChatPageContext) -> String {
    let context = context.clone();
    let session_title = context
        .session_title
        .clone()
        .unwrap_or_else(|| "New chat".to_string());
    let message_count = context.messages.len().to_string();
    let in_flight = if context.in_flight { "true" } else { "false" };

    let banner = context.banner.clone().map(|banner| {
        view! {
            <div id="relay-banner" class="relay-banner" role="status" data-level=banner.level>
                <strong>{banner.title}</strong>
                " "
                <span>{banner.message}</span>
            </div>
        }
    });

    let view_modes = context.view_modes.clone();
    let messages = context
        .messages
        .into_iter()
        .map(|message| {
            let mode = view_modes.mode_for(&message.id);
            message_view(message, mode, true)
        })
        .collect_view();

    let composer = match context.signed_in_user.clone() {
        Some(user) => view! {
            <section id="relay-composer-shell" data-signed-in-user=user>
                <form id="relay-composer" class="relay-composer" method="post" action="/chat/send">
                    <textarea
                        id="relay-composer-input"
                        name="message"
                        placeholder="Ask the agent about your data..."
                    ></textarea>
                    <button id="relay-composer-send" type="submit">
                        "Send"
                    </button>
                </form>
                <form id="relay-clear" method="post" action="/chat/clear">
                    <button type="submit">"Clear chat"</button>
                </form>
                <form id="relay-new-session" method="post" action="/chat/new">
                    <button type="submit">"New chat"</button>
                </form>
            </section>
        }
        .into_any(),
        None => view! {
            <p id="relay-signed-out" class="relay-banner" data-level="info">
                "Sign in to start chatting."
            </p>
        }
        .into_any(),
    };

    let pending = context.in_flight.then(|| {
        view! { <p id="relay-pending" aria-live="polite">"The agent is responding..."</p> }
    });

    view! {
        <div id="relay-shell" class="relay-shell" data-in-flight=in_flight>
            <header class="relay-header">
                <h1>"Relay Chat"</h1>
                <p id="relay-session-title">{session_title}</p>
            </header>
            {banner}
            <main id="relay-transcript" class="relay-transcript" data-message-count=message_count>
                {messages}
            </main>
            {pending}
            {composer}
        </div>
    }
    .to_html()
}
