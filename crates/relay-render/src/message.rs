use leptos::prelude::*;
use relay_agent::{ChatMessage, MessageSender};

use crate::content_shape::classify_stored_content;
use crate::dashboard::dashboard_view;
use crate::markdown::{render_markdown, RawHtml};
use crate::view_mode::ViewMode;

/// Form target that flips a message between text and dashboard.
pub fn view_toggle_path(message_id: &str) -> String {
    format!("/chat/messages/{message_id}/toggle")
}

/// Render one message as an HTML fragment.
///
/// Assistant content is classified on every call; the dashboard is shown
/// only when `view_mode` asks for it and the content carries one.
pub fn render_message(message: &ChatMessage, view_mode: ViewMode) -> String {
    message_view(message.clone(), view_mode, false).to_html()
}

pub(crate) fn message_view(
    message: ChatMessage,
    view_mode: ViewMode,
    with_toggle: bool,
) -> impl IntoView {
    let message_id = message.id.clone();
    let sender = message.sender.as_str();
    let created_at = message.created_at.to_rfc3339();

    let (body, shape, rendered_as, has_dashboard) = match message.sender {
        MessageSender::User => (
            view! { <p class="relay-user-text">{message.content}</p> }.into_any(),
            "user",
            "text",
            false,
        ),
        MessageSender::Assistant => {
            let shape = classify_stored_content(&message.content);
            let shape_name = shape.as_str();
            let resolved = shape.into_resolved();
            let has_dashboard = resolved.dashboard.is_some();
            match (view_mode, resolved.dashboard) {
                (ViewMode::Dashboard, Some(dashboard)) => (
                    dashboard_view(dashboard).into_any(),
                    shape_name,
                    "dashboard",
                    has_dashboard,
                ),
                _ => {
                    let raw_html = if resolved.allow_raw_html {
                        RawHtml::Allow
                    } else {
                        RawHtml::Escape
                    };
                    let html = render_markdown(&resolved.text, raw_html);
                    (
                        view! { <div class="relay-markdown" inner_html=html></div> }.into_any(),
                        shape_name,
                        "text",
                        has_dashboard,
                    )
                }
            }
        }
    };

    let toggle = (with_toggle && has_dashboard).then(|| {
        let action = view_toggle_path(&message_id);
        view! {
            <form class="relay-view-toggle" method="post" action=action>
                <button type="submit" data-view-mode=view_mode.as_str()>
                    {view_mode.toggle_label()}
                </button>
            </form>
        }
    });

    view! {
        <article
            class="relay-message"
            data-message-id=message_id
            data-sender=sender
            data-content-shape=shape
            data-rendered-as=rendered_as
            data-created-at=created_at
        >
            <div class="relay-message-body">{body}</div>
            {toggle}
        </article>
    }
}
