//! Leptos SSR rendering for relay chat messages and reply dashboards.
//!
//! Assistant messages are stored as serialized replies; rendering re-derives
//! their shape every time and picks markdown or dashboard output from the
//! caller-held view mode.
mod content_shape;
mod dashboard;
mod markdown;
mod message;
mod transcript;
mod view_mode;

pub use content_shape::{classify_stored_content, ResolvedContent, StoredContentShape};
pub use dashboard::{
    chart_points, display_alert, render_dashboard, AlertSeverity, ChartPoint, DisplayAlert,
    CHART_PALETTE,
};
pub use markdown::{render_markdown, RawHtml};
pub use message::{render_message, view_toggle_path};
pub use transcript::{render_chat_page, render_chat_transcript, ChatPageBanner, ChatPageContext};
pub use view_mode::{ViewMode, ViewModePreferences};
