//! Wire and data model for the relay chat agent endpoint.
//!
//! Holds the persisted chat message record, the canonical agent reply with
//! its dashboard schema, the HTTP transport to the remote agent, and the
//! normalization routine that folds legacy reply shapes into the canonical
//! one.
mod client;
mod dashboard;
mod normalize;
mod types;

pub use client::{AgentEndpointConfig, AgentRequest, AgentTransport, HttpAgentClient};
pub use dashboard::{
    display_cell, AlertSpec, CardStatus, ChartData, ChartKind, ChartSpec, DashboardContent,
    SummaryCard, TableSpec,
};
pub use normalize::{
    decode_dashboard_value, normalize_agent_reply, normalize_agent_reply_with_source,
    ReplySource,
};
pub use types::{
    new_message_id, ChatMessage, MessageSender, NormalizedAgentReply, RelayAgentError,
    APOLOGY_TEXT, WELCOME_MESSAGE_ID,
};
