use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub const DEFAULT_WELCOME_TEXT: &str =
    "Hello! I'm your data assistant. Ask me anything about your accounts and spend.";

fn parse_non_empty(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("value must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Parser)]
#[command(
    name = "relay",
    about = "Chat relay for a remote analytics agent",
    version
)]
/// Public struct `Cli` used across relay components.
pub struct Cli {
    #[arg(
        long = "agent-endpoint",
        env = "RELAY_AGENT_ENDPOINT",
        value_parser = parse_non_empty,
        help = "Agent endpoint URL that receives one POST per user turn"
    )]
    pub agent_endpoint: String,

    #[arg(
        long = "api-key",
        env = "RELAY_AGENT_API_KEY",
        hide_env_values = true,
        help = "Value sent in the x-api-key header"
    )]
    pub api_key: String,

    #[arg(
        long = "user-id",
        env = "RELAY_USER_ID",
        default_value = "default-user",
        value_parser = parse_non_empty
    )]
    pub user_id: String,

    #[arg(long = "agent-id", env = "RELAY_AGENT_ID", value_parser = parse_non_empty)]
    pub agent_id: String,

    #[arg(
        long = "session-id",
        env = "RELAY_SESSION_ID",
        default_value = "default-session",
        value_parser = parse_non_empty
    )]
    pub session_id: String,

    #[arg(
        long = "session-store",
        env = "RELAY_SESSION_STORE",
        help = "JSONL file backing chat sessions; sessions stay in memory when unset"
    )]
    pub session_store: Option<PathBuf>,

    #[arg(
        long = "operator",
        env = "RELAY_OPERATOR",
        help = "Authenticated user id for the chat surface; signed out when unset"
    )]
    pub operator: Option<String>,

    #[arg(
        long = "welcome-text",
        env = "RELAY_WELCOME_TEXT",
        default_value = DEFAULT_WELCOME_TEXT
    )]
    pub welcome_text: String,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
/// Enumerates supported `CliCommand` values.
pub enum CliCommand {
    /// Serve the web chat.
    Serve {
        #[arg(long, env = "RELAY_BIND", default_value = "127.0.0.1:8787")]
        bind: String,
    },
    /// Send one message and print the reply text.
    Send {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        message: Vec<String>,
    },
}
