//! Command-line entry points for the relay chat binary.
//!
//! `serve` hosts the web chat; `send` dispatches one message and prints the
//! reply text (or the apology when the agent call fails).
mod bootstrap_helpers;
mod cli_args;
mod startup;

pub use bootstrap_helpers::init_tracing;
pub use cli_args::{Cli, CliCommand, DEFAULT_WELCOME_TEXT};
pub use startup::{
    build_dispatcher, build_endpoint_config, build_session_store, run_cli, run_send,
};
