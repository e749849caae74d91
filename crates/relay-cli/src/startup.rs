use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use relay_agent::{AgentEndpointConfig, HttpAgentClient};
use relay_chat::{ChatDispatcher, DispatchOutcome, StaticAuthProvider};
use relay_render::classify_stored_content;
use relay_session::{ChatSessionStore, InMemoryChatSessionStore, JsonlChatSessionStore};
use relay_webchat::{run_webchat_server, WebchatState};
use tracing::info;

use crate::cli_args::{Cli, CliCommand};

pub fn build_endpoint_config(cli: &Cli) -> AgentEndpointConfig {
    AgentEndpointConfig {
        endpoint_url: cli.agent_endpoint.clone(),
        api_key: cli.api_key.clone(),
        user_id: cli.user_id.clone(),
        agent_id: cli.agent_id.clone(),
        session_id: cli.session_id.clone(),
    }
}

pub fn build_session_store(cli: &Cli) -> Result<Arc<dyn ChatSessionStore>> {
    match &cli.session_store {
        Some(path) => {
            let store = JsonlChatSessionStore::load(path)
                .with_context(|| format!("failed to open session store {}", path.display()))?;
            info!(path = %path.display(), "using jsonl session store");
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemoryChatSessionStore::new())),
    }
}

/// Wire the dispatcher; `operator` overrides the configured auth identity.
pub fn build_dispatcher(cli: &Cli, operator: Option<&str>) -> Result<ChatDispatcher> {
    let config = build_endpoint_config(cli);
    let transport =
        HttpAgentClient::new(&config).context("invalid agent endpoint configuration")?;
    let sessions = build_session_store(cli)?;
    let auth = StaticAuthProvider::from_operator(operator);
    Ok(
        ChatDispatcher::new(config, Arc::new(transport), sessions, Arc::new(auth))
            .with_welcome_text(cli.welcome_text.clone()),
    )
}

pub async fn run_cli(cli: Cli) -> Result<()> {
    match &cli.command {
        CliCommand::Serve { bind } => {
            let dispatcher = build_dispatcher(&cli, cli.operator.as_deref())?;
            let state = Arc::new(WebchatState::new(Arc::new(dispatcher)));
            run_webchat_server(bind, state).await
        }
        CliCommand::Send { message } => {
            let reply = run_send(&cli, &message.join(" ")).await?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{reply}").context("failed to write reply")?;
            Ok(())
        }
    }
}

/// One-shot dispatch. Signs in as `--operator`, or as `--user-id` when unset.
pub async fn run_send(cli: &Cli, message: &str) -> Result<String> {
    let operator = cli.operator.as_deref().unwrap_or(&cli.user_id);
    let dispatcher = build_dispatcher(cli, Some(operator))?;
    let outcome = dispatcher.send_message(message).await;
    if let DispatchOutcome::Failed { error, .. } = &outcome {
        eprintln!("agent request failed: {error}");
    }
    match outcome {
        DispatchOutcome::Skipped(reason) => bail!("message not sent: {}", reason.as_str()),
        DispatchOutcome::Aborted { notification } => bail!("{}", notification.message),
        DispatchOutcome::Replied {
            assistant_message, ..
        }
        | DispatchOutcome::Failed {
            assistant_message, ..
        } => Ok(classify_stored_content(&assistant_message.content)
            .into_resolved()
            .text),
    }
}
