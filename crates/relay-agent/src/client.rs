use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::types::RelayAgentError;

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Process-wide agent endpoint settings, resolved once at startup.
pub struct AgentEndpointConfig {
    pub endpoint_url: String,
    pub api_key: String,
    pub user_id: String,
    pub agent_id: String,
    pub session_id: String,
}

impl AgentEndpointConfig {
    pub fn validate(&self) -> Result<(), RelayAgentError> {
        if self.api_key.trim().is_empty() {
            return Err(RelayAgentError::MissingApiKey);
        }
        let endpoint = self.endpoint_url.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(RelayAgentError::InvalidConfig(format!(
                "endpoint url must be http(s), got '{}'",
                self.endpoint_url
            )));
        }
        for (name, value) in [
            ("user_id", &self.user_id),
            ("agent_id", &self.agent_id),
            ("session_id", &self.session_id),
        ] {
            if value.trim().is_empty() {
                return Err(RelayAgentError::InvalidConfig(format!(
                    "{name} must not be empty"
                )));
            }
        }
        Ok(())
    }

    pub fn request_for(&self, message: impl Into<String>) -> AgentRequest {
        AgentRequest {
            user_id: self.user_id.clone(),
            agent_id: self.agent_id.clone(),
            session_id: self.session_id.clone(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// JSON body posted to the agent endpoint.
pub struct AgentRequest {
    pub user_id: String,
    pub agent_id: String,
    pub session_id: String,
    pub message: String,
}

#[async_trait]
/// Trait contract for `AgentTransport` behavior.
///
/// One call is one request: implementations must not retry.
pub trait AgentTransport: Send + Sync {
    async fn send(&self, request: &AgentRequest) -> Result<Value, RelayAgentError>;
}

#[derive(Debug, Clone)]
/// Public struct `HttpAgentClient` used across relay components.
pub struct HttpAgentClient {
    client: reqwest::Client,
    endpoint_url: String,
}

impl HttpAgentClient {
    pub fn new(config: &AgentEndpointConfig) -> Result<Self, RelayAgentError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(config.api_key.trim()).map_err(|e| {
                RelayAgentError::InvalidConfig(format!("invalid API key header: {e}"))
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint_url: config.endpoint_url.trim().to_string(),
        })
    }
}

#[async_trait]
impl AgentTransport for HttpAgentClient {
    async fn send(&self, request: &AgentRequest) -> Result<Value, RelayAgentError> {
        debug!(
            endpoint = %self.endpoint_url,
            agent_id = %request.agent_id,
            session_id = %request.session_id,
            "posting message to agent endpoint"
        );
        let response = self
            .client
            .post(&self.endpoint_url)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            return Err(RelayAgentError::HttpStatus {
                status: status.as_u16(),
                body: raw,
            });
        }

        Ok(serde_json::from_str(&raw)?)
    }
}
