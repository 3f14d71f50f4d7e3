use crate::client::gateway::ChatGateway;
use crate::client::models::{ChatReply, ChatRequest, ConversationMode, ResetRequest};
use crate::error::{Result, SpecBuddyError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_HOST: &str = "http://localhost:8000";

/// Configuration for connecting to the conversation service
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub timeout: Option<Duration>,
    pub headers: HashMap<String, String>,
    pub mode: ConversationMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("SPECBUDDY_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            timeout: None,
            headers: HashMap::new(),
            mode: ConversationMode::default(),
        }
    }
}

impl ClientConfig {
    /// Build a configuration from the environment.
    ///
    /// Reads `SPECBUDDY_HOST` and `SPECBUDDY_TIMEOUT_SECS`; an unparsable timeout is a
    /// configuration error rather than being silently ignored.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("SPECBUDDY_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                SpecBuddyError::ConfigError(format!("SPECBUDDY_TIMEOUT_SECS is not a number: {}", raw))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Use a different service address
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Select the conversation endpoint
    pub fn with_mode(mut self, mode: ConversationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Abort requests that take longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send an extra header with every request
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host.trim_end_matches('/'), path)
    }
}

/// Gateway for the SpecBuddy HTTP service
///
/// Talks JSON to `POST /reset` and to the mode's reply endpoint (`/chat` or
/// `/sales_trainer`). Any non-success status is reported as an [`SpecBuddyError::ApiError`].
pub struct HttpChatGateway {
    client: Client,
    config: ClientConfig,
}

impl HttpChatGateway {
    /// Create a gateway with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a gateway with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if !config.headers.is_empty() {
            client_builder = client_builder.default_headers(build_headers(&config.headers)?);
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }

    /// Create gateway with custom host
    pub fn with_host(host: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::default().with_host(host))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

fn build_headers(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| SpecBuddyError::ConfigError(format!("invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| SpecBuddyError::ConfigError(format!("invalid header value: {}", e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn reset(&self, session_id: &str) -> Result<()> {
        info!("Resetting remote session");
        debug!("Session id: {}", session_id);

        let response = self
            .client
            .post(self.config.url("/reset"))
            .json(&ResetRequest {
                session_id: session_id.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Reset rejected with status {}", response.status());
            return Err(SpecBuddyError::ApiError {
                endpoint: "/reset".to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }

    async fn chat(&self, message: &str, session_id: &str) -> Result<ChatReply> {
        let endpoint = self.config.mode.endpoint();
        info!("Requesting reply from {}", endpoint);
        debug!("Session id: {}, message length: {}", session_id, message.len());

        let response = self
            .client
            .post(self.config.url(endpoint))
            .json(&ChatRequest::new(message, session_id))
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("{} failed with status {}", endpoint, response.status());
            return Err(SpecBuddyError::ApiError {
                endpoint: endpoint.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        let reply: ChatReply = serde_json::from_str(&body)?;

        debug!("Reply length: {}, image: {}", reply.reply.len(), reply.image().is_some());
        Ok(reply)
    }
}
