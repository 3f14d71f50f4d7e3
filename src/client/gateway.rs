use crate::client::models::ChatReply;
use crate::error::Result;
use async_trait::async_trait;

/// Abstract interface to the remote conversation service
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Ask the service to discard any state held for `session_id`
    async fn reset(&self, session_id: &str) -> Result<()>;

    /// Send a user message and wait for the reply
    async fn chat(&self, message: &str, session_id: &str) -> Result<ChatReply>;
}
