use serde::{Deserialize, Serialize};

/// Marker the server places after a finished requirements summary.
pub const SUMMARY_END_TOKEN: &str = "<END_OF_SPECS>";

/// Marker that introduces the follow-up question after a summary.
pub const FOLLOW_UP_TOKEN: &str = "<FOLLOW_UP>";

/// Which conversation endpoint the client talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationMode {
    /// Requirements collection (`/chat`)
    #[default]
    SpecBuddy,
    /// Sales coaching (`/sales_trainer`)
    SalesTrainer,
}

impl ConversationMode {
    /// Path of the reply endpoint for this mode
    pub fn endpoint(&self) -> &'static str {
        match self {
            ConversationMode::SpecBuddy => "/chat",
            ConversationMode::SalesTrainer => "/sales_trainer",
        }
    }
}

/// Body of a reply request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: session_id.into(),
        }
    }
}

/// Body of a session reset notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetRequest {
    pub session_id: String,
}

/// Reply returned by the conversation service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_query: Option<String>,
}

/// A summary reply split at its markers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryParts<'a> {
    pub summary: &'a str,
    pub follow_up: Option<&'a str>,
}

impl ChatReply {
    /// Create a plain text reply
    pub fn text(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            image_url: None,
            image_query: None,
        }
    }

    /// Attach an image reference to this reply
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Image URL, ignoring blank values the server sometimes sends
    pub fn image(&self) -> Option<&str> {
        self.image_url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }

    /// Split a final summary reply into the summary body and its follow-up question.
    ///
    /// Returns `None` for ordinary conversational replies, which carry no summary marker.
    pub fn summary_parts(&self) -> Option<SummaryParts<'_>> {
        let (summary, rest) = self.reply.split_once(SUMMARY_END_TOKEN)?;
        let follow_up = rest
            .split_once(FOLLOW_UP_TOKEN)
            .map(|(_, question)| question.trim())
            .filter(|question| !question.is_empty());

        Some(SummaryParts {
            summary: summary.trim(),
            follow_up,
        })
    }
}
