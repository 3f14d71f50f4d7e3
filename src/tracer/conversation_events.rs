//! Event types recorded while a conversation runs
//!
//! Each event carries the session id as its correlation id, so every notification,
//! request and reveal step of one conversation can be pulled out of a shared store.

use crate::conversation::EntryId;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Why a reveal stopped before reaching the end of its text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The conversation was cleared
    Reset,
    /// A newer reply took over; the remaining text was written out at once
    Superseded,
}

/// What happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEventKind {
    SessionStarted,
    SessionStartFailed { error: String },
    SessionReset,
    SessionResetFailed { error: String },
    ReplyRequested { message: String },
    ReplyReceived { chars: usize, image_url: Option<String> },
    ReplyFailed { error: String },
    /// A reply resolved after the conversation it belonged to was reset
    ReplyDiscarded,
    RevealStarted { entry_id: EntryId, chars: usize },
    /// One more character is showing; `offset` counts the characters shown so far
    RevealTick { entry_id: EntryId, ch: char, offset: usize },
    RevealCompleted { entry_id: EntryId },
    RevealCancelled { entry_id: EntryId, reason: CancelReason },
}

/// A recorded conversation event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEvent {
    pub timestamp: DateTime<Utc>,
    /// Session id of the conversation that produced the event
    pub correlation_id: String,
    pub kind: ConversationEventKind,
}

impl ConversationEvent {
    pub fn new(correlation_id: impl Into<String>, kind: ConversationEventKind) -> Self {
        Self {
            timestamp: Utc::now(),
            correlation_id: correlation_id.into(),
            kind,
        }
    }

    /// Whether this event reports a failed remote call
    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            ConversationEventKind::SessionStartFailed { .. }
                | ConversationEventKind::SessionResetFailed { .. }
                | ConversationEventKind::ReplyFailed { .. }
        )
    }

    /// One-line human readable summary
    pub fn printable_summary(&self) -> String {
        let time_str = self.timestamp.with_timezone(&Local).format("%H:%M:%S%.3f");

        let detail = match &self.kind {
            ConversationEventKind::SessionStarted => "session started".to_string(),
            ConversationEventKind::SessionStartFailed { error } => {
                format!("session start failed: {}", error)
            }
            ConversationEventKind::SessionReset => "session reset".to_string(),
            ConversationEventKind::SessionResetFailed { error } => {
                format!("session reset failed: {}", error)
            }
            ConversationEventKind::ReplyRequested { message } => {
                format!("reply requested ({} chars)", message.chars().count())
            }
            ConversationEventKind::ReplyReceived { chars, image_url } => match image_url {
                Some(url) => format!("reply received ({} chars, image {})", chars, url),
                None => format!("reply received ({} chars)", chars),
            },
            ConversationEventKind::ReplyFailed { error } => format!("reply failed: {}", error),
            ConversationEventKind::ReplyDiscarded => "stale reply discarded".to_string(),
            ConversationEventKind::RevealStarted { entry_id, chars } => {
                format!("reveal of {} started ({} chars)", entry_id, chars)
            }
            ConversationEventKind::RevealTick { entry_id, offset, .. } => {
                format!("reveal of {} at {} chars", entry_id, offset)
            }
            ConversationEventKind::RevealCompleted { entry_id } => {
                format!("reveal of {} completed", entry_id)
            }
            ConversationEventKind::RevealCancelled { entry_id, reason } => {
                format!("reveal of {} cancelled ({:?})", entry_id, reason)
            }
        };

        format!("[{}] {} (correlation_id: {})", time_str, detail, self.correlation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_classification() {
        let failed = ConversationEvent::new(
            "s-1",
            ConversationEventKind::ReplyFailed {
                error: "HTTP error".to_string(),
            },
        );
        let ok = ConversationEvent::new("s-1", ConversationEventKind::SessionStarted);

        assert!(failed.is_failure());
        assert!(!ok.is_failure());
    }

    #[test]
    fn test_printable_summary_includes_correlation_id() {
        let event = ConversationEvent::new(
            "abc-123",
            ConversationEventKind::ReplyReceived {
                chars: 3,
                image_url: Some("http://x/y.png".to_string()),
            },
        );

        let summary = event.printable_summary();
        assert!(summary.contains("correlation_id: abc-123"));
        assert!(summary.contains("reply received (3 chars, image http://x/y.png)"));
    }

    #[test]
    fn test_kind_serialization_is_tagged() {
        let kind = ConversationEventKind::RevealCancelled {
            entry_id: EntryId::new(4),
            reason: CancelReason::Reset,
        };
        let json = serde_json::to_value(&kind).unwrap();

        assert_eq!(json["type"], "reveal_cancelled");
        assert_eq!(json["reason"], "reset");
        assert_eq!(json["entry_id"], 4);
    }

    #[test]
    fn test_reveal_tick_carries_only_the_new_character() {
        let event = ConversationEvent::new(
            "s-1",
            ConversationEventKind::RevealTick {
                entry_id: EntryId::new(2),
                ch: '₹',
                offset: 7,
            },
        );

        let json = serde_json::to_value(&event.kind).unwrap();
        assert_eq!(json, serde_json::json!({"type": "reveal_tick", "entry_id": 2, "ch": "₹", "offset": 7}));
        assert!(event.printable_summary().contains("reveal of entry#2 at 7 chars"));
    }
}
