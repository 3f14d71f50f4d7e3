//! Session identity and lifecycle notifications.
//!
//! A [`SessionController`] owns the single session id for the lifetime of a conversation
//! client. Starting a new conversation keeps the id and asks the service to forget what it
//! knew; a fresh id is never minted after construction.

use crate::client::ChatGateway;
use crate::error::Result;
use crate::tracer::{ConversationEvent, ConversationEventKind, EventStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Opaque token correlating client and server conversation state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new random session id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues session lifecycle notifications to the conversation service.
///
/// Both notifications are single best-effort calls. A failure is logged and recorded in the
/// event store, then handed back to the caller, who is free to ignore it; the session stays
/// usable either way.
pub struct SessionController {
    session_id: SessionId,
    gateway: Arc<dyn ChatGateway>,
    events: Option<Arc<EventStore>>,
}

impl SessionController {
    /// Create a controller with a freshly generated session id
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self::with_session_id(gateway, SessionId::generate())
    }

    /// Create a controller for a known session id
    pub fn with_session_id(gateway: Arc<dyn ChatGateway>, session_id: SessionId) -> Self {
        Self {
            session_id,
            gateway,
            events: None,
        }
    }

    /// Record lifecycle events into `store`
    pub fn with_event_store(mut self, store: Arc<EventStore>) -> Self {
        self.events = Some(store);
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Announce the session to the service, clearing anything it held under this id
    pub async fn start(&self) -> Result<()> {
        match self.gateway.reset(self.session_id.as_str()).await {
            Ok(()) => {
                info!("Session {} started", self.session_id);
                self.record(ConversationEventKind::SessionStarted);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to start session {}: {}", self.session_id, e);
                self.record(ConversationEventKind::SessionStartFailed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Ask the service to discard server-side state for the current session id
    pub async fn reset(&self) -> Result<()> {
        match self.gateway.reset(self.session_id.as_str()).await {
            Ok(()) => {
                info!("Session {} reset", self.session_id);
                self.record(ConversationEventKind::SessionReset);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to reset session {}: {}", self.session_id, e);
                self.record(ConversationEventKind::SessionResetFailed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    pub(crate) fn record(&self, kind: ConversationEventKind) {
        if let Some(store) = &self.events {
            store.store(ConversationEvent::new(self.session_id.as_str(), kind));
        }
    }

    pub(crate) fn gateway(&self) -> &Arc<dyn ChatGateway> {
        &self.gateway
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatReply;
    use crate::error::SpecBuddyError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ResetRecorder {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl ResetRecorder {
        fn new(fail: bool) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl ChatGateway for ResetRecorder {
        async fn reset(&self, session_id: &str) -> Result<()> {
            self.calls.lock().unwrap().push(session_id.to_string());
            if self.fail {
                return Err(SpecBuddyError::ApiError {
                    endpoint: "/reset".to_string(),
                    status: 500,
                });
            }
            Ok(())
        }

        async fn chat(&self, _message: &str, _session_id: &str) -> Result<ChatReply> {
            unreachable!("session controller never requests replies")
        }
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_session_id_serializes_as_string() {
        let id = SessionId::from("abc-123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc-123\"");
        assert_eq!(id.to_string(), "abc-123");
    }

    #[tokio::test]
    async fn test_start_notifies_service() {
        let gateway = Arc::new(ResetRecorder::new(false));
        let store = Arc::new(EventStore::default());
        let controller = SessionController::with_session_id(gateway.clone(), "s-1".into())
            .with_event_store(store.clone());

        controller.start().await.unwrap();

        assert_eq!(*gateway.calls.lock().unwrap(), vec!["s-1".to_string()]);
        let events = store.get_events(None);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ConversationEventKind::SessionStarted);
        assert_eq!(events[0].correlation_id, "s-1");
    }

    #[tokio::test]
    async fn test_start_failure_is_returned_and_recorded() {
        let gateway = Arc::new(ResetRecorder::new(true));
        let store = Arc::new(EventStore::default());
        let controller = SessionController::new(gateway).with_event_store(store.clone());

        let result = controller.start().await;

        assert!(matches!(result, Err(SpecBuddyError::ApiError { status: 500, .. })));
        assert_eq!(store.count_events(Some(&|e: &ConversationEvent| e.is_failure())), 1);
    }

    #[tokio::test]
    async fn test_reset_reuses_session_id() {
        let gateway = Arc::new(ResetRecorder::new(false));
        let controller = SessionController::new(gateway.clone());
        let id = controller.session_id().clone();

        controller.start().await.unwrap();
        controller.reset().await.unwrap();

        let calls = gateway.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c == id.as_str()));
        assert_eq!(controller.session_id(), &id);
    }
}
