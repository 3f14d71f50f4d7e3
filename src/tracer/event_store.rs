//! Event storage with callbacks and filtering
//!
//! This module provides thread-safe storage for conversation events with support for an
//! on-store callback, filtering by predicate, and querying the most recent events.

use super::conversation_events::ConversationEvent;
use std::sync::{Arc, Mutex};

/// Type alias for event callback functions
pub type EventCallback = Arc<dyn Fn(&ConversationEvent) + Send + Sync>;

/// Store for capturing and querying conversation events
///
/// EventStore provides thread-safe storage with support for:
/// - Callbacks triggered on each stored event
/// - Filtering by custom predicates
/// - Query for last N events
pub struct EventStore {
    events: Arc<Mutex<Vec<ConversationEvent>>>,
    on_store_callback: Option<EventCallback>,
}

impl EventStore {
    /// Create a new event store
    ///
    /// # Arguments
    ///
    /// * `on_store_callback` - Optional callback function called whenever an event is stored
    pub fn new(on_store_callback: Option<EventCallback>) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            on_store_callback,
        }
    }

    /// Store an event, triggering the callback first if one is configured
    pub fn store(&self, event: ConversationEvent) {
        if let Some(callback) = &self.on_store_callback {
            callback(&event);
        }

        let mut events = self.events.lock().unwrap();
        events.push(event);
    }

    /// Count events matching an optional filter
    pub fn count_events(&self, filter_func: Option<&dyn Fn(&ConversationEvent) -> bool>) -> usize {
        let events = self.events.lock().unwrap();
        match filter_func {
            Some(filter) => events.iter().filter(|e| filter(*e)).count(),
            None => events.len(),
        }
    }

    /// Clone out the events matching an optional filter, oldest first
    pub fn get_events(
        &self,
        filter_func: Option<&dyn Fn(&ConversationEvent) -> bool>,
    ) -> Vec<ConversationEvent> {
        let events = self.events.lock().unwrap();
        events
            .iter()
            .filter(|e| filter_func.map_or(true, |filter| filter(*e)))
            .cloned()
            .collect()
    }

    /// Get the last N event summaries, optionally filtered
    pub fn get_last_n_summaries(
        &self,
        n: usize,
        filter_func: Option<&dyn Fn(&ConversationEvent) -> bool>,
    ) -> Vec<String> {
        let filtered = self.get_events(filter_func);
        let start_idx = filtered.len().saturating_sub(n);

        filtered[start_idx..].iter().map(ConversationEvent::printable_summary).collect()
    }

    /// Clear all events from the store
    pub fn clear(&self) {
        let mut events = self.events.lock().unwrap();
        events.clear();
    }

    /// Get the total number of events in the store
    pub fn len(&self) -> usize {
        let events = self.events.lock().unwrap();
        events.len()
    }

    /// Check if the event store is empty
    pub fn is_empty(&self) -> bool {
        let events = self.events.lock().unwrap();
        events.is_empty()
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracer::conversation_events::ConversationEventKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn failed_reply(session: &str) -> ConversationEvent {
        ConversationEvent::new(
            session,
            ConversationEventKind::ReplyFailed {
                error: "connection refused".to_string(),
            },
        )
    }

    #[test]
    fn test_store_event() {
        let store = EventStore::default();
        store.store(ConversationEvent::new("s-1", ConversationEventKind::SessionStarted));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_callback_triggered() {
        let callback_count = Arc::new(AtomicUsize::new(0));
        let callback_count_clone = Arc::clone(&callback_count);

        let callback: EventCallback = Arc::new(move |_event| {
            callback_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        let store = EventStore::new(Some(callback));
        store.store(failed_reply("s-1"));

        assert_eq!(callback_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_count_with_filter() {
        let store = EventStore::default();
        store.store(ConversationEvent::new("s-1", ConversationEventKind::SessionStarted));
        store.store(failed_reply("s-1"));
        store.store(failed_reply("s-1"));

        assert_eq!(store.count_events(None), 3);
        assert_eq!(store.count_events(Some(&|e: &ConversationEvent| e.is_failure())), 2);
    }

    #[test]
    fn test_last_n_summaries() {
        let store = EventStore::default();
        for i in 0..5 {
            store.store(ConversationEvent::new(
                format!("s-{}", i),
                ConversationEventKind::SessionReset,
            ));
        }

        let summaries = store.get_last_n_summaries(2, None);
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].contains("s-3"));
        assert!(summaries[1].contains("s-4"));

        assert_eq!(store.get_last_n_summaries(10, None).len(), 5);
    }

    #[test]
    fn test_clear() {
        let store = EventStore::default();
        store.store(failed_reply("s-1"));
        assert!(!store.is_empty());

        store.clear();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }
}
