//! Conversation event tracing
//!
//! Remote lifecycle calls are best effort: their failures never interrupt the user. The tracer
//! gives those failures, and the progress of each reply reveal, a place to land that callers
//! and tests can query instead of scraping log output.
//!
//! # Usage Example
//!
//! ```rust,ignore
//! use specbuddy::tracer::EventStore;
//!
//! let store = Arc::new(EventStore::default());
//! let conversation = ConversationViewModel::builder(gateway).event_store(store.clone()).build();
//! conversation.start().await.ok();
//!
//! for line in store.get_last_n_summaries(10, None) {
//!     println!("{}", line);
//! }
//! ```

pub mod conversation_events;
pub mod event_store;

pub use conversation_events::{CancelReason, ConversationEvent, ConversationEventKind};
pub use event_store::{EventCallback, EventStore};
