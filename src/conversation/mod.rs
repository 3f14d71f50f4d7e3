//! Conversation history and the reply reveal.

pub mod entry;
pub mod reveal;
pub mod view_model;

pub use entry::{Entry, EntryId, EntryList, MessageEntry};
pub use reveal::{RevealHandle, RevealState, TickOutcome};
pub use view_model::{
    ConversationConfig, ConversationSnapshot, ConversationViewModel, ConversationViewModelBuilder,
    SubmitOutcome, DEFAULT_FALLBACK_MESSAGE,
};
