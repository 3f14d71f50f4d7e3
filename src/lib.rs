pub mod client;
pub mod conversation;
pub mod error;
pub mod session;
pub mod suggestions;
pub mod tracer;

pub use error::{Result, SpecBuddyError};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::client::{ChatGateway, ChatReply, ClientConfig, ConversationMode, HttpChatGateway};
    pub use crate::conversation::{
        ConversationSnapshot, ConversationViewModel, EntryId, MessageEntry, SubmitOutcome,
    };
    pub use crate::error::{Result, SpecBuddyError};
    pub use crate::session::{SessionController, SessionId};
    pub use crate::suggestions::suggestion_rows;
    pub use crate::tracer::EventStore;
}
