//! Remote conversation service access.
//!
//! [`ChatGateway`] is the seam between the conversation logic and the network; the
//! [`HttpChatGateway`] implementation speaks the service's JSON protocol over `reqwest`.

pub mod gateway;
pub mod http;
pub mod models;

pub use gateway::ChatGateway;
pub use http::{ClientConfig, HttpChatGateway};
pub use models::{ChatReply, ChatRequest, ConversationMode, ResetRequest, SummaryParts};
