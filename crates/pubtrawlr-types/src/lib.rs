//! Shared wire and domain types for the PubTrawlr search and chat backends.

pub mod api;
pub mod events;
pub mod models;

pub use api::InitResponse;
pub use events::PollStatus;
pub use models::{Chatroom, Identity};
