//! # Remote Collaborators
//!
//! The answering service and the conversation store, behind traits so the
//! core never sees HTTP. `http` holds the reqwest implementations.

pub mod http;
pub mod service;
pub mod types;

pub use http::{HttpAnsweringService, HttpConversationStore};
pub use service::{AnsweringService, ConversationStore, RemoteError};
pub use types::{SavedConversation, UserProfile};
