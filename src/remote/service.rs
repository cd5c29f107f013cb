use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use super::types::{SavedConversation, UserProfile};

/// Errors surfaced by the remote collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteError {
    /// Client misconfigured (bad URL, unusable cookie value).
    Config(String),
    /// Transport failure: DNS, connection refused, reset.
    Network(String),
    /// The session credentials were rejected (HTTP 401).
    Unauthorized,
    /// Any other non-success status.
    Api { status: u16, message: String },
    /// Body could not be decoded into the expected shape.
    Parse(String),
    /// No response within the configured budget.
    Timeout(Duration),
    /// The task running the call died before reporting.
    Internal(String),
}

impl RemoteError {
    /// True when the caller should route to sign-in instead of reporting.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, RemoteError::Unauthorized)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Config(msg) => write!(f, "config error: {msg}"),
            RemoteError::Network(msg) => write!(f, "network error: {msg}"),
            RemoteError::Unauthorized => write!(f, "unauthorized (HTTP 401)"),
            RemoteError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            RemoteError::Parse(msg) => write!(f, "parse error: {msg}"),
            RemoteError::Timeout(after) => {
                write!(f, "no response after {}s", after.as_secs())
            }
            RemoteError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Turns a question into a complete answer.
///
/// The transport is async but the answer arrives whole; incremental reveal
/// is the renderer's job, not the service's.
#[async_trait]
pub trait AnsweringService: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &str;

    async fn answer(&self, question: &str) -> Result<String, RemoteError>;
}

/// Server-held conversations for the signed-in identity.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Checks whether the ambient credentials are still accepted.
    async fn verify_session(&self) -> Result<(), RemoteError>;

    async fn list_conversations(&self) -> Result<Vec<SavedConversation>, RemoteError>;

    async fn delete_conversation(&self, id: &str) -> Result<(), RemoteError>;

    async fn delete_all_conversations(&self) -> Result<(), RemoteError>;

    async fn fetch_profile(&self, user_id: &str) -> Result<UserProfile, RemoteError>;
}
