//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};

use crate::core::reactions::Clipboard;
use crate::remote::{
    AnsweringService, ConversationStore, RemoteError, SavedConversation, UserProfile,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Answering service
// ============================================================================

/// Returns a fixed reply (or error), optionally holding each call until released.
pub struct ScriptedAnsweringService {
    reply: Result<String, RemoteError>,
    gate: Option<Arc<Notify>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedAnsweringService {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            gate: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(error: RemoteError) -> Self {
        Self {
            reply: Err(error),
            gate: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Each call waits for `gate().notify_one()` before answering.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn gate(&self) -> Arc<Notify> {
        self.gate.clone().unwrap_or_else(|| Arc::new(Notify::new()))
    }

    /// Shared counter of `answer` calls.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl AnsweringService for ScriptedAnsweringService {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn answer(&self, _question: &str) -> Result<String, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.reply.clone()
    }
}

// ============================================================================
// Conversation store
// ============================================================================

#[derive(Debug)]
struct StoreState {
    conversations: Vec<SavedConversation>,
    profile: UserProfile,
    failure: Option<RemoteError>,
    gate: Option<Arc<Semaphore>>,
}

/// In-memory conversation store. Clones share state, so a test can flip
/// `fail_with` after handing one clone to the directory.
#[derive(Clone, Debug)]
pub struct FakeConversationStore {
    state: Arc<Mutex<StoreState>>,
}

impl Default for FakeConversationStore {
    fn default() -> Self {
        Self::with(Vec::new())
    }
}

impl FakeConversationStore {
    pub fn with(conversations: Vec<SavedConversation>) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                conversations,
                profile: UserProfile::placeholder(),
                failure: None,
                gate: None,
            })),
        }
    }

    /// Starts out holding every call until `release()`.
    pub fn gated(self) -> Self {
        self.hold();
        self
    }

    /// Calls made from now on block until `release()`.
    pub fn hold(&self) {
        lock(&self.state).gate = Some(Arc::new(Semaphore::new(0)));
    }

    /// Lets every held and future call through.
    pub fn release(&self) {
        if let Some(gate) = lock(&self.state).gate.take() {
            gate.close();
        }
    }

    async fn pass_gate(&self) {
        let gate = lock(&self.state).gate.clone();
        if let Some(gate) = gate {
            // Closing the semaphore is the release signal
            let _ = gate.acquire().await;
        }
    }

    pub fn with_profile(self, profile: UserProfile) -> Self {
        lock(&self.state).profile = profile;
        self
    }

    /// Every later call returns `error`.
    pub fn fail_with(&self, error: RemoteError) {
        lock(&self.state).failure = Some(error);
    }

    fn check(&self) -> Result<MutexGuard<'_, StoreState>, RemoteError> {
        let state = lock(&self.state);
        match &state.failure {
            Some(e) => Err(e.clone()),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl ConversationStore for FakeConversationStore {
    async fn verify_session(&self) -> Result<(), RemoteError> {
        self.pass_gate().await;
        self.check().map(|_| ())
    }

    async fn list_conversations(&self) -> Result<Vec<SavedConversation>, RemoteError> {
        self.pass_gate().await;
        Ok(self.check()?.conversations.clone())
    }

    async fn delete_conversation(&self, id: &str) -> Result<(), RemoteError> {
        self.pass_gate().await;
        self.check()?.conversations.retain(|c| c.id != id);
        Ok(())
    }

    async fn delete_all_conversations(&self) -> Result<(), RemoteError> {
        self.pass_gate().await;
        self.check()?.conversations.clear();
        Ok(())
    }

    async fn fetch_profile(&self, _user_id: &str) -> Result<UserProfile, RemoteError> {
        self.pass_gate().await;
        Ok(self.check()?.profile.clone())
    }
}

// ============================================================================
// Clipboard
// ============================================================================

/// Records every copy. Clones share the record.
#[derive(Clone, Default, Debug)]
pub struct RecordingClipboard {
    copied: Arc<Mutex<Vec<String>>>,
    broken: bool,
}

impl RecordingClipboard {
    /// A clipboard whose every write fails.
    pub fn failing() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Vec<String> {
        lock(&self.copied).clone()
    }
}

impl Clipboard for RecordingClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), String> {
        if self.broken {
            return Err("clipboard unavailable".to_string());
        }
        lock(&self.copied).push(text.to_string());
        Ok(())
    }
}
