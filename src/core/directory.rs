//! # Conversation Directory
//!
//! Local mirror of the conversations saved on the server, plus the delete
//! confirmation flow.
//!
//! The mirror only changes after the server agreed: a failed fetch keeps the
//! previous list, a failed delete keeps the entry and surfaces an alert.
//!
//! Every store call exists in two forms. The `async` methods await the store
//! directly. The `spawn_*` methods run it on a tokio task and report back as a
//! [`DirectoryEvent`], which the owner drains and folds in with
//! [`ConversationDirectory::apply`], so a UI loop never waits on the network.
//!
//! ```text
//!            request_delete / request_delete_all
//!   Idle ───────────────────────────────────────▶ ConfirmPending
//!    ▲                                                 │
//!    │◀──────────────── cancel() ──────────────────────┤
//!    │                                                 │ confirm()
//!    │◀────────── success / failure (alert) ─── Committing
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::core::session::SessionController;
use crate::remote::{ConversationStore, RemoteError, SavedConversation, UserProfile};

/// What a pending delete will remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationTarget {
    One(String),
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MutationState {
    #[default]
    Idle,
    ConfirmPending(MutationTarget),
    Committing(MutationTarget),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryError {
    /// Credentials were rejected; the caller routes to sign-in.
    SignInRequired,
    /// A delete is already awaiting confirmation or in progress.
    Busy,
    NothingToConfirm,
    DeleteFailed(RemoteError),
    DeleteAllFailed(RemoteError),
}

impl DirectoryError {
    /// Text for a blocking alert, if this error warrants one.
    pub fn alert(&self) -> Option<String> {
        match self {
            DirectoryError::DeleteFailed(_) | DirectoryError::DeleteAllFailed(_) => {
                Some(self.to_string())
            }
            _ => None,
        }
    }
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::SignInRequired => write!(f, "Please sign in to continue."),
            DirectoryError::Busy => write!(f, "Another delete is already in progress."),
            DirectoryError::NothingToConfirm => write!(f, "Nothing to confirm."),
            DirectoryError::DeleteFailed(_) => {
                write!(f, "Failed to delete conversation. Please try again.")
            }
            DirectoryError::DeleteAllFailed(_) => {
                write!(f, "Failed to delete all conversations. Please try again.")
            }
        }
    }
}

impl std::error::Error for DirectoryError {}

/// Results of store calls started by the `spawn_*` methods.
#[derive(Debug)]
pub enum DirectoryEvent {
    SessionChecked(Result<(), RemoteError>),
    Listed(Result<Vec<SavedConversation>, RemoteError>),
    ProfileLoaded(Result<UserProfile, RemoteError>),
    Committed {
        target: MutationTarget,
        result: Result<(), RemoteError>,
    },
}

pub struct ConversationDirectory {
    store: Arc<dyn ConversationStore>,
    conversations: Vec<SavedConversation>,
    state: MutationState,
    user_id: Option<String>,
    profile: UserProfile,
    listing: bool,
    in_flight: usize,
    tx: UnboundedSender<DirectoryEvent>,
    rx: UnboundedReceiver<DirectoryEvent>,
}

impl ConversationDirectory {
    pub fn new(store: Arc<dyn ConversationStore>, user_id: Option<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            store,
            conversations: Vec::new(),
            state: MutationState::Idle,
            user_id,
            profile: UserProfile::placeholder(),
            listing: false,
            in_flight: 0,
            tx,
            rx,
        }
    }

    /// The mirror as of the last successful fetch or delete.
    pub fn conversations(&self) -> &[SavedConversation] {
        &self.conversations
    }

    pub fn state(&self) -> &MutationState {
        &self.state
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// True while a spawned listing has not reported back.
    pub fn is_listing(&self) -> bool {
        self.listing
    }

    /// True while any spawned store call has not been applied.
    pub fn has_pending(&self) -> bool {
        self.in_flight > 0
    }

    /// Checks the ambient credentials. Only a rejection is an error.
    pub async fn verify_session(&self) -> Result<(), DirectoryError> {
        session_verdict(self.store.verify_session().await)
    }

    /// Refreshes the mirror from the server.
    pub async fn list(&mut self) -> Result<&[SavedConversation], DirectoryError> {
        let result = self.store.list_conversations().await;
        self.take_listing(result)?;
        Ok(&self.conversations)
    }

    /// Deletes one conversation on the server, then from the mirror.
    pub async fn delete_one(&mut self, id: &str) -> Result<(), DirectoryError> {
        let result = self.store.delete_conversation(id).await;
        self.finish_delete_one(id, result)
    }

    /// Deletes everything on the server, then empties the mirror and resets the session.
    pub async fn delete_all(
        &mut self,
        session: &mut SessionController,
    ) -> Result<(), DirectoryError> {
        let result = self.store.delete_all_conversations().await;
        self.finish_delete_all(result, session)
    }

    /// Makes `conversation` the whole transcript.
    pub fn select(&self, conversation: &SavedConversation, session: &mut SessionController) {
        session.resume(conversation);
    }

    /// Fetches the signed-in user's profile. Never fails: errors yield the placeholder.
    pub async fn refresh_user(&mut self) -> &UserProfile {
        let result = match &self.user_id {
            Some(user_id) => Some(self.store.fetch_profile(user_id).await),
            None => None,
        };
        self.take_profile(result);
        &self.profile
    }

    fn take_listing(
        &mut self,
        result: Result<Vec<SavedConversation>, RemoteError>,
    ) -> Result<(), DirectoryError> {
        match result {
            Ok(conversations) => {
                debug!("Mirror now holds {} conversations", conversations.len());
                self.conversations = conversations;
                Ok(())
            }
            Err(RemoteError::Unauthorized) => Err(DirectoryError::SignInRequired),
            Err(e) => {
                warn!("Failed to fetch conversations, keeping mirror: {}", e);
                Ok(())
            }
        }
    }

    fn take_profile(&mut self, result: Option<Result<UserProfile, RemoteError>>) {
        self.profile = match result {
            Some(Ok(profile)) => profile,
            Some(Err(e)) => {
                warn!("Failed to fetch profile for {:?}: {}", self.user_id, e);
                UserProfile::placeholder()
            }
            None => {
                debug!("No user id configured, using placeholder profile");
                UserProfile::placeholder()
            }
        };
    }

    fn finish_delete_one(
        &mut self,
        id: &str,
        result: Result<(), RemoteError>,
    ) -> Result<(), DirectoryError> {
        match result {
            Ok(()) => {
                self.conversations.retain(|c| c.id != id);
                debug!("Removed {} from mirror", id);
                Ok(())
            }
            Err(RemoteError::Unauthorized) => Err(DirectoryError::SignInRequired),
            Err(e) => {
                warn!("Failed to delete conversation {}: {}", id, e);
                Err(DirectoryError::DeleteFailed(e))
            }
        }
    }

    fn finish_delete_all(
        &mut self,
        result: Result<(), RemoteError>,
        session: &mut SessionController,
    ) -> Result<(), DirectoryError> {
        match result {
            Ok(()) => {
                self.conversations.clear();
                session.reset();
                debug!("Mirror cleared");
                Ok(())
            }
            Err(RemoteError::Unauthorized) => Err(DirectoryError::SignInRequired),
            Err(e) => {
                warn!("Failed to delete all conversations: {}", e);
                Err(DirectoryError::DeleteAllFailed(e))
            }
        }
    }

    // ========================================================================
    // Confirmation flow
    // ========================================================================

    pub fn request_delete(&mut self, id: &str) -> Result<(), DirectoryError> {
        self.request(MutationTarget::One(id.to_string()))
    }

    pub fn request_delete_all(&mut self) -> Result<(), DirectoryError> {
        self.request(MutationTarget::All)
    }

    fn request(&mut self, target: MutationTarget) -> Result<(), DirectoryError> {
        if self.state != MutationState::Idle {
            return Err(DirectoryError::Busy);
        }
        debug!("Awaiting confirmation for {:?}", target);
        self.state = MutationState::ConfirmPending(target);
        Ok(())
    }

    /// Drops a pending confirmation. No effect unless one is pending.
    pub fn cancel(&mut self) {
        if matches!(self.state, MutationState::ConfirmPending(_)) {
            self.state = MutationState::Idle;
        }
    }

    /// Carries out the pending delete. Always returns to `Idle`.
    pub async fn confirm(&mut self, session: &mut SessionController) -> Result<(), DirectoryError> {
        let target = self.begin_commit()?;
        let result = match &target {
            MutationTarget::One(id) => self.store.delete_conversation(id).await,
            MutationTarget::All => self.store.delete_all_conversations().await,
        };
        self.finish_commit(target, result, session)
    }

    fn begin_commit(&mut self) -> Result<MutationTarget, DirectoryError> {
        match std::mem::take(&mut self.state) {
            MutationState::ConfirmPending(target) => {
                self.state = MutationState::Committing(target.clone());
                Ok(target)
            }
            other => {
                self.state = other;
                Err(DirectoryError::NothingToConfirm)
            }
        }
    }

    fn finish_commit(
        &mut self,
        target: MutationTarget,
        result: Result<(), RemoteError>,
        session: &mut SessionController,
    ) -> Result<(), DirectoryError> {
        self.state = MutationState::Idle;
        match target {
            MutationTarget::One(id) => self.finish_delete_one(&id, result),
            MutationTarget::All => self.finish_delete_all(result, session),
        }
    }

    // ========================================================================
    // Background calls
    // ========================================================================

    pub fn spawn_verify_session(&mut self) {
        let store = Arc::clone(&self.store);
        self.spawn(
            async move { store.verify_session().await },
            DirectoryEvent::SessionChecked,
        );
    }

    /// Starts a listing unless one is already running.
    pub fn spawn_list(&mut self) {
        if self.listing {
            return;
        }
        self.listing = true;
        let store = Arc::clone(&self.store);
        self.spawn(
            async move { store.list_conversations().await },
            DirectoryEvent::Listed,
        );
    }

    /// Without a user id the placeholder is installed at once.
    pub fn spawn_refresh_user(&mut self) {
        let Some(user_id) = self.user_id.clone() else {
            self.take_profile(None);
            return;
        };
        let store = Arc::clone(&self.store);
        self.spawn(
            async move { store.fetch_profile(&user_id).await },
            DirectoryEvent::ProfileLoaded,
        );
    }

    /// Moves the pending delete to `Committing` and sends it to the store.
    /// The mirror is untouched until the matching `Committed` event is applied.
    pub fn spawn_confirm(&mut self) -> Result<(), DirectoryError> {
        let target = self.begin_commit()?;
        let store = Arc::clone(&self.store);
        let call_target = target.clone();
        self.spawn(
            async move {
                match &call_target {
                    MutationTarget::One(id) => store.delete_conversation(id).await,
                    MutationTarget::All => store.delete_all_conversations().await,
                }
            },
            move |result| DirectoryEvent::Committed { target, result },
        );
        Ok(())
    }

    /// Runs `call` on a task and queues its result. A panicking call still
    /// reports, as `RemoteError::Internal`.
    fn spawn<T, F, W>(&mut self, call: F, wrap: W)
    where
        T: Send + 'static,
        F: Future<Output = Result<T, RemoteError>> + Send + 'static,
        W: FnOnce(Result<T, RemoteError>) -> DirectoryEvent + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.tx.clone();
        let call = tokio::spawn(call);
        tokio::spawn(async move {
            let result = call
                .await
                .unwrap_or_else(|e| Err(RemoteError::Internal(e.to_string())));
            if tx.send(wrap(result)).is_err() {
                debug!("Directory dropped before a store call reported");
            }
        });
    }

    /// Waits for the next result, or returns `None` when nothing is in flight.
    pub async fn next_event(&mut self) -> Option<DirectoryEvent> {
        if self.in_flight == 0 {
            return None;
        }
        self.rx.recv().await
    }

    /// Returns a queued result without waiting.
    pub fn try_next_event(&mut self) -> Option<DirectoryEvent> {
        self.rx.try_recv().ok()
    }

    /// Folds one background result into the mirror, profile or mutation state.
    pub fn apply(
        &mut self,
        event: DirectoryEvent,
        session: &mut SessionController,
    ) -> Result<(), DirectoryError> {
        self.in_flight = self.in_flight.saturating_sub(1);
        match event {
            DirectoryEvent::SessionChecked(result) => session_verdict(result),
            DirectoryEvent::Listed(result) => {
                self.listing = false;
                self.take_listing(result)
            }
            DirectoryEvent::ProfileLoaded(result) => {
                self.take_profile(Some(result));
                Ok(())
            }
            DirectoryEvent::Committed { target, result } => {
                self.finish_commit(target, result, session)
            }
        }
    }
}

fn session_verdict(result: Result<(), RemoteError>) -> Result<(), DirectoryError> {
    match result {
        Ok(()) => Ok(()),
        Err(RemoteError::Unauthorized) => Err(DirectoryError::SignInRequired),
        Err(e) => {
            warn!("Session check failed, continuing: {}", e);
            Ok(())
        }
    }
}
