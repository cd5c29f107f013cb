//! # Session Controller
//!
//! Owns the transcript and is the only thing allowed to change it.
//!
//! ```text
//! submit("Hello")
//!   │  Action::Submit ─▶ Pending entry ─▶ persist
//!   ▼
//! answer task (tokio, timeout) ──SessionEvent::AnswerReady──┐
//!                                                           ▼
//!                            Action::AnswerReceived ─▶ Streaming ─▶ persist
//!                                                           │
//! renderer task ──SessionEvent::Tick ×N, StreamDone─────────┘
//!                            Action::Reveal / Finish ─▶ persist each time
//! ```
//!
//! Background tasks never touch the transcript. They send `SessionEvent`s
//! into a channel the owner drains with [`SessionController::next_event`] /
//! [`SessionController::try_next_event`] and feeds back through
//! [`SessionController::apply`]. Every event carries the generation it was
//! started under; `reset()` and `resume()` bump the generation, so anything
//! still in the pipe from a cancelled exchange is dropped on arrival.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::history::HistoryStore;
use crate::core::reactions::{
    Clipboard, CopyTarget, Notification, ReactionState, ReactionTracker, SystemClipboard,
};
use crate::core::renderer::{AnswerRenderer, CancelHandle, DEFAULT_TYPING_INTERVAL};
use crate::core::transcript::Transcript;
use crate::remote::{AnsweringService, RemoteError, SavedConversation};

/// How long an answer may take before the exchange is marked Failed.
pub const DEFAULT_ANSWER_TIMEOUT: Duration = Duration::from_secs(60);

/// Tunables for a session.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub typing_interval: Duration,
    pub answer_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            typing_interval: DEFAULT_TYPING_INTERVAL,
            answer_timeout: DEFAULT_ANSWER_TIMEOUT,
        }
    }
}

impl SessionOptions {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            typing_interval: config.typing_interval,
            answer_timeout: config.answer_timeout,
        }
    }
}

/// Results reported by background tasks.
#[derive(Debug)]
pub enum SessionEvent {
    AnswerReady {
        generation: u64,
        index: usize,
        result: Result<String, RemoteError>,
    },
    Tick {
        generation: u64,
        index: usize,
        partial: String,
    },
    StreamDone {
        generation: u64,
        index: usize,
    },
}

impl SessionEvent {
    fn generation(&self) -> u64 {
        match self {
            SessionEvent::AnswerReady { generation, .. }
            | SessionEvent::Tick { generation, .. }
            | SessionEvent::StreamDone { generation, .. } => *generation,
        }
    }
}

pub struct SessionController {
    transcript: Transcript,
    reactions: ReactionTracker,
    history: Box<dyn HistoryStore>,
    answering: Arc<dyn AnsweringService>,
    renderer: AnswerRenderer,
    answer_timeout: Duration,
    generation: u64,
    active_request: Option<AbortHandle>,
    active_stream: Option<CancelHandle>,
    tx: UnboundedSender<SessionEvent>,
    rx: UnboundedReceiver<SessionEvent>,
}

impl SessionController {
    /// Builds a session, seeding the transcript from `history` if it holds anything.
    pub fn new(
        answering: Arc<dyn AnsweringService>,
        history: Box<dyn HistoryStore>,
        options: SessionOptions,
    ) -> Self {
        let transcript = match history.load() {
            Ok(Some(records)) => {
                info!("Restored {} entries from local history", records.len());
                Transcript::from_records(records)
            }
            Ok(None) => Transcript::new(),
            Err(e) => {
                warn!("Ignoring unreadable local history: {}", e);
                Transcript::new()
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            transcript,
            reactions: ReactionTracker::new(Box::new(SystemClipboard)),
            history,
            answering,
            renderer: AnswerRenderer::new(options.typing_interval),
            answer_timeout: options.answer_timeout,
            generation: 0,
            active_request: None,
            active_stream: None,
            tx,
            rx,
        }
    }

    /// Swaps the clipboard used by `copy`.
    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.reactions = ReactionTracker::new(clipboard);
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// True while an exchange is Pending or Streaming.
    pub fn is_busy(&self) -> bool {
        self.transcript.in_flight_index().is_some()
    }

    pub fn answering_service(&self) -> &str {
        self.answering.name()
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Asks a question. Returns false when ignored: blank text or an exchange
    /// already in flight.
    pub fn submit(&mut self, question: &str) -> bool {
        match self.dispatch(Action::Submit(question.to_string())) {
            Effect::RequestAnswer { index, question } => {
                self.spawn_answer(index, question);
                true
            }
            _ => {
                debug!("Submission ignored (blank or busy)");
                false
            }
        }
    }

    /// "New chat": cancels in-flight work, empties the transcript and the stored copy.
    pub fn reset(&mut self) {
        self.cancel_in_flight();
        self.reactions.clear();
        self.dispatch(Action::Reset);
        info!("Session reset");
    }

    /// Replaces the transcript with one finished exchange. Nothing is re-streamed.
    pub fn resume(&mut self, conversation: &SavedConversation) {
        self.cancel_in_flight();
        self.reactions.clear();
        self.dispatch(Action::Resume {
            question: conversation.question.clone(),
            answer: conversation.answer.clone(),
        });
        info!("Resumed conversation {}", conversation.id);
    }

    pub fn toggle_like(&mut self, index: usize) -> bool {
        self.reactions.toggle_like(&self.transcript, index)
    }

    pub fn toggle_dislike(&mut self, index: usize) -> bool {
        self.reactions.toggle_dislike(&self.transcript, index)
    }

    pub fn copy(&mut self, index: usize, which: CopyTarget) -> bool {
        self.reactions
            .copy(&self.transcript, index, which, Instant::now())
    }

    pub fn reaction(&self, index: usize) -> ReactionState {
        self.reactions.state(index)
    }

    pub fn notification(&mut self, now: Instant) -> Option<&Notification> {
        self.reactions.notification(now)
    }

    // ========================================================================
    // Event pump
    // ========================================================================

    /// Waits for the next background event.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }

    /// Returns a queued event without waiting.
    pub fn try_next_event(&mut self) -> Option<SessionEvent> {
        self.rx.try_recv().ok()
    }

    /// Applies every event until no exchange is in flight.
    pub async fn settle(&mut self) {
        while self.is_busy() {
            match self.rx.recv().await {
                Some(event) => self.apply(event),
                None => break,
            }
        }
    }

    /// Folds one background event into the transcript.
    pub fn apply(&mut self, event: SessionEvent) {
        if event.generation() != self.generation {
            debug!(
                "Dropping event from generation {} (current {})",
                event.generation(),
                self.generation
            );
            return;
        }

        match event {
            SessionEvent::AnswerReady {
                index,
                result: Ok(text),
                ..
            } => {
                self.active_request = None;
                if let Effect::StartStream { index, text } =
                    self.dispatch(Action::AnswerReceived { index, text })
                {
                    self.start_stream(index, &text);
                }
            }
            SessionEvent::AnswerReady {
                index,
                result: Err(e),
                ..
            } => {
                self.active_request = None;
                warn!("Answering failed for entry {}: {}", index, e);
                self.dispatch(Action::Fail { index });
            }
            SessionEvent::Tick { index, partial, .. } => {
                self.dispatch(Action::Reveal { index, partial });
            }
            SessionEvent::StreamDone { index, .. } => {
                self.active_stream = None;
                self.dispatch(Action::Finish { index });
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Runs the reducer and carries out its storage effect.
    fn dispatch(&mut self, action: Action) -> Effect {
        let effect = update(&mut self.transcript, action);
        match effect {
            Effect::None => {}
            Effect::ClearPersisted => {
                if let Err(e) = self.history.clear() {
                    warn!("Failed to clear local history: {}", e);
                }
            }
            Effect::Persist | Effect::RequestAnswer { .. } | Effect::StartStream { .. } => {
                self.persist();
            }
        }
        effect
    }

    fn persist(&mut self) {
        if let Err(e) = self.history.save(&self.transcript.to_records()) {
            warn!("Failed to save local history: {}", e);
        }
    }

    fn spawn_answer(&mut self, index: usize, question: String) {
        let service = Arc::clone(&self.answering);
        let tx = self.tx.clone();
        let generation = self.generation;
        let budget = self.answer_timeout;

        info!(
            "Requesting answer from {} for entry {}",
            service.name(),
            index
        );

        let call = tokio::spawn(async move {
            match tokio::time::timeout(budget, service.answer(&question)).await {
                Ok(result) => result,
                Err(_) => Err(RemoteError::Timeout(budget)),
            }
        });
        self.active_request = Some(call.abort_handle());

        // Always reports, including when the call panics
        tokio::spawn(async move {
            let result = match call.await {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => return,
                Err(e) => {
                    warn!("Answer task for entry {} died: {}", index, e);
                    Err(RemoteError::Internal(e.to_string()))
                }
            };
            if tx
                .send(SessionEvent::AnswerReady {
                    generation,
                    index,
                    result,
                })
                .is_err()
            {
                warn!("Failed to deliver answer for entry {}: session dropped", index);
            }
        });
    }

    fn start_stream(&mut self, index: usize, text: &str) {
        let tick_tx = self.tx.clone();
        let done_tx = self.tx.clone();
        let generation = self.generation;

        let handle = self.renderer.stream(
            text,
            move |partial| {
                let _ = tick_tx.send(SessionEvent::Tick {
                    generation,
                    index,
                    partial,
                });
            },
            move || {
                let _ = done_tx.send(SessionEvent::StreamDone { generation, index });
            },
        );
        self.active_stream = Some(handle);
    }

    fn cancel_in_flight(&mut self) {
        self.generation += 1;
        if let Some(stream) = self.active_stream.take() {
            stream.cancel();
        }
        if let Some(request) = self.active_request.take() {
            request.abort();
        }
    }
}
