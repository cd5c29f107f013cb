//! # Actions
//!
//! Every transcript change is an `Action`. The user asks something? That's
//! `Action::Submit`. The answer arrives? `Action::AnswerReceived`. One more
//! character revealed? `Action::Reveal`.
//!
//! `update()` applies an action to the transcript and returns the `Effect`
//! the caller must carry out. No I/O happens here.
//!
//! ```text
//! Transcript + Action  →  update()  →  Transcript' + Effect
//! ```

use log::debug;

use crate::core::transcript::{Transcript, TranscriptEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A question from the user or a suggestion.
    Submit(String),
    /// The answering service returned the full text for `index`.
    AnswerReceived { index: usize, text: String },
    /// The renderer revealed a longer prefix.
    Reveal { index: usize, partial: String },
    /// The renderer finished revealing.
    Finish { index: usize },
    /// The answering service failed.
    Fail { index: usize },
    /// "New chat": drop everything.
    Reset,
    /// Load a saved exchange as the whole transcript.
    Resume { question: String, answer: String },
}

/// What the caller does after `update()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Nothing changed.
    None,
    /// Transcript changed; write it through to storage.
    Persist,
    /// A pending entry was appended: persist, then ask the answering service.
    RequestAnswer { index: usize, question: String },
    /// Entry is now Streaming: persist, then start revealing `text`.
    StartStream { index: usize, text: String },
    /// Transcript emptied: remove the stored copy.
    ClearPersisted,
}

pub fn update(transcript: &mut Transcript, action: Action) -> Effect {
    debug!("Action: {:?}", action);
    match action {
        Action::Submit(question) => {
            if question.trim().is_empty() {
                return Effect::None;
            }
            match transcript.push_pending(&question) {
                Some(index) => Effect::RequestAnswer { index, question },
                None => Effect::None,
            }
        }
        Action::AnswerReceived { index, text } => {
            if transcript.begin_streaming(index) {
                Effect::StartStream { index, text }
            } else {
                Effect::None
            }
        }
        Action::Reveal { index, partial } => {
            if transcript.reveal(index, &partial) {
                Effect::Persist
            } else {
                Effect::None
            }
        }
        Action::Finish { index } => {
            if transcript.complete(index) {
                Effect::Persist
            } else {
                Effect::None
            }
        }
        Action::Fail { index } => {
            if transcript.fail(index) {
                Effect::Persist
            } else {
                Effect::None
            }
        }
        Action::Reset => {
            transcript.clear();
            Effect::ClearPersisted
        }
        Action::Resume { question, answer } => {
            transcript.replace(vec![TranscriptEntry::complete(question, answer)]);
            Effect::Persist
        }
    }
}
