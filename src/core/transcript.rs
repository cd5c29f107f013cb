//! # Transcript
//!
//! The ordered question/answer log of the active session.
//!
//! ```text
//! Pending ──▶ Streaming ──▶ Complete
//!    │
//!    └──────▶ Failed
//! ```
//!
//! At most one entry is ever Pending or Streaming. Entries are never removed
//! one at a time: the whole transcript is cleared or replaced.

use serde::{Deserialize, Serialize};

use crate::core::history::HistoryRecord;

/// Answer text shown when the answering service fails.
pub const ANSWER_FAILURE_MESSAGE: &str = "Error fetching data. Please try again.";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Question sent, waiting for the answering service.
    Pending,
    /// Answer known, reveal in progress.
    Streaming,
    Complete,
    Failed,
}

impl EntryStatus {
    /// Pending or Streaming.
    pub fn is_in_flight(self) -> bool {
        matches!(self, EntryStatus::Pending | EntryStatus::Streaming)
    }
}

/// One exchange. Fields are private so only the transitions below can mutate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    question: String,
    answer: String,
    status: EntryStatus,
}

impl TranscriptEntry {
    pub fn pending(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: String::new(),
            status: EntryStatus::Pending,
        }
    }

    pub fn complete(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            status: EntryStatus::Complete,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&TranscriptEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the single Pending/Streaming entry, if any.
    pub fn in_flight_index(&self) -> Option<usize> {
        self.entries.iter().position(|e| e.status.is_in_flight())
    }

    /// Appends a Pending entry. Refused while another exchange is in flight.
    pub(crate) fn push_pending(&mut self, question: &str) -> Option<usize> {
        if self.in_flight_index().is_some() {
            return None;
        }
        self.entries.push(TranscriptEntry::pending(question));
        Some(self.entries.len() - 1)
    }

    /// Pending → Streaming.
    pub(crate) fn begin_streaming(&mut self, index: usize) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) if entry.status == EntryStatus::Pending => {
                entry.status = EntryStatus::Streaming;
                true
            }
            _ => false,
        }
    }

    /// Replaces the visible answer of a Streaming entry with a longer prefix.
    /// Shorter or diverging prefixes are ignored so the answer only ever grows.
    pub(crate) fn reveal(&mut self, index: usize, partial: &str) -> bool {
        match self.entries.get_mut(index) {
            Some(entry)
                if entry.status == EntryStatus::Streaming
                    && partial.len() > entry.answer.len()
                    && partial.starts_with(entry.answer.as_str()) =>
            {
                entry.answer.clear();
                entry.answer.push_str(partial);
                true
            }
            _ => false,
        }
    }

    /// Streaming → Complete.
    pub(crate) fn complete(&mut self, index: usize) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) if entry.status == EntryStatus::Streaming => {
                entry.status = EntryStatus::Complete;
                true
            }
            _ => false,
        }
    }

    /// Pending/Streaming → Failed, with the fixed failure text.
    pub(crate) fn fail(&mut self, index: usize) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) if entry.status.is_in_flight() => {
                entry.answer = ANSWER_FAILURE_MESSAGE.to_string();
                entry.status = EntryStatus::Failed;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn replace(&mut self, entries: Vec<TranscriptEntry>) {
        self.entries = entries;
    }

    /// The persisted shape: question/answer pairs without status.
    pub fn to_records(&self) -> Vec<HistoryRecord> {
        self.entries
            .iter()
            .map(|e| HistoryRecord {
                question: e.question.clone(),
                answer: e.answer.clone(),
            })
            .collect()
    }

    /// Rebuilds a transcript from persisted pairs. Nothing restored is in flight:
    /// entries carrying the failure text come back Failed, the rest Complete.
    pub fn from_records(records: Vec<HistoryRecord>) -> Self {
        let entries = records
            .into_iter()
            .map(|r| {
                let status = if r.answer == ANSWER_FAILURE_MESSAGE {
                    EntryStatus::Failed
                } else {
                    EntryStatus::Complete
                };
                TranscriptEntry {
                    question: r.question,
                    answer: r.answer,
                    status,
                }
            })
            .collect();
        Self { entries }
    }
}
