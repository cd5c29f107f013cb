//! # Reactions
//!
//! Like/dislike flags and copy-to-clipboard for transcript entries.
//!
//! Flags live only as long as the in-memory transcript and are keyed by entry
//! index, so the session clears them whenever the transcript is replaced.
//! Nothing here reacts to an entry that is still Pending or Streaming.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::core::transcript::Transcript;

/// How long the copy confirmation stays visible.
pub const NOTIFICATION_TTL: Duration = Duration::from_millis(1500);

pub const COPY_CONFIRMATION: &str = "Text copied to clipboard successfully!";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReactionState {
    pub liked: bool,
    pub disliked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTarget {
    Question,
    Answer,
}

/// Destination for copied text.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), String>;
}

/// The OS clipboard via `arboard`. A handle is opened per copy.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), String> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| e.to_string())?;
        clipboard.set_text(text).map_err(|e| e.to_string())
    }
}

/// A transient confirmation toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub expires_at: Instant,
}

pub struct ReactionTracker {
    states: HashMap<usize, ReactionState>,
    clipboard: Box<dyn Clipboard>,
    notification: Option<Notification>,
}

impl ReactionTracker {
    pub fn new(clipboard: Box<dyn Clipboard>) -> Self {
        Self {
            states: HashMap::new(),
            clipboard,
            notification: None,
        }
    }

    /// Current flags for an entry (both false if never touched).
    pub fn state(&self, index: usize) -> ReactionState {
        self.states.get(&index).copied().unwrap_or_default()
    }

    pub fn toggle_like(&mut self, transcript: &Transcript, index: usize) -> bool {
        if !is_settled(transcript, index) {
            return false;
        }
        let state = self.states.entry(index).or_default();
        state.liked = !state.liked;
        if state.liked {
            state.disliked = false;
        }
        debug!("Entry {} reaction: {:?}", index, state);
        true
    }

    pub fn toggle_dislike(&mut self, transcript: &Transcript, index: usize) -> bool {
        if !is_settled(transcript, index) {
            return false;
        }
        let state = self.states.entry(index).or_default();
        state.disliked = !state.disliked;
        if state.disliked {
            state.liked = false;
        }
        debug!("Entry {} reaction: {:?}", index, state);
        true
    }

    /// Copies the entry's question or answer and raises the confirmation toast.
    pub fn copy(
        &mut self,
        transcript: &Transcript,
        index: usize,
        which: CopyTarget,
        now: Instant,
    ) -> bool {
        if !is_settled(transcript, index) {
            return false;
        }
        let Some(entry) = transcript.get(index) else {
            return false;
        };
        let text = match which {
            CopyTarget::Question => entry.question(),
            CopyTarget::Answer => entry.answer(),
        };
        if let Err(e) = self.clipboard.set_text(text) {
            warn!("Clipboard write failed: {}", e);
            return false;
        }
        self.notification = Some(Notification {
            text: COPY_CONFIRMATION.to_string(),
            expires_at: now + NOTIFICATION_TTL,
        });
        true
    }

    /// The live toast, dropping it once expired.
    pub fn notification(&mut self, now: Instant) -> Option<&Notification> {
        if self
            .notification
            .as_ref()
            .is_some_and(|n| now >= n.expires_at)
        {
            self.notification = None;
        }
        self.notification.as_ref()
    }

    /// Forgets every flag; called when the transcript is replaced or reset.
    pub fn clear(&mut self) {
        self.states.clear();
    }
}

/// Reactions only apply to existing entries that are no longer in flight.
fn is_settled(transcript: &Transcript, index: usize) -> bool {
    transcript
        .get(index)
        .is_some_and(|entry| !entry.status().is_in_flight())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transcript::TranscriptEntry;
    use crate::test_support::RecordingClipboard;

    fn settled_transcript() -> Transcript {
        let mut t = Transcript::new();
        t.replace(vec![
            TranscriptEntry::complete("Q1", "A1"),
            TranscriptEntry::complete("Q2", "A2"),
        ]);
        t
    }

    fn tracker() -> (ReactionTracker, RecordingClipboard) {
        let clipboard = RecordingClipboard::default();
        (ReactionTracker::new(Box::new(clipboard.clone())), clipboard)
    }

    #[test]
    fn test_like_then_dislike_is_exclusive() {
        let t = settled_transcript();
        let (mut r, _) = tracker();
        assert!(r.toggle_like(&t, 0));
        assert_eq!(r.state(0), ReactionState { liked: true, disliked: false });
        assert!(r.toggle_dislike(&t, 0));
        assert_eq!(r.state(0), ReactionState { liked: false, disliked: true });
    }

    #[test]
    fn test_toggle_twice_clears() {
        let t = settled_transcript();
        let (mut r, _) = tracker();
        r.toggle_like(&t, 1);
        r.toggle_like(&t, 1);
        assert_eq!(r.state(1), ReactionState::default());
    }

    #[test]
    fn test_never_liked_and_disliked() {
        let t = settled_transcript();
        let (mut r, _) = tracker();
        // Walk every sequence of up to 6 toggles on one entry
        for mask in 0u32..64 {
            r.clear();
            for step in 0..6 {
                if mask & (1 << step) == 0 {
                    r.toggle_like(&t, 0);
                } else {
                    r.toggle_dislike(&t, 0);
                }
                let s = r.state(0);
                assert!(!(s.liked && s.disliked), "mask {mask:#b} step {step}");
            }
        }
    }

    #[test]
    fn test_reactions_ignored_while_in_flight() {
        let mut t = settled_transcript();
        t.push_pending("Q3");
        let (mut r, clipboard) = tracker();
        let now = Instant::now();
        assert!(!r.toggle_like(&t, 2));
        assert!(!r.toggle_dislike(&t, 2));
        assert!(!r.copy(&t, 2, CopyTarget::Question, now));
        assert_eq!(r.state(2), ReactionState::default());
        assert!(clipboard.contents().is_empty());
        assert!(r.notification(now).is_none());
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let t = settled_transcript();
        let (mut r, _) = tracker();
        assert!(!r.toggle_like(&t, 9));
        assert!(!r.copy(&t, 9, CopyTarget::Answer, Instant::now()));
    }

    #[test]
    fn test_copy_selects_text_and_notifies() {
        let t = settled_transcript();
        let (mut r, clipboard) = tracker();
        let now = Instant::now();
        assert!(r.copy(&t, 1, CopyTarget::Answer, now));
        assert!(r.copy(&t, 0, CopyTarget::Question, now));
        assert_eq!(clipboard.contents(), vec!["A2".to_string(), "Q1".to_string()]);
        assert_eq!(r.notification(now).map(|n| n.text.as_str()), Some(COPY_CONFIRMATION));
    }

    #[test]
    fn test_notification_expires() {
        let t = settled_transcript();
        let (mut r, _) = tracker();
        let now = Instant::now();
        r.copy(&t, 0, CopyTarget::Answer, now);
        assert!(r.notification(now + Duration::from_millis(1499)).is_some());
        assert!(r.notification(now + NOTIFICATION_TTL).is_none());
        assert!(r.notification(now).is_none(), "expired toast stays gone");
    }

    #[test]
    fn test_clipboard_failure_has_no_toast() {
        let t = settled_transcript();
        let clipboard = RecordingClipboard::failing();
        let mut r = ReactionTracker::new(Box::new(clipboard));
        let now = Instant::now();
        assert!(!r.copy(&t, 0, CopyTarget::Answer, now));
        assert!(r.notification(now).is_none());
    }
}
