//! # Answer Renderer
//!
//! Turns a complete answer into a typewriter reveal.
//!
//! ```text
//! "**Hi** there" ─strip─▶ "Hi there" ─Typewriter─▶ "H", "Hi", "Hi ", … "Hi there"
//! ```
//!
//! [`Typewriter`] is the pure part: a lazy, finite iterator of ever-longer
//! prefixes that can be cut short. [`AnswerRenderer::stream`] paces it on a
//! tokio task and reports through callbacks; the returned [`CancelHandle`]
//! guarantees silence once `cancel()` returns.
//!
//! [`layout_lines`] is a display-only split of an answer into label/detail
//! lines. It never touches the stored answer.

use std::iter::FusedIterator;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::debug;
use tokio::task::AbortHandle;

/// Pacing between revealed characters.
pub const DEFAULT_TYPING_INTERVAL: Duration = Duration::from_millis(3);

/// Emphasis markers the upstream model sprinkles into answers.
const MARKUP_CHARS: [char; 1] = ['*'];

/// Removes emphasis markup before an answer is revealed or stored.
pub fn strip_markup(text: &str) -> String {
    text.replace(MARKUP_CHARS, "")
}

// ============================================================================
// Typewriter
// ============================================================================

/// Yields successive prefixes of a markup-stripped answer, one character longer each time.
///
/// Prefixes end on `char` boundaries, so multi-byte text is never split.
#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    revealed: usize,
    cancelled: bool,
}

impl Typewriter {
    pub fn new(full_text: &str) -> Self {
        Self {
            text: strip_markup(full_text),
            revealed: 0,
            cancelled: false,
        }
    }

    /// The text the final prefix will equal.
    pub fn full_text(&self) -> &str {
        &self.text
    }

    /// Stops the sequence; every later `next()` returns `None`.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Characters still to be revealed.
    pub fn remaining(&self) -> usize {
        if self.cancelled {
            return 0;
        }
        self.text[self.revealed..].chars().count()
    }
}

impl Iterator for Typewriter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.cancelled {
            return None;
        }
        let next_char = self.text[self.revealed..].chars().next()?;
        self.revealed += next_char.len_utf8();
        Some(self.text[..self.revealed].to_string())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for Typewriter {}

impl FusedIterator for Typewriter {}

// ============================================================================
// Paced stream
// ============================================================================

fn lock(gate: &Mutex<bool>) -> MutexGuard<'_, bool> {
    gate.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Stops a running stream.
///
/// Callbacks run while holding the same lock `cancel()` takes, so once
/// `cancel()` returns no tick or completion can follow.
#[derive(Debug)]
pub struct CancelHandle {
    cancelled: Arc<Mutex<bool>>,
    task: AbortHandle,
}

impl CancelHandle {
    pub fn cancel(&self) {
        *lock(&self.cancelled) = true;
        self.task.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        *lock(&self.cancelled)
    }
}

/// Paces typewriter reveals at a fixed cadence.
#[derive(Debug, Clone, Copy)]
pub struct AnswerRenderer {
    interval: Duration,
}

impl Default for AnswerRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_INTERVAL)
    }
}

impl AnswerRenderer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Reveals `full_text` one character per interval.
    ///
    /// `on_tick` receives each growing prefix; `on_done` runs exactly once after
    /// the last one (immediately if the stripped text is empty) unless the
    /// stream is cancelled first. Must be called inside a tokio runtime.
    pub fn stream<T, D>(&self, full_text: &str, mut on_tick: T, on_done: D) -> CancelHandle
    where
        T: FnMut(String) + Send + 'static,
        D: FnOnce() + Send + 'static,
    {
        let mut typewriter = Typewriter::new(full_text);
        let cancelled = Arc::new(Mutex::new(false));
        let task_cancelled = Arc::clone(&cancelled);
        let interval = self.interval;

        debug!("Streaming {} chars every {:?}", typewriter.len(), interval);

        let task = tokio::spawn(async move {
            while let Some(prefix) = typewriter.next() {
                tokio::time::sleep(interval).await;
                {
                    let gate = lock(&task_cancelled);
                    if *gate {
                        return;
                    }
                    on_tick(prefix);
                }
            }
            let gate = lock(&task_cancelled);
            if !*gate {
                on_done();
            }
        });

        CancelHandle {
            cancelled,
            task: task.abort_handle(),
        }
    }
}

// ============================================================================
// Line layout
// ============================================================================

/// One display line of an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerLine<'a> {
    Plain(&'a str),
    /// Split at the first `:`; the colon belongs to neither side.
    Labeled { label: &'a str, detail: &'a str },
}

impl AnswerLine<'_> {
    /// Details that open with "Example" right after the colon are set apart
    /// when drawn. Leading whitespace counts: `"Usage: Example"` is not one.
    pub fn is_example(&self) -> bool {
        match self {
            AnswerLine::Labeled { detail, .. } => detail.starts_with("Example"),
            AnswerLine::Plain(_) => false,
        }
    }
}

/// Splits an answer into display lines.
pub fn layout_lines(answer: &str) -> Vec<AnswerLine<'_>> {
    answer
        .split('\n')
        .map(|line| match line.split_once(':') {
            Some((label, detail)) => AnswerLine::Labeled { label, detail },
            None => AnswerLine::Plain(line),
        })
        .collect()
}
