use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    /// Ctrl+C
    ForceQuit,
    Submit,
    Escape,

    // Editing
    InputChar(char),
    Paste(String), // Bracketed paste - preserves newlines
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    CursorHome,
    CursorEnd,

    // Scrolling
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,

    /// Ctrl+O
    OpenSidebar,
    /// Ctrl+T
    ToggleTheme,
    Resize,
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> io::Result<Option<TuiEvent>> {
    poll_event_timeout(Duration::ZERO)
}

/// Wait up to `timeout` for the next recognised event.
pub fn poll_event_timeout(timeout: Duration) -> io::Result<Option<TuiEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    Ok(match event::read()? {
        Event::Key(key_event) => translate_key(key_event),
        Event::Mouse(mouse_event) => match mouse_event.kind {
            MouseEventKind::ScrollUp => Some(TuiEvent::ScrollUp),
            MouseEventKind::ScrollDown => Some(TuiEvent::ScrollDown),
            _ => None,
        },
        Event::Paste(data) => Some(TuiEvent::Paste(data)),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    })
}

/// Maps a key press to a `TuiEvent`. Key releases are dropped.
pub fn translate_key(key_event: KeyEvent) -> Option<TuiEvent> {
    if key_event.kind == KeyEventKind::Release {
        return None;
    }
    log::debug!(
        "Key event: {:?} with modifiers {:?}",
        key_event.code,
        key_event.modifiers
    );
    match (key_event.modifiers, key_event.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(TuiEvent::ForceQuit),
        (KeyModifiers::CONTROL, KeyCode::Char('o')) => Some(TuiEvent::OpenSidebar),
        (KeyModifiers::CONTROL, KeyCode::Char('t')) => Some(TuiEvent::ToggleTheme),
        // Ctrl+J inserts newline (ASCII LF; Ctrl+Enter sends this in most terminals)
        (KeyModifiers::CONTROL, KeyCode::Char('j')) => Some(TuiEvent::InputChar('\n')),
        (KeyModifiers::CONTROL, _) => None,
        (_, KeyCode::Char(c)) => Some(TuiEvent::InputChar(c)),
        (_, KeyCode::Backspace) => Some(TuiEvent::Backspace),
        (_, KeyCode::Delete) => Some(TuiEvent::Delete),
        (_, KeyCode::Enter) => Some(TuiEvent::Submit),
        (_, KeyCode::Esc) => Some(TuiEvent::Escape),
        (_, KeyCode::Left) => Some(TuiEvent::CursorLeft),
        (_, KeyCode::Right) => Some(TuiEvent::CursorRight),
        (_, KeyCode::Up) => Some(TuiEvent::CursorUp),
        (_, KeyCode::Down) => Some(TuiEvent::CursorDown),
        (_, KeyCode::Home) => Some(TuiEvent::CursorHome),
        (_, KeyCode::End) => Some(TuiEvent::CursorEnd),
        (_, KeyCode::PageUp) => Some(TuiEvent::ScrollPageUp),
        (_, KeyCode::PageDown) => Some(TuiEvent::ScrollPageDown),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(modifiers: KeyModifiers, code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_control_shortcuts() {
        assert_eq!(
            translate_key(key(KeyModifiers::CONTROL, KeyCode::Char('o'))),
            Some(TuiEvent::OpenSidebar)
        );
        assert_eq!(
            translate_key(key(KeyModifiers::CONTROL, KeyCode::Char('t'))),
            Some(TuiEvent::ToggleTheme)
        );
        assert_eq!(
            translate_key(key(KeyModifiers::CONTROL, KeyCode::Char('c'))),
            Some(TuiEvent::ForceQuit)
        );
        assert_eq!(translate_key(key(KeyModifiers::CONTROL, KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_plain_and_shifted_chars() {
        assert_eq!(
            translate_key(key(KeyModifiers::NONE, KeyCode::Char('c'))),
            Some(TuiEvent::InputChar('c'))
        );
        assert_eq!(
            translate_key(key(KeyModifiers::SHIFT, KeyCode::Char('C'))),
            Some(TuiEvent::InputChar('C'))
        );
    }

    #[test]
    fn test_release_ignored() {
        let mut release = key(KeyModifiers::NONE, KeyCode::Enter);
        release.kind = KeyEventKind::Release;
        assert_eq!(translate_key(release), None);
    }
}
