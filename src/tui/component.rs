use ratatui::Frame;
use ratatui::layout::Rect;

use crate::tui::event::TuiEvent;

/// Something `draw_ui` can place in a `Rect`.
///
/// Transient wrappers (`TranscriptView`, `Sidebar`, `LandingPage`) carry their
/// props as fields and borrow persistent state. `render` takes `&mut self`
/// because the transcript view records entry heights and the input box moves
/// its scroll window while drawing.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Persistent state that consumes terminal events.
pub trait EventHandler {
    /// What the owner is told about; `()` when nothing needs reporting.
    type Event;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
