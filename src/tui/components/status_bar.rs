//! # StatusBar Component
//!
//! Top line: app name and answering service on the left, the current mode
//! and key hints on the right.
//!
//! Purely presentational. The status text is picked in priority order:
//!
//! 1. **Busy**: `"Answering…"`
//! 2. **Unseen content**: `"↓ New"` when scrolled away from the bottom
//! 3. **Default**: mode hint

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::InputMode;
use crate::tui::component::Component;
use crate::tui::theme::Palette;

pub struct StatusBar<'a> {
    pub service_name: &'a str,
    pub user_name: &'a str,
    pub busy: bool,
    pub has_unseen_content: bool,
    pub input_mode: InputMode,
    pub palette: &'a Palette,
}

impl StatusBar<'_> {
    fn status_text(&self) -> &'static str {
        if self.busy {
            "Answering…"
        } else if self.has_unseen_content {
            "↓ New"
        } else {
            match self.input_mode {
                InputMode::Input => "Esc select  ^O conversations  ^T theme",
                InputMode::Cursor => "↑↓ select  Enter type  ^O conversations",
            }
        }
    }
}

impl Component for StatusBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let status = self.status_text();
        let [left, right] = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(status.chars().count() as u16 + 1),
        ])
        .areas(area);

        let title = Line::from(vec![
            Span::styled("Chat AI", self.palette.title()),
            Span::styled(
                format!(" · {} · {}", self.service_name, self.user_name),
                self.palette.dim(),
            ),
        ]);
        frame.render_widget(Paragraph::new(title), left);
        frame.render_widget(
            Paragraph::new(status)
                .style(self.palette.dim())
                .alignment(Alignment::Right),
            right,
        );
    }
}
