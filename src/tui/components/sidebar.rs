//! # Sidebar Component
//!
//! Overlay listing the conversations saved on the server, with the signed-in
//! user's name and email on top. Opened with Ctrl+O, dismissed with Esc.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SidebarState` lives in `TuiState` (selection only)
//! - `Sidebar` is created each frame with the directory's mirror as props

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph};

use crate::remote::{SavedConversation, UserProfile};
use crate::tui::component::Component;
use crate::tui::event::TuiEvent;
use crate::tui::theme::Palette;

/// Selection state for the sidebar overlay.
pub struct SidebarState {
    pub list_state: ListState,
}

/// What the user asked the sidebar to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarEvent {
    Resume(SavedConversation),
    Delete(String),
    DeleteAll,
    NewChat,
    Refresh,
    Dismiss,
}

impl SidebarState {
    pub fn new(len: usize) -> Self {
        let mut list_state = ListState::default();
        if len > 0 {
            list_state.select(Some(0));
        }
        Self { list_state }
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    /// Keeps the selection inside a list of `len` items.
    pub fn clamp(&mut self, len: usize) {
        let selected = match (len, self.list_state.selected()) {
            (0, _) => None,
            (_, Some(i)) => Some(i.min(len - 1)),
            (_, None) => Some(0),
        };
        self.list_state.select(selected);
    }

    pub fn handle_event(
        &mut self,
        event: &TuiEvent,
        conversations: &[SavedConversation],
    ) -> Option<SidebarEvent> {
        let current = self.selected().and_then(|i| conversations.get(i));

        match event {
            TuiEvent::Escape => Some(SidebarEvent::Dismiss),
            TuiEvent::CursorUp => {
                if !conversations.is_empty() {
                    let i = self.selected().unwrap_or(0).saturating_sub(1);
                    self.list_state.select(Some(i));
                }
                None
            }
            TuiEvent::CursorDown => {
                if !conversations.is_empty() {
                    let i = self
                        .selected()
                        .map_or(0, |i| (i + 1).min(conversations.len() - 1));
                    self.list_state.select(Some(i));
                }
                None
            }
            TuiEvent::Submit => current.cloned().map(SidebarEvent::Resume),
            TuiEvent::InputChar('d') => current.map(|c| SidebarEvent::Delete(c.id.clone())),
            TuiEvent::InputChar('D') => {
                (!conversations.is_empty()).then_some(SidebarEvent::DeleteAll)
            }
            TuiEvent::InputChar('n') => Some(SidebarEvent::NewChat),
            TuiEvent::InputChar('r') => Some(SidebarEvent::Refresh),
            _ => None,
        }
    }
}

/// Transient render wrapper for the sidebar overlay.
pub struct Sidebar<'a> {
    pub state: &'a mut SidebarState,
    pub conversations: &'a [SavedConversation],
    pub profile: &'a UserProfile,
    /// A listing is in flight.
    pub loading: bool,
    pub palette: &'a Palette,
}

impl Component for Sidebar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = (area.width * 2 / 5).clamp(30u16.min(area.width), area.width);
        let panel = Rect { width, ..area };
        frame.render_widget(Clear, panel);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.palette.dim())
            .style(self.palette.base())
            .title(" Conversations ")
            .title_bottom(Line::from(" Enter open  d del  D del all  n new  r refresh ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let [profile_area, _, list_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(inner);

        let profile = Paragraph::new(vec![
            Line::from(Span::styled(
                self.profile.name.as_str(),
                Style::default()
                    .fg(self.palette.text)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(self.profile.email.as_str(), self.palette.dim())),
        ]);
        frame.render_widget(profile, profile_area);

        if self.conversations.is_empty() {
            let text = if self.loading {
                "Loading…"
            } else {
                "No saved conversations."
            };
            frame.render_widget(Paragraph::new(text).style(self.palette.dim()), list_area);
            return;
        }

        let max_chars = list_area.width as usize;
        let items: Vec<ListItem> = self
            .conversations
            .iter()
            .map(|c| ListItem::new(truncate_str(first_line(&c.question), max_chars)))
            .collect();
        let list = List::new(items)
            .style(Style::default().fg(self.palette.text))
            .highlight_style(
                Style::default()
                    .bg(self.palette.selection)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_stateful_widget(list, list_area, &mut self.state.list_state);
    }
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}

/// Truncate to `max_chars` characters, ending with "..." when cut.
fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        ".".repeat(max_chars)
    } else {
        let kept: String = s.chars().take(max_chars - 3).collect();
        format!("{kept}...")
    }
}
