//! # TranscriptView Component
//!
//! Scrollable view of the transcript.
//!
//! `TranscriptView` is transient (created each frame) and wraps
//! `&'a mut TranscriptViewState` (persistent state) and the transcript (props).
//! Heights are measured every frame: the streaming entry changes size on each
//! tick and transcripts stay short.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::reactions::ReactionState;
use crate::core::transcript::Transcript;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::exchange::Exchange;
use crate::tui::event::TuiEvent;
use crate::tui::theme::Palette;

/// Scroll and selection state. Persisted in `TuiState`.
pub struct TranscriptViewState {
    pub scroll_state: ScrollViewState,
    /// Height of each entry from the last render
    pub heights: Vec<u16>,
    /// Running sum of `heights`
    pub prefix_heights: Vec<u16>,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Entry selected in Cursor mode
    pub selected_index: Option<usize>,
    pub viewport_height: u16,
}

impl Default for TranscriptViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptViewState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            stick_to_bottom: true,
            selected_index: None,
            viewport_height: 0,
        }
    }

    fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    fn max_offset(&self) -> u16 {
        self.total_height().saturating_sub(self.viewport_height)
    }

    fn set_heights(&mut self, heights: Vec<u16>) {
        self.prefix_heights = heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
        self.heights = heights;
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
    }

    /// Re-engage auto-scroll once the user scrolls back to the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position { x: current.x, y: max_y });
        }
    }

    /// Selects the entry above the current one, or the last entry if none is selected.
    pub fn select_previous(&mut self, len: usize) {
        if len == 0 {
            self.selected_index = None;
            return;
        }
        self.selected_index = Some(match self.selected_index {
            Some(i) => i.saturating_sub(1).min(len - 1),
            None => len - 1,
        });
        self.scroll_to_selected();
    }

    pub fn select_next(&mut self, len: usize) {
        if let Some(i) = self.selected_index
            && i + 1 < len
        {
            self.selected_index = Some(i + 1);
            self.scroll_to_selected();
        }
    }

    /// Scroll so the selected entry is visible, aligning its top edge if it doesn't fit.
    pub fn scroll_to_selected(&mut self) {
        let Some(idx) = self.selected_index else {
            return;
        };
        let Some(&bottom) = self.prefix_heights.get(idx) else {
            return;
        };
        let top = bottom.saturating_sub(self.heights[idx]);
        let offset_y = self.scroll_state.offset().y;

        if top < offset_y {
            self.scroll_state.set_offset(Position { x: 0, y: top });
            self.stick_to_bottom = false;
        } else if bottom > offset_y + self.viewport_height {
            let new_y = bottom.saturating_sub(self.viewport_height).min(top);
            self.scroll_state.set_offset(Position { x: 0, y: new_y });
            self.stick_to_bottom = new_y >= self.max_offset();
        }
    }

    /// Back to the initial state after the transcript was replaced.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl EventHandler for TranscriptViewState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

pub struct TranscriptView<'a> {
    pub state: &'a mut TranscriptViewState,
    pub transcript: &'a Transcript,
    /// Reaction flags per entry, same length as the transcript
    pub reactions: &'a [ReactionState],
    pub spinner_frame: usize,
    pub palette: &'a Palette,
}

impl<'a> TranscriptView<'a> {
    fn exchange(&self, index: usize) -> Option<Exchange<'a>> {
        let entry = self.transcript.get(index)?;
        Some(Exchange {
            entry,
            reaction: self.reactions.get(index).copied().unwrap_or_default(),
            is_selected: self.state.selected_index == Some(index),
            spinner_frame: self.spinner_frame,
            palette: self.palette,
        })
    }
}

impl Component for TranscriptView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar

        let heights: Vec<u16> = (0..self.transcript.len())
            .filter_map(|i| self.exchange(i))
            .map(|ex| ex.calculate_height(content_width))
            .collect();
        self.state.set_heights(heights);
        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let mut scroll_view = ScrollView::new(Size::new(content_width, self.state.total_height()))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y = 0u16;
        for i in 0..self.transcript.len() {
            let height = self.state.heights[i];
            if let Some(exchange) = self.exchange(i) {
                scroll_view.render_widget(exchange, Rect::new(0, y, content_width, height));
            }
            y = y.saturating_add(height);
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }
        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}
