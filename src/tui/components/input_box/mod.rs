//! # InputBox Component
//!
//! The question field.
//!
//! The buffer and cursor are internal state. `busy` is a prop: while an
//! exchange is in flight Enter keeps the text in the box instead of
//! submitting it, so nothing typed is lost.

mod text_wrap;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;
use crate::tui::theme::Palette;

use text_wrap::{
    CONTENT_OFFSET, MAX_VISIBLE_LINES, VERTICAL_OVERHEAD, cursor_cell, inner_width,
    next_char_boundary, prev_char_boundary, wrap_line_count, wrap_options,
};

const PLACEHOLDER: &str = "Ask anything…";

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter on a non-blank buffer; the buffer has been cleared.
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    pub buffer: String,
    /// An exchange is in flight (Prop)
    pub busy: bool,
    /// Rendered without focus (Prop)
    pub dimmed: bool,
    pub palette: Palette,
    pos: usize,
    scroll_offset: u16,
}

impl InputBox {
    pub fn new(palette: Palette) -> Self {
        Self {
            buffer: String::new(),
            busy: false,
            dimmed: false,
            palette,
            pos: 0,
            scroll_offset: 0,
        }
    }

    /// Rows needed for the current buffer, clamped to the visible maximum.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let lines = wrap_line_count(&self.buffer, inner_width(area_width));
        lines.min(MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.pos = 0;
        self.scroll_offset = 0;
    }

    fn insert_str(&mut self, text: &str) {
        self.buffer.insert_str(self.pos, text);
        self.pos += text.len();
    }

    /// Keeps the cursor row inside the visible window.
    fn update_scroll_offset(&mut self, width: u16) {
        let (row, _) = cursor_cell(&self.buffer[..self.pos], width);
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if row >= self.scroll_offset + MAX_VISIBLE_LINES {
            self.scroll_offset = row + 1 - MAX_VISIBLE_LINES;
        }
    }

    fn visible_text(&self, width: u16) -> String {
        let lines = textwrap::wrap(&self.buffer, wrap_options(width));
        lines
            .iter()
            .skip(self.scroll_offset as usize)
            .take(MAX_VISIBLE_LINES as usize)
            .map(|l| l.as_ref())
            .collect::<Vec<&str>>()
            .join("\n")
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = inner_width(area.width);
        self.update_scroll_offset(width);

        let title = if self.busy {
            " Waiting for answer "
        } else {
            " Ask "
        };
        let border_style = if self.dimmed {
            self.palette.dim()
        } else {
            Style::default().fg(self.palette.accent)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .padding(Padding::horizontal(1))
            .title(title);

        let paragraph = if self.buffer.is_empty() {
            Paragraph::new(PLACEHOLDER).style(self.palette.dim())
        } else {
            Paragraph::new(self.visible_text(width)).style(self.palette.base())
        };
        frame.render_widget(paragraph.block(block), area);

        if !self.dimmed {
            let (row, col) = cursor_cell(&self.buffer[..self.pos], width);
            let visible_row = row.saturating_sub(self.scroll_offset);
            frame.set_cursor_position((
                area.x + CONTENT_OFFSET + col,
                area.y + 1 + visible_row,
            ));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                let mut tmp = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut tmp));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                self.insert_str(text);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace if self.pos > 0 => {
                let prev = prev_char_boundary(&self.buffer, self.pos);
                self.buffer.drain(prev..self.pos);
                self.pos = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Delete if self.pos < self.buffer.len() => {
                let next = next_char_boundary(&self.buffer, self.pos);
                self.buffer.drain(self.pos..next);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorLeft if self.pos > 0 => {
                self.pos = prev_char_boundary(&self.buffer, self.pos);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorRight if self.pos < self.buffer.len() => {
                self.pos = next_char_boundary(&self.buffer, self.pos);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorHome => {
                let line_start = self.buffer[..self.pos].rfind('\n').map_or(0, |i| i + 1);
                (self.pos != line_start).then(|| {
                    self.pos = line_start;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::CursorEnd => {
                let line_end = self.buffer[self.pos..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| self.pos + i);
                (self.pos != line_end).then(|| {
                    self.pos = line_end;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::Submit if !self.busy && !self.buffer.trim().is_empty() => {
                let text = std::mem::take(&mut self.buffer);
                self.clear();
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}
