//! # Exchange Component
//!
//! One transcript entry: a question card above an answer card.
//!
//! `Exchange` is transient, built each frame by `TranscriptView` for the
//! entries in view. Heights come from `Paragraph::line_count` on the same
//! paragraphs that get rendered, so the scroll math matches what is drawn.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::reactions::ReactionState;
use crate::core::renderer::{AnswerLine, layout_lines};
use crate::core::transcript::{EntryStatus, TranscriptEntry};
use crate::tui::theme::Palette;

/// Borders (2) + horizontal padding (2).
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders.
const VERTICAL_OVERHEAD: u16 = 2;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub struct Exchange<'a> {
    pub entry: &'a TranscriptEntry,
    pub reaction: ReactionState,
    pub is_selected: bool,
    pub spinner_frame: usize,
    pub palette: &'a Palette,
}

impl<'a> Exchange<'a> {
    fn question_paragraph(&self) -> Paragraph<'a> {
        Paragraph::new(self.entry.question())
            .style(Style::default().fg(self.palette.question))
            .wrap(Wrap { trim: false })
    }

    fn answer_paragraph(&self) -> Paragraph<'a> {
        let palette = self.palette;
        let lines: Vec<Line<'a>> = match self.entry.status() {
            EntryStatus::Pending => {
                let frame = SPINNER[self.spinner_frame % SPINNER.len()];
                vec![Line::from(Span::styled(
                    format!("{frame} Thinking…"),
                    palette.dim(),
                ))]
            }
            EntryStatus::Failed => vec![Line::from(Span::styled(
                self.entry.answer(),
                Style::default().fg(palette.danger),
            ))],
            EntryStatus::Streaming | EntryStatus::Complete => layout_lines(self.entry.answer())
                .into_iter()
                .map(|line| answer_line(line, palette))
                .collect(),
        };
        Paragraph::new(lines)
            .style(Style::default().fg(palette.answer))
            .wrap(Wrap { trim: false })
    }

    /// Rows this exchange occupies at `width`.
    pub fn calculate_height(&self, width: u16) -> u16 {
        let (q, a) = self.card_heights(width);
        q + a
    }

    fn card_heights(&self, width: u16) -> (u16, u16) {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return (1, 1);
        }
        let q = self.question_paragraph().line_count(content_width) as u16;
        let a = self.answer_paragraph().line_count(content_width) as u16;
        (q.max(1) + VERTICAL_OVERHEAD, a.max(1) + VERTICAL_OVERHEAD)
    }

    fn reaction_badge(&self) -> Option<Span<'static>> {
        if self.reaction.liked {
            Some(Span::styled(" ▲ liked ", Style::default().fg(self.palette.answer)))
        } else if self.reaction.disliked {
            Some(Span::styled(" ▼ disliked ", Style::default().fg(self.palette.danger)))
        } else {
            None
        }
    }
}

fn answer_line<'a>(line: AnswerLine<'a>, palette: &Palette) -> Line<'a> {
    match line {
        AnswerLine::Plain(text) => Line::from(text),
        AnswerLine::Labeled { label, detail } => {
            let detail_style = if line.is_example() {
                Style::default()
                    .fg(palette.example)
                    .add_modifier(Modifier::ITALIC)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(
                    label,
                    Style::default()
                        .fg(palette.label)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(":", palette.dim()),
                Span::styled(detail, detail_style),
            ])
        }
    }
}

impl Widget for Exchange<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (q_height, a_height) = self.card_heights(area.width);
        let q_area = Rect {
            height: q_height.min(area.height),
            ..area
        };
        let a_area = Rect {
            y: area.y + q_area.height,
            height: a_height.min(area.height.saturating_sub(q_area.height)),
            ..area
        };

        let border_style = if self.is_selected {
            Style::default().fg(self.palette.accent)
        } else {
            self.palette.dim()
        };

        let question_block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .padding(Padding::horizontal(1))
            .title(" You ");
        self.question_paragraph()
            .block(question_block)
            .render(q_area, buf);

        let mut answer_block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .padding(Padding::horizontal(1))
            .title(" Chat AI ");
        if let Some(badge) = self.reaction_badge() {
            answer_block = answer_block.title_bottom(Line::from(badge).right_aligned());
        }
        if self.is_selected && !self.entry.status().is_in_flight() {
            answer_block = answer_block.title_bottom(
                Line::from(" c copy  C copy question  l like  d dislike ")
                    .style(self.palette.dim())
                    .left_aligned(),
            );
        }
        self.answer_paragraph()
            .block(answer_block)
            .render(a_area, buf);
    }
}
