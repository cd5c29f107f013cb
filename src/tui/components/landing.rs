//! # Landing Page Component
//!
//! Shown while the transcript is empty: greeting plus numbered suggested
//! questions. Pressing a suggestion's number asks it.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Wrap};

use crate::tui::component::Component;
use crate::tui::theme::Palette;

/// Suggestions reachable with a single digit key.
pub const MAX_SUGGESTIONS: usize = 9;

pub struct LandingPage<'a> {
    pub suggestions: &'a [String],
    pub palette: &'a Palette,
}

impl LandingPage<'_> {
    /// Index of the suggestion bound to `key`, if any.
    pub fn suggestion_for_key(suggestions: &[String], key: char) -> Option<usize> {
        let n = key.to_digit(10)? as usize;
        (n >= 1 && n <= suggestions.len().min(MAX_SUGGESTIONS)).then_some(n - 1)
    }
}

impl Component for LandingPage<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let shown = &self.suggestions[..self.suggestions.len().min(MAX_SUGGESTIONS)];

        let header = vec![
            Line::from(Span::styled("Chat AI", self.palette.title())),
            Line::from(""),
            Line::from(Span::styled(
                "How can I help you?",
                Style::default().fg(self.palette.text),
            )),
        ];
        let header_height = header.len() as u16;

        let cards: Vec<Line> = shown
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Line::from(vec![
                    Span::styled(format!(" {} ", i + 1), self.palette.title()),
                    Span::raw(" "),
                    Span::styled(s.as_str(), Style::default().fg(self.palette.question)),
                ])
            })
            .collect();
        let cards_height = cards.len() as u16 + 2;

        let width = area.width.clamp(20, 70);
        let [column] = Layout::horizontal([Constraint::Length(width)])
            .flex(Flex::Center)
            .areas(area);
        let [header_area, _, cards_area, hint_area] = Layout::vertical([
            Constraint::Length(header_height),
            Constraint::Length(1),
            Constraint::Length(cards_height),
            Constraint::Length(1),
        ])
        .flex(Flex::Center)
        .areas(column);

        frame.render_widget(
            Paragraph::new(header).alignment(Alignment::Center),
            header_area,
        );

        if !cards.is_empty() {
            let block = Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(self.palette.dim())
                .padding(Padding::horizontal(1))
                .title(" Try asking ");
            frame.render_widget(
                Paragraph::new(cards).block(block).wrap(Wrap { trim: true }),
                cards_area,
            );
            let hint = format!("Press 1-{} to ask", shown.len());
            frame.render_widget(
                Paragraph::new(hint)
                    .style(self.palette.dim())
                    .alignment(Alignment::Center),
                hint_area,
            );
        }
    }
}
