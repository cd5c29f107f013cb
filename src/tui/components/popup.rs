//! # Popups
//!
//! Modal dialogs (alerts, sign-in prompt, delete confirmation) and the
//! copy confirmation toast.
//!
//! Alerts and the sign-in prompt are held in `TuiState` as a `Popup` until
//! dismissed. The confirmation and progress dialogs have no state of their
//! own: they follow the conversation directory's mutation state.

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph, Widget, Wrap};

use crate::core::directory::MutationTarget;
use crate::tui::theme::Palette;

const DIALOG_WIDTH: u16 = 56;
const TOAST_MARGIN: u16 = 1;

/// A dismissable popup. Any key closes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popup {
    Alert(String),
    SignIn { login_url: String },
}

pub struct Dialog<'a> {
    title: &'static str,
    body: Vec<Line<'a>>,
    hint: &'static str,
    danger: bool,
    palette: &'a Palette,
}

impl<'a> Dialog<'a> {
    pub fn for_popup(popup: &'a Popup, palette: &'a Palette) -> Self {
        match popup {
            Popup::Alert(message) => Self::alert(message, palette),
            Popup::SignIn { login_url } => Self::sign_in(login_url, palette),
        }
    }

    pub fn alert(message: &'a str, palette: &'a Palette) -> Self {
        Self {
            title: " Error ",
            body: vec![Line::from(message)],
            hint: " Press any key ",
            danger: true,
            palette,
        }
    }

    pub fn sign_in(login_url: &'a str, palette: &'a Palette) -> Self {
        Self {
            title: " Sign in required ",
            body: vec![
                Line::from("Your session has expired or you are not signed in."),
                Line::from(""),
                Line::from("Sign in at:"),
                Line::from(Span::styled(
                    login_url,
                    Style::default()
                        .fg(palette.accent)
                        .add_modifier(Modifier::UNDERLINED),
                )),
            ],
            hint: " Press any key ",
            danger: false,
            palette,
        }
    }

    pub fn confirm(target: &MutationTarget, palette: &'a Palette) -> Self {
        let question = match target {
            MutationTarget::One(_) => "Delete this conversation?",
            MutationTarget::All => "Delete all conversations?",
        };
        Self {
            title: " Confirm ",
            body: vec![
                Line::from(question),
                Line::from(Span::styled("This cannot be undone.", palette.dim())),
            ],
            hint: " y Delete  n Cancel ",
            danger: true,
            palette,
        }
    }

    /// Shown while a confirmed delete waits for the server.
    pub fn committing(target: &MutationTarget, palette: &'a Palette) -> Self {
        let text = match target {
            MutationTarget::One(_) => "Deleting conversation…",
            MutationTarget::All => "Deleting all conversations…",
        };
        Self {
            title: " Deleting ",
            body: vec![Line::from(text)],
            hint: " Please wait ",
            danger: false,
            palette,
        }
    }

    fn paragraph(&self) -> Paragraph<'a> {
        Paragraph::new(self.body.clone())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
    }

    /// Rows needed at `width`, borders included.
    fn height(&self, width: u16) -> u16 {
        self.paragraph().line_count(width.saturating_sub(4)) as u16 + 2
    }
}

impl Widget for Dialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = DIALOG_WIDTH.min(area.width);
        let height = self.height(width).min(area.height);
        let rect = centered_rect(width, height, area);

        let border = if self.danger {
            Style::default().fg(self.palette.danger)
        } else {
            Style::default().fg(self.palette.accent)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border)
            .style(self.palette.base())
            .padding(Padding::horizontal(1))
            .title(self.title)
            .title_bottom(Line::from(self.hint).style(self.palette.dim()).centered());

        Clear.render(rect, buf);
        self.paragraph().block(block).render(rect, buf);
    }
}

/// The copy confirmation, drawn in the top-right corner.
pub struct Toast<'a> {
    pub text: &'a str,
    pub palette: &'a Palette,
}

impl Widget for Toast<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = (self.text.chars().count() as u16 + 4).min(area.width);
        let height = 3u16.min(area.height);
        let rect = Rect {
            x: area.right().saturating_sub(width + TOAST_MARGIN).max(area.x),
            y: area.y + TOAST_MARGIN.min(area.height.saturating_sub(height)),
            width,
            height,
        };

        Clear.render(rect, buf);
        Paragraph::new(self.text)
            .style(Style::default().fg(self.palette.answer))
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(self.palette.answer))
                    .style(self.palette.base())
                    .padding(Padding::horizontal(1)),
            )
            .render(rect, buf);
    }
}

/// A `width` x `height` rect centered in `outer`.
fn centered_rect(width: u16, height: u16, outer: Rect) -> Rect {
    let [center_v] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(outer);
    let [center] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(center_v);
    center
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Theme;
    use ratatui::layout::Position;

    fn render(widget: impl Widget, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_centered_rect() {
        let rect = centered_rect(20, 4, Rect::new(0, 0, 80, 24));
        assert_eq!(rect, Rect::new(30, 10, 20, 4));
    }

    #[test]
    fn test_alert_shows_message() {
        let palette = Palette::for_theme(Theme::Dark);
        let popup = Popup::Alert("Failed to delete conversation. Please try again.".into());
        let text = render(Dialog::for_popup(&popup, &palette), 80, 24);
        assert!(text.contains("Failed to delete"));
        assert!(text.contains("Press any key"));
    }

    #[test]
    fn test_sign_in_shows_login_url() {
        let palette = Palette::for_theme(Theme::Dark);
        let popup = Popup::SignIn {
            login_url: "http://localhost:3000/login".into(),
        };
        let text = render(Dialog::for_popup(&popup, &palette), 80, 24);
        assert!(text.contains("http://localhost:3000/login"));
    }

    #[test]
    fn test_confirm_wording() {
        let palette = Palette::for_theme(Theme::Dark);
        let one = render(Dialog::confirm(&MutationTarget::One("1".into()), &palette), 80, 24);
        assert!(one.contains("Delete this conversation?"));
        let all = render(Dialog::confirm(&MutationTarget::All, &palette), 80, 24);
        assert!(all.contains("Delete all conversations?"));
    }

    #[test]
    fn test_committing_wording() {
        let palette = Palette::for_theme(Theme::Dark);
        let text = render(Dialog::committing(&MutationTarget::All, &palette), 80, 24);
        assert!(text.contains("Deleting all conversations"));
        assert!(text.contains("Please wait"));
    }

    #[test]
    fn test_toast_top_right() {
        let palette = Palette::for_theme(Theme::Dark);
        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        Toast {
            text: "Copied",
            palette: &palette,
        }
        .render(area, &mut buf);
        // "Copied" + borders and padding = 10 wide, one column from the right edge
        assert_eq!(buf[Position::new(49, 1)].symbol(), "╭");
        assert_eq!(buf[Position::new(51, 2)].symbol(), "C");
    }
}
