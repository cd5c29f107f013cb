//! Color palettes for the two themes.

use ratatui::style::{Color, Modifier, Style};

use crate::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub question: Color,
    pub answer: Color,
    pub label: Color,
    pub example: Color,
    pub accent: Color,
    pub danger: Color,
    pub selection: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                background: Color::Reset,
                text: Color::White,
                muted: Color::DarkGray,
                question: Color::Cyan,
                answer: Color::Green,
                label: Color::Yellow,
                example: Color::Magenta,
                accent: Color::LightBlue,
                danger: Color::Red,
                selection: Color::DarkGray,
            },
            Theme::Light => Self {
                background: Color::White,
                text: Color::Black,
                muted: Color::Gray,
                question: Color::Blue,
                answer: Color::Black,
                label: Color::Rgb(150, 90, 0),
                example: Color::Rgb(120, 40, 140),
                accent: Color::Blue,
                danger: Color::Red,
                selection: Color::Rgb(220, 220, 220),
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palettes_differ() {
        assert_ne!(Palette::for_theme(Theme::Dark), Palette::for_theme(Theme::Light));
    }
}
