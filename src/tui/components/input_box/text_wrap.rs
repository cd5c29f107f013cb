//! Wrapping arithmetic for the InputBox. No state here.

use unicode_width::UnicodeWidthStr;

/// Border (2) + padding (2) consumed horizontally by the bordered block
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders consumed vertically
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Maximum visible content lines before internal scrolling kicks in
pub(super) const MAX_VISIBLE_LINES: u16 = 4;
/// Offset from area edge to content (border + left padding)
pub(super) const CONTENT_OFFSET: u16 = 2;

pub(super) fn wrap_options(inner_width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(inner_width.max(1) as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

pub(super) fn inner_width(area_width: u16) -> u16 {
    area_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Wrapped line count, counting a trailing newline as an extra empty line.
pub(super) fn wrap_line_count(text: &str, width: u16) -> u16 {
    if width == 0 || text.is_empty() {
        return 1;
    }
    let lines = textwrap::wrap(text, wrap_options(width));
    let mut count = (lines.len() as u16).max(1);
    if text.ends_with('\n') && !lines.last().is_some_and(|l| l.is_empty()) {
        count += 1;
    }
    count
}

/// (row, column) of the end of `before_cursor` once wrapped to `width`.
pub(super) fn cursor_cell(before_cursor: &str, width: u16) -> (u16, u16) {
    if width == 0 || before_cursor.is_empty() {
        return (0, 0);
    }
    let row = wrap_line_count(before_cursor, width).saturating_sub(1);

    // Column on the current logical line. textwrap drops trailing spaces, so
    // measure the raw tail after the last full wrapped segment instead.
    let logical = before_cursor
        .rsplit_once('\n')
        .map_or(before_cursor, |(_, tail)| tail);
    let segments = textwrap::wrap(logical, wrap_options(width));
    let consumed: usize = segments
        .iter()
        .take(segments.len().saturating_sub(1))
        .map(|s| s.width())
        .sum();
    let col = logical.width().saturating_sub(consumed) as u16;
    (row, col.min(width))
}

pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map_or(0, |(i, _)| i)
}

pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len(), |c| pos + c.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_line_count_trailing_newline() {
        assert_eq!(wrap_line_count("", 10), 1);
        assert_eq!(wrap_line_count("abc", 10), 1);
        assert_eq!(wrap_line_count("abc\n", 10), 2);
        assert_eq!(wrap_line_count("aaaa bbbb cccc", 5), 3);
    }

    #[test]
    fn test_cursor_cell_single_line() {
        assert_eq!(cursor_cell("", 10), (0, 0));
        assert_eq!(cursor_cell("abc", 10), (0, 3));
        assert_eq!(cursor_cell("abc ", 10), (0, 4));
    }

    #[test]
    fn test_cursor_cell_after_newline() {
        assert_eq!(cursor_cell("abc\n", 10), (1, 0));
        assert_eq!(cursor_cell("abc\nde", 10), (1, 2));
    }

    #[test]
    fn test_char_boundaries_multibyte() {
        let s = "aé b";
        assert_eq!(next_char_boundary(s, 1), 3);
        assert_eq!(prev_char_boundary(s, 3), 1);
        assert_eq!(next_char_boundary(s, s.len()), s.len());
        assert_eq!(prev_char_boundary(s, 0), 0);
    }
}
