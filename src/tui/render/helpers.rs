use ratatui::layout::Rect;
use ratatui::text::Span;

use crate::util::text;

/// Total display width of a slice of spans
pub(super) fn spans_width(spans: &[Span]) -> usize {
    spans.iter().map(|s| text::display_width(&s.content)).sum()
}

/// A `width` x `height` rectangle centered in `area`, shrunk to fit
pub(super) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

/// The part of `s` to show in a field `cells` wide so the cursor stays
/// visible, plus the cursor column relative to the returned text.
pub(super) fn scroll_to_cursor(s: &str, cursor: usize, cells: usize) -> (String, usize) {
    let cells = cells.max(1);
    let mut start = 0;
    while text::cursor_col(s, cursor) - text::cursor_col(s, start) >= cells && start < cursor {
        start = text::next_boundary(s, start);
    }
    let shown = text::truncate_to_width(&s[start..], cells);
    let col = text::cursor_col(s, cursor) - text::cursor_col(s, start);
    (shown, col)
}
