use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const ELLIPSIS: char = '\u{2026}';

/// Width of `s` in terminal cells
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to at most `max_cells` cells, ending with `…` when anything was dropped.
/// Never splits a grapheme cluster.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 0 {
        return String::new();
    }
    let budget = max_cells - 1;
    let mut used = 0;
    let mut out = String::new();
    for g in s.graphemes(true) {
        let w = display_width(g);
        if used + w > budget {
            break;
        }
        used += w;
        out.push_str(g);
    }
    out.push(ELLIPSIS);
    out
}

/// Truncate, then pad with spaces to exactly `cells` wide
pub fn pad_to_width(s: &str, cells: usize) -> String {
    let mut out = truncate_to_width(s, cells);
    let w = display_width(&out);
    out.extend(std::iter::repeat_n(' ', cells.saturating_sub(w)));
    out
}

// ---------------------------------------------------------------------------
// Cursor movement inside an edit buffer (byte offsets on grapheme boundaries)
// ---------------------------------------------------------------------------

/// Offset of the grapheme after the one at `offset`; `s.len()` at the end
pub fn next_boundary(s: &str, offset: usize) -> usize {
    if offset >= s.len() {
        return s.len();
    }
    s[offset..]
        .grapheme_indices(true)
        .nth(1)
        .map_or(s.len(), |(i, _)| offset + i)
}

/// Offset of the grapheme before `offset`; 0 at the start
pub fn prev_boundary(s: &str, offset: usize) -> usize {
    let offset = offset.min(s.len());
    s[..offset]
        .grapheme_indices(true)
        .next_back()
        .map_or(0, |(i, _)| i)
}

/// Start of the word before `offset`, skipping trailing whitespace first
pub fn word_start_before(s: &str, offset: usize) -> usize {
    let offset = offset.min(s.len());
    let graphemes: Vec<(usize, &str)> = s[..offset].grapheme_indices(true).collect();
    let is_space = |g: &str| g.chars().all(char::is_whitespace);

    let mut idx = graphemes.len();
    while idx > 0 && is_space(graphemes[idx - 1].1) {
        idx -= 1;
    }
    while idx > 0 && !is_space(graphemes[idx - 1].1) {
        idx -= 1;
    }
    graphemes.get(idx).map_or(offset, |(i, _)| *i)
}

/// Terminal column of the cursor at `offset`
pub fn cursor_col(s: &str, offset: usize) -> usize {
    display_width(&s[..offset.min(s.len())])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_counts_wide_chars() {
        assert_eq!(display_width("plan"), 4);
        assert_eq!(display_width("你好"), 4);
        assert_eq!(display_width("cafe\u{0301}"), 4);
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("Buy milk", 20), "Buy milk");
        assert_eq!(truncate_to_width("Buy milk", 8), "Buy milk");
        assert_eq!(truncate_to_width("Buy milk", 5), "Buy \u{2026}");
        assert_eq!(truncate_to_width("Buy milk", 1), "\u{2026}");
        assert_eq!(truncate_to_width("Buy milk", 0), "");
    }

    #[test]
    fn truncate_respects_wide_graphemes() {
        // 你 is 2 cells: 3 cells leave room for one of them plus the ellipsis
        assert_eq!(truncate_to_width("你好吗", 3), "你\u{2026}");
        assert_eq!(truncate_to_width("你好吗", 4), "你\u{2026}");
    }

    #[test]
    fn pad_fills_to_width() {
        assert_eq!(pad_to_width("ab", 4), "ab  ");
        assert_eq!(pad_to_width("abcdef", 4), "abc\u{2026}");
    }

    #[test]
    fn boundaries_step_over_clusters() {
        let s = "ae\u{0301}b";
        assert_eq!(next_boundary(s, 0), 1);
        assert_eq!(next_boundary(s, 1), 4);
        assert_eq!(next_boundary(s, s.len()), s.len());
        assert_eq!(prev_boundary(s, 4), 1);
        assert_eq!(prev_boundary(s, 0), 0);
    }

    #[test]
    fn word_start_skips_spaces() {
        assert_eq!(word_start_before("buy oat milk", 12), 8);
        assert_eq!(word_start_before("buy oat milk  ", 14), 8);
        assert_eq!(word_start_before("milk", 4), 0);
        assert_eq!(word_start_before("", 0), 0);
    }

    #[test]
    fn cursor_col_uses_cells() {
        assert_eq!(cursor_col("你好", 3), 2);
        assert_eq!(cursor_col("abc", 10), 3);
    }
}
