use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::util::text;

/// Fold Shift into the key code so bindings can match on the character alone.
pub(super) fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
    {
        key.code = KeyCode::Char(c.to_ascii_uppercase());
        key.modifiers.remove(KeyModifiers::SHIFT);
    }
    key
}

pub(super) fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

/// Apply a line-editing key to `buffer`. Returns false when the key is not an
/// editing key, so the caller can treat it as a command.
pub(super) fn edit_text(buffer: &mut String, cursor: &mut usize, key: KeyEvent) -> bool {
    *cursor = (*cursor).min(buffer.len());
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('a') if ctrl => *cursor = 0,
        KeyCode::Char('e') if ctrl => *cursor = buffer.len(),
        KeyCode::Char('w') if ctrl => {
            let start = text::word_start_before(buffer, *cursor);
            buffer.replace_range(start..*cursor, "");
            *cursor = start;
        }
        KeyCode::Char('u') if ctrl => {
            buffer.replace_range(..*cursor, "");
            *cursor = 0;
        }
        KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => return false,
        KeyCode::Char(c) => {
            buffer.insert(*cursor, c);
            *cursor += c.len_utf8();
        }
        KeyCode::Backspace => {
            let start = text::prev_boundary(buffer, *cursor);
            buffer.replace_range(start..*cursor, "");
            *cursor = start;
        }
        KeyCode::Delete => {
            let end = text::next_boundary(buffer, *cursor);
            buffer.replace_range(*cursor..end, "");
        }
        KeyCode::Left => *cursor = text::prev_boundary(buffer, *cursor),
        KeyCode::Right => *cursor = text::next_boundary(buffer, *cursor),
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = buffer.len(),
        _ => return false,
    }
    true
}
