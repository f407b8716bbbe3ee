//! Line buffer
//!
//! The text being edited plus a 1-based cursor offset. Every editing operation
//! mutates the buffer and returns the escape sequence that mirrors the change
//! on the display, or `None` when the operation is a no-op.

use super::actions;

/// Insert `chars` into `text` at character index `idx` (clamped to the end).
pub fn insert_at(text: &mut Vec<char>, chars: &[char], idx: usize) {
    let idx = idx.min(text.len());
    text.splice(idx..idx, chars.iter().copied());
}

/// Remove the character at index `idx`, if any.
pub fn remove_at(text: &mut Vec<char>, idx: usize) -> Option<char> {
    if idx < text.len() {
        Some(text.remove(idx))
    } else {
        None
    }
}

/// Current line and cursor
///
/// Invariant: `1 <= cursor <= text.len() + 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct LineBuffer {
    text: Vec<char>,
    cursor: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            text: Vec::new(),
            cursor: 1,
        }
    }

    /// Build a buffer with the cursor at a given offset (clamped)
    pub fn with_text(text: &str, cursor: usize) -> Self {
        let text: Vec<char> = text.chars().collect();
        let cursor = cursor.clamp(1, text.len() + 1);
        Self { text, cursor }
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn chars(&self) -> &[char] {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// 1-based cursor offset
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Characters after the cursor
    pub fn tail(&self) -> Vec<char> {
        self.text[self.cursor - 1..].to_vec()
    }

    /// Empty the line and put the cursor at 1
    pub fn reset(&mut self) {
        self.text.clear();
        self.cursor = 1;
    }

    /// Replace the whole line, cursor at 1
    pub fn replace(&mut self, chars: Vec<char>) {
        self.text = chars;
        self.cursor = 1;
    }

    /// Splice characters in at the cursor without moving it
    pub fn insert_at_cursor(&mut self, chars: &[char]) {
        insert_at(&mut self.text, chars, self.cursor - 1);
    }

    /// Move the logical cursor forward without emitting anything
    pub fn advance(&mut self, n: usize) {
        self.cursor = (self.cursor + n).min(self.text.len() + 1);
    }

    /// Drop everything after the cursor without emitting anything
    pub fn truncate_at_cursor(&mut self) {
        self.text.truncate(self.cursor - 1);
    }

    /// Put the logical cursor at the end without emitting anything
    pub fn park_at_end(&mut self) {
        self.cursor = self.text.len() + 1;
    }

    pub fn move_left(&mut self) -> Option<String> {
        if self.cursor > 1 {
            self.cursor -= 1;
            Some(actions::cursor_back(1))
        } else {
            None
        }
    }

    pub fn move_right(&mut self) -> Option<String> {
        if self.cursor <= self.text.len() {
            self.cursor += 1;
            Some(actions::cursor_forward(1))
        } else {
            None
        }
    }

    pub fn move_to_start(&mut self) -> Option<String> {
        let distance = self.cursor - 1;
        if distance == 0 {
            return None;
        }
        self.cursor = 1;
        Some(actions::cursor_back(distance))
    }

    pub fn move_to_end(&mut self) -> Option<String> {
        let distance = self.text.len() + 1 - self.cursor;
        if distance == 0 {
            return None;
        }
        self.cursor = self.text.len() + 1;
        Some(actions::cursor_forward(distance))
    }

    /// Backspace
    pub fn delete_char_before_cursor(&mut self) -> Option<String> {
        if self.cursor == 1 {
            return None;
        }
        self.cursor -= 1;
        remove_at(&mut self.text, self.cursor - 1);
        Some(format!("{}{}", actions::cursor_back(1), actions::DELETE_CHAR))
    }

    pub fn delete_char_at_cursor(&mut self) -> Option<String> {
        remove_at(&mut self.text, self.cursor - 1).map(|_| actions::DELETE_CHAR.to_string())
    }

    /// Kill from the cursor to the end of the line.
    ///
    /// Only acts when more than one character follows the cursor; with exactly
    /// one trailing character this is a no-op.
    pub fn kill_to_end(&mut self) -> Option<String> {
        let n = self.text.len() + 1 - self.cursor;
        if n <= 1 {
            return None;
        }
        self.truncate_at_cursor();
        Some(actions::KILL_TO_EOL.to_string())
    }

    /// Kill the whole line and return the cursor to the start of the input
    pub fn kill_line(&mut self) -> Option<String> {
        let back = self.cursor - 1;
        self.reset();
        Some(format!("{}{}", actions::cursor_back(back), actions::KILL_LINE))
    }
}
