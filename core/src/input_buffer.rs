//! Edit buffer with cursor tracking for symbol input.
//!
//! The buffer stores the raw characters typed so far (e.g. "smi") and a
//! cursor counted in characters. Every mutation keeps
//! `0 <= cursor <= len()`; moves past either end are clamped.

/// Input buffer tracking raw input and cursor position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    chars: Vec<char>,
    cursor: usize, // Char offset, not byte offset
}

impl InputBuffer {
    /// Create a new empty input buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the raw input text.
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    /// Get the cursor position (char offset).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length of the buffer in chars.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Clear the buffer and reset cursor.
    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    /// Insert a character at the cursor position and step past it.
    pub fn insert_char(&mut self, ch: char) {
        self.chars.insert(self.cursor, ch);
        self.cursor += 1;
    }

    /// Insert a string at the cursor position.
    pub fn insert_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.insert_char(ch);
        }
    }

    /// Delete the character before the cursor (backspace).
    /// Returns true if a character was deleted.
    pub fn delete_before(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        true
    }

    /// Delete the character under the cursor (delete key).
    /// Returns true if a character was deleted.
    pub fn delete_after(&mut self) -> bool {
        if self.cursor >= self.chars.len() {
            return false;
        }
        self.chars.remove(self.cursor);
        true
    }

    /// Move cursor one character left. Returns true if it moved.
    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Move cursor one character right. Returns true if it moved.
    pub fn move_right(&mut self) -> bool {
        if self.cursor >= self.chars.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.chars.len();
    }

    /// Set the cursor, clamped to the end of the buffer.
    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos.min(self.chars.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_insert_at_cursor() {
        let mut buf = InputBuffer::new();
        buf.insert_str("fre");
        buf.move_left();
        buf.move_left();
        buf.insert_char('i');
        assert_eq!(buf.text(), "fire");
        assert_eq!(buf.cursor(), 2);
    }

    #[test]
    fn test_delete_before_and_after() {
        let mut buf = InputBuffer::new();
        buf.insert_str("abc");
        buf.move_left();
        assert!(buf.delete_before());
        assert_eq!(buf.text(), "ac");
        assert_eq!(buf.cursor(), 1);

        assert!(buf.delete_after());
        assert_eq!(buf.text(), "a");
        assert_eq!(buf.cursor(), 1);

        // Nothing under the cursor at the end
        assert!(!buf.delete_after());
        buf.move_to_start();
        assert!(!buf.delete_before());
        assert_eq!(buf.text(), "a");
    }

    #[test]
    fn test_cursor_counts_chars() {
        let mut buf = InputBuffer::new();
        buf.insert_str("é🔥");
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.cursor(), 2);
        buf.delete_before();
        assert_eq!(buf.text(), "é");
    }

    #[test]
    fn test_moves_clamp() {
        let mut buf = InputBuffer::new();
        assert!(!buf.move_left());
        assert!(!buf.move_right());
        buf.insert_str("ab");
        assert!(!buf.move_right());
        buf.move_to_start();
        assert!(!buf.move_left());
        buf.set_cursor(99);
        assert_eq!(buf.cursor(), 2);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(char),
        Backspace,
        Delete,
        Left,
        Right,
        Home,
        End,
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            proptest::char::range('a', 'z').prop_map(Op::Insert),
            Just(Op::Backspace),
            Just(Op::Delete),
            Just(Op::Left),
            Just(Op::Right),
            Just(Op::Home),
            Just(Op::End),
        ]
    }

    proptest! {
        /// Cursor stays within [0, len] after every operation.
        #[test]
        fn prop_cursor_within_bounds(ops in prop::collection::vec(arb_op(), 0..64)) {
            let mut buf = InputBuffer::new();
            for op in ops {
                match op {
                    Op::Insert(c) => buf.insert_char(c),
                    Op::Backspace => { buf.delete_before(); }
                    Op::Delete => { buf.delete_after(); }
                    Op::Left => { buf.move_left(); }
                    Op::Right => { buf.move_right(); }
                    Op::Home => buf.move_to_start(),
                    Op::End => buf.move_to_end(),
                }
                prop_assert!(buf.cursor() <= buf.len());
                prop_assert_eq!(buf.text().chars().count(), buf.len());
            }
        }
    }
}
