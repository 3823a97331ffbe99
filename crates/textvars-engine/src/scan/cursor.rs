/// A byte cursor for placeholder scanning with position tracking.
///
/// Positions are byte offsets into the scanned string, which is never
/// mutated while a cursor is alive.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The string being scanned.
    pub s: &'a str,
    /// Current byte index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a new cursor at the start of `s`.
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    /// Returns the current byte position.
    pub fn pos(&self) -> usize {
        self.i
    }

    /// Returns true if at end of string.
    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    /// Peeks `n` bytes ahead of the current position.
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.s.as_bytes().get(self.i + n).copied()
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    /// Advances while `pred` holds, returning how many bytes were consumed.
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let start = self.i;
        while let Some(b) = self.peek() {
            if !pred(b) {
                break;
            }
            self.i += 1;
        }
        self.i - start
    }

    /// Slices the underlying string. Both ends must lie on char boundaries.
    pub fn slice(&self, range: std::ops::Range<usize>) -> &'a str {
        &self.s[range]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_basics() {
        let mut cur = Cursor::new("hello");
        assert_eq!(cur.pos(), 0);
        assert!(!cur.eof());
        assert_eq!(cur.peek(), Some(b'h'));
        assert_eq!(cur.bump(), Some(b'h'));
        assert_eq!(cur.pos(), 1);
    }

    #[test]
    fn empty_string_input() {
        let cur = Cursor::new("");
        assert!(cur.eof());
        assert_eq!(cur.peek(), None);
        assert_eq!(cur.pos(), 0);
    }

    #[test]
    fn peek_at_looks_ahead_without_advancing() {
        let cur = Cursor::new("a.b");
        assert_eq!(cur.peek_at(1), Some(b'.'));
        assert_eq!(cur.peek_at(3), None);
        assert_eq!(cur.pos(), 0);
    }

    #[test]
    fn eat_while_stops_at_first_mismatch() {
        let mut cur = Cursor::new("abc-1 rest");
        let eaten = cur.eat_while(|b| b.is_ascii_alphanumeric() || b == b'-');
        assert_eq!(eaten, 5);
        assert_eq!(cur.peek(), Some(b' '));
    }

    #[test]
    fn eat_while_at_eof_consumes_nothing() {
        let mut cur = Cursor::new("x");
        cur.bump();
        assert_eq!(cur.eat_while(|_| true), 0);
        assert!(cur.eof());
    }

    #[test]
    fn bump_at_eof_returns_none() {
        let mut cur = Cursor::new("x");
        assert_eq!(cur.bump(), Some(b'x'));
        assert_eq!(cur.bump(), None);
        assert_eq!(cur.bump(), None); // idempotent
    }

    #[test]
    fn slice_returns_borrowed_text() {
        let cur = Cursor::new("@key rest");
        assert_eq!(cur.slice(1..4), "key");
    }
}
