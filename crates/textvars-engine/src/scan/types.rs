use serde::{Deserialize, Serialize};

/// Delimiters of the placeholder grammar.
pub struct Placeholder;

impl Placeholder {
    pub const SIGIL: u8 = b'@';
    pub const SEPARATOR: u8 = b'.';
    /// Keys starting with this prefix are rendered with the icon font.
    pub const ICON_PREFIX: &'static str = "icon/";

    /// Returns true for bytes allowed inside a path segment.
    pub fn is_segment_byte(b: u8) -> bool {
        b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'/')
    }
}

/// A placeholder found in a text string.
///
/// Offsets are byte positions in the string that was scanned, not in any
/// text produced later by rewriting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderMatch {
    /// Path without the leading `@`.
    pub key: String,
    pub start_offset: usize,
    pub matched_length: usize,
    /// Full matched text including the leading `@`.
    pub raw_text: String,
}

impl PlaceholderMatch {
    /// Byte range of the whole placeholder.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start_offset..self.start_offset + self.matched_length
    }

    pub fn is_icon_class(&self) -> bool {
        self.key.starts_with(Placeholder::ICON_PREFIX)
    }
}
