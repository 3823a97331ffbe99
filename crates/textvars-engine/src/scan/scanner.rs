use super::{
    cursor::Cursor,
    types::{Placeholder, PlaceholderMatch},
};

/// Scans `text` for `@key` placeholders.
///
/// Matching is greedy, left to right and non-overlapping: after a match the
/// scan resumes at the first byte past it. A key is one or more segments of
/// `[A-Za-z0-9_/-]` joined by `.`; a trailing `.` is not part of the key.
///
/// # Returns
/// The matches in scan order. An empty vector means there is nothing to
/// substitute.
pub fn scan(text: &str) -> Vec<PlaceholderMatch> {
    let mut cur = Cursor::new(text);
    let mut out = vec![];

    while !cur.eof() {
        if let Some(found) = try_scan_placeholder(&mut cur) {
            out.push(found);
            continue;
        }
        cur.bump();
    }

    out
}

/// Attempts to scan a placeholder at the current position.
///
/// Returns `None` if not at `@` or if no segment byte follows it.
/// On failure, cursor position is restored.
fn try_scan_placeholder(cur: &mut Cursor<'_>) -> Option<PlaceholderMatch> {
    if cur.peek() != Some(Placeholder::SIGIL) {
        return None;
    }

    let saved = cur.clone();
    let start = cur.pos();
    cur.bump(); // @

    if cur.eat_while(Placeholder::is_segment_byte) == 0 {
        *cur = saved;
        return None;
    }

    // Only consume a separator that starts another segment
    while cur.peek() == Some(Placeholder::SEPARATOR)
        && cur.peek_at(1).is_some_and(Placeholder::is_segment_byte)
    {
        cur.bump(); // .
        cur.eat_while(Placeholder::is_segment_byte);
    }
    let end = cur.pos();

    Some(PlaceholderMatch {
        key: cur.slice(start + 1..end).to_string(),
        start_offset: start,
        matched_length: end - start,
        raw_text: cur.slice(start..end).to_string(),
    })
}
