//! Font run bookkeeping for [`MemoryDocument`](super::MemoryDocument).
//!
//! A run list covers the text exactly: run lengths sum to the text's byte
//! length, no run is empty, and neighbouring runs never share a font.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::{Font, StyledRun};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontRun {
    pub len: usize,
    pub font: Font,
}

/// Total byte length covered by `runs`.
pub fn covered_len(runs: &[FontRun]) -> usize {
    runs.iter().map(|r| r.len).sum()
}

/// Font of the byte at `offset`, if any run covers it.
pub fn font_at(runs: &[FontRun], offset: usize) -> Option<&Font> {
    let mut pos = 0;
    for run in runs {
        if offset < pos + run.len {
            return Some(&run.font);
        }
        pos += run.len;
    }
    None
}

/// Ensures a run boundary at `offset`, returning the index of the run that
/// starts there (or `runs.len()` at the end).
fn split_at(runs: &mut Vec<FontRun>, offset: usize) -> usize {
    let mut pos = 0;
    for i in 0..runs.len() {
        if pos == offset {
            return i;
        }
        let end = pos + runs[i].len;
        if offset < end {
            let tail = FontRun {
                len: end - offset,
                font: runs[i].font.clone(),
            };
            runs[i].len = offset - pos;
            runs.insert(i + 1, tail);
            return i + 1;
        }
        pos = end;
    }
    runs.len()
}

/// Drops empty runs and merges neighbours with the same font.
fn normalize(runs: &mut Vec<FontRun>) {
    runs.retain(|r| r.len > 0);
    let mut merged: Vec<FontRun> = Vec::with_capacity(runs.len());
    for run in runs.drain(..) {
        match merged.last_mut() {
            Some(last) if last.font == run.font => last.len += run.len,
            _ => merged.push(run),
        }
    }
    *runs = merged;
}

pub fn insert(runs: &mut Vec<FontRun>, at: usize, len: usize, font: Font) {
    let idx = split_at(runs, at);
    runs.insert(idx, FontRun { len, font });
    normalize(runs);
}

pub fn delete(runs: &mut Vec<FontRun>, range: Range<usize>) {
    let first = split_at(runs, range.start);
    let last = split_at(runs, range.end);
    runs.drain(first..last);
    normalize(runs);
}

pub fn set_font(runs: &mut Vec<FontRun>, range: Range<usize>, font: &Font) {
    let first = split_at(runs, range.start);
    let last = split_at(runs, range.end);
    for run in &mut runs[first..last] {
        run.font = font.clone();
    }
    normalize(runs);
}

/// Distinct fonts used inside `range`, in order of appearance.
pub fn fonts_in(runs: &[FontRun], range: Range<usize>) -> Vec<&Font> {
    let mut out: Vec<&Font> = Vec::new();
    let mut pos = 0;
    for run in runs {
        let end = pos + run.len;
        if end > range.start && pos < range.end && !out.contains(&&run.font) {
            out.push(&run.font);
        }
        pos = end;
    }
    out
}

pub fn to_styled(runs: &[FontRun]) -> Vec<StyledRun> {
    let mut pos = 0;
    runs.iter()
        .map(|run| {
            let styled = StyledRun {
                range: pos..pos + run.len,
                font: run.font.clone(),
            };
            pos += run.len;
            styled
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn inter() -> Font {
        Font::new("Inter", "Regular")
    }

    fn bold() -> Font {
        Font::new("Inter", "Bold")
    }

    fn run(len: usize, font: Font) -> FontRun {
        FontRun { len, font }
    }

    #[test]
    fn insert_splits_and_merges() {
        let mut runs = vec![run(10, inter())];

        insert(&mut runs, 4, 3, bold());
        assert_eq!(runs, vec![run(4, inter()), run(3, bold()), run(6, inter())]);

        // Same font as the neighbours collapses back into one run
        set_font(&mut runs, 4..7, &inter());
        assert_eq!(runs, vec![run(13, inter())]);
    }

    #[test]
    fn delete_across_runs() {
        let mut runs = vec![run(3, inter()), run(3, bold()), run(3, inter())];

        delete(&mut runs, 2..7);
        assert_eq!(runs, vec![run(4, inter())]);
        assert_eq!(covered_len(&runs), 4);
    }

    #[test]
    fn font_at_and_fonts_in() {
        let runs = vec![run(2, inter()), run(2, bold())];

        assert_eq!(font_at(&runs, 1), Some(&inter()));
        assert_eq!(font_at(&runs, 2), Some(&bold()));
        assert_eq!(font_at(&runs, 4), None);
        assert_eq!(fonts_in(&runs, 0..2), vec![&inter()]);
        assert_eq!(fonts_in(&runs, 1..3), vec![&inter(), &bold()]);
    }

    #[test]
    fn insert_at_end_appends() {
        let mut runs = vec![run(2, inter())];
        insert(&mut runs, 2, 2, bold());
        assert_eq!(to_styled(&runs)[1].range, 2..4);
    }
}
