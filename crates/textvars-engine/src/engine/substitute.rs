use std::collections::BTreeMap;

use super::backup::{Backup, RestoreRecord, discard_backup, save_backup};
use super::fonts::{apply_font, capture_font, element_fonts, preload};
use super::{EngineError, Substitution};
use crate::host::{ElementId, Font, TextHost};
use crate::scan::scan;
use crate::settings::DocumentSettings;
use crate::variables::{VariableStore, resolve};

/// One placeholder replacement planned for a single pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementOp {
    pub original_start: usize,
    pub remove_length: usize,
    pub insert_text: String,
    pub placeholder_text: String,
    pub is_icon_class: bool,
    pub captured_font: Option<Font>,
}

/// Computes where each resolved value will sit once every replacement has
/// been applied.
///
/// `ops` are in scan order. Each record's start is the op's original start
/// shifted by the net length change of all earlier ops.
pub fn plan_records(ops: &[ReplacementOp]) -> Vec<RestoreRecord> {
    let mut shift: isize = 0;
    ops.iter()
        .map(|op| {
            let start = op.original_start.saturating_add_signed(shift);
            shift += op.insert_text.len() as isize - op.remove_length as isize;
            RestoreRecord {
                start,
                value_length: op.insert_text.len(),
                placeholder_text: op.placeholder_text.clone(),
                captured_font: op.captured_font.clone(),
            }
        })
        .collect()
}

/// Replaces every resolvable placeholder in the element with its value.
///
/// Unresolvable placeholders stay as they are. When nothing is replaced any
/// stale backup is cleared, so it can never be replayed onto unrelated text.
/// Otherwise a fresh backup is written before the text is touched.
///
/// Font failures only cost styling; text edits that fail abort the pass
/// with an [`EngineError`].
pub fn substitute<H, V>(
    host: &mut H,
    vars: &mut V,
    id: &ElementId,
    settings: &DocumentSettings,
) -> Result<Substitution, EngineError>
where
    H: TextHost + ?Sized,
    V: VariableStore + ?Sized,
{
    let text = host.text(id)?;
    let matches = scan(&text);
    if matches.is_empty() {
        discard_backup(host, id);
        return Ok(Substitution::Unchanged);
    }

    let mut ops = Vec::new();
    let mut snapshot = BTreeMap::new();
    for found in matches {
        let Some(value) = resolve(vars, &found.key, &settings.collection_name, id) else {
            continue;
        };
        log::debug!("{id}: {} -> {value:?}", found.raw_text);
        snapshot.insert(found.key.clone(), value.clone());
        ops.push(ReplacementOp {
            original_start: found.start_offset,
            remove_length: found.matched_length,
            is_icon_class: found.is_icon_class(),
            captured_font: capture_font(host, id, found.start_offset),
            insert_text: value,
            placeholder_text: found.raw_text,
        });
    }

    if ops.is_empty() {
        discard_backup(host, id);
        return Ok(Substitution::Unchanged);
    }

    let records = plan_records(&ops);

    let current_fonts = element_fonts(host, id)?;
    preload(host, current_fonts);
    let icon_font = settings.icon_font();
    let icon_ready = ops.iter().any(|op| op.is_icon_class)
        && !preload(host, [icon_font.clone()]).is_empty();

    let backup = Backup::new(text, snapshot.clone(), &settings.collection_name, records);
    if let Err(e) = save_backup(host, id, &backup) {
        log::warn!("Failed to save backup of {id}: {e}");
    }

    // Right to left: offsets of ops not yet applied stay valid
    for (applied, op) in ops.iter().rev().enumerate() {
        let at = op.original_start;
        if let Err(e) = host.insert_text(id, at, &op.insert_text) {
            if applied == 0 {
                // Text is untouched, so the backup would describe nothing
                discard_backup(host, id);
            }
            return Err(e.into());
        }

        let inserted = at..at + op.insert_text.len();
        let font = if op.is_icon_class && icon_ready {
            Some(&icon_font)
        } else {
            op.captured_font.as_ref()
        };
        if let Some(font) = font {
            apply_font(host, id, inserted.clone(), font);
        }

        host.delete_text(id, inserted.end..inserted.end + op.remove_length)?;
    }

    log::info!("Substituted {} placeholder(s) in {id}", ops.len());
    Ok(Substitution::Changed { snapshot })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::backup::has_backup;
    use crate::host::MemoryDocument;
    use crate::variables::MemoryVariableStore;
    use pretty_assertions::assert_eq;

    fn op(start: usize, remove: usize, insert: &str) -> ReplacementOp {
        ReplacementOp {
            original_start: start,
            remove_length: remove,
            insert_text: insert.to_string(),
            placeholder_text: "@".repeat(remove),
            is_icon_class: false,
            captured_font: None,
        }
    }

    #[test]
    fn records_shift_by_earlier_length_changes() {
        // "@a @bb" with a -> "XXXX", bb -> "Y"
        let records = plan_records(&[op(0, 2, "XXXX"), op(3, 3, "Y")]);

        assert_eq!(records[0].start, 0);
        assert_eq!(records[0].value_length, 4);
        assert_eq!(records[1].start, 5);
        assert_eq!(records[1].value_length, 1);
    }

    #[test]
    fn shrinking_values_shift_left() {
        let records = plan_records(&[op(2, 10, ""), op(20, 5, "abc"), op(30, 2, "z")]);

        let starts: Vec<usize> = records.iter().map(|r| r.start).collect();
        assert_eq!(starts, vec![2, 10, 18]);
    }

    #[test]
    fn refused_first_edit_leaves_no_backup() {
        let mut doc = MemoryDocument::new();
        let id = doc.add_text("Label", "Hi @name", Font::new("Inter", "Regular"));
        let mut vars = MemoryVariableStore::new();
        vars.set_string("Text Variables", "name", "Ada");
        doc.limit_edits(0);

        let result = substitute(&mut doc, &mut vars, &id, &DocumentSettings::default());

        assert!(result.is_err());
        assert_eq!(doc.text(&id).unwrap(), "Hi @name");
        assert!(!has_backup(&doc, &id));
    }
}
