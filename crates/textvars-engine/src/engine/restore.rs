use super::backup::{Backup, BackupError, RestoreRecord, discard_backup, load_backup};
use super::fonts::{apply_font, element_fonts, preload};
use super::{EngineError, Restoration};
use crate::host::{ElementId, Font, TextHost};

/// Puts the placeholders recorded in the element's backup back in place of
/// their values, then clears the backup.
///
/// Restoring is one-shot: without a backup this reports
/// [`Restoration::NotRestored`] and leaves the text alone. A backup that
/// cannot be read is discarded the same way.
pub fn restore<H>(host: &mut H, id: &ElementId) -> Result<Restoration, EngineError>
where
    H: TextHost + ?Sized,
{
    let backup = match load_backup(host, id) {
        Ok(Some(backup)) => backup,
        Ok(None) => return Ok(Restoration::NotRestored),
        Err(BackupError::Host(e)) => return Err(e.into()),
        Err(e) => {
            log::warn!("Discarding unreadable backup of {id}: {e}");
            discard_backup(host, id);
            return Ok(Restoration::NotRestored);
        }
    };

    let Backup {
        original_text,
        records,
        ..
    } = backup;

    let current_fonts = element_fonts(host, id)?;
    let Some(mut records) = records else {
        return restore_legacy(host, id, &original_text, current_fonts);
    };

    preload(
        host,
        current_fonts
            .into_iter()
            .chain(records.iter().filter_map(|r| r.captured_font.clone())),
    );

    records.sort_by(|a, b| b.start.cmp(&a.start));
    let mut restored = 0;
    for record in &records {
        match restore_record(host, id, record) {
            Ok(true) => restored += 1,
            Ok(false) => {}
            Err(e) => {
                // Records already replayed must never be replayed again
                discard_backup(host, id);
                return Err(e);
            }
        }
    }

    discard_backup(host, id);
    log::info!("Restored {restored} of {} placeholder(s) in {id}", records.len());
    Ok(Restoration::Restored)
}

/// Restores one record, returning `false` when its value no longer sits
/// where the record says.
fn restore_record<H: TextHost + ?Sized>(
    host: &mut H,
    id: &ElementId,
    record: &RestoreRecord,
) -> Result<bool, EngineError> {
    let text = host.text(id)?;
    let fits = record.value_range().is_some_and(|value| {
        value.end <= text.len()
            && text.is_char_boundary(value.start)
            && text.is_char_boundary(value.end)
    });
    if !fits {
        log::warn!(
            "Skipping {} in {id}: {}+{} is outside the current text",
            record.placeholder_text,
            record.start,
            record.value_length
        );
        return Ok(false);
    }

    let at = record.start;
    let inserted = at..at + record.placeholder_text.len();
    host.insert_text(id, at, &record.placeholder_text)?;
    if let Some(font) = &record.captured_font {
        apply_font(host, id, inserted.clone(), font);
    }
    host.delete_text(id, inserted.end..inserted.end + record.value_length)?;
    Ok(true)
}

/// Backups without records only know the whole original text.
fn restore_legacy<H: TextHost + ?Sized>(
    host: &mut H,
    id: &ElementId,
    original_text: &str,
    current_fonts: Vec<Font>,
) -> Result<Restoration, EngineError> {
    if original_text.is_empty() {
        log::warn!("Discarding empty legacy backup of {id}");
        discard_backup(host, id);
        return Ok(Restoration::NotRestored);
    }

    preload(host, current_fonts);
    host.replace_text(id, original_text)?;
    discard_backup(host, id);
    log::info!("Restored {id} from a legacy backup");
    Ok(Restoration::Restored)
}
