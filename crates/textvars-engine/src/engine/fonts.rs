use std::collections::BTreeSet;

use crate::host::{ElementId, Font, FontSpec, HostError, TextHost};

/// Loads every distinct font, returning the ones that loaded. Failures are
/// logged; the affected text just cannot be styled with that font.
pub(crate) fn preload<H: TextHost + ?Sized>(
    host: &mut H,
    fonts: impl IntoIterator<Item = Font>,
) -> BTreeSet<Font> {
    let wanted: BTreeSet<Font> = fonts.into_iter().collect();
    let mut loaded = BTreeSet::new();
    for font in wanted {
        match host.load_font(&font) {
            Ok(()) => {
                loaded.insert(font);
            }
            Err(e) => log::warn!("Font load failed: {e}"),
        }
    }
    loaded
}

/// Fonts used by the element's styled runs.
pub(crate) fn element_fonts<H: TextHost + ?Sized>(
    host: &H,
    id: &ElementId,
) -> Result<Vec<Font>, HostError> {
    Ok(host
        .styled_runs(id)?
        .into_iter()
        .map(|run| run.font)
        .collect())
}

/// Font of the single character at byte `at`, when it is uniform.
pub(crate) fn capture_font<H: TextHost + ?Sized>(host: &H, id: &ElementId, at: usize) -> Option<Font> {
    match host.range_font(id, at..at + 1) {
        Ok(FontSpec::Uniform(font)) => Some(font),
        Ok(FontSpec::Mixed) => None,
        Err(e) => {
            log::warn!("Cannot read font at {at} in {id}: {e}");
            None
        }
    }
}

/// Applies `font` to `range`, logging a refusal instead of failing the pass.
pub(crate) fn apply_font<H: TextHost + ?Sized>(
    host: &mut H,
    id: &ElementId,
    range: std::ops::Range<usize>,
    font: &Font,
) {
    if range.is_empty() {
        return;
    }
    if let Err(e) = host.set_range_font(id, range.clone(), font) {
        log::warn!(
            "Could not apply {font} to {}..{} in {id}: {e}",
            range.start,
            range.end
        );
    }
}
