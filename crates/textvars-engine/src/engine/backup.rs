//! Per-element backups that undo the last substitution.
//!
//! A backup is stored as JSON in the element's data under [`BACKUP_KEY`].
//! It exists exactly while the element shows substituted text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::host::{ElementId, Font, HostError, TextHost};

pub const BACKUP_KEY: &str = "textvars.backup";

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("Backup is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Host(#[from] HostError),
}

/// How to put one placeholder back.
///
/// `start` and `value_length` locate the resolved value in the text as it
/// reads after substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreRecord {
    pub start: usize,
    pub value_length: usize,
    pub placeholder_text: String,
    pub captured_font: Option<Font>,
}

impl RestoreRecord {
    /// `None` when the span does not fit in a `usize`.
    pub fn value_range(&self) -> Option<std::ops::Range<usize>> {
        let end = self.start.checked_add(self.value_length)?;
        Some(self.start..end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    /// Text before substitution
    pub original_text: String,
    /// Resolved value per placeholder key
    #[serde(default)]
    pub snapshot: BTreeMap<String, String>,
    #[serde(default)]
    pub collection_name: String,
    /// Missing in backups written before per-placeholder records existed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<RestoreRecord>>,
    /// Unix milliseconds
    #[serde(default)]
    pub timestamp: i64,
}

impl Backup {
    pub fn new(
        original_text: String,
        snapshot: BTreeMap<String, String>,
        collection_name: &str,
        records: Vec<RestoreRecord>,
    ) -> Self {
        Self {
            original_text,
            snapshot,
            collection_name: collection_name.to_string(),
            records: Some(records),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Reads the element's backup. An empty attachment means no backup.
pub fn load_backup<H: TextHost + ?Sized>(
    host: &H,
    id: &ElementId,
) -> Result<Option<Backup>, BackupError> {
    let raw = host.node_data(id, BACKUP_KEY)?;
    if raw.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(&raw)?))
}

pub fn save_backup<H: TextHost + ?Sized>(
    host: &mut H,
    id: &ElementId,
    backup: &Backup,
) -> Result<(), BackupError> {
    let raw = serde_json::to_string(backup)?;
    host.set_node_data(id, BACKUP_KEY, &raw)?;
    Ok(())
}

pub fn clear_backup<H: TextHost + ?Sized>(host: &mut H, id: &ElementId) -> Result<(), BackupError> {
    host.set_node_data(id, BACKUP_KEY, "")?;
    Ok(())
}

pub fn has_backup<H: TextHost + ?Sized>(host: &H, id: &ElementId) -> bool {
    host.node_data(id, BACKUP_KEY)
        .map(|raw| !raw.is_empty())
        .unwrap_or(false)
}

/// Clears the backup, logging rather than propagating a failure.
pub(crate) fn discard_backup<H: TextHost + ?Sized>(host: &mut H, id: &ElementId) {
    if let Err(e) = clear_backup(host, id) {
        log::warn!("Failed to clear backup of {id}: {e}");
    }
}
