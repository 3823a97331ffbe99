//! # Substitution and Restoration
//!
//! [`substitute`] swaps every resolvable `@placeholder` in a text element for
//! its value and records a [`Backup`]; [`restore`] replays that backup to
//! bring the placeholders back, fonts included.
//!
//! Both passes edit strictly right to left, so the offsets of everything not
//! yet edited never move. Text edits that fail surface as [`EngineError`];
//! font and persistence failures are logged and absorbed.

pub mod backup;
pub(crate) mod fonts;
pub mod restore;
pub mod substitute;

use std::collections::BTreeMap;

use crate::host::HostError;

pub use backup::{
    BACKUP_KEY, Backup, BackupError, RestoreRecord, clear_backup, has_backup, load_backup,
    save_backup,
};
pub use restore::restore;
pub use substitute::{ReplacementOp, plan_records, substitute};

/// Outcome of a substitution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitution {
    /// Nothing resolvable was found; any stale backup has been cleared
    Unchanged,
    /// Placeholders were replaced; `snapshot` maps each key to its value
    Changed { snapshot: BTreeMap<String, String> },
}

impl Substitution {
    pub fn is_changed(&self) -> bool {
        matches!(self, Substitution::Changed { .. })
    }
}

/// Outcome of a restoration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restoration {
    Restored,
    /// No usable backup was stored
    NotRestored,
}

impl Restoration {
    pub fn is_restored(&self) -> bool {
        matches!(self, Restoration::Restored)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Host(#[from] HostError),
}
