//! # Session
//!
//! Runtime state shared by the selection handler and the message handler:
//! the document settings, the feature flag, the last focused text element
//! and the guard that keeps passes from overlapping.
//!
//! Selecting a text element restores its placeholders so the user edits the
//! `@key` form; leaving it substitutes the values back in.

use std::cell::Cell;
use std::rc::Rc;

use crate::engine::{restore, substitute};
use crate::host::{ElementId, TextHost};
use crate::protocol::{ElementResult, RestoreResult, SettingsUpdate};
use crate::settings::DocumentSettings;
use crate::variables::VariableStore;

/// What a selection change did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The feature is off; nothing was touched
    Disabled,
    /// Another pass was in flight; the event was dropped
    Busy,
    Handled {
        /// Element left behind whose placeholders were substituted
        substituted: Option<ElementId>,
        /// Newly focused element whose placeholders were restored
        restored: Option<ElementId>,
    },
}

/// Marks a pass in flight until dropped.
#[derive(Debug)]
pub struct PassGuard {
    flag: Rc<Cell<bool>>,
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

#[derive(Debug)]
pub struct Session {
    settings: DocumentSettings,
    enabled: bool,
    last_focused: Option<ElementId>,
    processing: Rc<Cell<bool>>,
}

impl Session {
    pub fn new(settings: DocumentSettings, enabled: bool) -> Self {
        Self {
            settings,
            enabled,
            last_focused: None,
            processing: Rc::new(Cell::new(false)),
        }
    }

    /// Session for the host's document, using its persisted settings when
    /// it has any.
    pub fn load<H: TextHost + ?Sized>(host: &H, defaults: DocumentSettings, enabled: bool) -> Self {
        Self::new(DocumentSettings::load(host, defaults), enabled)
    }

    pub fn settings(&self) -> &DocumentSettings {
        &self.settings
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            log::info!("Text variables {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
    }

    pub fn last_focused(&self) -> Option<&ElementId> {
        self.last_focused.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.processing.get()
    }

    /// Claims the processing flag, or `None` while another pass holds it.
    pub fn try_begin(&self) -> Option<PassGuard> {
        if self.processing.replace(true) {
            return None;
        }
        Some(PassGuard {
            flag: Rc::clone(&self.processing),
        })
    }

    /// Applies `update` and persists the document settings when they changed.
    pub fn update_settings<H: TextHost + ?Sized>(&mut self, host: &mut H, update: &SettingsUpdate) {
        if let Some(enabled) = update.enabled {
            self.set_enabled(enabled);
        }
        if update.apply_to(&mut self.settings) {
            log::info!("Settings now {:?}", self.settings);
            self.settings.save(host);
        }
    }

    /// Reacts to a settled selection.
    ///
    /// The element that lost focus gets its placeholders substituted and a
    /// newly focused text element gets them restored. Only a selection of
    /// exactly one text element counts as focus.
    pub fn on_selection_changed<H, V>(
        &mut self,
        host: &mut H,
        vars: &mut V,
        selection: &[ElementId],
    ) -> Transition
    where
        H: TextHost + ?Sized,
        V: VariableStore + ?Sized,
    {
        // Returns before tracking focus, so focus changes while disabled go unseen
        if !self.enabled {
            return Transition::Disabled;
        }
        let Some(_guard) = self.try_begin() else {
            log::debug!("Selection change dropped while busy");
            return Transition::Busy;
        };

        let new_id = match selection {
            [only] if host.is_text_element(only) => Some(only.clone()),
            _ => None,
        };
        let previous = self.last_focused.take();

        let mut substituted = None;
        if let Some(prev) = previous.as_ref().filter(|prev| new_id.as_ref() != Some(*prev)) {
            match substitute(host, vars, prev, &self.settings) {
                Ok(outcome) if outcome.is_changed() => substituted = Some(prev.clone()),
                Ok(_) => {}
                Err(e) => log::warn!("Substitution of {prev} failed: {e}"),
            }
        }

        let mut restored = None;
        if let Some(new) = new_id.as_ref().filter(|new| previous.as_ref() != Some(*new)) {
            match restore(host, new) {
                Ok(outcome) if outcome.is_restored() => restored = Some(new.clone()),
                Ok(_) => {}
                Err(e) => log::warn!("Restoration of {new} failed: {e}"),
            }
        }

        self.last_focused = new_id;
        Transition::Handled {
            substituted,
            restored,
        }
    }

    /// Substitutes every selected text element. Empty while busy.
    pub fn run_on_selection<H, V>(&mut self, host: &mut H, vars: &mut V) -> Vec<ElementResult>
    where
        H: TextHost + ?Sized,
        V: VariableStore + ?Sized,
    {
        let Some(_guard) = self.try_begin() else {
            log::warn!("Run on selection ignored while busy");
            return Vec::new();
        };

        let mut results = Vec::new();
        for id in selected_text(host) {
            let changed = match substitute(host, vars, &id, &self.settings) {
                Ok(outcome) => outcome.is_changed(),
                Err(e) => {
                    log::warn!("Substitution of {id} failed: {e}");
                    false
                }
            };
            results.push(ElementResult { id, changed });
        }
        results
    }

    /// Restores every selected text element. Empty while busy.
    pub fn restore_on_selection<H: TextHost + ?Sized>(&mut self, host: &mut H) -> Vec<RestoreResult> {
        let Some(_guard) = self.try_begin() else {
            log::warn!("Restore on selection ignored while busy");
            return Vec::new();
        };

        let mut results = Vec::new();
        for id in selected_text(host) {
            let restored = match restore(host, &id) {
                Ok(outcome) => outcome.is_restored(),
                Err(e) => {
                    log::warn!("Restoration of {id} failed: {e}");
                    false
                }
            };
            results.push(RestoreResult { id, restored });
        }
        results
    }
}

fn selected_text<H: TextHost + ?Sized>(host: &H) -> Vec<ElementId> {
    host.selection()
        .into_iter()
        .filter(|id| host.is_text_element(id))
        .collect()
}
