use serde::{Deserialize, Serialize};

use crate::host::{Font, TextHost};

/// Document key under which [`DocumentSettings`] are persisted.
pub const SETTINGS_KEY: &str = "textvars.settings";

/// Per-document defaults: which collection placeholders resolve against and
/// which font renders `icon/` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSettings {
    pub collection_name: String,
    pub icon_font_family: String,
    pub icon_font_style: String,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            collection_name: "Text Variables".to_string(),
            icon_font_family: "Material Symbols Outlined".to_string(),
            icon_font_style: "Regular".to_string(),
        }
    }
}

impl DocumentSettings {
    pub fn icon_font(&self) -> Font {
        Font::new(&self.icon_font_family, &self.icon_font_style)
    }

    /// Reads the document's settings, falling back to `defaults` when none
    /// are stored or the stored blob cannot be parsed.
    pub fn load<H: TextHost + ?Sized>(host: &H, defaults: DocumentSettings) -> Self {
        let raw = host.document_data(SETTINGS_KEY);
        if raw.is_empty() {
            return defaults;
        }
        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring unreadable document settings: {e}");
                defaults
            }
        }
    }

    pub fn save<H: TextHost + ?Sized>(&self, host: &mut H) {
        match serde_json::to_string(self) {
            Ok(raw) => host.set_document_data(SETTINGS_KEY, &raw),
            Err(e) => log::warn!("Failed to persist document settings: {e}"),
        }
    }
}
