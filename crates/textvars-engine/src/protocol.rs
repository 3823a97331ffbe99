//! Messages exchanged with the surface that hosts the controls.
//!
//! Both directions are serde enums tagged by `"type"` with kebab-case names,
//! e.g. `{"type":"run-on-selection"}` or
//! `{"type":"set","enabled":false,"collectionName":"Brand"}`.

use serde::{Deserialize, Serialize};

use crate::host::ElementId;
use crate::settings::DocumentSettings;

/// Request from the surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiMessage {
    Init,
    Set(SettingsUpdate),
    RunOnSelection,
    RestoreOnSelection,
    Resize { width: u32, height: u32 },
    Hide,
    Close,
}

/// Partial settings change; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_font_style: Option<String>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the present fields to `settings`, returning whether any of
    /// them changed.
    pub fn apply_to(&self, settings: &mut DocumentSettings) -> bool {
        let before = settings.clone();
        if let Some(name) = &self.collection_name {
            settings.collection_name = name.clone();
        }
        if let Some(family) = &self.icon_font_family {
            settings.icon_font_family = family.clone();
        }
        if let Some(style) = &self.icon_font_style {
            settings.icon_font_style = style.clone();
        }
        *settings != before
    }
}

/// Reply to the surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Response {
    Init {
        collections: Vec<String>,
        settings: DocumentSettings,
        enabled: bool,
    },
    Settings {
        settings: DocumentSettings,
        enabled: bool,
    },
    RunResult { results: Vec<ElementResult> },
    RestoreResult { results: Vec<RestoreResult> },
    Resize { width: u32, height: u32 },
    Hide,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementResult {
    pub id: ElementId,
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreResult {
    pub id: ElementId,
    pub restored: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(r#"{"type":"init"}"#, UiMessage::Init)]
    #[case(r#"{"type":"run-on-selection"}"#, UiMessage::RunOnSelection)]
    #[case(r#"{"type":"restore-on-selection"}"#, UiMessage::RestoreOnSelection)]
    #[case(r#"{"type":"resize","width":320,"height":480}"#, UiMessage::Resize { width: 320, height: 480 })]
    #[case(r#"{"type":"hide"}"#, UiMessage::Hide)]
    #[case(r#"{"type":"close"}"#, UiMessage::Close)]
    fn parses_messages(#[case] json: &str, #[case] expected: UiMessage) {
        assert_eq!(serde_json::from_str::<UiMessage>(json).unwrap(), expected);
    }

    #[test]
    fn set_fields_are_optional() {
        let message: UiMessage =
            serde_json::from_str(r#"{"type":"set","collectionName":"Brand"}"#).unwrap();

        assert_eq!(
            message,
            UiMessage::Set(SettingsUpdate {
                collection_name: Some("Brand".to_string()),
                ..SettingsUpdate::default()
            })
        );
    }

    #[test]
    fn apply_reports_changes() {
        let mut settings = DocumentSettings::default();
        let update = SettingsUpdate {
            icon_font_style: Some("Bold".to_string()),
            ..SettingsUpdate::default()
        };

        assert!(update.apply_to(&mut settings));
        assert_eq!(settings.icon_font_style, "Bold");
        assert!(!update.apply_to(&mut settings));
        assert!(SettingsUpdate::default().is_empty());
    }

    #[test]
    fn run_result_wire_format() {
        let response = Response::RunResult {
            results: vec![ElementResult {
                id: ElementId::from("1:2"),
                changed: true,
            }],
        };

        insta::assert_json_snapshot!(response, @r#"
        {
          "type": "run-result",
          "results": [
            {
              "id": "1:2",
              "changed": true
            }
          ]
        }
        "#);
    }
}
