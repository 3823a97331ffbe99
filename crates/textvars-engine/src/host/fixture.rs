//! JSON fixture format for [`MemoryDocument`].
//!
//! Front ends load a document from this format and write it back after
//! editing, so per-element backups and document settings survive restarts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use xi_rope::Rope;

use super::memory::{MemoryDocument, TextNode};
use super::runs::{self, FontRun};
use super::{ElementId, Font};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFile {
    pub id: ElementId,
    pub name: String,
    /// Absent for non-text elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<FontRun>,
    /// Font for unstyled text; defaults to [`DocumentFile::default_font`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFile {
    pub nodes: Vec<NodeFile>,
    #[serde(default)]
    pub installed_fonts: Vec<Font>,
    #[serde(default)]
    pub selection: Vec<ElementId>,
    #[serde(default)]
    pub document_data: BTreeMap<String, String>,
}

impl DocumentFile {
    pub fn default_font() -> Font {
        Font::new("Inter", "Regular")
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Builds a live document. Runs that do not cover the text exactly, or
    /// that end inside a character, are discarded in favour of a single run
    /// in the node's font.
    pub fn into_document(self) -> MemoryDocument {
        let mut doc = MemoryDocument::new();
        for font in self.installed_fonts {
            doc.install_font(font);
        }

        for node in self.nodes {
            let Some(text) = node.text else {
                doc.insert_frame(node.id, &node.name);
                continue;
            };

            let base_font = node.font.unwrap_or_else(Self::default_font);
            let node_runs = if runs_fit(&node.runs, &text) {
                node.runs
            } else {
                if !node.runs.is_empty() {
                    log::warn!(
                        "Discarding runs of {} that do not fit its text",
                        node.id
                    );
                }
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![FontRun {
                        len: text.len(),
                        font: base_font.clone(),
                    }]
                }
            };

            doc.install_font(base_font.clone());
            for run in &node_runs {
                doc.install_font(run.font.clone());
            }
            doc.insert_node(
                node.id,
                TextNode {
                    name: node.name,
                    buffer: Rope::from(text.as_str()),
                    runs: node_runs,
                    base_font,
                    data: node.data,
                },
            );
        }

        doc.document_data = self.document_data;
        doc.selection = self.selection;
        doc
    }

    /// Captures the current state of a live document.
    pub fn from_document(doc: &MemoryDocument) -> Self {
        let nodes = doc
            .order
            .iter()
            .filter_map(|id| {
                if let Some(node) = doc.nodes.get(id) {
                    Some(NodeFile {
                        id: id.clone(),
                        name: node.name.clone(),
                        text: Some(node.buffer.to_string()),
                        runs: node.runs.clone(),
                        font: Some(node.base_font.clone()),
                        data: node.data.clone(),
                    })
                } else {
                    doc.others.get(id).map(|name| NodeFile {
                        id: id.clone(),
                        name: name.clone(),
                        text: None,
                        runs: Vec::new(),
                        font: None,
                        data: BTreeMap::new(),
                    })
                }
            })
            .collect();

        Self {
            nodes,
            installed_fonts: doc.installed.iter().cloned().collect(),
            selection: doc.selection.clone(),
            document_data: doc.document_data.clone(),
        }
    }
}

/// Runs must cover `text` exactly, be non-empty, and end on char boundaries.
fn runs_fit(node_runs: &[FontRun], text: &str) -> bool {
    runs::covered_len(node_runs) == text.len()
        && node_runs.iter().all(|r| r.len > 0)
        && runs::to_styled(node_runs)
            .iter()
            .all(|r| text.is_char_boundary(r.range.end))
}
