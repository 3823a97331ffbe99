//! # Host Boundary
//!
//! The engine never owns text. It reads and edits text elements through
//! [`TextHost`], which a document editor implements. [`MemoryDocument`] is
//! the in-process implementation used by tests and the terminal front end.
//!
//! All ranges are byte ranges into the element's current text.

pub mod fixture;
pub mod memory;
pub mod runs;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

pub use fixture::{DocumentFile, NodeFile};
pub use memory::MemoryDocument;
pub use runs::FontRun;

/// Identifier of an element in the host document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A font face as the host names it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub style: String,
}

impl Font {
    pub fn new(family: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            style: style.into(),
        }
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.style)
    }
}

/// Font of a character range: one font throughout, or a mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSpec {
    Uniform(Font),
    Mixed,
}

/// A maximal run of text sharing one font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledRun {
    pub range: Range<usize>,
    pub font: Font,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),
    #[error("Element is not a text element: {0}")]
    NotText(ElementId),
    #[error("Range {start}..{end} is invalid for text of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },
    #[error("Font not loaded: {0}")]
    FontNotLoaded(Font),
    #[error("Font unavailable: {0}")]
    FontUnavailable(Font),
    #[error("Host rejected font {0} for this range")]
    StyleRejected(Font),
    #[error("Host refused to edit {0}")]
    EditRefused(ElementId),
    #[error("Variable lookup failed: {0}")]
    Lookup(String),
}

/// Text document operations the engine needs from its host.
///
/// Editing text requires every font used by the element to be loaded;
/// setting a range font requires that font to be loaded.
pub trait TextHost {
    /// Full text of a text element.
    fn text(&self, id: &ElementId) -> Result<String, HostError>;

    /// Inserts `text` before byte offset `at`. The inserted text takes the
    /// font of the character it is inserted before.
    fn insert_text(&mut self, id: &ElementId, at: usize, text: &str) -> Result<(), HostError>;

    fn delete_text(&mut self, id: &ElementId, range: Range<usize>) -> Result<(), HostError>;

    /// Replaces the whole text, collapsing styling to the first character's font.
    fn replace_text(&mut self, id: &ElementId, text: &str) -> Result<(), HostError>;

    fn styled_runs(&self, id: &ElementId) -> Result<Vec<StyledRun>, HostError>;

    /// Font of a non-empty range.
    fn range_font(&self, id: &ElementId, range: Range<usize>) -> Result<FontSpec, HostError>;

    fn set_range_font(
        &mut self,
        id: &ElementId,
        range: Range<usize>,
        font: &Font,
    ) -> Result<(), HostError>;

    fn load_font(&mut self, font: &Font) -> Result<(), HostError>;

    /// Opaque per-element data. Absent keys read as the empty string.
    fn node_data(&self, id: &ElementId, key: &str) -> Result<String, HostError>;

    /// Writing the empty string clears the key.
    fn set_node_data(&mut self, id: &ElementId, key: &str, value: &str) -> Result<(), HostError>;

    /// Opaque per-document data. Absent keys read as the empty string.
    fn document_data(&self, key: &str) -> String;

    fn set_document_data(&mut self, key: &str, value: &str);

    fn is_text_element(&self, id: &ElementId) -> bool;

    /// Currently selected elements, text or otherwise.
    fn selection(&self) -> Vec<ElementId>;
}
