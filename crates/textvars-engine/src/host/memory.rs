use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use xi_rope::Rope;
use xi_rope::delta::Builder;

use super::runs::{self, FontRun};
use super::{ElementId, Font, FontSpec, HostError, StyledRun, TextHost};

/// A text element held by [`MemoryDocument`].
#[derive(Debug, Clone)]
pub(crate) struct TextNode {
    pub(crate) name: String,
    /// xi-rope buffer holding the element's text as UTF-8
    pub(crate) buffer: Rope,
    /// Font runs covering `buffer` exactly
    pub(crate) runs: Vec<FontRun>,
    /// Font used for text typed into an empty element
    pub(crate) base_font: Font,
    pub(crate) data: BTreeMap<String, String>,
}

/// In-memory document implementing [`TextHost`].
///
/// Mirrors the rules of a real design-tool host closely enough to exercise
/// the engine: fonts must be loaded before text is edited, only installed
/// fonts load, and selected fonts can be configured to be refused when
/// applied to a range.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    pub(crate) nodes: BTreeMap<ElementId, TextNode>,
    /// Element ids in creation order, text and non-text alike
    pub(crate) order: Vec<ElementId>,
    /// Elements that exist but hold no text (frames, shapes)
    pub(crate) others: BTreeMap<ElementId, String>,
    pub(crate) installed: BTreeSet<Font>,
    pub(crate) loaded: BTreeSet<Font>,
    pub(crate) rejected: BTreeSet<Font>,
    pub(crate) document_data: BTreeMap<String, String>,
    pub(crate) selection: Vec<ElementId>,
    /// Text edits still allowed; `None` means unlimited
    pub(crate) edit_budget: Option<usize>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `font` loadable.
    pub fn install_font(&mut self, font: Font) {
        self.installed.insert(font);
    }

    /// Makes the host refuse to apply `font` to any range.
    pub fn reject_font(&mut self, font: Font) {
        self.rejected.insert(font);
    }

    /// Makes the host refuse every text edit after the next `n`.
    pub fn limit_edits(&mut self, n: usize) {
        self.edit_budget = Some(n);
    }

    pub fn is_font_loaded(&self, font: &Font) -> bool {
        self.loaded.contains(font)
    }

    /// Adds a text element with a generated id, styled entirely in `font`.
    /// The font is installed as a side effect.
    pub fn add_text(&mut self, name: &str, text: &str, font: Font) -> ElementId {
        let id = ElementId::new(uuid::Uuid::new_v4().to_string());
        self.insert_text_node(id.clone(), name, text, font);
        id
    }

    /// Adds a text element under a caller-chosen id.
    pub fn insert_text_node(&mut self, id: ElementId, name: &str, text: &str, font: Font) {
        let runs = if text.is_empty() {
            Vec::new()
        } else {
            vec![FontRun {
                len: text.len(),
                font: font.clone(),
            }]
        };
        self.installed.insert(font.clone());
        self.insert_node(
            id,
            TextNode {
                name: name.to_string(),
                buffer: Rope::from(text),
                runs,
                base_font: font,
                data: BTreeMap::new(),
            },
        );
    }

    pub(crate) fn insert_node(&mut self, id: ElementId, node: TextNode) {
        if !self.nodes.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.nodes.insert(id, node);
    }

    /// Adds a non-text element (e.g. a frame) with a generated id.
    pub fn add_frame(&mut self, name: &str) -> ElementId {
        let id = ElementId::new(uuid::Uuid::new_v4().to_string());
        self.insert_frame(id.clone(), name);
        id
    }

    pub fn insert_frame(&mut self, id: ElementId, name: &str) {
        if !self.others.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.others.insert(id, name.to_string());
    }

    /// Restyles a range without any loaded-font checks, for building fixtures.
    /// Ranges outside the text or splitting a character are ignored.
    pub fn style_range(&mut self, id: &ElementId, range: Range<usize>, font: Font) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if let Err(e) = check_range(&node.buffer.to_string(), &range) {
            log::warn!("Not styling {id}: {e}");
            return;
        }
        runs::set_font(&mut node.runs, range, &font);
        self.installed.insert(font);
    }

    pub fn set_selection(&mut self, ids: Vec<ElementId>) {
        self.selection = ids;
    }

    /// Text element ids in creation order.
    pub fn text_ids(&self) -> Vec<ElementId> {
        self.order
            .iter()
            .filter(|id| self.nodes.contains_key(*id))
            .cloned()
            .collect()
    }

    /// All element ids in creation order.
    pub fn element_ids(&self) -> &[ElementId] {
        &self.order
    }

    pub fn name(&self, id: &ElementId) -> Option<&str> {
        self.nodes
            .get(id)
            .map(|n| n.name.as_str())
            .or_else(|| self.others.get(id).map(String::as_str))
    }

    fn node(&self, id: &ElementId) -> Result<&TextNode, HostError> {
        self.nodes.get(id).ok_or_else(|| self.missing(id))
    }

    fn node_mut(&mut self, id: &ElementId) -> Result<&mut TextNode, HostError> {
        let missing = self.missing(id);
        self.nodes.get_mut(id).ok_or(missing)
    }

    fn missing(&self, id: &ElementId) -> HostError {
        if self.others.contains_key(id) {
            HostError::NotText(id.clone())
        } else {
            HostError::ElementNotFound(id.clone())
        }
    }

    fn spend_edit(&mut self, id: &ElementId) -> Result<(), HostError> {
        match &mut self.edit_budget {
            Some(0) => Err(HostError::EditRefused(id.clone())),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Editing requires every font the element currently uses to be loaded.
    fn ensure_editable(&self, node: &TextNode) -> Result<(), HostError> {
        if node.runs.is_empty() && !self.loaded.contains(&node.base_font) {
            return Err(HostError::FontNotLoaded(node.base_font.clone()));
        }
        for run in &node.runs {
            if !self.loaded.contains(&run.font) {
                return Err(HostError::FontNotLoaded(run.font.clone()));
            }
        }
        Ok(())
    }
}

/// Validates `range` against `text`: in bounds and on char boundaries.
fn check_range(text: &str, range: &Range<usize>) -> Result<(), HostError> {
    let valid = range.start <= range.end
        && range.end <= text.len()
        && text.is_char_boundary(range.start)
        && text.is_char_boundary(range.end);
    if valid {
        Ok(())
    } else {
        Err(HostError::InvalidRange {
            start: range.start,
            end: range.end,
            len: text.len(),
        })
    }
}

/// Applies a single replacement to the buffer through an xi-rope delta.
fn edit(buffer: &Rope, range: Range<usize>, text: &str) -> Rope {
    let mut builder = Builder::new(buffer.len());
    builder.replace(range, Rope::from(text));
    builder.build().apply(buffer)
}

impl TextHost for MemoryDocument {
    fn text(&self, id: &ElementId) -> Result<String, HostError> {
        Ok(self.node(id)?.buffer.to_string())
    }

    fn insert_text(&mut self, id: &ElementId, at: usize, text: &str) -> Result<(), HostError> {
        let node = self.node(id)?;
        check_range(&node.buffer.to_string(), &(at..at))?;
        self.ensure_editable(node)?;
        if text.is_empty() {
            return Ok(());
        }
        self.spend_edit(id)?;

        let node = self.node_mut(id)?;
        let font = runs::font_at(&node.runs, at)
            .or_else(|| at.checked_sub(1).and_then(|prev| runs::font_at(&node.runs, prev)))
            .cloned()
            .unwrap_or_else(|| node.base_font.clone());
        node.buffer = edit(&node.buffer, at..at, text);
        runs::insert(&mut node.runs, at, text.len(), font);
        Ok(())
    }

    fn delete_text(&mut self, id: &ElementId, range: Range<usize>) -> Result<(), HostError> {
        let node = self.node(id)?;
        check_range(&node.buffer.to_string(), &range)?;
        self.ensure_editable(node)?;
        if range.is_empty() {
            return Ok(());
        }
        self.spend_edit(id)?;

        let node = self.node_mut(id)?;
        if let Some(font) = runs::font_at(&node.runs, range.start) {
            // An element emptied entirely keeps typing in its last font
            if range.start == 0 && range.end == node.buffer.len() {
                node.base_font = font.clone();
            }
        }
        let mut builder = Builder::new(node.buffer.len());
        builder.delete(range.clone());
        node.buffer = builder.build().apply(&node.buffer);
        runs::delete(&mut node.runs, range);
        Ok(())
    }

    fn replace_text(&mut self, id: &ElementId, text: &str) -> Result<(), HostError> {
        let node = self.node(id)?;
        self.ensure_editable(node)?;
        self.spend_edit(id)?;

        let node = self.node_mut(id)?;
        let font = runs::font_at(&node.runs, 0)
            .cloned()
            .unwrap_or_else(|| node.base_font.clone());
        node.buffer = Rope::from(text);
        node.runs = if text.is_empty() {
            Vec::new()
        } else {
            vec![FontRun {
                len: text.len(),
                font: font.clone(),
            }]
        };
        node.base_font = font;
        Ok(())
    }

    fn styled_runs(&self, id: &ElementId) -> Result<Vec<StyledRun>, HostError> {
        Ok(runs::to_styled(&self.node(id)?.runs))
    }

    fn range_font(&self, id: &ElementId, range: Range<usize>) -> Result<FontSpec, HostError> {
        let node = self.node(id)?;
        check_range(&node.buffer.to_string(), &range)?;
        if range.is_empty() {
            return Err(HostError::InvalidRange {
                start: range.start,
                end: range.end,
                len: node.buffer.len(),
            });
        }

        let fonts = runs::fonts_in(&node.runs, range);
        match fonts.as_slice() {
            [font] => Ok(FontSpec::Uniform((*font).clone())),
            _ => Ok(FontSpec::Mixed),
        }
    }

    fn set_range_font(
        &mut self,
        id: &ElementId,
        range: Range<usize>,
        font: &Font,
    ) -> Result<(), HostError> {
        let node = self.node(id)?;
        check_range(&node.buffer.to_string(), &range)?;
        if self.rejected.contains(font) {
            return Err(HostError::StyleRejected(font.clone()));
        }
        if !self.loaded.contains(font) {
            return Err(HostError::FontNotLoaded(font.clone()));
        }

        let node = self.node_mut(id)?;
        runs::set_font(&mut node.runs, range, font);
        Ok(())
    }

    fn load_font(&mut self, font: &Font) -> Result<(), HostError> {
        if !self.installed.contains(font) {
            return Err(HostError::FontUnavailable(font.clone()));
        }
        self.loaded.insert(font.clone());
        Ok(())
    }

    fn node_data(&self, id: &ElementId, key: &str) -> Result<String, HostError> {
        Ok(self.node(id)?.data.get(key).cloned().unwrap_or_default())
    }

    fn set_node_data(&mut self, id: &ElementId, key: &str, value: &str) -> Result<(), HostError> {
        let node = self.node_mut(id)?;
        if value.is_empty() {
            node.data.remove(key);
        } else {
            node.data.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn document_data(&self, key: &str) -> String {
        self.document_data.get(key).cloned().unwrap_or_default()
    }

    fn set_document_data(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            self.document_data.remove(key);
        } else {
            self.document_data
                .insert(key.to_string(), value.to_string());
        }
    }

    fn is_text_element(&self, id: &ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    fn selection(&self) -> Vec<ElementId> {
        self.selection.clone()
    }
}
