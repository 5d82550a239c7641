//! Core data types that flow through the segmentation and indexing pipeline.
//!
//! A harvested wiki page becomes a [`Document`]: an ordered list of
//! [`Section`]s, each holding typed [`Block`]s. Documents are serialized to
//! canonical markdown, chunked into [`Chunk`]s, and embedded into the
//! vector index.

use serde::{Deserialize, Serialize};

/// A typed content block inside a section.
///
/// The variant set is closed on purpose: rendering is exhaustive and
/// checked at compile time, instead of dispatching on a `"type"` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A paragraph of plain text.
    Text(String),
    /// A table as ordered rows of ordered cell strings. A `---` separator
    /// row follows the header row when the source table had header cells.
    Table(Vec<Vec<String>>),
    /// A bulleted or numbered list, flattened to its item texts.
    List(Vec<String>),
}

/// A named slice of the page: a sanitized heading plus its blocks in
/// source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            blocks: Vec::new(),
        }
    }
}

/// Heading of the implicit first section collecting content that precedes
/// any heading element.
pub const INTRODUCTION: &str = "Introduction";

/// An ordered sequence of sections. Always starts with the implicit
/// [`INTRODUCTION`] section, so a document is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub sections: Vec<Section>,
}

impl Document {
    /// Creates a document containing only the empty Introduction section.
    pub fn new() -> Self {
        Self {
            sections: vec![Section::new(INTRODUCTION)],
        }
    }

    /// Index of the section with the given heading, if one exists.
    pub fn position(&self, heading: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.heading == heading)
    }

    /// Opens (or re-opens) a section for the given sanitized heading and
    /// returns its index. Same-heading sections merge: blocks seen after a
    /// duplicate heading append to the earlier section rather than
    /// replacing it.
    pub fn open_section(&mut self, heading: String) -> usize {
        match self.position(&heading) {
            Some(idx) => idx,
            None => {
                self.sections.push(Section::new(heading));
                self.sections.len() - 1
            }
        }
    }

    /// Total number of blocks across all sections.
    pub fn block_count(&self) -> usize {
        self.sections.iter().map(|s| s.blocks.len()).sum()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// A fixed-size window of canonical document text, the unit of embedding.
///
/// Chunks are ephemeral: regenerated on every index build and persisted
/// only inside the index artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of this chunk in the chunk sequence, starting at 0.
    pub index: usize,
    /// The window text.
    pub text: String,
    /// SHA-256 of the text, recorded for artifact integrity checks.
    pub hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_has_introduction() {
        let doc = Document::new();
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].heading, INTRODUCTION);
        assert!(doc.sections[0].blocks.is_empty());
    }

    #[test]
    fn open_section_merges_duplicate_headings() {
        let mut doc = Document::new();
        let first = doc.open_section("Bio_".to_string());
        doc.sections[first].blocks.push(Block::Text("a".into()));
        let second = doc.open_section("Bio_".to_string());
        assert_eq!(first, second);
        doc.sections[second].blocks.push(Block::Text("b".into()));
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[first].blocks.len(), 2);
    }

    #[test]
    fn block_count_spans_sections() {
        let mut doc = Document::new();
        doc.sections[0].blocks.push(Block::Text("intro".into()));
        let idx = doc.open_section("History".to_string());
        doc.sections[idx].blocks.push(Block::List(vec!["x".into()]));
        assert_eq!(doc.block_count(), 2);
    }
}
