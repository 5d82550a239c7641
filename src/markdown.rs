//! Canonical markdown rendering of segmented documents.
//!
//! `render_document` is pure and deterministic: equal documents produce
//! byte-identical output, which is what makes the canonical artifact a
//! stable cache key companion. A lower-fidelity `body_to_markdown` mode
//! converts a whole page without the Section/Block model; both outputs are
//! consumed identically by the chunker.

use anyhow::Result;

use crate::models::{Block, Document};

/// Renders a segmented document as canonical markdown.
///
/// Layout: a title line derived from `base_name` (underscores become
/// spaces), then each section as `## heading` followed by its blocks.
/// Text blocks end with a blank line, tables render one pipe-delimited
/// line per row, lists render `- item` lines.
pub fn render_document(doc: &Document, base_name: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", base_name.replace('_', " ")));

    for section in &doc.sections {
        out.push_str(&format!("## {}\n\n", section.heading));
        for block in &section.blocks {
            match block {
                Block::Text(text) => {
                    out.push_str(text);
                    out.push_str("\n\n");
                }
                Block::Table(rows) => {
                    for row in rows {
                        out.push_str(&format!("| {} |\n", row.join(" | ")));
                    }
                    out.push('\n');
                }
                Block::List(items) => {
                    for item in items {
                        out.push_str(&format!("- {item}\n"));
                    }
                    out.push('\n');
                }
            }
        }
    }

    out
}

/// Whole-body fallback: converts raw HTML straight to plain structured
/// text, skipping segmentation entirely. Used when heading-scoped
/// structure is not wanted; the chunker does not care which mode produced
/// its input.
pub fn body_to_markdown(html: &str) -> Result<String> {
    let text = html2text::from_read(html.as_bytes(), 80)?;
    Ok(text)
}
