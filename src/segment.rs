//! Heading-scoped segmentation of harvested wiki HTML.
//!
//! Walks the page's main content in document order and buckets paragraphs,
//! tables, and lists under the nearest preceding heading. Content before
//! the first heading lands in the implicit `Introduction` section.
//!
//! Segmentation is best-effort: malformed sub-elements (a row with no
//! cells, a list with only empty items) are logged and skipped, never
//! fatal. The only hard failure is input with no extractable root.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::PipelineError;
use crate::fingerprint::sanitize_component;
use crate::models::{Block, Document};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Parses raw HTML and segments it into an ordered, typed [`Document`].
///
/// The traversal root is the first `<main>` element when present, else the
/// `<body>`. Visits `h1`-`h3`, `p`, `table`, `ul`, and `ol` elements in
/// document order; everything else (navigation chrome, scripts) is simply
/// not in the visited tag set.
pub fn segment(html: &str) -> Result<Document, PipelineError> {
    let tree = Html::parse_document(html);

    let root = tree
        .select(&selector("main"))
        .next()
        .or_else(|| tree.select(&selector("body")).next())
        .ok_or(PipelineError::NoContent)?;

    Ok(segment_root(root))
}

fn segment_root(root: ElementRef<'_>) -> Document {
    let mut doc = Document::new();
    let mut current = 0usize;

    for element in root.select(&selector("h1, h2, h3, p, table, ul, ol")) {
        match element.value().name() {
            "h1" | "h2" | "h3" => {
                let heading = sanitize_component(&element_text(element));
                if heading.is_empty() {
                    debug!("skipping heading that sanitized to empty");
                    continue;
                }
                current = doc.open_section(heading);
            }
            "p" => {
                let text = element_text(element);
                if !text.is_empty() {
                    doc.sections[current].blocks.push(Block::Text(text));
                }
            }
            "table" => {
                if let Some(rows) = table_rows(element) {
                    doc.sections[current].blocks.push(Block::Table(rows));
                }
            }
            "ul" | "ol" => {
                let items: Vec<String> = element
                    .select(&selector("li"))
                    .map(element_text)
                    .filter(|item| !item.is_empty())
                    .collect();
                if !items.is_empty() {
                    doc.sections[current].blocks.push(Block::List(items));
                }
            }
            _ => {}
        }
    }

    doc
}

/// Extracts a table's rows as cell-text sequences. Header detection: when
/// the first row contains `<th>` cells, a `---` separator row (one dash
/// cell per header cell) is inserted immediately after it. Rows with zero
/// cells are skipped; a table with no surviving rows yields `None`.
fn table_rows(table: ElementRef<'_>) -> Option<Vec<Vec<String>>> {
    let cell_selector = selector("th, td");
    let header_selector = selector("th");

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut header_cells = 0usize;

    for (i, row) in table.select(&selector("tr")).enumerate() {
        let cells: Vec<String> = row.select(&cell_selector).map(element_text).collect();
        if cells.is_empty() {
            debug!(row = i, "skipping table row with no cells");
            continue;
        }
        if rows.is_empty() {
            header_cells = row.select(&header_selector).count();
        }
        rows.push(cells);
    }

    if rows.is_empty() {
        return None;
    }
    if header_cells > 0 {
        rows.insert(1, vec!["---".to_string(); header_cells]);
    }
    Some(rows)
}

/// Collects an element's text content with whitespace normalized: internal
/// runs collapse to single spaces and the result is trimmed.
fn element_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
