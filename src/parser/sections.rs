use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::catalog::Catalog;
use super::normalize::collapse_whitespace;
use crate::document::Document;

pub const DEFAULT_SECTION: &str = "header";
pub const DEFAULT_MARGIN: f32 = 50.0;

static LEADING_PUNCT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\s:;\-–—|]+").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub name: String,
    pub content: String,
    pub confidence: f32,
}

impl Section {
    fn new(name: String, content: String) -> Self {
        let confidence = if content.chars().count() > 50 { 0.95 } else { 0.5 };
        Section {
            name,
            content,
            confidence,
        }
    }
}

/// Cluster a document's layout blocks into named sections.
///
/// Blocks inside the header/footer band (measured against the first page's
/// height) are skipped. A block that opens with a section title moves the
/// cursor; every other block is appended to the current section. Sections
/// come back in first-appearance order, and empty ones are dropped.
pub fn segment(doc: &Document, catalog: &Catalog, margin: f32) -> Vec<Section> {
    let Some(reference_height) = doc.reference_height() else {
        return Vec::new();
    };

    let mut accumulators: Vec<(String, String)> = Vec::new();
    let mut current = DEFAULT_SECTION.to_string();
    let mut skipped = 0usize;

    for page in &doc.pages {
        for block in &page.blocks {
            let y = block.bbox.y0;
            if y < margin || y > reference_height - margin {
                skipped += 1;
                continue;
            }

            let text = block.text();
            if text.is_empty() {
                continue;
            }

            if let Some((section, title_len)) = catalog.identify_section(&text) {
                current = section.to_string();
                let body = accumulator(&mut accumulators, &current);
                // Text sharing the block with its title ("Skills: Rust, Go") stays.
                let rest = LEADING_PUNCT_RE.replace(&text[title_len..], "");
                if !rest.is_empty() {
                    body.push('\n');
                    body.push_str(&rest);
                }
                continue;
            }

            let body = accumulator(&mut accumulators, &current);
            body.push('\n');
            body.push_str(&text);
        }
    }

    let sections: Vec<Section> = accumulators
        .into_iter()
        .filter_map(|(name, raw)| {
            let content = post_process(&raw, catalog);
            if content.is_empty() {
                None
            } else {
                Some(Section::new(name, content))
            }
        })
        .collect();

    debug!(
        sections = sections.len(),
        skipped_blocks = skipped,
        "Segmented document"
    );
    sections
}

/// Existing accumulator for `name`, or a fresh empty one.
fn accumulator<'a>(accumulators: &'a mut Vec<(String, String)>, name: &str) -> &'a mut String {
    let idx = match accumulators.iter().position(|(n, _)| n == name) {
        Some(idx) => idx,
        None => {
            accumulators.push((name.to_string(), String::new()));
            accumulators.len() - 1
        }
    };
    &mut accumulators[idx].1
}

fn post_process(raw: &str, catalog: &Catalog) -> String {
    let mut cleaned = collapse_whitespace(raw);
    for title in &catalog.titles {
        if let Some(len) = title.match_len(&cleaned) {
            cleaned = LEADING_PUNCT_RE.replace(&cleaned[len..], "").to_string();
        }
    }
    cleaned.trim().to_string()
}

/// Content of the named section, if present.
pub fn find_section<'a>(sections: &'a [Section], name: &str) -> Option<&'a Section> {
    sections.iter().find(|s| s.name == name)
}

// ── Tests ──
