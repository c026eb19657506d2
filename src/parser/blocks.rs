//! Plain-text document reader.
//!
//! Turns a text dump (pages separated by form feeds) into the same
//! page → block structure a layout reader produces, one block per
//! non-blank line, with synthetic geometry that always lands inside the
//! page body.

use crate::document::{BBox, Document, LayoutBlock, Page};

const PAGE_WIDTH: f32 = 612.0;
const MIN_PAGE_HEIGHT: f32 = 792.0;
const BODY_TOP: f32 = 72.0;
const BODY_BOTTOM_PAD: f32 = 72.0;
const LINE_HEIGHT: f32 = 14.0;
const CHAR_WIDTH: f32 = 6.0;

pub fn document_from_text(text: &str) -> Document {
    if text.trim().is_empty() {
        return Document::default();
    }

    let raw_pages: Vec<&str> = text.split('\x0c').collect();
    let lines_per_page: Vec<Vec<&str>> = raw_pages.iter().map(|p| classify_lines(p)).collect();

    // Every page gets the same height so the first page is a valid reference
    // for the header/footer band on all of them.
    let tallest = lines_per_page.iter().map(|l| l.len()).max().unwrap_or(0);
    let height = (BODY_TOP + tallest as f32 * LINE_HEIGHT + BODY_BOTTOM_PAD).max(MIN_PAGE_HEIGHT);

    let pages = raw_pages
        .iter()
        .zip(lines_per_page)
        .map(|(raw, lines)| Page {
            width: PAGE_WIDTH,
            height,
            blocks: lines
                .iter()
                .enumerate()
                .map(|(i, line)| line_block(i, line))
                .collect(),
            text: Some(raw.to_string()),
        })
        .collect();

    Document { pages }
}

/// Content lines of one page, in order. Blank and decoration-only lines are dropped.
fn classify_lines(page: &str) -> Vec<&str> {
    page.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_rule_line(line))
        .collect()
}

fn line_block(index: usize, line: &str) -> LayoutBlock {
    let y0 = BODY_TOP + index as f32 * LINE_HEIGHT;
    let width = (line.chars().count() as f32 * CHAR_WIDTH).min(PAGE_WIDTH - 2.0 * BODY_TOP);
    LayoutBlock {
        bbox: BBox::new(BODY_TOP, y0, BODY_TOP + width, y0 + LINE_HEIGHT),
        runs: vec![line.to_string()],
    }
}

// "-----", "=====", "_____" and friends
fn is_rule_line(s: &str) -> bool {
    !s.chars().any(|c| c.is_alphanumeric())
        && s.chars().all(|c| matches!(c, '-' | '=' | '_' | '*' | '~' | '.' | ' '))
}
