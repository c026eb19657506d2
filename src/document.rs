//! Decoded document handed to the pipeline by an external reader.
//!
//! Geometry follows the usual PDF-text convention after flipping: `y` grows
//! downward from the top edge of the page, so `bbox.y0` is the block top.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub const ZERO: BBox = BBox {
        x0: 0.0,
        y0: 0.0,
        x1: 0.0,
        y1: 0.0,
    };

    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        BBox { x0, y0, x1, y1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutBlock {
    pub bbox: BBox,
    #[serde(default)]
    pub runs: Vec<String>,
}

impl LayoutBlock {
    /// Text runs joined by single spaces, empty runs skipped.
    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub blocks: Vec<LayoutBlock>,
    /// Plain text as the reader extracted it, when it differs from the block text.
    #[serde(default)]
    pub text: Option<String>,
}

impl Page {
    pub fn plain_text(&self) -> String {
        match &self.text {
            Some(t) => t.clone(),
            None => self
                .blocks
                .iter()
                .map(|b| b.runs.join(" "))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_path(path: &Path) -> Result<Self, DocumentError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Height of the first page; the header/footer band is measured against it.
    pub fn reference_height(&self) -> Option<f32> {
        self.pages.first().map(|p| p.height)
    }

    /// Every page's plain text, each followed by a newline.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        for page in &self.pages {
            out.push_str(&page.plain_text());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_text_skips_empty_runs() {
        let block = LayoutBlock {
            bbox: BBox::ZERO,
            runs: vec!["Jane".into(), "  ".into(), " Doe ".into()],
        };
        assert_eq!(block.text(), "Jane Doe");
    }

    #[test]
    fn plain_text_prefers_reader_text() {
        let page = Page {
            width: 612.0,
            height: 792.0,
            blocks: vec![LayoutBlock {
                bbox: BBox::new(72.0, 100.0, 300.0, 112.0),
                runs: vec!["from".into(), "blocks".into()],
            }],
            text: Some("from reader".into()),
        };
        assert_eq!(page.plain_text(), "from reader");

        let page = Page { text: None, ..page };
        assert_eq!(page.plain_text(), "from blocks");
    }

    #[test]
    fn parses_layout_json() {
        let doc = Document::from_json_str(
            r#"{"pages":[{"width":612,"height":792,"blocks":[
                {"bbox":{"x0":72,"y0":90,"x1":400,"y1":104},"runs":["Jane","Doe"]}
            ]}]}"#,
        )
        .unwrap();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.reference_height(), Some(792.0));
        assert_eq!(doc.pages[0].blocks[0].text(), "Jane Doe");
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            Document::from_json_str("{\"pages\": 3}"),
            Err(DocumentError::Json(_))
        ));
    }
}
