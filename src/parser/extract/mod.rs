pub mod aggregate;
pub mod cleanup;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use super::blocks::document_from_text;
use super::catalog::{Accumulation, Catalog, FieldSpec, PatternRule, TextSource};
use super::normalize::normalize_text;
use crate::document::{BBox, Document};

/// One field's final value. Absent fields are never built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub value: Option<String>,
    pub page: usize,
    pub bbox: BBox,
}

/// A cleaned value collected from one rule match, with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub value: String,
    pub page: usize,
    pub bbox: BBox,
}

#[derive(Debug, Clone)]
pub struct BlockText {
    pub page: usize,
    pub bbox: BBox,
    pub text: String,
}

/// Everything the extractor reads: normalized whole text, raw page text,
/// and raw block text.
#[derive(Debug, Clone, Default)]
pub struct ExtractionInput {
    pub normalized: String,
    pub pages: Vec<String>,
    pub blocks: Vec<BlockText>,
}

impl ExtractionInput {
    pub fn from_document(doc: &Document) -> Self {
        let blocks = doc
            .pages
            .iter()
            .enumerate()
            .flat_map(|(page, p)| {
                p.blocks.iter().map(move |b| BlockText {
                    page,
                    bbox: b.bbox,
                    text: b.text(),
                })
            })
            .filter(|b| !b.text.is_empty())
            .collect();

        ExtractionInput {
            normalized: normalize_text(&doc.full_text()),
            pages: doc.pages.iter().map(|p| p.plain_text()).collect(),
            blocks,
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::from_document(&document_from_text(text))
    }
}

#[derive(Debug, Clone)]
pub struct FieldExtractor {
    catalog: Arc<Catalog>,
}

impl FieldExtractor {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        FieldExtractor { catalog }
    }

    /// Fields in catalog order; fields without a surviving value are left out.
    pub fn extract(&self, input: &ExtractionInput) -> Vec<ExtractedField> {
        let fields: Vec<ExtractedField> = self
            .catalog
            .fields
            .iter()
            .filter_map(|spec| extract_field(&self.catalog, spec, input))
            .collect();
        debug!(
            extracted = fields.len(),
            catalog = self.catalog.fields.len(),
            "Field extraction finished"
        );
        fields
    }
}

fn extract_field(
    catalog: &Catalog,
    spec: &FieldSpec,
    input: &ExtractionInput,
) -> Option<ExtractedField> {
    let candidates = collect_candidates(catalog, spec, input);
    trace!(field = %spec.name, candidates = candidates.len(), "Collected candidates");

    let reduced = aggregate::reduce(spec, &candidates)?;
    let origin = &candidates[reduced.origin];
    debug!(field = %spec.name, value = %reduced.value, "Field extracted");

    Some(ExtractedField {
        name: spec.name.clone(),
        field_type: spec.name.clone(),
        value: Some(reduced.value),
        page: origin.page,
        bbox: origin.bbox,
    })
}

fn collect_candidates(
    catalog: &Catalog,
    spec: &FieldSpec,
    input: &ExtractionInput,
) -> Vec<Candidate> {
    let mut out = Vec::new();
    let ctx = RuleContext { catalog, spec };

    for rule in &spec.rules {
        let before = out.len();
        match spec.source {
            TextSource::Normalized => {
                ctx.collect(rule, &input.normalized, 0, BBox::ZERO, &mut out)
            }
            TextSource::Pages => {
                for (page, text) in input.pages.iter().enumerate() {
                    ctx.collect(rule, text, page, BBox::ZERO, &mut out);
                }
            }
            TextSource::Blocks => {
                for block in &input.blocks {
                    ctx.collect(rule, &block.text, block.page, block.bbox, &mut out);
                }
            }
        }

        if spec.accumulate == Accumulation::FirstRule && out.len() > before {
            break;
        }
    }

    out
}

struct RuleContext<'a> {
    catalog: &'a Catalog,
    spec: &'a FieldSpec,
}

impl RuleContext<'_> {
    fn collect(
        &self,
        rule: &PatternRule,
        text: &str,
        page: usize,
        bbox: BBox,
        out: &mut Vec<Candidate>,
    ) {
        let spec = self.spec;
        for m in rule.matches(text) {
            let mut selected = m.select(rule.extract);
            if spec.stop_at_heading {
                selected = self.catalog.cut_at_heading(selected);
            }
            let pieces: Vec<&str> = match &spec.split {
                Some(re) => re.split(selected).collect(),
                None => vec![selected],
            };

            for piece in pieces {
                let value = cleanup::apply(piece, &spec.cleanup);
                if value.is_empty() || rule.rejects(&value) {
                    continue;
                }
                out.push(Candidate { value, page, bbox });
            }
        }
    }
}

// ── Tests ──
