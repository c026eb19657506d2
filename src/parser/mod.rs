pub mod blocks;
pub mod catalog;
pub mod extract;
pub mod normalize;
pub mod sections;
pub mod suggest;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::document::Document;
use crate::error::ProcessError;
use crate::settings::Settings;
use crate::skills::{SkillsBreakdown, SkillsTaxonomy};
use catalog::Catalog;
use extract::{ExtractedField, ExtractionInput, FieldExtractor};
use sections::Section;
use suggest::{EntityRecognizer, Suggester};

/// Everything one processing request produces.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    pub fields: Vec<ExtractedField>,
    pub sections: Vec<Section>,
    pub skills_analysis: Option<SkillsBreakdown>,
}

impl ProcessingResult {
    pub fn field(&self, name: &str) -> Option<&ExtractedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        sections::find_section(&self.sections, name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSuggestions {
    pub field_type: String,
    pub values: Vec<String>,
}

/// Process-wide singletons plus the per-request entry points.
///
/// Segmentation and extraction read the same document and share nothing
/// else, so they run on the two halves of a `rayon::join`.
#[derive(Clone)]
pub struct Pipeline {
    catalog: Arc<Catalog>,
    extractor: FieldExtractor,
    taxonomy: Arc<SkillsTaxonomy>,
    suggester: Suggester,
    margin: f32,
}

impl Pipeline {
    pub fn new(
        catalog: Arc<Catalog>,
        taxonomy: Arc<SkillsTaxonomy>,
        recognizer: Arc<dyn EntityRecognizer>,
        settings: &Settings,
    ) -> Self {
        Pipeline {
            extractor: FieldExtractor::new(catalog.clone()),
            suggester: Suggester::new(catalog.clone(), taxonomy.clone(), recognizer),
            catalog,
            taxonomy,
            margin: settings.header_footer_margin,
        }
    }

    /// Segment, extract and categorize one document. The document is
    /// consumed and released on every path, including failures.
    pub fn process(&self, document: Document) -> Result<ProcessingResult, ProcessError> {
        if document.is_empty() {
            return Err(ProcessError::EmptyDocument);
        }

        let result = guarded(|| self.run(&document))?;
        info!(
            fields = result.fields.len(),
            sections = result.sections.len(),
            skills_analysis = result.skills_analysis.is_some(),
            "Processed document"
        );
        Ok(result)
    }

    fn run(&self, document: &Document) -> ProcessingResult {
        let (sections, fields) = rayon::join(
            || self.sections(document),
            || self.fields(document),
        );

        // Prefer the extracted field; fall back to the raw section text.
        let skills_text = fields
            .iter()
            .find(|f| f.name == "skills")
            .and_then(|f| f.value.as_deref())
            .or_else(|| sections::find_section(&sections, "skills").map(|s| s.content.as_str()));
        let skills_analysis = skills_text.map(|text| self.taxonomy.categorize(text));

        ProcessingResult {
            fields,
            sections,
            skills_analysis,
        }
    }

    pub fn sections(&self, document: &Document) -> Vec<Section> {
        sections::segment(document, &self.catalog, self.margin)
    }

    pub fn fields(&self, document: &Document) -> Vec<ExtractedField> {
        self.extractor
            .extract(&ExtractionInput::from_document(document))
    }

    /// Suggestions for each requested field type, in request order.
    pub fn suggestions(
        &self,
        document: Document,
        field_types: &[String],
    ) -> Result<Vec<FieldSuggestions>, ProcessError> {
        if document.is_empty() {
            return Err(ProcessError::EmptyDocument);
        }

        guarded(|| {
            let sections = self.sections(&document);
            field_types
                .iter()
                .map(|field_type| FieldSuggestions {
                    field_type: field_type.clone(),
                    values: self.suggester.suggest(&sections, field_type),
                })
                .collect()
        })
    }
}

/// Run `f`, turning a panic anywhere inside it into one opaque failure.
fn guarded<T>(f: impl FnOnce() -> T) -> Result<T, ProcessError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        warn!(error = %msg, "Processing aborted");
        ProcessError::Internal(msg)
    })
}

// ── Tests ──
