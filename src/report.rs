//! Boundary response: the JSON shape handed back to callers, with field
//! confidences, section confidences and timing.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::parser::catalog::RESERVED_SECTION;
use crate::parser::ProcessingResult;

const VALUE_CONFIDENCE: f32 = 0.95;
const MISSING_CONFIDENCE: f32 = 0.5;
const SKILLS_ANALYSIS_CONFIDENCE: f32 = 0.9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMatch {
    pub field_name: String,
    pub confidence: f32,
    pub suggested_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionReport {
    pub content: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedResponse {
    pub matched_fields: Vec<FieldMatch>,
    pub sections: BTreeMap<String, SectionReport>,
    /// Seconds.
    pub processing_time: f64,
    pub processed_at: DateTime<Utc>,
}

impl ProcessedResponse {
    pub fn from_result(
        result: &ProcessingResult,
        elapsed: Duration,
    ) -> serde_json::Result<Self> {
        let matched_fields = result
            .fields
            .iter()
            .map(|f| FieldMatch {
                field_name: f.name.clone(),
                confidence: if f.value.is_some() {
                    VALUE_CONFIDENCE
                } else {
                    MISSING_CONFIDENCE
                },
                suggested_value: f.value.clone(),
            })
            .collect();

        let mut sections: BTreeMap<String, SectionReport> = result
            .sections
            .iter()
            .map(|s| {
                (
                    s.name.clone(),
                    SectionReport {
                        content: s.content.clone(),
                        confidence: s.confidence,
                    },
                )
            })
            .collect();

        if let Some(analysis) = &result.skills_analysis {
            let content = serde_json::to_string(analysis)?;
            sections.insert(
                RESERVED_SECTION.to_string(),
                SectionReport {
                    content,
                    confidence: SKILLS_ANALYSIS_CONFIDENCE,
                },
            );
        }

        Ok(ProcessedResponse {
            matched_fields,
            sections,
            processing_time: elapsed.as_secs_f64(),
            processed_at: Utc::now(),
        })
    }
}
