//! Entity-assisted suggestions: a secondary pass that proposes alternative
//! values for a few field types from the segmented sections.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::Catalog;
use super::sections::{find_section, Section, DEFAULT_SECTION};
use crate::error::ModelError;
use crate::skills::SkillsTaxonomy;

const BUILTIN_GAZETTEER: &str = include_str!("../../data/person_gazetteer.json");

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z][A-Za-z'-]*").unwrap());

const MAX_NAME_TOKENS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityLabel {
    Person,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
    /// Byte offsets into the recognized text.
    pub start: usize,
    pub end: usize,
}

/// A named-entity model. Loaded once and shared read-only across requests.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Vec<Entity>;
}

#[derive(Debug, Deserialize)]
struct GazetteerDef {
    given_names: Vec<String>,
    #[serde(default)]
    stop_tokens: Vec<String>,
}

/// Lexicon recognizer: a run of two or three capitalized words that opens
/// with a known given name is a person.
#[derive(Debug, Clone)]
pub struct GazetteerRecognizer {
    given_names: HashSet<String>,
    stop_tokens: HashSet<String>,
}

impl GazetteerRecognizer {
    pub fn builtin() -> Result<Self, ModelError> {
        Self::from_json(BUILTIN_GAZETTEER)
    }

    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let def: GazetteerDef = serde_json::from_str(json)?;
        let lower = |words: Vec<String>| -> HashSet<String> {
            words
                .into_iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        };

        let given_names = lower(def.given_names);
        if given_names.is_empty() {
            return Err(ModelError::Empty);
        }
        Ok(GazetteerRecognizer {
            given_names,
            stop_tokens: lower(def.stop_tokens),
        })
    }

    fn is_name_word(&self, word: &str) -> bool {
        word.chars().next().is_some_and(|c| c.is_uppercase())
            && !self.stop_tokens.contains(&word.to_lowercase())
    }
}

impl EntityRecognizer for GazetteerRecognizer {
    fn recognize(&self, text: &str) -> Vec<Entity> {
        let words: Vec<_> = WORD_RE.find_iter(text).collect();
        let mut entities = Vec::new();
        let mut i = 0;

        while i < words.len() {
            let first = words[i];
            if !self.is_name_word(first.as_str())
                || !self.given_names.contains(&first.as_str().to_lowercase())
            {
                i += 1;
                continue;
            }

            // Extend over capitalized words separated by plain spaces only.
            let mut j = i + 1;
            while j < words.len()
                && j - i < MAX_NAME_TOKENS
                && self.is_name_word(words[j].as_str())
                && text[words[j - 1].end()..words[j].start()]
                    .chars()
                    .all(|c| c == ' ')
            {
                j += 1;
            }

            if j - i >= 2 {
                let (start, end) = (first.start(), words[j - 1].end());
                entities.push(Entity {
                    text: text[start..end].to_string(),
                    label: EntityLabel::Person,
                    start,
                    end,
                });
                i = j;
            } else {
                i += 1;
            }
        }

        entities
    }
}

/// Proposes alternative values for `name`, `email` and `skills` field types.
#[derive(Clone)]
pub struct Suggester {
    catalog: Arc<Catalog>,
    taxonomy: Arc<SkillsTaxonomy>,
    recognizer: Arc<dyn EntityRecognizer>,
}

impl Suggester {
    pub fn new(
        catalog: Arc<Catalog>,
        taxonomy: Arc<SkillsTaxonomy>,
        recognizer: Arc<dyn EntityRecognizer>,
    ) -> Self {
        Suggester {
            catalog,
            taxonomy,
            recognizer,
        }
    }

    /// Candidates for one field type. Unsupported types yield nothing.
    pub fn suggest(&self, sections: &[Section], field_type: &str) -> Vec<String> {
        let suggestions = match field_type {
            "name" | "full_name" => self.names(sections),
            "email" => self.emails(sections),
            "skills" => self.skills(sections),
            _ => Vec::new(),
        };
        debug!(field_type, count = suggestions.len(), "Suggestions computed");
        suggestions
    }

    fn names(&self, sections: &[Section]) -> Vec<String> {
        let Some(header) = find_section(sections, DEFAULT_SECTION) else {
            return Vec::new();
        };
        self.recognizer
            .recognize(&header.content)
            .into_iter()
            .filter(|e| e.label == EntityLabel::Person)
            .map(|e| e.text)
            .take(1)
            .collect()
    }

    // Every match across all sections, duplicates kept.
    fn emails(&self, sections: &[Section]) -> Vec<String> {
        let Some(spec) = self.catalog.field("email") else {
            return Vec::new();
        };
        let text = sections
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        spec.rules
            .iter()
            .flat_map(|rule| {
                rule.matches(&text)
                    .map(|m| m.select(rule.extract).to_string())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn skills(&self, sections: &[Section]) -> Vec<String> {
        match find_section(sections, "skills") {
            Some(section) => self.taxonomy.categorize(&section.content).flatten(),
            None => Vec::new(),
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn section(name: &str, content: &str) -> Section {
        Section {
            name: name.to_string(),
            content: content.to_string(),
            confidence: 0.5,
        }
    }

    fn suggester() -> Suggester {
        Suggester::new(
            Arc::new(Catalog::builtin().unwrap()),
            Arc::new(SkillsTaxonomy::builtin().unwrap()),
            Arc::new(GazetteerRecognizer::builtin().unwrap()),
        )
    }

    #[test]
    fn recognizes_person_runs() {
        let ner = GazetteerRecognizer::builtin().unwrap();
        let entities = ner.recognize("Priya Sharma priya@example.com Pune");
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "Priya Sharma");
        assert_eq!((entities[0].start, entities[0].end), (0, 12));
    }

    #[test]
    fn person_capped_at_three_words() {
        let ner = GazetteerRecognizer::builtin().unwrap();
        let entities = ner.recognize("Jane Ann Marie Doe");
        assert_eq!(entities[0].text, "Jane Ann Marie");
    }

    #[test]
    fn stop_tokens_break_names() {
        let ner = GazetteerRecognizer::builtin().unwrap();
        assert!(ner.recognize("John Resume").is_empty());
        assert!(ner.recognize("Rahul").is_empty());
        assert!(ner.recognize("rahul verma").is_empty());
    }

    #[test]
    fn gazetteer_without_names_rejected() {
        assert!(matches!(
            GazetteerRecognizer::from_json(r#"{"given_names": []}"#),
            Err(ModelError::Empty)
        ));
    }

    #[test]
    fn name_from_header_only() {
        let sections = vec![
            section("header", "Curriculum Vitae Rahul Verma rahul@example.com"),
            section("experience", "Worked with Jane Doe"),
        ];
        assert_eq!(suggester().suggest(&sections, "name"), vec!["Rahul Verma"]);
        assert_eq!(suggester().suggest(&sections, "full_name"), vec!["Rahul Verma"]);
    }

    #[test]
    fn name_without_header_is_empty() {
        let sections = vec![section("skills", "Jane Doe")];
        assert!(suggester().suggest(&sections, "name").is_empty());
    }

    #[test]
    fn emails_from_all_sections_with_duplicates() {
        let sections = vec![
            section("header", "a@example.com"),
            section("summary", "reach me at a@example.com or b@work.org"),
        ];
        assert_eq!(
            suggester().suggest(&sections, "email"),
            vec!["a@example.com", "a@example.com", "b@work.org"]
        );
    }

    #[test]
    fn skills_flattened_by_category() {
        let sections = vec![section("skills", "Docker, Python, teamwork, English")];
        assert_eq!(
            suggester().suggest(&sections, "skills"),
            vec!["python", "teamwork", "english", "docker"]
        );
    }

    #[test]
    fn unsupported_type_is_empty() {
        let sections = vec![section("header", "Jane Doe")];
        assert!(suggester().suggest(&sections, "phone").is_empty());
    }
}
