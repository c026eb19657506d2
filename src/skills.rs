//! Skills categorizer: buckets the tokens of a skills fragment into the four
//! fixed categories by set membership against a loaded taxonomy.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TaxonomyError;

const BUILTIN_TAXONOMY: &str = include_str!("../data/skills.json");

const TOKEN_PUNCT: &[char] = &[',', ';', ':', '(', ')', '[', ']', '"', '\''];

/// Proficiency vocabulary in priority order.
const PROFICIENCY_LEVELS: [(&str, f32); 5] = [
    ("expert", 1.0),
    ("advanced", 0.8),
    ("intermediate", 0.6),
    ("basic", 0.4),
    ("familiar", 0.3),
];
const DEFAULT_PROFICIENCY: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Technical,
    Soft,
    Languages,
    Tools,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; 4] = [
        SkillCategory::Technical,
        SkillCategory::Soft,
        SkillCategory::Languages,
        SkillCategory::Tools,
    ];
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaxonomyDef {
    #[serde(default)]
    technical: Vec<String>,
    #[serde(default)]
    soft: Vec<String>,
    #[serde(default)]
    languages: Vec<String>,
    #[serde(default)]
    tools: Vec<String>,
}

/// Category → lower-cased canonical tokens. Read-only once loaded.
#[derive(Debug, Clone)]
pub struct SkillsTaxonomy {
    technical: HashSet<String>,
    soft: HashSet<String>,
    languages: HashSet<String>,
    tools: HashSet<String>,
}

impl SkillsTaxonomy {
    pub fn builtin() -> Result<Self, TaxonomyError> {
        Self::from_json(BUILTIN_TAXONOMY)
    }

    pub fn from_path(path: &Path) -> Result<Self, TaxonomyError> {
        let raw = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Unknown category names and a taxonomy without a single token are rejected.
    pub fn from_json(json: &str) -> Result<Self, TaxonomyError> {
        let def: TaxonomyDef = serde_json::from_str(json)?;
        let taxonomy = SkillsTaxonomy {
            technical: lowercase_set(def.technical),
            soft: lowercase_set(def.soft),
            languages: lowercase_set(def.languages),
            tools: lowercase_set(def.tools),
        };

        if taxonomy.is_empty() {
            return Err(TaxonomyError::Empty);
        }
        debug!(tokens = taxonomy.len(), "Loaded skills taxonomy");
        Ok(taxonomy)
    }

    pub fn tokens(&self, category: SkillCategory) -> &HashSet<String> {
        match category {
            SkillCategory::Technical => &self.technical,
            SkillCategory::Soft => &self.soft,
            SkillCategory::Languages => &self.languages,
            SkillCategory::Tools => &self.tools,
        }
    }

    pub fn len(&self) -> usize {
        SkillCategory::ALL
            .iter()
            .map(|c| self.tokens(*c).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bucket the tokens of `text`. All four categories are always present.
    pub fn categorize(&self, text: &str) -> SkillsBreakdown {
        let words = tokenize(text);
        let bucket = |category: SkillCategory| -> Vec<String> {
            let known = self.tokens(category);
            words.iter().filter(|w| known.contains(*w)).cloned().collect()
        };

        SkillsBreakdown {
            technical: bucket(SkillCategory::Technical),
            soft: bucket(SkillCategory::Soft),
            languages: bucket(SkillCategory::Languages),
            tools: bucket(SkillCategory::Tools),
        }
    }
}

fn lowercase_set(tokens: Vec<String>) -> HashSet<String> {
    tokens
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Lower-cased whitespace tokens with edge punctuation removed, deduplicated
/// and sorted so every bucket comes out in ascending order.
fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|w| {
            w.trim_matches(TOKEN_PUNCT)
                .trim_end_matches('.')
                .trim_matches(TOKEN_PUNCT)
                .to_string()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillsBreakdown {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
    pub languages: Vec<String>,
    pub tools: Vec<String>,
}

impl SkillsBreakdown {
    pub fn category(&self, category: SkillCategory) -> &[String] {
        match category {
            SkillCategory::Technical => &self.technical,
            SkillCategory::Soft => &self.soft,
            SkillCategory::Languages => &self.languages,
            SkillCategory::Tools => &self.tools,
        }
    }

    /// Every token, category by category in the fixed order.
    pub fn flatten(&self) -> Vec<String> {
        SkillCategory::ALL
            .iter()
            .flat_map(|c| self.category(*c).iter().cloned())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        SkillCategory::ALL
            .iter()
            .all(|c| self.category(*c).is_empty())
    }
}

/// Score of the highest-priority proficiency word in `fragment`, 0.5 if none.
pub fn detect_proficiency(fragment: &str) -> f32 {
    let lowered = fragment.to_lowercase();
    PROFICIENCY_LEVELS
        .iter()
        .find(|(word, _)| lowered.contains(word))
        .map(|(_, score)| *score)
        .unwrap_or(DEFAULT_PROFICIENCY)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> SkillsTaxonomy {
        SkillsTaxonomy::from_json(
            r#"{"technical": ["java", "python"], "soft": ["teamwork"],
                "languages": ["english"], "tools": ["git", "Docker"]}"#,
        )
        .unwrap()
    }

    #[test]
    fn buckets_by_membership() {
        let b = taxonomy().categorize("java python teamwork");
        assert_eq!(b.technical, vec!["java", "python"]);
        assert_eq!(b.soft, vec!["teamwork"]);
        assert!(b.languages.is_empty());
        assert!(b.tools.is_empty());
    }

    #[test]
    fn all_four_keys_serialized() {
        let json = serde_json::to_value(taxonomy().categorize("nothing here")).unwrap();
        let obj = json.as_object().unwrap();
        for key in ["technical", "soft", "languages", "tools"] {
            assert_eq!(obj[key], serde_json::json!([]), "{key}");
        }
        assert_eq!(obj.len(), 4);
    }

    #[test]
    fn case_punctuation_and_duplicates() {
        let b = taxonomy().categorize("Python, JAVA; (Docker) python. git\n\"English\"");
        assert_eq!(b.technical, vec!["java", "python"]);
        assert_eq!(b.tools, vec!["docker", "git"]);
        assert_eq!(b.languages, vec!["english"]);
    }

    #[test]
    fn multi_word_entries_never_match() {
        let t = SkillsTaxonomy::from_json(r#"{"technical": ["machine learning"]}"#).unwrap();
        assert!(t.categorize("machine learning").is_empty());
    }

    #[test]
    fn flatten_follows_category_order() {
        let b = taxonomy().categorize("git teamwork english python");
        assert_eq!(b.flatten(), vec!["python", "teamwork", "english", "git"]);
    }

    #[test]
    fn unknown_category_rejected() {
        let err = SkillsTaxonomy::from_json(r#"{"technical": ["rust"], "hobbies": ["chess"]}"#);
        assert!(matches!(err, Err(TaxonomyError::Json(_))));
    }

    #[test]
    fn empty_taxonomy_rejected() {
        assert!(matches!(
            SkillsTaxonomy::from_json(r#"{"technical": [], "soft": ["  "]}"#),
            Err(TaxonomyError::Empty)
        ));
        assert!(matches!(
            SkillsTaxonomy::from_json("not json"),
            Err(TaxonomyError::Json(_))
        ));
    }

    #[test]
    fn builtin_taxonomy_loads() {
        let t = SkillsTaxonomy::builtin().unwrap();
        assert!(t.tokens(SkillCategory::Technical).contains("rust"));
        assert!(t.tokens(SkillCategory::Soft).contains("teamwork"));
    }

    #[test]
    fn proficiency_priority() {
        assert_eq!(detect_proficiency("Expert in Rust"), 1.0);
        assert_eq!(detect_proficiency("advanced SQL, basic Go"), 0.8);
        assert_eq!(detect_proficiency("Intermediate"), 0.6);
        assert_eq!(detect_proficiency("basic German"), 0.4);
        assert_eq!(detect_proficiency("familiar with Docker"), 0.3);
        assert_eq!(detect_proficiency("Rust"), 0.5);
    }
}
