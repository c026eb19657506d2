//! Pattern catalog: which fields exist, which rules feed them, how their
//! candidates are reduced, and which block texts open a section.
//!
//! The catalog is data. The built-in table lives in `data/field_catalog.json`
//! and can be replaced at startup without touching extraction code.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use tracing::debug;

use crate::error::CatalogError;

const BUILTIN_CATALOG: &str = include_str!("../../data/field_catalog.json");

static TITLE_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s:;\-–—|]*$").unwrap());

/// Pseudo-section the orchestrator adds; no catalog section may use the name.
pub const RESERVED_SECTION: &str = "skills_analysis";

/// Which part of a match becomes the candidate value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extract {
    Whole,
    /// First capture group, or the whole match when the group did not take part.
    #[default]
    FirstGroup,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accumulation {
    /// Stop at the first rule that yields a usable value.
    #[default]
    FirstRule,
    /// Collect from every rule before aggregating.
    AllRules,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    First,
    Longest,
    Joined,
    UniqueSortedJoined,
    FixedOverride,
}

/// Text a field's rules run against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    #[default]
    Normalized,
    /// Each page's raw text; matches carry their page index.
    Pages,
    /// Each layout block's text; matches carry page index and block box.
    Blocks,
}

/// Per-value cleanup, applied before aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cleanup {
    CollapseWhitespace,
    /// Drop a leading `Label:` prefix.
    StripLabel,
    /// Truncate at the earliest of these markers.
    CutAt(Vec<String>),
    TrimPunctuation,
}

#[derive(Debug, Deserialize)]
struct CatalogDef {
    #[serde(default)]
    version: Option<String>,
    sections: Vec<SectionDef>,
    fields: Vec<FieldDef>,
}

#[derive(Debug, Deserialize)]
struct SectionDef {
    name: String,
    #[serde(default)]
    titles: Vec<String>,
    /// Titles that only count when they are the whole line ("Projects",
    /// "Summary:"), so job titles like "Project Manager" stay body text.
    #[serde(default)]
    exact_titles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FieldDef {
    name: String,
    #[serde(default)]
    accumulate: Accumulation,
    aggregate: Aggregation,
    #[serde(default)]
    source: TextSource,
    #[serde(default)]
    split: Option<String>,
    #[serde(default)]
    cleanup: Vec<Cleanup>,
    #[serde(default)]
    separator: Option<String>,
    #[serde(default)]
    fixed_value: Option<String>,
    #[serde(default)]
    stop_at_heading: bool,
    rules: Vec<RuleDef>,
}

#[derive(Debug, Deserialize)]
struct RuleDef {
    pattern: String,
    #[serde(default)]
    extract: Extract,
    #[serde(default)]
    reject: Option<String>,
}

/// One match of a rule: the whole matched span plus its first group, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch<'t> {
    pub whole: &'t str,
    pub group: Option<&'t str>,
}

impl<'t> RuleMatch<'t> {
    pub fn select(&self, extract: Extract) -> &'t str {
        match extract {
            Extract::Whole => self.whole,
            Extract::FirstGroup => self.group.unwrap_or(self.whole),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatternRule {
    pub pattern: Regex,
    pub extract: Extract,
    pub reject: Option<Regex>,
}

impl PatternRule {
    /// Matches in document order.
    pub fn matches<'r, 't>(&'r self, text: &'t str) -> impl Iterator<Item = RuleMatch<'t>> + 'r
    where
        't: 'r,
    {
        self.pattern.captures_iter(text).filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(RuleMatch {
                whole: whole.as_str(),
                group: caps.get(1).map(|g| g.as_str()),
            })
        })
    }

    pub fn rejects(&self, value: &str) -> bool {
        self.reject.as_ref().is_some_and(|re| re.is_match(value))
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub rules: Vec<PatternRule>,
    pub accumulate: Accumulation,
    pub aggregate: Aggregation,
    pub source: TextSource,
    pub split: Option<Regex>,
    pub cleanup: Vec<Cleanup>,
    pub separator: String,
    pub fixed_value: Option<String>,
    /// Truncate each selected match at the first section heading line.
    pub stop_at_heading: bool,
}

#[derive(Debug, Clone)]
pub struct SectionTitle {
    pub section: String,
    pub pattern: Regex,
}

impl SectionTitle {
    /// Byte length of the title prefix when `text` opens with this title.
    pub fn match_len(&self, text: &str) -> Option<usize> {
        self.pattern.find(text).map(|m| m.end())
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    pub version: String,
    pub titles: Vec<SectionTitle>,
    pub fields: Vec<FieldSpec>,
}

impl Catalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let def: CatalogDef = serde_json::from_str(json)?;
        let titles = compile_sections(def.sections)?;
        let fields = compile_fields(def.fields)?;
        let version = def.version.unwrap_or_else(|| "unversioned".to_string());

        debug!(
            version = %version,
            fields = fields.len(),
            titles = titles.len(),
            "Compiled field catalog"
        );

        Ok(Catalog {
            version,
            titles,
            fields,
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// First section whose title opens `text`, with the title's byte length.
    pub fn identify_section(&self, text: &str) -> Option<(&str, usize)> {
        self.titles
            .iter()
            .find_map(|t| t.match_len(text).map(|len| (t.section.as_str(), len)))
    }

    /// A line holding nothing but a section title.
    pub fn is_heading(&self, line: &str) -> bool {
        self.identify_section(line)
            .is_some_and(|(_, len)| TITLE_TAIL_RE.is_match(&line[len..]))
    }

    /// `text` up to, not including, its first heading line.
    pub fn cut_at_heading<'t>(&self, text: &'t str) -> &'t str {
        let mut end = 0;
        for line in text.split_inclusive('\n') {
            if self.is_heading(line.trim()) {
                break;
            }
            end += line.len();
        }
        &text[..end]
    }
}

fn compile_sections(defs: Vec<SectionDef>) -> Result<Vec<SectionTitle>, CatalogError> {
    let mut seen = HashSet::new();
    let mut titles = Vec::new();

    for def in defs {
        if def.name == RESERVED_SECTION {
            return Err(CatalogError::ReservedSection(def.name));
        }
        if !seen.insert(def.name.clone()) {
            return Err(CatalogError::Duplicate {
                kind: "section",
                name: def.name,
            });
        }
        // Titles are start-anchored and must end on a word boundary so
        // "Educational" never opens "education".
        let prefix = def.titles.iter().map(|t| format!(r"^\s*(?:{t})\b"));
        let exact = def
            .exact_titles
            .iter()
            .map(|t| format!(r"^\s*(?:{t})\s*:?\s*$"));
        for title in prefix.chain(exact) {
            let pattern = RegexBuilder::new(&title)
                .case_insensitive(true)
                .build()
                .map_err(|source| CatalogError::Pattern {
                    owner: def.name.clone(),
                    source,
                })?;
            titles.push(SectionTitle {
                section: def.name.clone(),
                pattern,
            });
        }
    }

    Ok(titles)
}

fn compile_fields(defs: Vec<FieldDef>) -> Result<Vec<FieldSpec>, CatalogError> {
    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(defs.len());

    for def in defs {
        if !seen.insert(def.name.clone()) {
            return Err(CatalogError::Duplicate {
                kind: "field",
                name: def.name,
            });
        }
        if def.rules.is_empty() {
            return Err(CatalogError::EmptyField(def.name));
        }
        if def.aggregate == Aggregation::FixedOverride && def.fixed_value.is_none() {
            return Err(CatalogError::MissingFixedValue(def.name));
        }

        let rules = def
            .rules
            .iter()
            .map(|r| {
                Ok(PatternRule {
                    pattern: compile(&def.name, &r.pattern)?,
                    extract: r.extract,
                    reject: r
                        .reject
                        .as_deref()
                        .map(|p| compile(&def.name, p))
                        .transpose()?,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;
        let split = def
            .split
            .as_deref()
            .map(|p| compile(&def.name, p))
            .transpose()?;

        fields.push(FieldSpec {
            name: def.name,
            rules,
            accumulate: def.accumulate,
            aggregate: def.aggregate,
            source: def.source,
            split,
            cleanup: def.cleanup,
            separator: def.separator.unwrap_or_else(|| " • ".to_string()),
            fixed_value: def.fixed_value,
            stop_at_heading: def.stop_at_heading,
        });
    }

    Ok(fields)
}

fn compile(owner: &str, pattern: &str) -> Result<Regex, CatalogError> {
    RegexBuilder::new(pattern)
        .multi_line(true)
        .build()
        .map_err(|source| CatalogError::Pattern {
            owner: owner.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "sections": [{"name": "skills", "titles": ["skills"]}],
        "fields": [{"name": "email", "aggregate": "first",
                    "rules": [{"pattern": "\\S+@\\S+", "extract": "whole"}]}]
    }"#;

    #[test]
    fn builtin_catalog_compiles() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.field("email").is_some());
        assert!(catalog.field("skills").is_some());
        assert!(catalog
            .titles
            .iter()
            .all(|t| t.section != RESERVED_SECTION));
    }

    #[test]
    fn builtin_field_order_is_declaration_order() {
        let catalog = Catalog::builtin().unwrap();
        let names: Vec<&str> = catalog.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"full_name"));
        assert_eq!(names.get(1), Some(&"email"));
    }

    #[test]
    fn minimal_catalog_defaults() {
        let catalog = Catalog::from_json(MINIMAL).unwrap();
        assert_eq!(catalog.version, "unversioned");
        let email = catalog.field("email").unwrap();
        assert_eq!(email.accumulate, Accumulation::FirstRule);
        assert_eq!(email.source, TextSource::Normalized);
        assert_eq!(email.separator, " • ");
    }

    #[test]
    fn reserved_section_rejected() {
        let json = r#"{"sections": [{"name": "skills_analysis", "titles": ["x"]}], "fields": []}"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::ReservedSection(_))
        ));
    }

    #[test]
    fn bad_pattern_rejected() {
        let json = r#"{"sections": [], "fields": [{"name": "x", "aggregate": "first",
                        "rules": [{"pattern": "(unclosed"}]}]}"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::Pattern { .. })
        ));
    }

    #[test]
    fn fixed_override_needs_value() {
        let json = r#"{"sections": [], "fields": [{"name": "x", "aggregate": "fixed_override",
                        "rules": [{"pattern": "x"}]}]}"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::MissingFixedValue(_))
        ));
    }

    #[test]
    fn duplicate_field_rejected() {
        let json = r#"{"sections": [], "fields": [
            {"name": "x", "aggregate": "first", "rules": [{"pattern": "x"}]},
            {"name": "x", "aggregate": "first", "rules": [{"pattern": "y"}]}]}"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::Duplicate { kind: "field", .. })
        ));
    }

    #[test]
    fn cleanup_variants_deserialize() {
        let json = r#"{"sections": [], "fields": [{"name": "x", "aggregate": "first",
            "cleanup": ["strip_label", {"cut_at": [" ("]}, "trim_punctuation"],
            "rules": [{"pattern": "x"}]}]}"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(
            catalog.fields[0].cleanup,
            vec![
                Cleanup::StripLabel,
                Cleanup::CutAt(vec![" (".to_string()]),
                Cleanup::TrimPunctuation
            ]
        );
    }

    #[test]
    fn section_titles_anchor_to_start() {
        let catalog = Catalog::from_json(MINIMAL).unwrap();
        assert_eq!(catalog.identify_section("SKILLS"), Some(("skills", 6)));
        assert_eq!(catalog.identify_section("Skills: Rust").map(|s| s.0), Some("skills"));
        assert!(catalog.identify_section("Soft skills").is_none());
        assert!(catalog.identify_section("Skillset").is_none());
    }

    #[test]
    fn exact_titles_need_the_whole_line() {
        let json = r#"{"sections": [{"name": "projects", "exact_titles": ["projects?"]}],
                       "fields": []}"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.identify_section("PROJECTS").map(|s| s.0), Some("projects"));
        assert_eq!(catalog.identify_section("Projects:").map(|s| s.0), Some("projects"));
        assert!(catalog.identify_section("Project Manager at Acme").is_none());
    }

    #[test]
    fn headings_are_title_only_lines() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.is_heading("EXPERIENCE"));
        assert!(catalog.is_heading("Technical Skills:"));
        assert!(!catalog.is_heading("Experience with Kafka"));
        assert!(!catalog.is_heading("Python, SQL"));
    }

    #[test]
    fn cut_at_heading_keeps_lines_above() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(
            catalog.cut_at_heading("Python\nSQL\nEXPERIENCE\nAcme"),
            "Python\nSQL\n"
        );
        assert_eq!(catalog.cut_at_heading("EXPERIENCE\nAcme"), "");
        assert_eq!(catalog.cut_at_heading("Python"), "Python");
    }

    #[test]
    fn first_group_falls_back_to_whole() {
        let rule = PatternRule {
            pattern: Regex::new(r"a(b)?").unwrap(),
            extract: Extract::FirstGroup,
            reject: None,
        };
        let found: Vec<&str> = rule.matches("ab a").map(|m| m.select(rule.extract)).collect();
        assert_eq!(found, vec!["b", "a"]);
    }
}
