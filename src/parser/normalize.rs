use std::sync::LazyLock;

use regex::Regex;

static HSPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+").unwrap());
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[•●▪◦■|]").unwrap());
static NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n(?:\s*\n)*").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize whole-document text before field extraction.
///
/// Line endings fold to `\n`, horizontal whitespace runs become one space,
/// bullet and pipe separators become line breaks, and blank lines collapse.
/// Line structure survives so line-scoped patterns stay line-scoped.
pub fn normalize_text(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = SEPARATOR_RE.replace_all(&text, "\n");
    let text = HSPACE_RE.replace_all(&text, " ");
    let text: String = text
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");
    NEWLINES_RE.replace_all(&text, "\n").trim().to_string()
}

/// Collapse every whitespace run (newlines included) to one space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RE.replace_all(s, " ").trim().to_string()
}
