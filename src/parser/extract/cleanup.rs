use std::sync::LazyLock;

use regex::Regex;

use crate::parser::catalog::Cleanup;
use crate::parser::normalize::collapse_whitespace;

static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z &/]{0,30}:\s*").unwrap());

/// Apply a field's cleanups, in declared order, to one matched value.
pub fn apply(value: &str, steps: &[Cleanup]) -> String {
    let mut out = value.trim().to_string();
    for step in steps {
        out = match step {
            Cleanup::CollapseWhitespace => collapse_whitespace(&out),
            Cleanup::StripLabel => strip_label(&out).to_string(),
            Cleanup::CutAt(markers) => cut_at(&out, markers).to_string(),
            Cleanup::TrimPunctuation => trim_punctuation(&out).to_string(),
        };
    }
    out.trim().to_string()
}

fn strip_label(s: &str) -> &str {
    match LABEL_RE.find(s) {
        Some(m) => &s[m.end()..],
        None => s,
    }
}

fn cut_at<'a>(s: &'a str, markers: &[String]) -> &'a str {
    let end = markers
        .iter()
        .filter(|m| !m.is_empty())
        .filter_map(|m| s.find(m.as_str()))
        .min()
        .unwrap_or(s.len());
    &s[..end]
}

// '.' is kept: "B.E." and "Jr." end on one.
fn trim_punctuation(s: &str) -> &str {
    s.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-' | '–' | '—' | '•' | '|' | '*')
    })
}
