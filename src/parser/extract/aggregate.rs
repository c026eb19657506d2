use std::collections::BTreeSet;

use crate::parser::catalog::{Aggregation, FieldSpec};

use super::Candidate;

/// Reduced field value plus the index of the candidate whose origin it reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduced {
    pub value: String,
    pub origin: usize,
}

/// Reduce a field's collected candidates. An empty list never yields a value.
pub fn reduce(spec: &FieldSpec, candidates: &[Candidate]) -> Option<Reduced> {
    if candidates.is_empty() {
        return None;
    }

    let reduced = match spec.aggregate {
        Aggregation::First => Reduced {
            value: candidates[0].value.clone(),
            origin: 0,
        },
        Aggregation::Longest => {
            let origin = longest(candidates);
            Reduced {
                value: candidates[origin].value.clone(),
                origin,
            }
        }
        Aggregation::UniqueSortedJoined => Reduced {
            value: unique_sorted_joined(candidates.iter().map(|c| c.value.as_str())),
            origin: 0,
        },
        Aggregation::Joined => Reduced {
            value: candidates
                .iter()
                .map(|c| c.value.as_str())
                .collect::<Vec<_>>()
                .join(&spec.separator),
            origin: 0,
        },
        Aggregation::FixedOverride => Reduced {
            value: spec.fixed_value.clone()?,
            origin: 0,
        },
    };

    Some(reduced)
}

/// Index of the longest value by character count; ties go to the earliest.
fn longest(candidates: &[Candidate]) -> usize {
    let mut best = 0;
    let mut best_len = candidates[0].value.chars().count();
    for (i, c) in candidates.iter().enumerate().skip(1) {
        let len = c.value.chars().count();
        if len > best_len {
            best = i;
            best_len = len;
        }
    }
    best
}

pub fn unique_sorted_joined<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BBox;
    use crate::parser::catalog::{Accumulation, TextSource};

    fn spec(aggregate: Aggregation) -> FieldSpec {
        FieldSpec {
            name: "test".into(),
            rules: Vec::new(),
            accumulate: Accumulation::AllRules,
            aggregate,
            source: TextSource::Normalized,
            split: None,
            cleanup: Vec::new(),
            separator: " | ".into(),
            fixed_value: Some("yes".into()),
            stop_at_heading: false,
        }
    }

    fn candidates(values: &[&str]) -> Vec<Candidate> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Candidate {
                value: v.to_string(),
                page: i,
                bbox: BBox::ZERO,
            })
            .collect()
    }

    #[test]
    fn empty_is_absent_for_every_policy() {
        for policy in [
            Aggregation::First,
            Aggregation::Longest,
            Aggregation::Joined,
            Aggregation::UniqueSortedJoined,
            Aggregation::FixedOverride,
        ] {
            assert_eq!(reduce(&spec(policy), &[]), None);
        }
    }

    #[test]
    fn first_keeps_encounter_order() {
        let r = reduce(&spec(Aggregation::First), &candidates(&["5 years", "3+ years"])).unwrap();
        assert_eq!(r.value, "5 years");
    }

    #[test]
    fn longest_ties_go_to_first() {
        let c = candidates(&["Pune", "MIT College", "COEP Pune", "Pune Institute"]);
        let r = reduce(&spec(Aggregation::Longest), &c).unwrap();
        assert_eq!(r.value, "Pune Institute");
        assert_eq!(r.origin, 3);

        let c = candidates(&["abc", "xyz"]);
        assert_eq!(reduce(&spec(Aggregation::Longest), &c).unwrap().value, "abc");
    }

    #[test]
    fn longest_is_at_least_every_candidate() {
        let c = candidates(&["a", "ééé", "bb", "cccc", "dd"]);
        let r = reduce(&spec(Aggregation::Longest), &c).unwrap();
        assert!(c
            .iter()
            .all(|x| r.value.chars().count() >= x.value.chars().count()));
    }

    #[test]
    fn unique_sorted_dedupes_case_sensitively() {
        let c = candidates(&["SQL", "Python", "SQL", "python"]);
        let r = reduce(&spec(Aggregation::UniqueSortedJoined), &c).unwrap();
        assert_eq!(r.value, "Python, SQL, python");
    }

    #[test]
    fn unique_sorted_is_idempotent() {
        let once = unique_sorted_joined(["b", "a", "c", "a"].into_iter());
        let twice = unique_sorted_joined(once.split(", "));
        assert_eq!(once, twice);
    }

    #[test]
    fn joined_uses_field_separator() {
        let c = candidates(&["Chat App (React)", "Tracker (Rust)"]);
        let r = reduce(&spec(Aggregation::Joined), &c).unwrap();
        assert_eq!(r.value, "Chat App (React) | Tracker (Rust)");
    }

    #[test]
    fn fixed_override_ignores_matched_text() {
        let c = candidates(&["willing to relocate"]);
        let r = reduce(&spec(Aggregation::FixedOverride), &c).unwrap();
        assert_eq!(r.value, "yes");
    }
}
