//! Literal-text deduplication of issues.
//!
//! Only case and surrounding whitespace are ignored; differently phrased
//! duplicates are kept.

use std::collections::HashSet;

use crate::types::Issue;

/// Case-folded, trimmed description.
pub fn dedup_key(description: &str) -> String {
    description.trim().to_lowercase()
}

/// Keep the first issue per key, preserving input order.
/// Returns (kept, removed_count).
pub fn dedupe(issues: Vec<Issue>) -> (Vec<Issue>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(issues.len());
    let mut keep = Vec::with_capacity(issues.len());
    let mut removed = 0usize;

    for issue in issues {
        if !seen.insert(dedup_key(&issue.description)) {
            removed += 1;
            continue;
        }
        keep.push(issue);
    }

    (keep, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::normalizer::normalize_plain_text;
    use chrono::Utc;

    #[test]
    fn collapses_case_and_whitespace_variants() {
        let issues = normalize_plain_text("1. App crashes\n2. APP CRASHES \n3. Slow UI", Utc::now());
        let (kept, removed) = dedupe(issues);
        let d: Vec<_> = kept.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(d, vec!["App crashes", "Slow UI"]);
        assert_eq!(removed, 1);
    }

    #[test]
    fn near_duplicates_are_not_merged() {
        let issues = normalize_plain_text("1. App crashes\n2. The app crashes", Utc::now());
        let (kept, removed) = dedupe(issues);
        assert_eq!(kept.len(), 2);
        assert_eq!(removed, 0);
    }
}
