//! # Source Type Classifier
//!
//! Maps free-text source labels coming back from the model
//! (e.g. "YouTube Transcript", "tweet", "Trustpilot Review") onto the closed
//! [`SourceType`] set.
//!
//! - Case-insensitive, whitespace-trimmed.
//! - Fallback order: exact label match → keyword table (first match wins) → default.
//! - The default is [`SourceType::GoogleArticles`]; hitting it is logged and
//!   counted, never an error.

use metrics::counter;
use tracing::warn;

use crate::types::SourceType;

/// Returned for labels nothing in the table recognizes.
pub const DEFAULT_SOURCE_TYPE: SourceType = SourceType::GoogleArticles;

/// Keyword patterns checked by substring containment, in priority order.
/// More specific phrases sit above the generic ones they contain.
pub const KEYWORD_PATTERNS: &[(&str, SourceType)] = &[
    ("youtube transcript", SourceType::YouTube),
    ("youtube comment", SourceType::YouTube),
    ("youtube", SourceType::YouTube),
    ("google article", SourceType::GoogleArticles),
    ("article", SourceType::GoogleArticles),
    ("reddit post", SourceType::RedditPosts),
    ("reddit", SourceType::RedditPosts),
    ("twitter post", SourceType::Tweets),
    ("tweet", SourceType::Tweets),
    ("twitter", SourceType::Tweets),
    ("trustpilot review", SourceType::TrustpilotPosts),
    ("trustpilot", SourceType::TrustpilotPosts),
];

/// Resolve a label without applying the default.
pub fn resolve(raw_label: &str) -> Option<SourceType> {
    let s = raw_label.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }

    // 1) Exact label match.
    if let Some(st) = SourceType::ALL
        .into_iter()
        .find(|st| st.label().to_lowercase() == s)
    {
        return Some(st);
    }

    // 2) Keyword table.
    KEYWORD_PATTERNS
        .iter()
        .find(|(pattern, _)| s.contains(pattern))
        .map(|&(_, st)| st)
}

/// Classify a label; never fails.
pub fn classify(raw_label: &str) -> SourceType {
    match resolve(raw_label) {
        Some(st) => st,
        None => {
            warn!(
                target: "classifier",
                label = raw_label,
                fallback = %DEFAULT_SOURCE_TYPE,
                "unrecognized source type, using default"
            );
            counter!("classifier_fallback_total").increment(1);
            DEFAULT_SOURCE_TYPE
        }
    }
}
