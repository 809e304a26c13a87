// src/severity.rs
//! Keyword severity used by the dashboard chart. Independent of `category`.

use serde::Serialize;

use crate::types::Issue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Medium,
    Minor,
}

impl Severity {
    /// "crash" → Critical, "slow" → Medium, anything else → Minor.
    pub fn of(text: &str) -> Self {
        let t = text.to_lowercase();
        if t.contains("crash") {
            Severity::Critical
        } else if t.contains("slow") {
            Severity::Medium
        } else {
            Severity::Minor
        }
    }
}

/// Chart buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub medium: usize,
    pub minor: usize,
}

impl SeverityCounts {
    pub fn tally<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let mut out = Self::default();
        for issue in issues {
            match Severity::of(&issue.description) {
                Severity::Critical => out.critical += 1,
                Severity::Medium => out.medium += 1,
                Severity::Minor => out.minor += 1,
            }
        }
        out
    }
}

/// List glyph for an issue line.
pub fn marker(text: &str) -> &'static str {
    let t = text.to_lowercase();
    if t.contains("crash") {
        "💥"
    } else if t.contains("slow") {
        "🐢"
    } else if t.contains("bug") {
        "🐞"
    } else if t.contains("request") {
        "📩"
    } else {
        "💬"
    }
}
