// src/types.rs
//! Canonical issue records produced by the analysis pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category assigned when the model response carried none.
pub const GENERAL_FEEDBACK: &str = "General Feedback";

/// Category labels the model is asked to choose from.
pub const CATEGORY_LABELS: [&str; 9] = [
    "Bug",
    "Performance",
    "Usability",
    "Feature Request",
    "Hardware",
    "Software",
    "Support",
    "Pricing",
    "Design",
];

/// Closed set of citation platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceType {
    #[serde(rename = "Google Articles")]
    GoogleArticles,
    #[serde(rename = "YouTube")]
    YouTube,
    #[serde(rename = "Reddit Posts")]
    RedditPosts,
    #[serde(rename = "Tweets")]
    Tweets,
    #[serde(rename = "Trustpilot Posts")]
    TrustpilotPosts,
}

impl SourceType {
    pub const ALL: [SourceType; 5] = [
        SourceType::GoogleArticles,
        SourceType::YouTube,
        SourceType::RedditPosts,
        SourceType::Tweets,
        SourceType::TrustpilotPosts,
    ];

    /// Display label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            SourceType::GoogleArticles => "Google Articles",
            SourceType::YouTube => "YouTube",
            SourceType::RedditPosts => "Reddit Posts",
            SourceType::Tweets => "Tweets",
            SourceType::TrustpilotPosts => "Trustpilot Posts",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One citation attributed to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub url: String,
    pub title: String,
}

/// Per-platform occurrence counts; only platforms attributed to the issue appear.
pub type OccurrenceDetails = BTreeMap<SourceType, u32>;

/// One normalized unit of product feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub occurrence_details: OccurrenceDetails,
    pub total_occurrences: u32,
    pub last_detected: DateTime<Utc>,
}
