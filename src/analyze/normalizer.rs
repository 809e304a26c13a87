//! Issue normalizer: turns either payload shape into canonical [`Issue`] records.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use rand::distr::Alphanumeric;
use rand::Rng;
use regex::Regex;
use std::collections::BTreeSet;

use crate::analyze::classifier::classify;
use crate::analyze::response::RawIssue;
use crate::analyze::synthesizer::Synthesizer;
use crate::error::{AnalyzeError, AnalyzeResult};
use crate::types::{Issue, OccurrenceDetails, Source, GENERAL_FEEDBACK};

/// "N. " list marker, at line start or after a space. Newlines are left
/// unconsumed so back-to-back markers on consecutive lines all match.
static RE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)(?:^|[ \t])\d+\.[ \t]+").expect("valid marker regex"));

/// Blank-line paragraph boundary.
static RE_BLANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid blank regex"));

const ID_SUFFIX_LEN: usize = 7;

fn random_suffix<R: Rng>(rng: &mut R) -> String {
    (0..ID_SUFFIX_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

/// Structured mode: one issue per raw object, in input order.
pub fn normalize_structured<R: Rng>(
    raw: Vec<RawIssue>,
    synth: &Synthesizer,
    now: DateTime<Utc>,
    rng: &mut R,
) -> AnalyzeResult<Vec<Issue>> {
    let stamp = now.timestamp_millis();
    let mut out = Vec::with_capacity(raw.len());

    for (index, item) in raw.into_iter().enumerate() {
        let description = item
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if description.is_empty() {
            return Err(AnalyzeError::Format(format!(
                "issue #{} has no description",
                index + 1
            )));
        }

        let category = item
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(GENERAL_FEEDBACK)
            .to_string();

        let id = format!("iss_{stamp}_{index}_{}", random_suffix(rng));

        let sources: Vec<Source> = item
            .sources
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(n, s)| Source {
                id: format!("{id}-src-{}", n + 1),
                source_type: classify(&s.source_type),
                url: s.url.trim().to_string(),
                title: s.title.trim().to_string(),
            })
            .collect();

        let types: BTreeSet<_> = sources.iter().map(|s| s.source_type).collect();
        let synthesized = synth.synthesize(&types, rng);

        out.push(Issue {
            id,
            description,
            category,
            sources,
            occurrence_details: synthesized.details,
            total_occurrences: synthesized.total,
            last_detected: synthesized.last_detected,
        });
    }

    Ok(out)
}

/// Split a numbered list into item texts, markers removed.
///
/// Text before the first marker (a model preamble) is dropped. Without any
/// marker the text is split on blank lines instead.
pub fn split_numbered(text: &str) -> Vec<String> {
    let segments: Vec<&str> = if RE_MARKER.is_match(text) {
        RE_MARKER.split(text).skip(1).collect()
    } else {
        RE_BLANK.split(text).collect()
    };

    segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Plain-text mode: low-fidelity fallback, no synthesis.
pub fn normalize_plain_text(text: &str, now: DateTime<Utc>) -> Vec<Issue> {
    let stamp = now.timestamp_millis();
    split_numbered(text)
        .into_iter()
        .enumerate()
        .map(|(index, description)| Issue {
            id: format!("ai_{stamp}_{index}"),
            description,
            category: GENERAL_FEEDBACK.to_string(),
            sources: Vec::new(),
            occurrence_details: OccurrenceDetails::new(),
            total_occurrences: 1,
            last_detected: now,
        })
        .collect()
}
