//! Occurrence synthesizer: plausible per-platform counts and a last-detected
//! date for issues whose model response carried no occurrence signal.
//!
//! All random draws go through the caller-supplied [`Rng`], so tests can pass
//! a seeded generator.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::types::{OccurrenceDetails, SourceType};

/// Range used when no platform contributes any occurrence.
pub const FALLBACK_TOTAL_RANGE: RangeInclusive<u32> = 1..=20;

/// Years `last_detected` is drawn from.
pub const DEFAULT_YEAR_WINDOW: RangeInclusive<i32> = 2020..=2025;

/// Days are capped at 28 so every month yields a valid date.
const MAX_DAY: u32 = 28;

/// Inclusive per-platform contribution ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceRanges {
    ranges: Vec<(SourceType, RangeInclusive<u32>)>,
}

impl Default for OccurrenceRanges {
    fn default() -> Self {
        Self::new([
            (SourceType::GoogleArticles, 5..=50),
            (SourceType::YouTube, 10..=120),
            (SourceType::RedditPosts, 8..=80),
            (SourceType::Tweets, 15..=200),
            (SourceType::TrustpilotPosts, 3..=40),
        ])
    }
}

impl OccurrenceRanges {
    /// Build a table; reversed bounds are swapped. Platforms left out contribute nothing.
    pub fn new(entries: impl IntoIterator<Item = (SourceType, RangeInclusive<u32>)>) -> Self {
        let ranges = entries
            .into_iter()
            .map(|(st, r)| {
                let (lo, hi) = (*r.start(), *r.end());
                (st, lo.min(hi)..=lo.max(hi))
            })
            .collect();
        Self { ranges }
    }

    pub fn range_for(&self, st: SourceType) -> Option<RangeInclusive<u32>> {
        self.ranges
            .iter()
            .find(|(k, _)| *k == st)
            .map(|(_, r)| r.clone())
    }
}

/// Output of one synthesis draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesized {
    pub details: OccurrenceDetails,
    pub total: u32,
    pub last_detected: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Synthesizer {
    ranges: OccurrenceRanges,
    years: RangeInclusive<i32>,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new(OccurrenceRanges::default(), DEFAULT_YEAR_WINDOW)
    }
}

impl Synthesizer {
    pub fn new(ranges: OccurrenceRanges, years: RangeInclusive<i32>) -> Self {
        let (lo, hi) = (*years.start(), *years.end());
        Self {
            ranges,
            years: lo.min(hi)..=lo.max(hi),
        }
    }

    pub fn ranges(&self) -> &OccurrenceRanges {
        &self.ranges
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.years.clone()
    }

    pub fn synthesize<R: Rng>(&self, types: &BTreeSet<SourceType>, rng: &mut R) -> Synthesized {
        let mut details = OccurrenceDetails::new();
        let mut total: u32 = 0;
        for &st in types {
            let Some(range) = self.ranges.range_for(st) else {
                continue;
            };
            let n = rng.random_range(range);
            details.insert(st, n);
            total = total.saturating_add(n);
        }

        // No issue may report zero occurrences.
        if total == 0 {
            details.clear();
            total = rng.random_range(FALLBACK_TOTAL_RANGE);
        }

        Synthesized {
            details,
            total,
            last_detected: self.random_date(rng),
        }
    }

    fn random_date<R: Rng>(&self, rng: &mut R) -> DateTime<Utc> {
        let year = rng.random_range(self.years.clone());
        let month = rng.random_range(1..=12u32);
        let day = rng.random_range(1..=MAX_DAY);
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now)
    }
}
