// tests/synthesizer_bounds.rs
use chrono::Datelike;
use product_holmes::analyze::synthesizer::{
    OccurrenceRanges, Synthesizer, DEFAULT_YEAR_WINDOW, FALLBACK_TOTAL_RANGE,
};
use product_holmes::SourceType;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;

/// All non-empty subsets of the five platforms.
fn subsets() -> Vec<BTreeSet<SourceType>> {
    (1u32..(1 << SourceType::ALL.len()))
        .map(|mask| {
            SourceType::ALL
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, st)| *st)
                .collect()
        })
        .collect()
}

#[test]
fn each_subset_sums_to_total_within_ranges() {
    let synth = Synthesizer::default();
    let mut rng = StdRng::seed_from_u64(42);
    for set in subsets() {
        for _ in 0..20 {
            let out = synth.synthesize(&set, &mut rng);
            let keys: BTreeSet<_> = out.details.keys().copied().collect();
            assert_eq!(keys, set);
            for (st, n) in &out.details {
                assert!(synth.ranges().range_for(*st).unwrap().contains(n));
            }
            assert_eq!(out.total, out.details.values().sum::<u32>());
            assert!(out.total > 0);
        }
    }
}

#[test]
fn empty_set_draws_small_fallback_total() {
    let synth = Synthesizer::default();
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let out = synth.synthesize(&BTreeSet::new(), &mut rng);
        assert!(out.details.is_empty());
        assert!(FALLBACK_TOTAL_RANGE.contains(&out.total));
    }
}

#[test]
fn last_detected_is_valid_iso_date_in_window() {
    let synth = Synthesizer::default();
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..300 {
        let d = synth.synthesize(&BTreeSet::new(), &mut rng).last_detected;
        let iso = serde_json::to_value(d).unwrap();
        let parsed: chrono::DateTime<chrono::Utc> =
            iso.as_str().unwrap().parse().expect("ISO-8601");
        assert_eq!(parsed, d);
        assert!(d.day() <= 28);
        assert!(DEFAULT_YEAR_WINDOW.contains(&d.year()));
    }
}

#[test]
fn custom_window_and_ranges_are_honored() {
    let synth = Synthesizer::new(
        OccurrenceRanges::new([(SourceType::Tweets, 100..=100)]),
        2024..=2025,
    );
    let mut rng = StdRng::seed_from_u64(0);
    let set: BTreeSet<_> = [SourceType::Tweets].into_iter().collect();
    let out = synth.synthesize(&set, &mut rng);
    assert_eq!(out.total, 100);
    assert!((2024..=2025).contains(&out.last_detected.year()));
}
