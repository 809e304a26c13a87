// tests/structured_mode.rs
use chrono::Utc;
use product_holmes::analyze::process_payload;
use product_holmes::analyze::synthesizer::Synthesizer;
use product_holmes::{AnalyzeError, ResponseMode, SourceType};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

#[test]
fn single_issue_round_trip() {
    let payload = r#"[{"description":"Battery drains fast","category":"Hardware","sources":[{"type":"Reddit Post","url":"https://x","title":"t"}]}]"#;
    let synth = Synthesizer::default();
    let mut rng = StdRng::seed_from_u64(8);
    let (mode, issues, removed) = process_payload(payload, &synth, Utc::now(), &mut rng).unwrap();

    assert_eq!(mode, ResponseMode::Structured);
    assert_eq!(removed, 0);
    assert_eq!(issues.len(), 1);
    let i = &issues[0];
    assert_eq!(i.description, "Battery drains fast");
    assert_eq!(i.category, "Hardware");
    assert_eq!(i.sources.len(), 1);
    assert_eq!(i.sources[0].source_type, SourceType::RedditPosts);
    assert_eq!(i.sources[0].url, "https://x");

    let range = synth.ranges().range_for(SourceType::RedditPosts).unwrap();
    assert!(range.contains(&i.total_occurrences));
    assert_eq!(i.occurrence_details.get(&SourceType::RedditPosts), Some(&i.total_occurrences));
}

#[test]
fn fenced_payload_with_several_issues_keeps_order_and_unique_ids() {
    let payload = "```json\n[\
        {\"description\":\"Crashes on save\",\"category\":\"Bug\",\"sources\":[{\"type\":\"tweet\",\"url\":\"u1\",\"title\":\"a\"},{\"type\":\"mystery blog\",\"url\":\"u2\",\"title\":\"b\"}]},\
        {\"description\":\"Too pricey\",\"sources\":null},\
        {\"description\":\"Crashes on save\",\"category\":\"Bug\"}\
    ]\n```";
    let mut rng = StdRng::seed_from_u64(8);
    let (_, issues, _) =
        process_payload(payload, &Synthesizer::default(), Utc::now(), &mut rng).unwrap();

    let d: Vec<_> = issues.iter().map(|i| i.description.as_str()).collect();
    // structured results are not deduplicated
    assert_eq!(d, vec!["Crashes on save", "Too pricey", "Crashes on save"]);

    let ids: HashSet<_> = issues.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids.len(), 3);

    let first = &issues[0];
    assert_eq!(first.sources[0].source_type, SourceType::Tweets);
    // unknown label falls back to the default platform
    assert_eq!(first.sources[1].source_type, SourceType::GoogleArticles);
    assert_ne!(first.sources[0].id, first.sources[1].id);

    let second = &issues[1];
    assert_eq!(second.category, "General Feedback");
    assert!(second.sources.is_empty());
    assert!(second.occurrence_details.is_empty());
    assert!((1..=20).contains(&second.total_occurrences));
}

#[test]
fn blank_description_is_a_format_error() {
    let mut rng = StdRng::seed_from_u64(8);
    for payload in [
        r#"[{"description":"   ","category":"Bug"}]"#,
        r#"[{"category":"Bug"}]"#,
    ] {
        let err = process_payload(payload, &Synthesizer::default(), Utc::now(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::Format(_)), "{payload}");
    }
}

#[test]
fn relay_envelope_with_array_is_structured() {
    let payload = r#"{"issues":[{"description":"Lag","category":"Performance","sources":[]}]}"#;
    let mut rng = StdRng::seed_from_u64(8);
    let (mode, issues, _) =
        process_payload(payload, &Synthesizer::default(), Utc::now(), &mut rng).unwrap();
    assert_eq!(mode, ResponseMode::Structured);
    assert_eq!(issues[0].category, "Performance");
}

#[test]
fn fenced_json_after_a_preamble_is_structured() {
    let payload = "Here is the JSON you asked for:\n```json\n\
        [{\"description\":\"Battery drains fast\",\"category\":\"Hardware\",\"sources\":[{\"type\":\"Reddit Post\",\"url\":\"https://x\",\"title\":\"t\"}]}]\n\
        ```\nLet me know if you need more.";
    let mut rng = StdRng::seed_from_u64(8);
    let (mode, issues, _) =
        process_payload(payload, &Synthesizer::default(), Utc::now(), &mut rng).unwrap();
    assert_eq!(mode, ResponseMode::Structured);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].description, "Battery drains fast");
    assert_eq!(issues[0].sources[0].source_type, SourceType::RedditPosts);
}

#[test]
fn truncated_json_is_a_format_error_not_an_issue() {
    let mut rng = StdRng::seed_from_u64(8);
    for payload in [
        r#"[{"description":"Battery drains fast","category":"Hardware","sources":[{"type":"Reddit"#,
        "```json\n{\"issues\": [{\"description\":\"Lag\"\n```",
    ] {
        let err = process_payload(payload, &Synthesizer::default(), Utc::now(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::Format(_)), "{payload}");
    }
}
