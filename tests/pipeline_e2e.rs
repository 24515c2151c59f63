// tests/pipeline_e2e.rs
//
// End-to-end: fixture feeds → orchestrator → normalizer → engine → ranking.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use common::*;
use matchday_predictor::entropy::ScriptedEntropy;
use matchday_predictor::ingest::{CooldownBook, FetchError, SourceAdapter, SourceErrorKind};
use matchday_predictor::prediction::Outcome;
use matchday_predictor::build_pipeline;

#[tokio::test]
async fn fixtures_rank_upcoming_matches_by_kickoff() {
    let report = fixture_pipeline(7).get_predictions(fixture_now(), 0.0).await;

    assert!(report.errors.is_empty());
    assert!(report.skipped_sources.is_empty());

    let fixtures: Vec<(&str, &str)> = report
        .predictions
        .iter()
        .map(|p| (p.candidate.home.as_str(), p.candidate.away.as_str()))
        .collect();
    // Live (Liverpool) and ended (Bayern) games are gone; cross-feed duplicates merged
    assert_eq!(
        fixtures,
        [
            ("Arsenal FC", "Chelsea FC"),
            ("Flamengo", "Palmeiras"),
            ("Corinthians", "São Paulo"),
            ("Real Madrid CF", "FC Barcelona"),
        ]
    );

    let arsenal = &report.predictions[0];
    assert_eq!(arsenal.candidate.match_id, "football-data:9001");
    assert_eq!(arsenal.candidate.league, "PL");
    assert!(arsenal.candidate.sources.contains("scorebat"));
    assert!(arsenal.candidate.sources.contains("football-data"));
    assert_eq!(arsenal.countdown, "1d 6h");

    let flamengo = &report.predictions[1];
    // futebol outranks scorebat for this fixture
    assert_eq!(flamengo.candidate.match_id, "futebol:501");
    assert_eq!(flamengo.candidate.league, "BSA");
    assert_eq!(flamengo.candidate.sources.len(), 2);
}

#[tokio::test]
async fn fixed_seed_is_byte_identical_across_runs() {
    let a = fixture_pipeline(42).get_predictions(fixture_now(), 0.0).await;
    let b = fixture_pipeline(42).get_predictions(fixture_now(), 0.0).await;
    assert_eq!(
        serde_json::to_string(&a.predictions).unwrap(),
        serde_json::to_string(&b.predictions).unwrap()
    );
}

#[tokio::test]
async fn caller_entropy_is_used_when_supplied() {
    let p = fixture_pipeline(1);
    // Heavy home form, every source votes home
    let mut e = ScriptedEntropy::new(vec![0.99, 0.0, 0.0, 0.0, 0.0]);
    let report = p.get_predictions_with(fixture_now(), 0.0, &mut e).await;
    for r in &report.predictions {
        assert_eq!(r.prediction.predicted_outcome, Outcome::HomeWin);
    }
}

#[tokio::test]
async fn partial_failure_keeps_good_source_and_reports_one_error() {
    let good = StaticAdapter::ok(
        config("b", 20),
        vec![raw("Arsenal", "Chelsea", "2030-06-02T18:00:00Z", "b")],
    );
    let bad = StaticAdapter::failing(config("a", 10), FetchError::Network("connection reset".into()));
    let adapters: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(good), Arc::new(bad)];
    let pipeline = build_pipeline(&seeded_policy(3), adapters, CooldownBook::new());

    let report = pipeline.get_predictions(fixture_now(), 0.0).await;
    assert_eq!(report.predictions.len(), 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].source, "a");
    assert_eq!(report.errors[0].kind, SourceErrorKind::NetworkError);
    assert!(!report.nothing_fetched());
}

#[tokio::test]
async fn nothing_fetched_differs_from_nothing_scheduled() {
    let empty = StaticAdapter::ok(config("a", 10), vec![]);
    let pipeline = build_pipeline(
        &seeded_policy(3),
        vec![Arc::new(empty) as Arc<dyn SourceAdapter>],
        CooldownBook::new(),
    );
    let report = pipeline.get_predictions(fixture_now(), 0.0).await;
    assert!(report.predictions.is_empty());
    assert!(report.errors.is_empty());
    assert!(!report.nothing_fetched());

    let down = StaticAdapter::failing(config("a", 10), FetchError::Timeout("slow".into()));
    let pipeline = build_pipeline(
        &seeded_policy(3),
        vec![Arc::new(down) as Arc<dyn SourceAdapter>],
        CooldownBook::new(),
    );
    let report = pipeline.get_predictions(fixture_now(), 0.0).await;
    assert!(report.predictions.is_empty());
    assert_eq!(report.errors.len(), 1);
    assert!(report.nothing_fetched());
}

#[tokio::test]
async fn unauthorized_source_is_not_called_again_within_cooldown() {
    let bad = StaticAdapter::failing(config("a", 10), FetchError::Unauthorized("HTTP 401".into()));
    let calls = bad.calls();
    let pipeline = build_pipeline(
        &seeded_policy(3),
        vec![Arc::new(bad) as Arc<dyn SourceAdapter>],
        CooldownBook::new(),
    );

    let first = pipeline.get_predictions(fixture_now(), 0.0).await;
    assert_eq!(first.errors[0].kind, SourceErrorKind::Unauthorized);

    let second = pipeline
        .get_predictions(fixture_now() + ChronoDuration::seconds(1), 0.0)
        .await;
    assert_eq!(count(&calls), 1);
    assert!(second.errors.is_empty());
    assert_eq!(second.skipped_sources, ["a"]);
    assert!(second.nothing_fetched());
}

#[tokio::test]
async fn min_confidence_above_cap_returns_nothing_but_keeps_errors() {
    let bad = StaticAdapter::failing(config("z", 99), FetchError::Network("down".into()));
    let mut adapters = fixture_adapters();
    adapters.push(Arc::new(bad.with_delay(Duration::from_millis(10))));
    let pipeline = build_pipeline(&seeded_policy(5), adapters, CooldownBook::new());

    let report = pipeline.get_predictions(fixture_now(), 99.5).await;
    assert!(report.predictions.is_empty());
    assert_eq!(report.errors.len(), 1);
}
