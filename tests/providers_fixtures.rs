// tests/providers_fixtures.rs
//
// Each feed's parser over a stored response body.

mod common;

use matchday_predictor::ingest::http::JsonFeed;
use matchday_predictor::ingest::providers::{football_data, futebol, scorebat};
use matchday_predictor::ingest::{SourceAdapter, SourceErrorKind};

fn token() -> Option<String> {
    Some("t".into())
}

#[tokio::test]
async fn scorebat_fixture_splits_titles_and_skips_bad_items() {
    let feed = JsonFeed::from_fixture_str(
        scorebat::default_config(token()),
        scorebat::ScorebatParser,
        &common::fixture("scorebat.json"),
    );
    let got = feed.fetch().await.unwrap();
    assert_eq!(got.len(), 3);
    assert_eq!((got[1].home.as_str(), got[1].away.as_str()), ("Flamengo", "Palmeiras"));
    assert_eq!(got[1].league, "BRAZIL: Serie A");
    assert!(got.iter().all(|m| m.native_id.is_none()));
}

#[tokio::test]
async fn futebol_fixture_maps_portuguese_fields() {
    let feed = JsonFeed::from_fixture_str(
        futebol::default_config(token()),
        futebol::FutebolParser,
        &common::fixture("futebol_partidas.json"),
    );
    let got = feed.fetch().await.unwrap();
    assert_eq!(got.len(), 2);
    assert_eq!(got[1].away, "São Paulo");
    assert_eq!(got[1].kickoff, "2030-06-04T16:00:00-0300");
    assert_eq!(got[1].league, "BSA");
}

#[tokio::test]
async fn football_data_fixture_skips_undecided_slots() {
    let feed = JsonFeed::from_fixture_str(
        football_data::default_config(token()),
        football_data::FootballDataParser,
        &common::fixture("football_data.json"),
    );
    let got = feed.fetch().await.unwrap();
    assert_eq!(got.len(), 4);
    assert!(got.iter().all(|m| m.home != "Winner SF2" && m.away != "Winner SF2"));
    assert_eq!(got[3].native_id.as_deref(), Some("9005"));
    assert_eq!(got[3].league, "PD");
}

#[tokio::test]
async fn max_items_caps_each_feed() {
    let mut cfg = football_data::default_config(token());
    cfg.max_items = 2;
    let feed = JsonFeed::from_fixture_str(
        cfg,
        football_data::FootballDataParser,
        &common::fixture("football_data.json"),
    );
    assert_eq!(feed.fetch().await.unwrap().len(), 2);
}

#[tokio::test]
async fn wrong_shape_is_malformed_not_empty() {
    let feed = JsonFeed::from_fixture_str(
        futebol::default_config(token()),
        futebol::FutebolParser,
        &common::fixture("football_data.json"),
    );
    let err = feed.fetch().await.unwrap_err();
    assert_eq!(err.kind(), SourceErrorKind::MalformedResponse);
}
