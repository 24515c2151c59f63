// tests/common/mod.rs
// Shared helpers: an in-memory adapter with call counting and fixture loaders.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use matchday_predictor::config::PipelinePolicy;
use matchday_predictor::ingest::http::JsonFeed;
use matchday_predictor::ingest::providers::{football_data, futebol, scorebat};
use matchday_predictor::ingest::{
    CooldownBook, FetchError, RawMatch, SourceAdapter, SourceAuth, SourceConfig,
};
use matchday_predictor::{build_pipeline, ResultPipeline};

/// Reference instant matching the fixture schedule.
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap()
}

pub fn config(name: &str, priority: u32) -> SourceConfig {
    SourceConfig {
        name: name.to_string(),
        endpoint: format!("http://{name}.invalid/"),
        auth: Some(SourceAuth::Bearer("test".into())),
        timeout: Duration::from_secs(2),
        priority,
        max_items: 50,
    }
}

pub fn raw(home: &str, away: &str, kickoff: &str, source: &str) -> RawMatch {
    RawMatch {
        home: home.into(),
        away: away.into(),
        kickoff: kickoff.into(),
        league: "PL".into(),
        native_id: None,
        source: source.into(),
    }
}

pub struct StaticAdapter {
    config: SourceConfig,
    result: Result<Vec<RawMatch>, FetchError>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl StaticAdapter {
    pub fn ok(config: SourceConfig, matches: Vec<RawMatch>) -> Self {
        Self {
            config,
            result: Ok(matches),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(config: SourceConfig, err: FetchError) -> Self {
        Self {
            config,
            result: Err(err),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay = Some(d);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.config.auth = None;
        self
    }

    /// Handle to the call counter; keep it before moving the adapter into an `Arc`.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl SourceAdapter for StaticAdapter {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn fetch(&self) -> Result<Vec<RawMatch>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        self.result.clone()
    }
}

pub fn count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{name}")).expect("fixture")
}

/// The three real parsers fed from the JSON fixtures.
pub fn fixture_adapters() -> Vec<Arc<dyn SourceAdapter>> {
    vec![
        Arc::new(JsonFeed::from_fixture_str(
            scorebat::default_config(Some("t".into())),
            scorebat::ScorebatParser,
            &fixture("scorebat.json"),
        )),
        Arc::new(JsonFeed::from_fixture_str(
            futebol::default_config(Some("t".into())),
            futebol::FutebolParser,
            &fixture("futebol_partidas.json"),
        )),
        Arc::new(JsonFeed::from_fixture_str(
            football_data::default_config(Some("t".into())),
            football_data::FootballDataParser,
            &fixture("football_data.json"),
        )),
    ]
}

pub fn seeded_policy(seed: u64) -> PipelinePolicy {
    PipelinePolicy {
        entropy_seed: Some(seed),
        ..PipelinePolicy::default()
    }
}

pub fn fixture_pipeline(seed: u64) -> ResultPipeline {
    build_pipeline(&seeded_policy(seed), fixture_adapters(), CooldownBook::new())
}
