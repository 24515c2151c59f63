// src/ingest/mod.rs
pub mod cooldown;
pub mod http;
pub mod normalize;
pub mod orchestrator;
pub mod providers;
pub mod scheduler;
pub mod types;

use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

pub use cooldown::{CooldownBook, CooldownPolicy, SourceHealth};
pub use normalize::{parse_kickoff, Normalizer};
pub use orchestrator::{FetchOrchestrator, FetchOutcome};
pub use types::{
    FetchError, MatchCandidate, RawMatch, SourceAdapter, SourceAuth, SourceConfig, SourceError,
    SourceErrorKind,
};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(describe_metrics);
}

/// Descriptions go to whichever recorder is installed at call time.
pub(crate) fn describe_metrics() {
    describe_counter!(
        "ingest_raw_matches_total",
        "Raw matches parsed from feeds, per source."
    );
    describe_counter!(
        "ingest_items_skipped_total",
        "Feed items skipped as malformed, per source."
    );
    describe_counter!(
        "ingest_source_errors_total",
        "Failed source fetches, by error kind."
    );
    describe_counter!(
        "ingest_sources_cooling_total",
        "Source calls skipped due to cool-down."
    );
    describe_histogram!("ingest_fetch_ms", "Per-source fetch time in milliseconds.");
    describe_histogram!("ingest_parse_ms", "Per-source parse time in milliseconds.");
    describe_counter!(
        "normalize_dropped_total",
        "Raw matches dropped (empty side or unparsable kickoff)."
    );
    describe_counter!(
        "normalize_merged_total",
        "Raw matches merged into an existing fixture."
    );
    describe_counter!(
        "pipeline_predictions_total",
        "Ranked predictions returned by the pipeline."
    );
    describe_counter!("scheduler_polls_total", "Completed poll-and-deliver cycles.");
    describe_gauge!(
        "pipeline_last_run_ts",
        "Unix ts when the prediction pipeline last ran."
    );
}
