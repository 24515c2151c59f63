// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod countdown;
pub mod engine;
pub mod entropy;
pub mod ingest;
pub mod league;
pub mod metrics;
pub mod notify;
pub mod pipeline;
pub mod prediction;
pub mod seen;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::pipeline::{PipelineReport, RankedPrediction, ResultPipeline};

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::PipelinePolicy;
use crate::engine::PredictionEngine;
use crate::ingest::{CooldownBook, FetchOrchestrator, SourceAdapter, SourceConfig};
use crate::league::LeagueTable;

pub fn league_table_for(policy: &PipelinePolicy) -> LeagueTable {
    match &policy.league_table_path {
        Some(p) => LeagueTable::load_from_file(Path::new(p)),
        None => LeagueTable::default_seed(),
    }
}

/// Wire adapters, cool-down book and policy into a `ResultPipeline`.
pub fn build_pipeline(
    policy: &PipelinePolicy,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    book: CooldownBook,
) -> ResultPipeline {
    let leagues = Arc::new(league_table_for(policy));
    let orchestrator = FetchOrchestrator::new(
        adapters,
        book,
        policy.cooldown_policy(),
        policy.pipeline_deadline(),
    );
    let engine = PredictionEngine::new(Arc::clone(&leagues), policy.confidence_policy());
    ResultPipeline::new(orchestrator, leagues, engine, policy.live_window())
        .with_entropy_seed(policy.entropy_seed)
}

/// HTTP adapters from source configs, then the pipeline.
pub fn build_pipeline_from_configs(
    policy: &PipelinePolicy,
    configs: Vec<SourceConfig>,
) -> Result<ResultPipeline> {
    let adapters = ingest::providers::build_adapters(configs)?;
    Ok(build_pipeline(policy, adapters, CooldownBook::new()))
}

/// Router state from the process environment and the policy file.
pub fn build_state_from_env() -> Result<AppState> {
    let policy = config::load_policy_default()?;
    let configs = config::source_configs_from_env();
    let pipeline = build_pipeline_from_configs(&policy, configs)?;
    info!(sources = ?pipeline.orchestrator().active_sources(), "pipeline ready");
    Ok(AppState::new(Arc::new(pipeline), policy))
}
