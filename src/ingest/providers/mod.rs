// src/ingest/providers/mod.rs
pub mod football_data;
pub mod futebol;
pub mod scorebat;

use std::sync::Arc;

use anyhow::{bail, Result};

use crate::ingest::http::JsonFeed;
use crate::ingest::types::{SourceAdapter, SourceConfig};

/// Every feed this crate knows, as `(name, env prefix)`.
pub const KNOWN_SOURCES: &[(&str, &str)] = &[
    (football_data::NAME, "FOOTBALL_DATA"),
    (futebol::NAME, "FUTEBOL"),
    (scorebat::NAME, "SCOREBAT"),
];

/// Built-in config for a known feed, with the given credential.
pub fn default_config(name: &str, token: Option<String>) -> Option<SourceConfig> {
    match name {
        football_data::NAME => Some(football_data::default_config(token)),
        futebol::NAME => Some(futebol::default_config(token)),
        scorebat::NAME => Some(scorebat::default_config(token)),
        _ => None,
    }
}

/// Build the HTTP adapter matching `config.name`.
pub fn build_adapter(config: SourceConfig) -> Result<Arc<dyn SourceAdapter>> {
    let adapter: Arc<dyn SourceAdapter> = match config.name.as_str() {
        football_data::NAME => Arc::new(JsonFeed::http(config, football_data::FootballDataParser)?),
        futebol::NAME => Arc::new(JsonFeed::http(config, futebol::FutebolParser)?),
        scorebat::NAME => Arc::new(JsonFeed::http(config, scorebat::ScorebatParser)?),
        other => bail!("no adapter for source '{other}'"),
    };
    Ok(adapter)
}

/// Build adapters for every config; disabled ones are kept so the orchestrator can report them.
pub fn build_adapters(configs: Vec<SourceConfig>) -> Result<Vec<Arc<dyn SourceAdapter>>> {
    configs.into_iter().map(build_adapter).collect()
}
