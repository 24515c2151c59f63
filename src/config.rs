//! Configuration surface.
//!
//! - Source configs come from environment-style key/value pairs. A missing
//!   or blank `<PREFIX>_TOKEN` leaves that adapter disabled.
//! - Pipeline policy comes from TOML: `$PIPELINE_CONFIG_PATH`, then
//!   `config/pipeline.toml`, then built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::ingest::cooldown::CooldownPolicy;
use crate::ingest::providers::{self, KNOWN_SOURCES};
use crate::ingest::types::SourceConfig;
use crate::prediction::ConfidencePolicy;

pub const ENV_PIPELINE_CONFIG_PATH: &str = "PIPELINE_CONFIG_PATH";
pub const DEFAULT_PIPELINE_CONFIG_PATH: &str = "config/pipeline.toml";

/// Longest accepted duration setting (about a century).
const MAX_SECS: u64 = 3_153_600_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelinePolicy {
    pub cooldown_secs: u64,
    pub unauthorized_cooldown_secs: u64,
    pub pipeline_deadline_secs: u64,
    pub live_window_secs: u64,
    pub min_confidence: f64,
    pub boost_threshold: f64,
    pub boost_multiplier: f64,
    pub confidence_cap: f64,
    /// Unset: every run draws a fresh OS seed.
    pub entropy_seed: Option<u64>,
    pub seen_retention_secs: u64,
    pub seen_capacity: usize,
    pub page_size: usize,
    pub poll_interval_secs: u64,
    /// Optional JSON league table replacing the built-in seed.
    pub league_table_path: Option<String>,
}

impl Default for PipelinePolicy {
    fn default() -> Self {
        Self {
            cooldown_secs: 3_600,
            unauthorized_cooldown_secs: 21_600,
            pipeline_deadline_secs: 12,
            live_window_secs: 7_200,
            min_confidence: 0.0,
            boost_threshold: 90.0,
            boost_multiplier: 1.05,
            confidence_cap: 99.0,
            entropy_seed: None,
            seen_retention_secs: 86_400,
            seen_capacity: 10_000,
            page_size: 5,
            poll_interval_secs: 900,
            league_table_path: None,
        }
    }
}

impl PipelinePolicy {
    pub fn cooldown_policy(&self) -> CooldownPolicy {
        CooldownPolicy {
            window: chrono_secs(self.cooldown_secs),
            unauthorized_window: chrono_secs(self.unauthorized_cooldown_secs),
        }
    }

    pub fn pipeline_deadline(&self) -> StdDuration {
        StdDuration::from_secs(self.pipeline_deadline_secs.max(1))
    }

    pub fn live_window(&self) -> chrono::Duration {
        chrono_secs(self.live_window_secs)
    }

    pub fn confidence_policy(&self) -> ConfidencePolicy {
        ConfidencePolicy {
            boost_threshold: self.boost_threshold,
            boost_multiplier: self.boost_multiplier,
            cap: self.confidence_cap,
        }
    }

    pub fn seen_retention(&self) -> chrono::Duration {
        chrono_secs(self.seen_retention_secs)
    }

    pub fn poll_interval(&self) -> StdDuration {
        StdDuration::from_secs(self.poll_interval_secs.max(1))
    }
}

fn chrono_secs(secs: u64) -> chrono::Duration {
    chrono::Duration::seconds(secs.min(MAX_SECS) as i64)
}

pub fn parse_policy(s: &str) -> Result<PipelinePolicy> {
    let p: PipelinePolicy = toml::from_str(s).context("parsing pipeline policy")?;
    Ok(p)
}

pub fn load_policy_from(path: &Path) -> Result<PipelinePolicy> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading pipeline policy from {}", path.display()))?;
    parse_policy(&content)
}

/// 1) $PIPELINE_CONFIG_PATH (must exist)
/// 2) config/pipeline.toml
/// 3) defaults
pub fn load_policy_default() -> Result<PipelinePolicy> {
    if let Ok(p) = std::env::var(ENV_PIPELINE_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_policy_from(&pb);
        }
        return Err(anyhow!(
            "{ENV_PIPELINE_CONFIG_PATH} points to non-existent path {}",
            pb.display()
        ));
    }
    let default = PathBuf::from(DEFAULT_PIPELINE_CONFIG_PATH);
    if default.exists() {
        return load_policy_from(&default);
    }
    Ok(PipelinePolicy::default())
}

/// One `SourceConfig` per known feed, in `KNOWN_SOURCES` order. Optional
/// overrides: `<PREFIX>_URL`, `<PREFIX>_TIMEOUT_SECS`, `<PREFIX>_PRIORITY`.
pub fn source_configs_from_lookup<F>(lookup: F) -> Vec<SourceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: String| {
        lookup(&key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let mut out = Vec::with_capacity(KNOWN_SOURCES.len());
    for (name, prefix) in KNOWN_SOURCES {
        let token = get(format!("{prefix}_TOKEN"));
        let Some(mut cfg) = providers::default_config(name, token) else {
            continue;
        };

        if let Some(url) = get(format!("{prefix}_URL")) {
            cfg.endpoint = url;
        }
        if let Some(raw) = get(format!("{prefix}_TIMEOUT_SECS")) {
            match raw.parse::<u64>() {
                Ok(s) if s > 0 => cfg.timeout = StdDuration::from_secs(s),
                _ => {
                    tracing::warn!(target: "config", source = *name, value = %raw, "ignoring invalid timeout")
                }
            }
        }
        if let Some(raw) = get(format!("{prefix}_PRIORITY")) {
            match raw.parse::<u32>() {
                Ok(p) => cfg.priority = p,
                Err(_) => {
                    tracing::warn!(target: "config", source = *name, value = %raw, "ignoring invalid priority")
                }
            }
        }
        out.push(cfg);
    }
    out
}

pub fn source_configs_from_env() -> Vec<SourceConfig> {
    source_configs_from_lookup(|k| std::env::var(k).ok())
}
