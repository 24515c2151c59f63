// src/ingest/orchestrator.rs
//! Concurrent fan-out over all enabled, non-cooling adapters.
//!
//! Each adapter runs in its own task under its own timeout. The whole fan-in
//! is bounded by a separate pipeline deadline; anything still running when it
//! fires is aborted and reported as `Timeout`. Dropping the returned future
//! drops the `JoinSet`, which aborts every in-flight call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Serialize;
use tokio::task::JoinSet;

use crate::ingest::cooldown::{CooldownBook, CooldownPolicy};
use crate::ingest::types::{FetchError, RawMatch, SourceAdapter, SourceError};

pub const DEFAULT_PIPELINE_DEADLINE: Duration = Duration::from_secs(12);

/// Result of one `fetch_all` call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchOutcome {
    /// Raw matches in adapter priority order.
    pub matches: Vec<RawMatch>,
    pub errors: Vec<SourceError>,
    /// Sources not called because they are cooling down.
    pub skipped: Vec<String>,
}

pub struct FetchOrchestrator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    book: CooldownBook,
    policy: CooldownPolicy,
    deadline: Duration,
}

impl FetchOrchestrator {
    /// Disabled adapters are dropped here, before any fetch is attempted.
    pub fn new(
        adapters: Vec<Arc<dyn SourceAdapter>>,
        book: CooldownBook,
        policy: CooldownPolicy,
        deadline: Duration,
    ) -> Self {
        let mut active: Vec<Arc<dyn SourceAdapter>> = adapters
            .into_iter()
            .filter(|a| {
                let enabled = a.config().is_enabled();
                if !enabled {
                    tracing::info!(target: "ingest", source = a.name(), "source disabled (no credentials)");
                }
                enabled
            })
            .collect();
        active.sort_by(|a, b| {
            (a.config().priority, a.name()).cmp(&(b.config().priority, b.name()))
        });

        Self {
            adapters: active,
            book,
            policy,
            deadline,
        }
    }

    /// Names of active sources, most trusted first.
    pub fn active_sources(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.name().to_string()).collect()
    }

    pub fn priorities(&self) -> HashMap<String, u32> {
        self.adapters
            .iter()
            .map(|a| (a.name().to_string(), a.config().priority))
            .collect()
    }

    pub fn cooldown_book(&self) -> &CooldownBook {
        &self.book
    }

    pub async fn fetch_all(&self, now: DateTime<Utc>) -> FetchOutcome {
        crate::ingest::ensure_metrics_described();

        let mut out = FetchOutcome::default();
        let mut results: Vec<Option<Result<Vec<RawMatch>, FetchError>>> =
            (0..self.adapters.len()).map(|_| None).collect();
        let mut attempted = vec![false; self.adapters.len()];
        let mut task_slots = HashMap::new();
        let mut set = JoinSet::new();

        for (idx, adapter) in self.adapters.iter().enumerate() {
            if let Some(until) = self.book.cooling_until(adapter.name(), now, &self.policy) {
                tracing::debug!(target: "ingest", source = adapter.name(), %until, "source cooling down, skipped");
                counter!("ingest_sources_cooling_total").increment(1);
                out.skipped.push(adapter.name().to_string());
                continue;
            }

            attempted[idx] = true;
            let adapter = Arc::clone(adapter);
            let handle = set.spawn(async move {
                let limit = adapter.config().timeout;
                let t0 = Instant::now();
                let res = match tokio::time::timeout(limit, adapter.fetch()).await {
                    Ok(r) => r,
                    Err(_) => Err(FetchError::Timeout(format!(
                        "no response within {}ms",
                        limit.as_millis()
                    ))),
                };
                histogram!("ingest_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
                res
            });
            task_slots.insert(handle.id(), idx);
        }

        let deadline = tokio::time::sleep(self.deadline);
        tokio::pin!(deadline);
        let mut deadline_hit = false;
        loop {
            tokio::select! {
                joined = set.join_next_with_id() => match joined {
                    None => break,
                    Some(Ok((id, res))) => {
                        if let Some(&idx) = task_slots.get(&id) {
                            results[idx] = Some(res);
                        }
                    }
                    Some(Err(e)) => {
                        if let Some(&idx) = task_slots.get(&e.id()) {
                            results[idx] = Some(Err(FetchError::Network(format!("adapter task failed: {e}"))));
                        }
                    }
                },
                _ = &mut deadline => {
                    deadline_hit = true;
                    break;
                }
            }
        }
        if deadline_hit {
            tracing::warn!(target: "ingest", deadline_ms = self.deadline.as_millis() as u64, "pipeline deadline hit, aborting pending sources");
            set.abort_all();
        }

        for (idx, adapter) in self.adapters.iter().enumerate() {
            if !attempted[idx] {
                continue;
            }
            let name = adapter.name();
            let res = results[idx].take().unwrap_or_else(|| {
                Err(FetchError::Timeout(format!(
                    "pipeline deadline of {}ms exceeded",
                    self.deadline.as_millis()
                )))
            });
            match res {
                Ok(mut v) => {
                    tracing::debug!(target: "ingest", source = name, count = v.len(), "source fetched");
                    self.book.record_success(name, now);
                    out.matches.append(&mut v);
                }
                Err(e) => {
                    tracing::warn!(target: "ingest", source = name, kind = %e.kind(), error = %e, "source fetch failed");
                    counter!("ingest_source_errors_total", "kind" => e.kind().as_str()).increment(1);
                    self.book.record_failure(name, e.kind(), now);
                    out.errors.push(SourceError::new(name, &e));
                }
            }
        }

        out
    }
}
