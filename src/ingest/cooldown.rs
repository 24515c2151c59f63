// src/ingest/cooldown.rs
//! Process-wide source health book.
//!
//! One entry per source, each behind its own mutex, so concurrent pipeline
//! runs serialize updates per source but never across sources. The book is
//! cheap to clone (shared `Arc`) and is passed into the orchestrator
//! explicitly; there is no module-level state.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::ingest::types::SourceErrorKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceHealth {
    pub last_failure_at: Option<DateTime<Utc>>,
    pub last_failure_kind: Option<SourceErrorKind>,
    pub consecutive_failures: u32,
    pub last_success_at: Option<DateTime<Utc>>,
}

/// How long a failing source is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownPolicy {
    pub window: Duration,
    /// Auth rejections will not fix themselves quickly.
    pub unauthorized_window: Duration,
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self {
            window: Duration::hours(1),
            unauthorized_window: Duration::hours(6),
        }
    }
}

impl CooldownPolicy {
    pub fn window_for(&self, kind: SourceErrorKind) -> Duration {
        match kind {
            SourceErrorKind::Unauthorized => self.unauthorized_window.max(self.window),
            _ => self.window,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CooldownBook {
    inner: Arc<RwLock<HashMap<String, Arc<Mutex<SourceHealth>>>>>,
}

impl CooldownBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, source: &str) -> Arc<Mutex<SourceHealth>> {
        if let Some(e) = self.inner.read().get(source) {
            return Arc::clone(e);
        }
        let mut map = self.inner.write();
        Arc::clone(map.entry(source.to_string()).or_default())
    }

    /// `Some(until)` while `source` is inside its cool-down window at `now`.
    pub fn cooling_until(
        &self,
        source: &str,
        now: DateTime<Utc>,
        policy: &CooldownPolicy,
    ) -> Option<DateTime<Utc>> {
        let entry = self.inner.read().get(source).cloned()?;
        let h = entry.lock();
        let (at, kind) = (h.last_failure_at?, h.last_failure_kind?);
        let until = at + policy.window_for(kind);
        (now < until).then_some(until)
    }

    pub fn record_failure(&self, source: &str, kind: SourceErrorKind, now: DateTime<Utc>) {
        let entry = self.entry(source);
        let mut h = entry.lock();
        // Keep the latest failure if runs finish out of order
        if h.last_failure_at.map_or(true, |prev| now >= prev) {
            h.last_failure_at = Some(now);
            h.last_failure_kind = Some(kind);
        }
        h.consecutive_failures = h.consecutive_failures.saturating_add(1);
    }

    pub fn record_success(&self, source: &str, now: DateTime<Utc>) {
        let entry = self.entry(source);
        let mut h = entry.lock();
        h.consecutive_failures = 0;
        if h.last_success_at.map_or(true, |prev| now >= prev) {
            h.last_success_at = Some(now);
        }
    }

    pub fn get(&self, source: &str) -> Option<SourceHealth> {
        let entry = self.inner.read().get(source).cloned()?;
        let h = entry.lock().clone();
        Some(h)
    }

    /// Sorted copy of the whole book, for diagnostics.
    pub fn snapshot(&self) -> BTreeMap<String, SourceHealth> {
        self.inner
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.lock().clone()))
            .collect()
    }
}
