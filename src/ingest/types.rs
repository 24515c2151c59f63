// src/ingest/types.rs
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credential material and where it goes on the request.
#[derive(Clone, PartialEq, Eq)]
pub enum SourceAuth {
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// Custom header, e.g. `X-Auth-Token`.
    Header { name: String, value: String },
    /// Query parameter, e.g. `?token=...`.
    Query { param: String, value: String },
}

// Never print secrets
impl fmt::Debug for SourceAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceAuth::Bearer(_) => f.write_str("Bearer(***)"),
            SourceAuth::Header { name, .. } => write!(f, "Header({name}: ***)"),
            SourceAuth::Query { param, .. } => write!(f, "Query({param}=***)"),
        }
    }
}

/// Immutable per-adapter configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Unique key, e.g. "futebol".
    pub name: String,
    pub endpoint: String,
    /// `None` => adapter is disabled.
    pub auth: Option<SourceAuth>,
    pub timeout: Duration,
    /// Lower = preferred when two feeds report the same fixture.
    pub priority: u32,
    /// Upper bound on items taken from one response.
    pub max_items: usize,
}

impl SourceConfig {
    pub fn is_enabled(&self) -> bool {
        self.auth.is_some()
    }
}

/// One fixture as reported by a single feed, before normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawMatch {
    pub home: String,
    pub away: String,
    /// Kickoff exactly as the feed wrote it.
    pub kickoff: String,
    /// Feed-supplied league code/label, or "UNK".
    pub league: String,
    pub native_id: Option<String>,
    pub source: String,
}

/// Canonical, source-agnostic fixture record. One per `dedupe_key` after normalization.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MatchCandidate {
    pub home: String,
    pub away: String,
    pub kickoff_utc: DateTime<Utc>,
    pub league: String,
    pub dedupe_key: String,
    pub sources: BTreeSet<String>,
    pub match_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    Timeout,
    Unauthorized,
    MalformedResponse,
    NetworkError,
}

impl SourceErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceErrorKind::Timeout => "timeout",
            SourceErrorKind::Unauthorized => "unauthorized",
            SourceErrorKind::MalformedResponse => "malformed_response",
            SourceErrorKind::NetworkError => "network_error",
        }
    }
}

impl fmt::Display for SourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one adapter call. Never fatal to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    pub fn kind(&self) -> SourceErrorKind {
        match self {
            FetchError::Timeout(_) => SourceErrorKind::Timeout,
            FetchError::Unauthorized(_) => SourceErrorKind::Unauthorized,
            FetchError::MalformedResponse(_) => SourceErrorKind::MalformedResponse,
            FetchError::Network(_) => SourceErrorKind::NetworkError,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            FetchError::Timeout(d)
            | FetchError::Unauthorized(d)
            | FetchError::MalformedResponse(d)
            | FetchError::Network(d) => d,
        }
    }
}

/// Per-source error record returned beside the predictions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceError {
    pub source: String,
    pub kind: SourceErrorKind,
    pub detail: String,
}

impl SourceError {
    pub fn new(source: impl Into<String>, err: &FetchError) -> Self {
        Self {
            source: source.into(),
            kind: err.kind(),
            detail: err.detail().to_string(),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.source, self.kind, self.detail)
    }
}

/// One external feed. Implementations own their field mapping; the
/// orchestrator enforces timeouts and cool-down around `fetch`.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    fn config(&self) -> &SourceConfig;

    fn name(&self) -> &str {
        &self.config().name
    }

    /// Fetch the current fixture list. Malformed items are skipped, not fatal.
    async fn fetch(&self) -> Result<Vec<RawMatch>, FetchError>;
}

/// Feed-specific mapping from a decoded JSON body to `RawMatch` items.
pub trait FeedParser: Send + Sync + 'static {
    /// Locate the item array; `None` means the body has the wrong shape.
    fn items<'a>(&self, body: &'a serde_json::Value) -> Option<&'a Vec<serde_json::Value>>;

    /// Map one item; `None` skips it.
    fn parse_item(&self, source: &str, item: &serde_json::Value) -> Option<RawMatch>;
}
