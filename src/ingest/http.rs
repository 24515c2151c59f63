// src/ingest/http.rs
//! Shared JSON-over-HTTP transport for feed adapters.
//!
//! `JsonFeed<P>` does the request (auth, timeout, status mapping) and hands
//! the decoded body to the feed's `FeedParser`. A fixture mode lets tests and
//! offline runs feed a stored body through exactly the same parse path.

use std::time::Instant;

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::StatusCode;

use crate::ingest::types::{FeedParser, FetchError, RawMatch, SourceAdapter, SourceAuth, SourceConfig};

enum Mode {
    Fixture(String),
    Http { client: reqwest::Client },
}

pub struct JsonFeed<P: FeedParser> {
    config: SourceConfig,
    parser: P,
    mode: Mode,
}

impl<P: FeedParser> JsonFeed<P> {
    pub fn http(config: SourceConfig, parser: P) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("matchday-predictor/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            config,
            parser,
            mode: Mode::Http { client },
        })
    }

    /// Serve a stored body instead of calling the endpoint.
    pub fn from_fixture_str(config: SourceConfig, parser: P, body: &str) -> Self {
        Self {
            config,
            parser,
            mode: Mode::Fixture(body.to_string()),
        }
    }

    async fn body(&self) -> Result<String, FetchError> {
        match &self.mode {
            Mode::Fixture(s) => Ok(s.clone()),
            Mode::Http { client } => {
                let mut req = client.get(&self.config.endpoint);
                req = match &self.config.auth {
                    Some(SourceAuth::Bearer(token)) => req.bearer_auth(token),
                    Some(SourceAuth::Header { name, value }) => req.header(name.as_str(), value),
                    Some(SourceAuth::Query { param, value }) => {
                        req.query(&[(param.as_str(), value.as_str())])
                    }
                    None => req,
                };

                let resp = req.send().await.map_err(map_transport_error)?;
                check_status(resp.status())?;
                resp.text().await.map_err(map_transport_error)
            }
        }
    }

    /// Decode the body and map items. Bad items are skipped and counted.
    pub fn parse_body(&self, body: &str) -> Result<Vec<RawMatch>, FetchError> {
        let t0 = Instant::now();
        let source = self.config.name.as_str();

        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| FetchError::MalformedResponse(format!("body is not JSON: {e}")))?;
        let items = self.parser.items(&value).ok_or_else(|| {
            FetchError::MalformedResponse("expected item array missing from body".to_string())
        })?;

        let mut out = Vec::with_capacity(items.len().min(self.config.max_items));
        let mut skipped = 0u64;
        for item in items.iter().take(self.config.max_items) {
            match self.parser.parse_item(source, item) {
                Some(m) => out.push(m),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!(target: "ingest", source, skipped, "skipped malformed feed items");
            counter!("ingest_items_skipped_total", "source" => source.to_string()).increment(skipped);
        }
        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        counter!("ingest_raw_matches_total", "source" => source.to_string())
            .increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl<P: FeedParser> SourceAdapter for JsonFeed<P> {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn fetch(&self) -> Result<Vec<RawMatch>, FetchError> {
        let body = self.body().await?;
        self.parse_body(&body)
    }
}

/// 401/403 are auth failures; every other non-2xx is transport-level.
pub fn check_status(status: StatusCode) -> Result<(), FetchError> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(FetchError::Unauthorized(format!("HTTP {status}")));
    }
    Err(FetchError::Network(format!("HTTP {status}")))
}

fn map_transport_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(e.to_string())
    } else if e.is_decode() {
        FetchError::MalformedResponse(e.to_string())
    } else {
        FetchError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_map_to_unauthorized() {
        for s in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = check_status(s).unwrap_err();
            assert!(matches!(err, FetchError::Unauthorized(_)), "{s}");
        }
    }

    #[test]
    fn other_failures_are_network_errors() {
        for s in [
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::NOT_FOUND,
        ] {
            let err = check_status(s).unwrap_err();
            assert!(matches!(err, FetchError::Network(_)), "{s}");
        }
        assert!(check_status(StatusCode::OK).is_ok());
    }
}
