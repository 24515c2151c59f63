// src/ingest/providers/scorebat.rs
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::ingest::types::{FeedParser, RawMatch, SourceAuth, SourceConfig};

pub const NAME: &str = "scorebat";
pub const DEFAULT_URL: &str = "https://www.scorebat.com/video-api/v3/";
pub const DEFAULT_PRIORITY: u32 = 30;

#[derive(Debug, Deserialize)]
struct Item {
    title: String,
    date: String,
    #[serde(default)]
    competition: Option<String>,
}

/// Scorebat only ships a "Home - Away" title, so team names come from splitting it.
pub struct ScorebatParser;

static RE_TITLE_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+(?:vs\.?|v|-|–)\s+").expect("title split regex"));

/// Split "Arsenal - Chelsea" / "Arsenal vs Chelsea" into the two sides.
pub fn split_title(title: &str) -> Option<(String, String)> {
    let mut parts = RE_TITLE_SPLIT.splitn(title.trim(), 2);
    let home = parts.next()?.trim();
    let away = parts.next()?.trim();
    if home.is_empty() || away.is_empty() {
        return None;
    }
    Some((home.to_string(), away.to_string()))
}

impl FeedParser for ScorebatParser {
    fn items<'a>(&self, body: &'a serde_json::Value) -> Option<&'a Vec<serde_json::Value>> {
        body.get("response")?.as_array()
    }

    fn parse_item(&self, source: &str, item: &serde_json::Value) -> Option<RawMatch> {
        let it: Item = serde_json::from_value(item.clone()).ok()?;
        let (home, away) = split_title(&it.title)?;
        Some(RawMatch {
            home,
            away,
            kickoff: it.date,
            league: it.competition.unwrap_or_else(|| "UNK".to_string()),
            native_id: None,
            source: source.to_string(),
        })
    }
}

pub fn default_config(token: Option<String>) -> SourceConfig {
    SourceConfig {
        name: NAME.to_string(),
        endpoint: DEFAULT_URL.to_string(),
        auth: token.map(|value| SourceAuth::Query {
            param: "token".to_string(),
            value,
        }),
        timeout: Duration::from_secs(5),
        priority: DEFAULT_PRIORITY,
        max_items: 50,
    }
}
