// src/ingest/providers/football_data.rs
use std::time::Duration;

use serde::Deserialize;

use crate::ingest::types::{FeedParser, RawMatch, SourceAuth, SourceConfig};

pub const NAME: &str = "football-data";
pub const DEFAULT_URL: &str = "https://api.football-data.org/v4/matches";
pub const DEFAULT_PRIORITY: u32 = 10;

#[derive(Debug, Deserialize)]
struct Team {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Competition {
    #[serde(default)]
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Match {
    #[serde(default)]
    id: Option<u64>,
    utc_date: String,
    home_team: Team,
    away_team: Team,
    #[serde(default)]
    competition: Option<Competition>,
}

pub struct FootballDataParser;

impl FeedParser for FootballDataParser {
    fn items<'a>(&self, body: &'a serde_json::Value) -> Option<&'a Vec<serde_json::Value>> {
        body.get("matches")?.as_array()
    }

    fn parse_item(&self, source: &str, item: &serde_json::Value) -> Option<RawMatch> {
        let m: Match = serde_json::from_value(item.clone()).ok()?;
        // Undecided cup slots come through with null team names
        Some(RawMatch {
            home: m.home_team.name?,
            away: m.away_team.name?,
            kickoff: m.utc_date,
            league: m
                .competition
                .and_then(|c| c.code)
                .unwrap_or_else(|| "UNK".to_string()),
            native_id: m.id.map(|id| id.to_string()),
            source: source.to_string(),
        })
    }
}

pub fn default_config(token: Option<String>) -> SourceConfig {
    SourceConfig {
        name: NAME.to_string(),
        endpoint: DEFAULT_URL.to_string(),
        auth: token.map(|value| SourceAuth::Header {
            name: "X-Auth-Token".to_string(),
            value,
        }),
        timeout: Duration::from_secs(5),
        priority: DEFAULT_PRIORITY,
        max_items: 50,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_team_names_are_skipped() {
        let item = json!({
            "id": 1,
            "utcDate": "2025-05-01T18:00:00Z",
            "homeTeam": { "name": null },
            "awayTeam": { "name": "Chelsea FC" }
        });
        assert!(FootballDataParser.parse_item(NAME, &item).is_none());
    }

    #[test]
    fn competition_code_is_carried() {
        let item = json!({
            "id": 537785,
            "utcDate": "2025-05-01T18:00:00Z",
            "homeTeam": { "name": "Arsenal FC" },
            "awayTeam": { "name": "Chelsea FC" },
            "competition": { "code": "PL" }
        });
        let m = FootballDataParser.parse_item(NAME, &item).unwrap();
        assert_eq!(m.league, "PL");
        assert_eq!(m.native_id.as_deref(), Some("537785"));
    }
}
