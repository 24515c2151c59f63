// src/ingest/providers/futebol.rs
use std::time::Duration;

use serde::Deserialize;

use crate::ingest::types::{FeedParser, RawMatch, SourceAuth, SourceConfig};

pub const NAME: &str = "futebol";
pub const DEFAULT_URL: &str = "https://api.api-futebol.com.br/v1/campeonatos/10/partidas";
pub const DEFAULT_PRIORITY: u32 = 20;
/// Campeonato 10 is the Brasileirão Série A.
const LEAGUE_CODE: &str = "BSA";

#[derive(Debug, Deserialize)]
struct Time {
    nome_popular: String,
}

#[derive(Debug, Deserialize)]
struct Partida {
    #[serde(default)]
    partida_id: Option<u64>,
    time_mandante: Time,
    time_visitante: Time,
    #[serde(default)]
    data_realizacao_iso: Option<String>,
}

pub struct FutebolParser;

impl FeedParser for FutebolParser {
    fn items<'a>(&self, body: &'a serde_json::Value) -> Option<&'a Vec<serde_json::Value>> {
        body.get("partidas")?.as_array()
    }

    fn parse_item(&self, source: &str, item: &serde_json::Value) -> Option<RawMatch> {
        let p: Partida = serde_json::from_value(item.clone()).ok()?;
        Some(RawMatch {
            home: p.time_mandante.nome_popular,
            away: p.time_visitante.nome_popular,
            kickoff: p.data_realizacao_iso?,
            league: LEAGUE_CODE.to_string(),
            native_id: p.partida_id.map(|id| id.to_string()),
            source: source.to_string(),
        })
    }
}

pub fn default_config(token: Option<String>) -> SourceConfig {
    SourceConfig {
        name: NAME.to_string(),
        endpoint: DEFAULT_URL.to_string(),
        auth: token.map(SourceAuth::Bearer),
        timeout: Duration::from_secs(5),
        priority: DEFAULT_PRIORITY,
        max_items: 50,
    }
}
