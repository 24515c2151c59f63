// src/ingest/normalize.rs
//! Raw feed records → deduplicated `MatchCandidate`s.
//!
//! Order of operations per record: clean team labels, parse kickoff against
//! the accepted layouts, resolve league, compute the dedupe key. Records with
//! an empty side or an unparsable kickoff are dropped (counted, not errors).
//! Groups sharing a key take field values from the most trusted source
//! (lowest priority); ties keep the first record seen.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::ingest::types::{MatchCandidate, RawMatch};
use crate::league::LeagueTable;

/// Accepted kickoff layouts, tried in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickoffLayout {
    /// `2025-05-01T18:00:00Z`
    Zulu,
    /// `2025-05-01T18:00:00+01:00`
    Offset,
    /// `2025-05-01 18:00:00`, read as UTC
    NaiveUtc,
    /// `2025-05-01T18:00:00-0300`
    CompactOffset,
}

impl KickoffLayout {
    pub const ORDERED: [KickoffLayout; 4] = [
        KickoffLayout::Zulu,
        KickoffLayout::Offset,
        KickoffLayout::NaiveUtc,
        KickoffLayout::CompactOffset,
    ];

    pub fn parse(self, s: &str) -> Option<DateTime<Utc>> {
        match self {
            KickoffLayout::Zulu => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ")
                .ok()
                .map(|n| n.and_utc()),
            KickoffLayout::Offset => DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%:z")
                .ok()
                .map(|d| d.with_timezone(&Utc)),
            KickoffLayout::NaiveUtc => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|n| n.and_utc()),
            KickoffLayout::CompactOffset => DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z")
                .ok()
                .map(|d| d.with_timezone(&Utc)),
        }
    }
}

/// First layout that parses wins.
pub fn parse_kickoff(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    KickoffLayout::ORDERED.iter().find_map(|l| l.parse(s))
}

static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Display label: decode HTML entities, collapse whitespace, trim.
pub fn clean_label(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);
    RE_WS.replace_all(&decoded, " ").trim().to_string()
}

/// Club affixes that feeds add or omit inconsistently.
const TEAM_AFFIXES: &[&str] = &["fc", "afc", "cf", "sc", "fk", "ec"];

/// Key form of a team label: lowercase, no dots, no club affixes.
pub fn team_key(label: &str) -> String {
    let lower = clean_label(label).to_lowercase().replace('.', "");
    let words: Vec<&str> = lower
        .split_whitespace()
        .filter(|w| !TEAM_AFFIXES.contains(w))
        .collect();
    if words.is_empty() {
        // Label was nothing but an affix; keep it rather than collide everything
        return lower.split_whitespace().collect::<Vec<_>>().join(" ");
    }
    words.join(" ")
}

pub fn dedupe_key(home: &str, away: &str, kickoff: DateTime<Utc>) -> String {
    format!(
        "{}|{}|{}",
        team_key(home),
        team_key(away),
        kickoff.format("%Y-%m-%d")
    )
}

/// Stable id for fixtures whose winning feed has no native id.
pub fn derived_match_id(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let mut out = String::with_capacity(14);
    out.push_str("m-");
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

struct Group {
    priority: u32,
    home: String,
    away: String,
    kickoff: DateTime<Utc>,
    league: String,
    native_id: Option<String>,
    source: String,
    sources: BTreeSet<String>,
}

pub struct Normalizer {
    priorities: HashMap<String, u32>,
    leagues: Arc<LeagueTable>,
}

impl Normalizer {
    /// Sources missing from `priorities` rank below every configured one.
    pub fn new(priorities: HashMap<String, u32>, leagues: Arc<LeagueTable>) -> Self {
        Self { priorities, leagues }
    }

    fn priority_of(&self, source: &str) -> u32 {
        self.priorities.get(source).copied().unwrap_or(u32::MAX)
    }

    /// Output keeps first-seen order of each key.
    pub fn normalize(&self, raws: Vec<RawMatch>) -> Vec<MatchCandidate> {
        let mut groups: Vec<Group> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut keys: Vec<String> = Vec::new();
        let mut dropped = 0u64;
        let mut merged = 0u64;

        for raw in raws {
            let home = clean_label(&raw.home);
            let away = clean_label(&raw.away);
            if home.is_empty() || away.is_empty() {
                dropped += 1;
                continue;
            }
            let Some(kickoff) = parse_kickoff(&raw.kickoff) else {
                tracing::debug!(target: "ingest", source = %raw.source, kickoff = %raw.kickoff, "unparsable kickoff, dropped");
                dropped += 1;
                continue;
            };

            let key = dedupe_key(&home, &away, kickoff);
            let priority = self.priority_of(&raw.source);
            let league = self.leagues.resolve_code(&raw.league);

            match index.get(&key) {
                Some(&i) => {
                    merged += 1;
                    let g = &mut groups[i];
                    g.sources.insert(raw.source.clone());
                    if priority < g.priority {
                        g.priority = priority;
                        g.home = home;
                        g.away = away;
                        g.kickoff = kickoff;
                        g.league = league;
                        g.native_id = raw.native_id;
                        g.source = raw.source;
                    }
                }
                None => {
                    index.insert(key.clone(), groups.len());
                    keys.push(key);
                    groups.push(Group {
                        priority,
                        home,
                        away,
                        kickoff,
                        league,
                        native_id: raw.native_id,
                        sources: BTreeSet::from([raw.source.clone()]),
                        source: raw.source,
                    });
                }
            }
        }

        if dropped > 0 {
            counter!("normalize_dropped_total").increment(dropped);
        }
        if merged > 0 {
            counter!("normalize_merged_total").increment(merged);
        }
        tracing::debug!(target: "ingest", kept = groups.len(), dropped, merged, "normalized");

        groups
            .into_iter()
            .zip(keys)
            .map(|(g, key)| {
                let match_id = match g.native_id.as_deref().map(str::trim) {
                    Some(id) if !id.is_empty() => format!("{}:{}", g.source, id),
                    _ => derived_match_id(&key),
                };
                MatchCandidate {
                    home: g.home,
                    away: g.away,
                    kickoff_utc: g.kickoff,
                    league: g.league,
                    dedupe_key: key,
                    sources: g.sources,
                    match_id,
                }
            })
            .collect()
    }
}
