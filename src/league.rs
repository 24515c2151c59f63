//! # League Table
//!
//! Static mapping from feed-supplied league labels to canonical codes,
//! display names, and the scoring modifiers used by the prediction engine.
//!
//! - Loads from JSON config (leagues + aliases), or the built-in seed.
//! - Case-insensitive lookup with normalization of punctuation and dashes.
//! - Fallback order: exact code → alias → longest contained alias → "UNK".
//! - Unlisted leagues score with neutral modifiers (1.0).

use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

pub const UNKNOWN_LEAGUE: &str = "UNK";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeagueProfile {
    /// Presentation only; the pipeline carries the code.
    pub name: String,
    /// Multiplies the home score.
    #[serde(default = "one")]
    pub home_factor: f64,
    /// Multiplies the draw score.
    #[serde(default = "one")]
    pub draw_factor: f64,
}

fn one() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueTable {
    /// Canonical code (upper-case) → profile.
    #[serde(default)]
    pub leagues: HashMap<String, LeagueProfile>,
    /// Normalized alias → canonical code.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl Default for LeagueTable {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl LeagueTable {
    /// Load from a JSON file, falling back to `default_seed()` on any error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()));
        match parsed {
            Ok(table) => table,
            Err(error) => {
                tracing::warn!(target: "config", path = %path.display(), %error, "league table unreadable, using built-in seed");
                Self::default_seed()
            }
        }
    }

    /// Canonical code for a feed label, or `"UNK"`.
    pub fn resolve_code(&self, raw: &str) -> String {
        let code = raw.trim().to_ascii_uppercase();
        if self.leagues.contains_key(&code) {
            return code;
        }

        let s = normalize(raw);
        if s.is_empty() {
            return UNKNOWN_LEAGUE.to_string();
        }
        if let Some(c) = self.aliases.get(&s) {
            return c.clone();
        }

        // "ENGLAND: Premier League" style labels: longest alias wins so
        // "brazil serie a" beats "serie a".
        let mut best: Option<(&str, &str)> = None;
        for (alias, c) in &self.aliases {
            if contains_words(&s, alias) {
                let better = match best {
                    None => true,
                    Some((b, bc)) => {
                        alias.len() > b.len() || (alias.len() == b.len() && c.as_str() < bc)
                    }
                };
                if better {
                    best = Some((alias.as_str(), c.as_str()));
                }
            }
        }
        best.map(|(_, c)| c.to_string())
            .unwrap_or_else(|| UNKNOWN_LEAGUE.to_string())
    }

    pub fn display_name(&self, code: &str) -> Option<&str> {
        self.leagues.get(code).map(|p| p.name.as_str())
    }

    pub fn home_factor(&self, code: &str) -> f64 {
        self.leagues
            .get(code)
            .map(|p| sanitize_factor(p.home_factor))
            .unwrap_or(1.0)
    }

    pub fn draw_factor(&self, code: &str) -> f64 {
        self.leagues
            .get(code)
            .map(|p| sanitize_factor(p.draw_factor))
            .unwrap_or(1.0)
    }

    /// Built-in seed covering the competitions the feeds commonly report.
    pub fn default_seed() -> Self {
        let mut leagues = HashMap::new();
        let mut aliases = HashMap::new();

        for (code, name, home, draw) in [
            ("PL", "Premier League", 1.00, 1.00),
            ("ELC", "Championship", 1.00, 1.10),
            ("PD", "La Liga", 1.04, 1.05),
            ("SA", "Serie A", 1.00, 1.12),
            ("BL1", "Bundesliga", 1.02, 0.92),
            ("FL1", "Ligue 1", 1.03, 1.05),
            ("DED", "Eredivisie", 1.05, 0.90),
            ("PPL", "Primeira Liga", 1.06, 1.00),
            ("BSA", "Brasileirão Série A", 1.10, 1.08),
            ("MLS", "Major League Soccer", 1.08, 0.95),
            ("CL", "UEFA Champions League", 0.97, 1.00),
            ("EL", "UEFA Europa League", 0.98, 1.00),
            ("WC", "FIFA World Cup", 0.90, 1.05),
            ("EC", "European Championship", 0.90, 1.08),
        ] {
            leagues.insert(
                code.to_string(),
                LeagueProfile {
                    name: name.to_string(),
                    home_factor: home,
                    draw_factor: draw,
                },
            );
        }

        for (a, c) in [
            ("premier league", "PL"),
            ("england premier league", "PL"),
            ("epl", "PL"),
            ("championship", "ELC"),
            ("england championship", "ELC"),
            ("la liga", "PD"),
            ("laliga", "PD"),
            ("primera division", "PD"),
            ("spain la liga", "PD"),
            ("serie a", "SA"),
            ("italy serie a", "SA"),
            ("bundesliga", "BL1"),
            ("germany bundesliga", "BL1"),
            ("ligue 1", "FL1"),
            ("france ligue 1", "FL1"),
            ("eredivisie", "DED"),
            ("netherlands eredivisie", "DED"),
            ("primeira liga", "PPL"),
            ("portugal primeira liga", "PPL"),
            ("liga portugal", "PPL"),
            ("brasileirao", "BSA"),
            ("brasileirão", "BSA"),
            ("brazil serie a", "BSA"),
            ("campeonato brasileiro", "BSA"),
            ("mls", "MLS"),
            ("usa mls", "MLS"),
            ("major league soccer", "MLS"),
            ("champions league", "CL"),
            ("uefa champions league", "CL"),
            ("europa league", "EL"),
            ("uefa europa league", "EL"),
            ("world cup", "WC"),
            ("euro", "EC"),
        ] {
            aliases.insert(a.to_string(), c.to_string());
        }

        Self { leagues, aliases }
    }
}

/// Lowercase, replace punctuation/dashes with spaces, collapse whitespace.
fn normalize(s: &str) -> String {
    let mut out = s.trim().to_lowercase();
    for ch in ['—', '–', '-', '_', '/', '\\', ':', '.', ',', '(', ')'] {
        out = out.replace(ch, " ");
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-word containment: "england premier league 2" contains "premier league".
fn contains_words(haystack: &str, needle: &str) -> bool {
    let h: Vec<&str> = haystack.split(' ').collect();
    let n: Vec<&str> = needle.split(' ').collect();
    !n.is_empty() && h.windows(n.len()).any(|w| w == n.as_slice())
}

fn sanitize_factor(x: f64) -> f64 {
    if x.is_finite() && x > 0.0 {
        x
    } else {
        1.0
    }
}
