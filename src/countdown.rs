//! Lifecycle phase and countdown text for a kickoff relative to `now`.

use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};

/// Default length of the `Live` phase after kickoff.
pub fn default_live_window() -> Duration {
    Duration::hours(2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Time remaining until kickoff, always positive.
    Upcoming(Duration),
    Live,
    Ended,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Upcoming(_) => "upcoming",
            Phase::Live => "live",
            Phase::Ended => "ended",
        }
    }

    pub fn is_upcoming(&self) -> bool {
        matches!(self, Phase::Upcoming(_))
    }
}

impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

/// Total: kickoff in the future → `Upcoming`; within `live_window` after
/// kickoff (kickoff instant included) → `Live`; otherwise `Ended`.
pub fn phase(kickoff: DateTime<Utc>, now: DateTime<Utc>, live_window: Duration) -> Phase {
    if now < kickoff {
        Phase::Upcoming(kickoff - now)
    } else if now < kickoff + live_window.max(Duration::zero()) {
        Phase::Live
    } else {
        Phase::Ended
    }
}

/// Largest two units: `"1d 2h"`, `"3h 15m"`, `"4m 10s"`.
/// A zero second unit is omitted (`"2d"`); a non-positive span renders `"0s"`.
pub fn render_countdown(delta: Duration) -> String {
    let total = delta.num_seconds();
    if total <= 0 {
        return "0s".to_string();
    }
    let units = [
        (total / 86_400, "d"),
        ((total % 86_400) / 3_600, "h"),
        ((total % 3_600) / 60, "m"),
        (total % 60, "s"),
    ];

    let Some(first) = units.iter().position(|(v, _)| *v > 0) else {
        return "0s".to_string();
    };
    let (v, u) = units[first];
    match units.get(first + 1) {
        Some((next, nu)) if *next > 0 => format!("{v}{u} {next}{nu}"),
        _ => format!("{v}{u}"),
    }
}

/// Text shown beside a prediction.
pub fn countdown_text(p: &Phase) -> String {
    match p {
        Phase::Upcoming(d) => render_countdown(*d),
        Phase::Live => "LIVE".to_string(),
        Phase::Ended => "Ended".to_string(),
    }
}

/// `"Thursday 01 May, 18:00 UTC"`
pub fn kickoff_label(kickoff: DateTime<Utc>) -> String {
    kickoff.format("%A %d %B, %H:%M UTC").to_string()
}
