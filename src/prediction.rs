//! prediction.rs — output shapes of the prediction engine.
//!
//! Probabilities are stored as exact tenths of a percent so the three values
//! always add up to 100.0, and ties compare exactly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "Home Win")]
    HomeWin,
    #[serde(rename = "Draw")]
    Draw,
    #[serde(rename = "Away Win")]
    AwayWin,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::HomeWin => "Home Win",
            Outcome::Draw => "Draw",
            Outcome::AwayWin => "Away Win",
        }
    }
}

/// Home/draw/away percentages, one decimal, summing to exactly 100.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl OutcomeProbabilities {
    /// Used when the raw scores cannot be normalized.
    pub const FALLBACK: OutcomeProbabilities = OutcomeProbabilities {
        home: 40.0,
        draw: 35.0,
        away: 25.0,
    };

    /// Normalize non-negative raw scores. `None` if they do not sum to a positive number.
    ///
    /// Each share is rounded to a tenth; the rounding remainder goes to the
    /// currently largest share (ties: home, away, draw).
    pub fn from_raw_scores(home: f64, draw: f64, away: f64) -> Option<Self> {
        let clean = |x: f64| if x.is_finite() && x > 0.0 { x } else { 0.0 };
        // Tie order: home, away, draw
        let raw = [clean(home), clean(away), clean(draw)];
        let total: f64 = raw.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return None;
        }

        let mut tenths = raw.map(|x| (x / total * 1000.0).round() as i64);
        let mut largest = 0;
        for i in 1..tenths.len() {
            if tenths[i] > tenths[largest] {
                largest = i;
            }
        }
        tenths[largest] += 1000 - tenths.iter().sum::<i64>();

        Some(Self {
            home: tenths[0] as f64 / 10.0,
            away: tenths[1] as f64 / 10.0,
            draw: tenths[2] as f64 / 10.0,
        })
    }

    /// Arg-max; ties resolve home > away > draw.
    pub fn winner(&self) -> (Outcome, f64) {
        let mut best = (Outcome::HomeWin, self.home);
        for (o, p) in [(Outcome::AwayWin, self.away), (Outcome::Draw, self.draw)] {
            if p > best.1 {
                best = (o, p);
            }
        }
        best
    }

    pub fn sum(&self) -> f64 {
        self.home + self.draw + self.away
    }
}

/// High-confidence framing: winners at or above `boost_threshold` get a
/// relative boost, capped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidencePolicy {
    pub boost_threshold: f64,
    pub boost_multiplier: f64,
    pub cap: f64,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            boost_threshold: 90.0,
            boost_multiplier: 1.05,
            cap: 99.0,
        }
    }
}

impl ConfidencePolicy {
    /// Confidence for a winning percentage, in `[0, cap]`, one decimal.
    /// A function of the raw percentage only, so recomputing is stable.
    pub fn apply(&self, winning_pct: f64) -> f64 {
        let cap = if self.cap.is_finite() {
            self.cap.clamp(0.0, 99.0)
        } else {
            99.0
        };
        let pct = if winning_pct.is_finite() {
            winning_pct.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let boosted = if pct >= self.boost_threshold {
            pct * self.boost_multiplier.max(1.0)
        } else {
            pct
        };
        round1(boosted.min(cap))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn of(confidence_pct: f64) -> Self {
        if confidence_pct >= 60.0 {
            ConfidenceTier::High
        } else if confidence_pct >= 45.0 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub probabilities: OutcomeProbabilities,
    pub predicted_outcome: Outcome,
    pub confidence_pct: f64,
    pub tip: String,
}

/// League codes with a known goals profile, for the tip suffix.
const HIGH_SCORING: &[&str] = &["BL1", "DED", "MLS"];
const LOW_SCORING: &[&str] = &["SA", "BSA", "WC", "EC"];

/// Deterministic betting-style suggestion from outcome, tier and league.
pub fn tip_for(outcome: Outcome, tier: ConfidenceTier, league: &str) -> String {
    let base = match (outcome, tier) {
        (Outcome::HomeWin, ConfidenceTier::High) => "Back the home win",
        (Outcome::HomeWin, ConfidenceTier::Medium) => "Home win or draw (double chance)",
        (Outcome::HomeWin, ConfidenceTier::Low) => "Draw no bet: home",
        (Outcome::AwayWin, ConfidenceTier::High) => "Back the away win",
        (Outcome::AwayWin, ConfidenceTier::Medium) => "Away win or draw (double chance)",
        (Outcome::AwayWin, ConfidenceTier::Low) => "Draw no bet: away",
        (Outcome::Draw, ConfidenceTier::High) => "Back the draw",
        (Outcome::Draw, ConfidenceTier::Medium) => "Draw or under 2.5 goals",
        (Outcome::Draw, ConfidenceTier::Low) => "Under 2.5 goals",
    };

    let note = if HIGH_SCORING.contains(&league) {
        Some("over 1.5 goals also in play")
    } else if LOW_SCORING.contains(&league) && tier != ConfidenceTier::High {
        Some("expect a tight game")
    } else {
        None
    };

    match note {
        Some(n) => format!("{base}; {n}"),
        None => base.to_string(),
    }
}

pub(crate) fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
