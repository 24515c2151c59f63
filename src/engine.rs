//! # Prediction Engine
//! Pure mapping `(candidate, entropy)` → `PredictionResult`.
//! No I/O and no ambient randomness; a scripted entropy source makes every
//! output reproducible in tests.
//!
//! Raw scores per outcome:
//! - form: a baseline plus up to `FORM_SPREAD` of entropy noise,
//! - source votes: one entropy-drawn pick per reporting source
//!   (home/away count `VOTE_WEIGHT`, a draw counts `DRAW_VOTE_WEIGHT`),
//! - league modifiers on the home and draw totals.
//!
//! Entropy draws happen in a fixed order: home form, draw form, away form,
//! then one vote per source in the candidate's (sorted) source order.

use std::sync::Arc;

use crate::entropy::{unit, EntropySource};
use crate::ingest::types::MatchCandidate;
use crate::league::LeagueTable;
use crate::prediction::{
    tip_for, ConfidencePolicy, ConfidenceTier, Outcome, OutcomeProbabilities, PredictionResult,
};

pub const HOME_BASELINE: f64 = 0.50;
pub const DRAW_BASELINE: f64 = 0.10;
pub const AWAY_BASELINE: f64 = 0.30;
pub const FORM_SPREAD: f64 = 0.20;
pub const VOTE_WEIGHT: f64 = 1.0;
pub const DRAW_VOTE_WEIGHT: f64 = 0.5;

/// Unnormalized outcome scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawScores {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

#[derive(Debug, Clone)]
pub struct PredictionEngine {
    leagues: Arc<LeagueTable>,
    confidence: ConfidencePolicy,
}

impl PredictionEngine {
    pub fn new(leagues: Arc<LeagueTable>, confidence: ConfidencePolicy) -> Self {
        Self { leagues, confidence }
    }

    /// Scores for one candidate. Consumes `3 + sources.len()` entropy draws.
    pub fn raw_scores(
        &self,
        candidate: &MatchCandidate,
        entropy: &mut dyn EntropySource,
    ) -> RawScores {
        let mut home = HOME_BASELINE + FORM_SPREAD * unit(entropy.next_unit());
        let mut draw = DRAW_BASELINE + FORM_SPREAD * unit(entropy.next_unit());
        let mut away = AWAY_BASELINE + FORM_SPREAD * unit(entropy.next_unit());

        for _source in &candidate.sources {
            match vote(entropy.next_unit()) {
                Outcome::HomeWin => home += VOTE_WEIGHT,
                Outcome::Draw => draw += DRAW_VOTE_WEIGHT,
                Outcome::AwayWin => away += VOTE_WEIGHT,
            }
        }

        RawScores {
            home: home * self.leagues.home_factor(&candidate.league),
            draw: draw * self.leagues.draw_factor(&candidate.league),
            away,
        }
    }

    /// Never fails; degenerate scores fall back to 40/35/25.
    pub fn predict(
        &self,
        candidate: &MatchCandidate,
        entropy: &mut dyn EntropySource,
    ) -> PredictionResult {
        let scores = self.raw_scores(candidate, entropy);
        self.predict_from_scores(scores, &candidate.league)
    }

    pub fn predict_from_scores(&self, scores: RawScores, league: &str) -> PredictionResult {
        let probabilities =
            OutcomeProbabilities::from_raw_scores(scores.home, scores.draw, scores.away)
                .unwrap_or_else(|| {
                    tracing::debug!(target: "pipeline", ?scores, "degenerate scores, using fallback");
                    OutcomeProbabilities::FALLBACK
                });

        let (outcome, winning_pct) = probabilities.winner();
        let confidence_pct = self.confidence.apply(winning_pct);
        let tip = tip_for(outcome, ConfidenceTier::of(confidence_pct), league);

        PredictionResult {
            probabilities,
            predicted_outcome: outcome,
            confidence_pct,
            tip,
        }
    }
}

fn vote(x: f64) -> Outcome {
    let x = unit(x);
    if x < 1.0 / 3.0 {
        Outcome::HomeWin
    } else if x < 2.0 / 3.0 {
        Outcome::Draw
    } else {
        Outcome::AwayWin
    }
}
