//! # Result Pipeline
//! One call, "ranked predictions for right now":
//! fetch → normalize → drop live/ended → predict → confidence filter →
//! stable sort by kickoff. Source errors travel with the result even when
//! predictions were produced.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use metrics::{counter, gauge};
use serde::Serialize;

use crate::countdown::{self, Phase};
use crate::engine::PredictionEngine;
use crate::entropy::{EntropySource, SeededEntropy};
use crate::ingest::{FetchOrchestrator, FetchOutcome, MatchCandidate, Normalizer, SourceError};
use crate::league::LeagueTable;
use crate::prediction::PredictionResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPrediction {
    pub candidate: MatchCandidate,
    pub prediction: PredictionResult,
    pub phase: Phase,
    pub countdown: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub predictions: Vec<RankedPrediction>,
    pub errors: Vec<SourceError>,
    /// Sources left alone because they are cooling down.
    pub skipped_sources: Vec<String>,
    /// Raw records returned by all sources, before normalization.
    pub raw_matches: usize,
    pub generated_at: DateTime<Utc>,
}

impl PipelineReport {
    /// No source delivered anything and at least one failed or was skipped,
    /// as opposed to feeds answering with an empty schedule.
    pub fn nothing_fetched(&self) -> bool {
        self.raw_matches == 0 && (!self.errors.is_empty() || !self.skipped_sources.is_empty())
    }
}

pub struct ResultPipeline {
    orchestrator: FetchOrchestrator,
    normalizer: Normalizer,
    engine: PredictionEngine,
    live_window: Duration,
    entropy_seed: Option<u64>,
}

impl ResultPipeline {
    pub fn new(
        orchestrator: FetchOrchestrator,
        leagues: Arc<LeagueTable>,
        engine: PredictionEngine,
        live_window: Duration,
    ) -> Self {
        let normalizer = Normalizer::new(orchestrator.priorities(), leagues);
        Self {
            orchestrator,
            normalizer,
            engine,
            live_window,
            entropy_seed: None,
        }
    }

    /// Every run starts from this seed; `None` draws a fresh OS seed per run.
    pub fn with_entropy_seed(mut self, seed: Option<u64>) -> Self {
        self.entropy_seed = seed;
        self
    }

    pub fn orchestrator(&self) -> &FetchOrchestrator {
        &self.orchestrator
    }

    pub async fn get_predictions(&self, now: DateTime<Utc>, min_confidence: f64) -> PipelineReport {
        let fetched = self.orchestrator.fetch_all(now).await;
        let mut entropy = match self.entropy_seed {
            Some(seed) => SeededEntropy::new(seed),
            None => SeededEntropy::from_os(),
        };
        self.finish(now, min_confidence, fetched, &mut entropy)
    }

    /// Same as `get_predictions` with a caller-owned entropy source.
    pub async fn get_predictions_with(
        &self,
        now: DateTime<Utc>,
        min_confidence: f64,
        entropy: &mut dyn EntropySource,
    ) -> PipelineReport {
        let fetched = self.orchestrator.fetch_all(now).await;
        self.finish(now, min_confidence, fetched, entropy)
    }

    fn finish(
        &self,
        now: DateTime<Utc>,
        min_confidence: f64,
        fetched: FetchOutcome,
        entropy: &mut dyn EntropySource,
    ) -> PipelineReport {
        let raw_matches = fetched.matches.len();
        let candidates = self.normalizer.normalize(fetched.matches);
        let total = candidates.len();
        let predictions = rank(
            &self.engine,
            candidates,
            now,
            min_confidence,
            self.live_window,
            entropy,
        );

        counter!("pipeline_predictions_total").increment(predictions.len() as u64);
        gauge!("pipeline_last_run_ts").set(now.timestamp() as f64);
        tracing::info!(
            target: "pipeline",
            candidates = total,
            ranked = predictions.len(),
            errors = fetched.errors.len(),
            skipped = fetched.skipped.len(),
            "pipeline run"
        );

        PipelineReport {
            predictions,
            errors: fetched.errors,
            skipped_sources: fetched.skipped,
            raw_matches,
            generated_at: now,
        }
    }
}

/// Steps 3–6 over already normalized candidates. Entropy is drawn only for
/// upcoming candidates, in input order.
pub fn rank(
    engine: &PredictionEngine,
    candidates: Vec<MatchCandidate>,
    now: DateTime<Utc>,
    min_confidence: f64,
    live_window: Duration,
    entropy: &mut dyn EntropySource,
) -> Vec<RankedPrediction> {
    let min_confidence = if min_confidence.is_finite() {
        min_confidence
    } else {
        0.0
    };

    let mut out: Vec<RankedPrediction> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let phase = countdown::phase(candidate.kickoff_utc, now, live_window);
            if !phase.is_upcoming() {
                return None;
            }
            let prediction = engine.predict(&candidate, entropy);
            if prediction.confidence_pct < min_confidence {
                return None;
            }
            Some(RankedPrediction {
                countdown: countdown::countdown_text(&phase),
                candidate,
                prediction,
                phase,
            })
        })
        .collect();

    // Vec::sort_by_key is stable
    out.sort_by_key(|p| p.candidate.kickoff_utc);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::ScriptedEntropy;
    use crate::prediction::{ConfidencePolicy, Outcome};
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn engine() -> PredictionEngine {
        PredictionEngine::new(
            Arc::new(LeagueTable::default_seed()),
            ConfidencePolicy::default(),
        )
    }

    fn cand(id: &str, kickoff: DateTime<Utc>) -> MatchCandidate {
        MatchCandidate {
            home: format!("{id} home"),
            away: format!("{id} away"),
            kickoff_utc: kickoff,
            league: "PL".into(),
            dedupe_key: id.into(),
            sources: BTreeSet::new(),
            match_id: id.into(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn live_and_ended_matches_are_dropped() {
        let n = now();
        let out = rank(
            &engine(),
            vec![
                cand("ended", n - Duration::hours(5)),
                cand("live", n - Duration::minutes(30)),
                cand("soon", n + Duration::hours(1)),
            ],
            n,
            0.0,
            countdown::default_live_window(),
            &mut ScriptedEntropy::new(vec![0.5]),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].candidate.match_id, "soon");
        assert_eq!(out[0].countdown, "1h");
    }

    #[test]
    fn sorted_by_kickoff_and_stable_on_ties() {
        let n = now();
        let k = n + Duration::hours(3);
        let out = rank(
            &engine(),
            vec![
                cand("late", n + Duration::hours(9)),
                cand("tie-a", k),
                cand("tie-b", k),
                cand("early", n + Duration::hours(1)),
            ],
            n,
            0.0,
            countdown::default_live_window(),
            &mut ScriptedEntropy::new(vec![0.5]),
        );
        let ids: Vec<_> = out.iter().map(|p| p.candidate.match_id.as_str()).collect();
        assert_eq!(ids, ["early", "tie-a", "tie-b", "late"]);
    }

    #[test]
    fn min_confidence_filters_predictions() {
        let n = now();
        // No sources: home form 0.5..0.7 vs draw/away; confidence stays well under 90
        let out = rank(
            &engine(),
            vec![cand("a", n + Duration::hours(26))],
            n,
            90.0,
            countdown::default_live_window(),
            &mut ScriptedEntropy::new(vec![0.5]),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn upcoming_example_renders_countdown() {
        let n = now();
        let out = rank(
            &engine(),
            vec![cand("a", n + Duration::hours(26))],
            n,
            0.0,
            countdown::default_live_window(),
            &mut ScriptedEntropy::new(vec![0.9, 0.1, 0.1]),
        );
        assert_eq!(out[0].countdown, "1d 2h");
        assert_eq!(out[0].prediction.predicted_outcome, Outcome::HomeWin);
        assert!(out[0].phase.is_upcoming());
    }
}
