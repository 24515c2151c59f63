//! Delivery of ranked predictions through an abstract "send text" capability.
//!
//! The pipeline never knows the channel. Callers page the ranked list, render
//! each page as plain text (one line per match) and hand it to a `TextSink`.

pub mod webhook;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::countdown::kickoff_label;
use crate::pipeline::RankedPrediction;

pub use webhook::WebhookSink;

#[async_trait]
pub trait TextSink: Send + Sync {
    async fn send_text(&self, recipient: &str, text: &str) -> Result<()>;
}

/// Writes messages to the log. Default sink when no channel is configured.
#[derive(Debug, Clone, Default)]
pub struct LogSink;

#[async_trait]
impl TextSink for LogSink {
    async fn send_text(&self, recipient: &str, text: &str) -> Result<()> {
        tracing::info!(target: "notify", recipient, lines = text.lines().count(), "{text}");
        Ok(())
    }
}

/// Chunks of at most `page_size` (0 is treated as 1), order preserved.
pub fn paginate(predictions: &[RankedPrediction], page_size: usize) -> Vec<&[RankedPrediction]> {
    predictions.chunks(page_size.max(1)).collect()
}

pub fn render_line(p: &RankedPrediction) -> String {
    let c = &p.candidate;
    let r = &p.prediction;
    format!(
        "{} vs {} | {} | {} | {} {:.1}% | {}",
        c.home,
        c.away,
        kickoff_label(c.kickoff_utc),
        p.countdown,
        r.predicted_outcome.label(),
        r.confidence_pct,
        r.tip
    )
}

/// Page header with 1-based numbering, then one line per match.
pub fn render_page(page: &[RankedPrediction], index: usize, total: usize) -> String {
    let mut out = format!("Predictions {}/{}", index + 1, total.max(1));
    for p in page {
        out.push('\n');
        out.push_str(&render_line(p));
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    /// 0-based indices of pages the sink accepted, in send order.
    pub sent_pages: Vec<usize>,
    pub pages_sent: usize,
    pub pages_failed: usize,
    pub errors: Vec<String>,
}

/// Sends every page; a failed page is recorded and the rest still go out.
pub async fn deliver(
    sink: &dyn TextSink,
    recipient: &str,
    predictions: &[RankedPrediction],
    page_size: usize,
) -> DeliveryReport {
    let pages = paginate(predictions, page_size);
    let total = pages.len();
    let mut report = DeliveryReport::default();

    for (i, page) in pages.into_iter().enumerate() {
        let text = render_page(page, i, total);
        match sink.send_text(recipient, &text).await {
            Ok(()) => {
                report.sent_pages.push(i);
                report.pages_sent += 1;
            }
            Err(e) => {
                tracing::warn!(target: "notify", recipient, page = i + 1, error = %e, "page delivery failed");
                report.pages_failed += 1;
                report.errors.push(format!("page {}: {e:#}", i + 1));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countdown::Phase;
    use crate::ingest::MatchCandidate;
    use crate::prediction::{Outcome, OutcomeProbabilities, PredictionResult};
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::BTreeSet;

    fn ranked(home: &str) -> RankedPrediction {
        RankedPrediction {
            candidate: MatchCandidate {
                home: home.into(),
                away: "Chelsea".into(),
                kickoff_utc: Utc.with_ymd_and_hms(2025, 5, 1, 18, 0, 0).unwrap(),
                league: "PL".into(),
                dedupe_key: format!("{home}|chelsea|2025-05-01"),
                sources: BTreeSet::new(),
                match_id: home.into(),
            },
            prediction: PredictionResult {
                probabilities: OutcomeProbabilities { home: 53.0, draw: 17.6, away: 29.4 },
                predicted_outcome: Outcome::HomeWin,
                confidence_pct: 53.0,
                tip: "Home win or draw (double chance)".into(),
            },
            phase: Phase::Upcoming(Duration::hours(26)),
            countdown: "1d 2h".into(),
        }
    }

    #[test]
    fn pages_hold_at_most_page_size() {
        let items: Vec<_> = ["a", "b", "c", "d", "e"].iter().map(|h| ranked(h)).collect();
        let pages = paginate(&items, 2);
        assert_eq!(pages.iter().map(|p| p.len()).collect::<Vec<_>>(), [2, 2, 1]);
        assert_eq!(paginate(&items, 0).len(), 5);
        assert!(paginate(&[], 3).is_empty());
    }

    #[test]
    fn line_is_plain_text() {
        assert_eq!(
            render_line(&ranked("Arsenal")),
            "Arsenal vs Chelsea | Thursday 01 May, 18:00 UTC | 1d 2h | Home Win 53.0% | Home win or draw (double chance)"
        );
    }

    #[test]
    fn page_header_is_one_based() {
        let items = vec![ranked("Arsenal")];
        let text = render_page(&items, 0, 3);
        assert!(text.starts_with("Predictions 1/3\nArsenal vs Chelsea"));
    }
}
