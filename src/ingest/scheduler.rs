// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::notify::{self, DeliveryReport, TextSink};
use crate::pipeline::{RankedPrediction, ResultPipeline};
use crate::seen::SeenCache;

#[derive(Clone, Debug)]
pub struct PollSchedulerCfg {
    pub interval: Duration,
    pub recipient: String,
    pub page_size: usize,
    pub min_confidence: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PollSummary {
    pub ranked: usize,
    /// Predictions not delivered in an earlier poll.
    pub fresh: usize,
    pub source_errors: usize,
    pub delivery: DeliveryReport,
}

/// One poll: run the pipeline, keep fixtures not delivered within the
/// retention window, deliver them page by page. Only fixtures on pages the
/// sink accepted are marked seen, keyed by `dedupe_key` so a fixture keeps
/// its identity when the winning source changes between polls.
pub async fn poll_once(
    pipeline: &ResultPipeline,
    seen: &SeenCache,
    sink: &dyn TextSink,
    cfg: &PollSchedulerCfg,
    now: DateTime<Utc>,
) -> PollSummary {
    let report = pipeline.get_predictions(now, cfg.min_confidence).await;

    let fresh: Vec<RankedPrediction> = report
        .predictions
        .iter()
        .filter(|p| !seen.contains(&p.candidate.dedupe_key, now))
        .cloned()
        .collect();

    let delivery = if fresh.is_empty() {
        DeliveryReport::default()
    } else {
        notify::deliver(sink, &cfg.recipient, &fresh, cfg.page_size).await
    };

    // Failed pages stay unseen so the next poll retries them
    for (i, page) in notify::paginate(&fresh, cfg.page_size).into_iter().enumerate() {
        if delivery.sent_pages.contains(&i) {
            for p in page {
                seen.check_and_insert(&p.candidate.dedupe_key, now);
            }
        }
    }

    counter!("scheduler_polls_total").increment(1);
    if report.nothing_fetched() {
        tracing::warn!(
            target: "scheduler",
            errors = report.errors.len(),
            skipped = report.skipped_sources.len(),
            "poll fetched nothing"
        );
    }

    PollSummary {
        ranked: report.predictions.len(),
        fresh: fresh.len(),
        source_errors: report.errors.len(),
        delivery,
    }
}

/// Background poll loop; first tick fires immediately.
pub fn spawn_poll_scheduler(
    pipeline: Arc<ResultPipeline>,
    seen: Arc<SeenCache>,
    sink: Arc<dyn TextSink>,
    cfg: PollSchedulerCfg,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(cfg.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let summary = poll_once(&pipeline, &seen, sink.as_ref(), &cfg, Utc::now()).await;
            tracing::info!(
                target: "scheduler",
                ranked = summary.ranked,
                fresh = summary.fresh,
                pages = summary.delivery.pages_sent,
                failed = summary.delivery.pages_failed,
                "poll tick"
            );
        }
    })
}
