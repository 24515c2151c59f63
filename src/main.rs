//! Matchday Predictor — Binary Entrypoint
//! Boots the Axum HTTP server, the optional poll scheduler, and metrics.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use matchday_predictor::ingest::scheduler::{spawn_poll_scheduler, PollSchedulerCfg};
use matchday_predictor::metrics::Metrics;
use matchday_predictor::notify::{LogSink, TextSink, WebhookSink};
use matchday_predictor::seen::SeenCache;
use matchday_predictor::{api, build_state_from_env};

/// Compact logs by default, JSON with PREDICTOR_LOG_JSON=1.
/// `try_init` leaves an already installed subscriber in place.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("matchday_predictor=info,warn"));

    let json = std::env::var("PREDICTOR_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let state = build_state_from_env()?;
    let policy = Arc::clone(&state.policy);

    // Recorder before any poll runs, so early series are captured
    let metrics = if std::env::var("METRICS_ENABLED").ok().as_deref() == Some("1") {
        Some(Metrics::init(&policy)?)
    } else {
        None
    };

    // Poll + deliver only when someone is listening
    if let Some(recipient) = std::env::var("POLL_RECIPIENT")
        .ok()
        .filter(|r| !r.trim().is_empty())
    {
        let sink: Arc<dyn TextSink> = match WebhookSink::from_env() {
            Some(w) => Arc::new(w),
            None => Arc::new(LogSink),
        };
        let seen = Arc::new(SeenCache::new(policy.seen_retention(), policy.seen_capacity));
        let cfg = PollSchedulerCfg {
            interval: policy.poll_interval(),
            recipient,
            page_size: policy.page_size,
            min_confidence: policy.min_confidence,
        };
        spawn_poll_scheduler(Arc::clone(&state.pipeline), seen, sink, cfg);
    }

    let mut router = api::router(state);

    if let Some(m) = &metrics {
        router = router.merge(m.router());
    }

    Ok(router.into())
}
