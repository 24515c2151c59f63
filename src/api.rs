use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::config::PipelinePolicy;
use crate::ingest::{SourceError, SourceHealth};
use crate::pipeline::{RankedPrediction, ResultPipeline};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ResultPipeline>,
    pub policy: Arc<PipelinePolicy>,
}

impl AppState {
    pub fn new(pipeline: Arc<ResultPipeline>, policy: PipelinePolicy) -> Self {
        Self {
            pipeline,
            policy: Arc::new(policy),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/predictions", get(predictions))
        .route("/debug/sources", get(debug_sources))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
struct PredictionsQuery {
    min_confidence: Option<f64>,
    /// 1-based
    page: Option<usize>,
    page_size: Option<usize>,
}

#[derive(Serialize)]
struct PredictionsResp {
    generated_at: DateTime<Utc>,
    total: usize,
    page: usize,
    pages: usize,
    page_size: usize,
    predictions: Vec<RankedPrediction>,
    errors: Vec<SourceError>,
    skipped_sources: Vec<String>,
    nothing_fetched: bool,
}

async fn predictions(
    State(state): State<AppState>,
    Query(q): Query<PredictionsQuery>,
) -> Json<PredictionsResp> {
    let min_confidence = q.min_confidence.unwrap_or(state.policy.min_confidence);
    let page_size = q.page_size.unwrap_or(state.policy.page_size).clamp(1, 100);
    let page = q.page.unwrap_or(1).max(1);

    let report = state.pipeline.get_predictions(Utc::now(), min_confidence).await;
    let nothing_fetched = report.nothing_fetched();
    let total = report.predictions.len();
    let pages = total.div_ceil(page_size);

    let predictions = report
        .predictions
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();

    Json(PredictionsResp {
        generated_at: report.generated_at,
        total,
        page,
        pages,
        page_size,
        predictions,
        errors: report.errors,
        skipped_sources: report.skipped_sources,
        nothing_fetched,
    })
}

#[derive(Serialize)]
struct SourcesResp {
    active: Vec<String>,
    health: BTreeMap<String, SourceHealth>,
}

async fn debug_sources(State(state): State<AppState>) -> Json<SourcesResp> {
    let orch = state.pipeline.orchestrator();
    Json(SourcesResp {
        active: orch.active_sources(),
        health: orch.cooldown_book().snapshot(),
    })
}
