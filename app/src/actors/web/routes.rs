//! REST endpoint handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use super::WebState;
use deadeye::{
    DeadeyeMessage, HeatmapSnapshot, HitRecord, HitRequest, RangeCommandEvent, StatusResponse,
};

#[derive(Deserialize)]
pub struct HitsQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// GET /api/status
pub async fn get_status(State(state): State<Arc<WebState>>) -> Json<StatusResponse> {
    let actors_guard = state.actors.read().await;
    let actors = actors_guard
        .iter()
        .map(|(id, a)| (id.clone(), a.clone()))
        .collect();

    let session = state.root.range.session();
    Json(StatusResponse { actors, session })
}

/// GET /api/heatmap — the current intensity field, pulled by render sinks.
pub async fn get_heatmap(State(state): State<Arc<WebState>>) -> Json<HeatmapSnapshot> {
    Json(state.root.range.heatmap())
}

/// GET /api/hits?limit=50 — most recent registered hits.
pub async fn get_hits(
    State(state): State<Arc<WebState>>,
    Query(query): Query<HitsQuery>,
) -> Json<Vec<HitRecord>> {
    let hits = state.hits.read().await;
    let start = hits.len().saturating_sub(query.limit);
    Json(hits.iter().skip(start).copied().collect())
}

/// POST /api/hit — the collision system reports a board intersection.
pub async fn post_hit(
    State(state): State<Arc<WebState>>,
    Json(body): Json<HitRequest>,
) -> StatusCode {
    if !body.u.is_finite() || !body.v.is_finite() {
        return StatusCode::BAD_REQUEST;
    }
    let _ = state.bus_tx.send(
        DeadeyeMessage::new(RangeCommandEvent::RegisterHit {
            u: body.u,
            v: body.v,
        })
        .source("web"),
    );
    StatusCode::ACCEPTED
}

/// POST /api/reset — zero the session counters and the heatmap.
pub async fn post_reset(State(state): State<Arc<WebState>>) -> StatusCode {
    let _ = state
        .bus_tx
        .send(DeadeyeMessage::new(RangeCommandEvent::Reset).source("web"));
    StatusCode::ACCEPTED
}
