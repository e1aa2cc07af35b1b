//! REST API request/response types for the web layer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{ActorStatus, SessionSnapshot};

/// GET /api/status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub actors: HashMap<String, ActorStatusResponse>,
    pub session: SessionSnapshot,
}

/// Per-actor status within the status response. Also used as the cached
/// per-actor state in the web layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorStatusResponse {
    #[serde(default)]
    pub name: String,
    pub status: ActorStatus,
    #[serde(default)]
    pub telemetry: HashMap<String, String>,
}

/// POST /api/hit request body. Coordinates are normalized board-plane
/// values; the range actor clamps them to `[0, 1]`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct HitRequest {
    pub u: f64,
    pub v: f64,
}

/// GET /api/heatmap response — a full snapshot of the intensity field.
///
/// `cells` is row-major, `size * size` entries, each in
/// `[0, max_intensity]`. Render sinks pull this at their own cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapSnapshot {
    pub size: usize,
    pub max_intensity: f32,
    pub cells: Vec<f32>,
}
