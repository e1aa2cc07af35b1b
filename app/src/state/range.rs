//! Range state — the intensity field and session counters.
//!
//! Snapshot types are re-exported from the `deadeye` lib. The runtime store
//! stays here (it uses `RwLock` and is not part of the wire schema).

use std::sync::{Arc, RwLock};

pub use deadeye::{HeatmapSnapshot, SessionSnapshot};

use crate::sim::{Heatmap, Session};

/// Shared interior state backing both `RangeState` (read) and `RangeWriter`
/// (write).
struct RangeStateInner {
    heatmap: RwLock<Heatmap>,
    session: RwLock<Session>,
}

/// Read-only range state — heatmap and session snapshots.
///
/// Exposes only snapshot accessors. Lives on `SystemState.range` and is
/// accessible to all actors and the web layer; sinks pull at their own
/// cadence.
pub struct RangeState {
    inner: Arc<RangeStateInner>,
}

/// Write handle for range mutations.
///
/// Only the range actor holds this. All heatmap and session mutations flow
/// through bus events and fire commands processed there, enforced at the
/// type level.
pub struct RangeWriter {
    inner: Arc<RangeStateInner>,
}

impl RangeState {
    /// Create a new `RangeState` and its companion `RangeWriter`.
    pub fn new(heatmap: Heatmap) -> (Self, RangeWriter) {
        let inner = Arc::new(RangeStateInner {
            heatmap: RwLock::new(heatmap),
            session: RwLock::new(Session::new()),
        });
        (
            Self {
                inner: Arc::clone(&inner),
            },
            RangeWriter { inner },
        )
    }

    /// Clone out the full intensity field.
    pub fn heatmap(&self) -> HeatmapSnapshot {
        self.inner
            .heatmap
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .snapshot()
    }

    /// Current session counters.
    pub fn session(&self) -> SessionSnapshot {
        self.inner
            .session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .snapshot()
    }
}

impl RangeWriter {
    /// Intensity field resolution, fixed at construction.
    pub fn field_size(&self) -> usize {
        self.inner
            .heatmap
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .size()
    }

    /// Stamp an impact footprint at cell `(x, y)`.
    pub fn apply_impact(&self, x: usize, y: usize) {
        self.inner
            .heatmap
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .apply_impact(x, y);
    }

    /// Record one scored shot in the session counters.
    pub fn register_shot(&self, score: f64) -> SessionSnapshot {
        let mut session = self.inner.session.write().unwrap_or_else(|e| e.into_inner());
        session.register_shot(score);
        session.snapshot()
    }

    /// Zero the session counters and every heatmap cell, all-or-nothing:
    /// both locks are held for the duration so no reader sees a half reset.
    pub fn reset(&self) -> SessionSnapshot {
        let mut heatmap = self.inner.heatmap.write().unwrap_or_else(|e| e.into_inner());
        let mut session = self.inner.session.write().unwrap_or_else(|e| e.into_inner());
        heatmap.reset();
        session.reset();
        session.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_session_and_heatmap_together() {
        let (state, writer) = RangeState::new(Heatmap::new(64, 30.0, 1.5));
        writer.apply_impact(32, 32);
        writer.register_shot(10.0);

        let snap = writer.reset();
        assert_eq!(snap, SessionSnapshot::default());
        assert_eq!(state.session(), SessionSnapshot::default());
        assert!(state.heatmap().cells.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn reader_sees_writer_updates() {
        let (state, writer) = RangeState::new(Heatmap::new(64, 30.0, 1.5));
        writer.apply_impact(10, 10);
        let session = writer.register_shot(8.2);

        assert_eq!(session.shot_count, 1);
        assert_eq!(state.session().total_score, 8.0);
        assert!(state.heatmap().cells.iter().any(|&c| c > 0.0));
    }
}
