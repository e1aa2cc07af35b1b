pub mod config;
mod range;

pub use range::{RangeState, RangeWriter};

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::actors::Actor;
use crate::sim::Heatmap;
use config::DeadeyeConfig;

/// Root entry point for all managed application state.
///
/// Passed as `Arc<SystemState>` to all actors and the web layer.
pub struct SystemState {
    pub config: DeadeyeConfig,
    pub range: RangeState,
    actors: RwLock<HashMap<String, (Box<dyn Actor>, Arc<AtomicBool>)>>,
}

impl SystemState {
    pub fn new(config: DeadeyeConfig) -> (Self, RangeWriter) {
        let heatmap = Heatmap::new(
            config.board.field_size,
            config.board.max_intensity,
            config.board.spread_growth,
        );
        let (range, writer) = RangeState::new(heatmap);
        (
            Self {
                config,
                range,
                actors: RwLock::new(HashMap::new()),
            },
            writer,
        )
    }

    // ----- Actor registry -----

    /// Register an actor in the registry with its shutdown flag.
    pub fn register_actor(&self, id: String, actor: Box<dyn Actor>, shutdown: Arc<AtomicBool>) {
        self.actors
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, (actor, shutdown));
    }

    /// Get the list of all registered actor IDs.
    pub fn actor_ids(&self) -> Vec<String> {
        self.actors
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    /// Stop an actor by setting its shutdown flag and calling `stop()`.
    pub fn stop_actor(&self, id: &str) {
        let guard = self.actors.read().unwrap_or_else(|e| e.into_inner());
        if let Some((actor, shutdown)) = guard.get(id) {
            shutdown.store(true, Ordering::Relaxed);
            actor.stop();
        }
    }
}
