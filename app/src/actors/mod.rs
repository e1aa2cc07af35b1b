//! Actor infrastructure — shared trait, bus helpers, and actor resolution.

pub mod controller;
pub mod mock;
pub mod range;
pub mod web;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio::sync::broadcast;

use crate::bus::{BusReceiver, BusSender};
use crate::channel::CommandSender;
use crate::state::SystemState;
use deadeye::DeadeyeConfig;

// ---------------------------------------------------------------------------
// Actor trait
// ---------------------------------------------------------------------------

/// Common trait for self-managed actors. Each actor struct holds its own
/// wiring; `start()` takes what it needs and spawns a thread.
pub trait Actor: Send + Sync {
    /// Spawn the actor's run loop.
    fn start(&self, state: Arc<SystemState>, sender: BusSender, receiver: BusReceiver);

    /// Request the actor to stop. Default: no-op (actors check the shutdown
    /// flag via `BusReceiver::is_shutdown()`).
    fn stop(&self) {}
}

// ---------------------------------------------------------------------------
// Actor resolution
// ---------------------------------------------------------------------------

/// A concrete actor ready to be started, resolved from config.
pub struct ResolvedActor {
    pub id: String,
    pub name: String,
    pub actor: Box<dyn Actor>,
}

/// Build the actor list from the persisted config.
///
/// The command channel has exactly one producer, so exactly one controller
/// is resolved: the mock controller when configured, the UDP controller
/// otherwise. Invalid addresses are logged and skipped.
pub fn resolve_actors(config: &DeadeyeConfig, commands: &CommandSender) -> Vec<ResolvedActor> {
    let mut actors = Vec::new();

    if let Some(section) = &config.mock_controller {
        tracing::info!("mock controller configured -- UDP controller disabled");
        actors.push(ResolvedActor {
            id: "mock_controller".into(),
            name: section.name.clone(),
            actor: Box::new(mock::MockControllerActor {
                pulse_secs: section.pulse_secs,
                commands: commands.clone(),
            }),
        });
    } else {
        let section = &config.controller;
        match section.bind.parse::<SocketAddr>() {
            Ok(addr) => {
                actors.push(ResolvedActor {
                    id: "controller".into(),
                    name: section.name.clone(),
                    actor: Box::new(controller::ControllerActor {
                        addr,
                        commands: commands.clone(),
                    }),
                });
            }
            Err(e) => {
                tracing::warn!("controller: invalid bind address '{}': {e}", section.bind);
            }
        }
    }

    if let Some(ws) = &config.webserver {
        match ws.bind.parse::<SocketAddr>() {
            Ok(addr) => {
                actors.push(ResolvedActor {
                    id: "webserver".into(),
                    name: ws.name.clone(),
                    actor: Box::new(web::WebActor::new(addr)),
                });
            }
            Err(e) => {
                tracing::warn!("webserver: invalid bind address '{}': {e}", ws.bind);
            }
        }
    }

    actors
}

/// Start a resolved actor: create bus wrappers, call start(), register in state.
pub fn start_actor(
    id: String,
    actor: Box<dyn Actor>,
    state: &Arc<SystemState>,
    bus_tx: &broadcast::Sender<deadeye::DeadeyeMessage>,
) {
    let shutdown = Arc::new(AtomicBool::new(false));
    let sender = BusSender::new(id.clone(), bus_tx.clone(), Arc::clone(&shutdown));
    let receiver = sender.subscribe();
    actor.start(Arc::clone(state), sender, receiver);
    state.register_actor(id, actor, shutdown);
}

/// Build a map of actor IDs to display names from config (for the web layer).
pub fn actor_names(config: &DeadeyeConfig) -> HashMap<String, String> {
    let mut names = HashMap::new();
    names.insert("range".into(), "Range".into());
    if let Some(section) = &config.mock_controller {
        names.insert("mock_controller".into(), section.name.clone());
    } else {
        names.insert("controller".into(), config.controller.name.clone());
    }
    if let Some(ws) = &config.webserver {
        names.insert("webserver".into(), ws.name.clone());
    }
    names
}
