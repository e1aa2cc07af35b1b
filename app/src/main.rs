use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

mod actors;
mod bus;
mod channel;
mod sim;
mod state;

use actors::Actor;
use bus::BusSender;
use deadeye::DeadeyeMessage;
use sim::{LogShooter, Scorer};
use state::SystemState;

#[derive(Parser, Debug, Clone)]
#[command(name = "deadeye", about = "Target range bridge")]
struct Config {
    /// Config file path (default: ~/.config/deadeye/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the controller bind address from the config file
    #[arg(long)]
    bind: Option<std::net::SocketAddr>,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new("deadeye=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::debug!("debug logging enabled");

    let cli = Config::parse();

    // Load (or create) config file
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(state::config::default_config_path);
    let mut config = state::config::load(&config_path);
    if let Some(bind) = cli.bind {
        config.controller.bind = bind.to_string();
    }

    // Create tokio runtime manually -- the web actor brings its own; this one
    // backs the drain task and signal handling
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    // Single unified bus
    let (bus_tx, _) = broadcast::channel::<DeadeyeMessage>(1024);

    // Fire command channel: controller -> range tick, FIFO, exactly-once
    let (commands, drain) = channel::command_channel();

    // Build shared state root
    let max_score = config.board.max_score;
    let (system_state, range_writer) = SystemState::new(config);
    let state = Arc::new(system_state);

    // Range actor — always-on simulation consumer (heatmap, scoring, session).
    // Must be fully up before the controller starts so no command is missed.
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let sender = BusSender::new("range".into(), bus_tx.clone(), Arc::clone(&shutdown));
        let receiver = sender.subscribe();
        let (actor, ready_rx) = actors::range::RangeActor::new(
            range_writer,
            drain,
            Box::new(LogShooter),
            Scorer::new(max_score),
        );
        actor.start(Arc::clone(&state), sender, receiver);
        ready_rx.recv().expect("range actor failed to start");
        state.register_actor("range".into(), Box::new(actor), shutdown);
    }

    // Start all actors from config (controller, webserver)
    for ra in actors::resolve_actors(&state.config, &commands) {
        tracing::info!("starting actor '{}' ({})", ra.id, ra.name);
        actors::start_actor(ra.id, ra.actor, &state, &bus_tx);
    }

    // Drain bus (keeps broadcast channel healthy when no other subscriber)
    let mut drain_rx = bus_tx.subscribe();
    let drain_handle = tokio::spawn(async move {
        loop {
            match drain_rx.recv().await {
                Ok(_) => {}
                Err(broadcast::error::RecvError::Closed) => break,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("drain subscriber lagged, dropped {n} events");
                }
            }
        }
    });

    rt.block_on(async { tokio::signal::ctrl_c().await })?;

    // Shutdown — refuse further fire commands, then stop all actors via registry
    tracing::info!("shutting down...");
    commands.close();
    for id in state.actor_ids() {
        state.stop_actor(&id);
    }
    // Drop bus_tx closes the broadcast channel as secondary signal
    drop(bus_tx);
    drain_handle.abort();

    Ok(())
}
