//! UDP controller actor. Listens for orientation/trigger datagrams from the
//! motion controller and turns trigger rising edges into fire commands.
//!
//! Decode and edge detection run synchronously per datagram on this thread;
//! the only thing crossing to the simulation side is the fire command.

pub mod edge;

pub use edge::TriggerEdge;

use std::collections::HashMap;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::Actor;
use crate::bus::{BusReceiver, BusSender};
use crate::channel::{CommandSender, FireCommand};
use crate::state::SystemState;
use deadeye::{
    ActorState, ActorStatus, AlertLevel, AlertMessage, ControllerEvent, DeadeyeMessage, InputSample,
};

/// Read timeout on the socket so the loop stays shutdown-responsive
/// without forced thread termination.
const RECV_TIMEOUT: Duration = Duration::from_millis(900);
const MIN_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);
const TELEMETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Controller session actor. Binds the UDP socket and processes samples in
/// a rebinding event loop.
pub struct ControllerActor {
    pub addr: SocketAddr,
    pub commands: CommandSender,
}

impl Actor for ControllerActor {
    fn start(&self, _state: Arc<SystemState>, sender: BusSender, receiver: BusReceiver) {
        let addr = self.addr;
        let commands = self.commands.clone();
        let thread_name = format!("device:{}", sender.actor_id());

        std::thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                run(addr, commands, sender, receiver);
            })
            .expect("failed to spawn controller thread");
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Per-session packet counters for status emission.
#[derive(Default)]
struct Counters {
    packets: u64,
    malformed: u64,
    trigger_pulls: u64,
}

fn telemetry_state(addr: &SocketAddr, counters: &Counters) -> HashMap<String, String> {
    let mut m = HashMap::new();
    m.insert("bind".into(), addr.to_string());
    m.insert("packets".into(), counters.packets.to_string());
    m.insert("malformed".into(), counters.malformed.to_string());
    m.insert("trigger_pulls".into(), counters.trigger_pulls.to_string());
    m
}

fn emit_status(sender: &BusSender, status: ActorStatus, state: HashMap<String, String>) {
    sender.send(DeadeyeMessage::new(ActorState::new(status, state)));
}

fn emit_alert(sender: &BusSender, level: AlertLevel, message: impl Into<String>) {
    sender.send(DeadeyeMessage::new(AlertMessage {
        level,
        message: message.into(),
    }));
}

fn is_timeout(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn run(addr: SocketAddr, commands: CommandSender, sender: BusSender, mut receiver: BusReceiver) {
    let mut backoff = MIN_BACKOFF;

    loop {
        if receiver.poll().is_err() {
            break;
        }

        emit_status(&sender, ActorStatus::Starting, HashMap::new());

        match bind_and_listen(addr, &commands, &sender, &mut receiver) {
            Ok(()) => break,
            Err(e) => {
                warn!("bind {addr} failed: {e}");
                emit_alert(
                    &sender,
                    AlertLevel::Warn,
                    format!("Controller socket error: {e}"),
                );
                emit_status(&sender, ActorStatus::Retrying, HashMap::new());
                info!("retrying in {}s", backoff.as_secs());

                let deadline = Instant::now() + backoff;
                while Instant::now() < deadline {
                    if receiver.poll().is_err() {
                        emit_status(&sender, ActorStatus::Stopped, HashMap::new());
                        return;
                    }
                    std::thread::sleep(Duration::from_millis(250));
                }
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
        }
    }

    emit_status(&sender, ActorStatus::Stopped, HashMap::new());
}

/// Bind the socket and pump datagrams until shutdown. Returns `Ok(())` on a
/// clean shutdown, `Err` only for bind/setup failures — receive errors are
/// logged and the loop keeps listening.
fn bind_and_listen(
    addr: SocketAddr,
    commands: &CommandSender,
    sender: &BusSender,
    receiver: &mut BusReceiver,
) -> std::io::Result<()> {
    let socket = UdpSocket::bind(addr)?;
    socket.set_read_timeout(Some(RECV_TIMEOUT))?;

    let mut counters = Counters::default();
    let mut trigger_edge = TriggerEdge::new();
    let mut reload_edge = TriggerEdge::new();
    let mut last_telemetry = Instant::now();
    let mut buf = [0u8; 512];

    info!("listening on {addr}");
    emit_status(sender, ActorStatus::Listening, telemetry_state(&addr, &counters));

    loop {
        if receiver.poll().is_err() {
            return Ok(());
        }

        match socket.recv_from(&mut buf) {
            Ok((len, peer)) => {
                counters.packets += 1;
                match InputSample::parse(&buf[..len]) {
                    Ok(sample) => {
                        if trigger_edge.observe(sample.trigger_pressed) {
                            counters.trigger_pulls += 1;
                            if commands.enqueue(FireCommand).is_err() {
                                info!("command channel closed, stopping");
                                return Ok(());
                            }
                            debug!("trigger pull #{} from {peer}", counters.trigger_pulls);
                            sender.send(DeadeyeMessage::new(ControllerEvent::TriggerPulled));
                        }
                        if reload_edge.observe(sample.reload_requested) {
                            sender.send(DeadeyeMessage::new(ControllerEvent::ReloadRequested));
                        }
                    }
                    Err(e) => {
                        counters.malformed += 1;
                        warn!("malformed datagram from {peer}: {e}");
                    }
                }
            }
            Err(ref e) if is_timeout(e) => {}
            Err(e) => {
                warn!("recv error: {e}");
            }
        }

        if last_telemetry.elapsed() >= TELEMETRY_INTERVAL {
            last_telemetry = Instant::now();
            emit_status(sender, ActorStatus::Listening, telemetry_state(&addr, &counters));
        }
    }
}
