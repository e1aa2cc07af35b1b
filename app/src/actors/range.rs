//! Range actor — the always-on simulation consumer.
//!
//! Holds the sole `RangeWriter`, enforcing that all heatmap and session
//! mutations flow through events processed here. Once per tick it drains
//! bus commands (hits, resets) and then the fire command queue, invoking
//! the injected `Shoot` capability exactly once per command.

use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::info;

use super::Actor;
use crate::bus::{BusReceiver, BusSender, PollError};
use crate::channel::CommandDrain;
use crate::sim::{Scorer, Shoot};
use crate::state::{RangeWriter, SystemState};
use deadeye::{DeadeyeEvent, DeadeyeMessage, HitRecord, RangeCommandEvent, ShotFired};

const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Radius of the scoring circle in normalized board coordinates: the circle
/// inscribed in the unit square, centered on (0.5, 0.5).
const MAX_BOARD_DISTANCE: f64 = 0.5;

/// Range actor. Always-on — not config-driven.
pub struct RangeActor {
    writer: Mutex<Option<RangeWriter>>,
    drain: Mutex<Option<CommandDrain>>,
    shooter: Mutex<Option<Box<dyn Shoot>>>,
    scorer: Scorer,
    ready_tx: Mutex<Option<std_mpsc::SyncSender<()>>>,
}

impl RangeActor {
    pub fn new(
        writer: RangeWriter,
        drain: CommandDrain,
        shooter: Box<dyn Shoot>,
        scorer: Scorer,
    ) -> (Self, std_mpsc::Receiver<()>) {
        let (ready_tx, ready_rx) = std_mpsc::sync_channel(0);
        let actor = Self {
            writer: Mutex::new(Some(writer)),
            drain: Mutex::new(Some(drain)),
            shooter: Mutex::new(Some(shooter)),
            scorer,
            ready_tx: Mutex::new(Some(ready_tx)),
        };
        (actor, ready_rx)
    }
}

impl Actor for RangeActor {
    fn start(&self, _state: Arc<SystemState>, sender: BusSender, receiver: BusReceiver) {
        let writer = self
            .writer
            .lock()
            .unwrap()
            .take()
            .expect("RangeActor::start() called more than once");
        let drain = self
            .drain
            .lock()
            .unwrap()
            .take()
            .expect("RangeActor::start() called more than once");
        let shooter = self
            .shooter
            .lock()
            .unwrap()
            .take()
            .expect("RangeActor::start() called more than once");
        let ready_tx = self
            .ready_tx
            .lock()
            .unwrap()
            .take()
            .expect("RangeActor::start() called more than once");
        let scorer = self.scorer;

        std::thread::Builder::new()
            .name("range".into())
            .spawn(move || run(writer, drain, shooter, scorer, sender, receiver, ready_tx))
            .expect("failed to spawn range thread");
    }
}

fn run(
    writer: RangeWriter,
    mut drain: CommandDrain,
    mut shooter: Box<dyn Shoot>,
    scorer: Scorer,
    sender: BusSender,
    mut receiver: BusReceiver,
    ready_tx: std_mpsc::SyncSender<()>,
) {
    // Signal main thread that we're up and polling.
    let _ = ready_tx.send(());
    drop(ready_tx);

    let mut fired: u64 = 0;

    loop {
        // Drain bus commands
        loop {
            match receiver.poll() {
                Err(PollError::Shutdown) => return,
                Ok(None) => break,
                Ok(Some(msg)) => {
                    if let DeadeyeEvent::RangeCommand(cmd) = &msg.event {
                        match cmd.event {
                            RangeCommandEvent::RegisterHit { u, v } => {
                                register_hit(&writer, &scorer, &sender, u, v);
                            }
                            RangeCommandEvent::Reset => {
                                let session = writer.reset();
                                info!("session reset");
                                sender.send(DeadeyeMessage::new(session));
                            }
                        }
                    }
                }
            }
        }

        // Execute queued fire commands, one Shoot() invocation each
        for _cmd in drain.drain_all() {
            fired += 1;
            shooter.shoot();
            sender.send(DeadeyeMessage::new(ShotFired { number: fired }));
        }

        std::thread::sleep(TICK_INTERVAL);
    }
}

/// Register a scored hit at normalized board coordinate `(u, v)`.
///
/// Coordinates are clamped to the board before touching the accumulator;
/// the score comes from the radial distance to the board center.
fn register_hit(writer: &RangeWriter, scorer: &Scorer, sender: &BusSender, u: f64, v: f64) {
    let u = u.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);

    let size = writer.field_size();
    let x = (u * (size - 1) as f64).round() as usize;
    let y = (v * (size - 1) as f64).round() as usize;
    writer.apply_impact(x, y);

    let distance = ((u - 0.5).powi(2) + (v - 0.5).powi(2)).sqrt();
    let score = scorer.score(distance, MAX_BOARD_DISTANCE);
    let session = writer.register_shot(score);

    info!(
        "hit ({u:.3}, {v:.3}): score {score:.1} | total {} over {} shots",
        session.total_score, session.shot_count,
    );
    sender.send(DeadeyeMessage::new(HitRecord { u, v, score }));
    sender.send(DeadeyeMessage::new(session));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{FireCommand, command_channel};
    use crate::sim::Heatmap;
    use crate::state::RangeState;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use tokio::sync::broadcast;

    fn test_sender() -> (BusSender, broadcast::Receiver<DeadeyeMessage>) {
        let (bus_tx, bus_rx) = broadcast::channel(64);
        let shutdown = Arc::new(AtomicBool::new(false));
        (BusSender::new("range".into(), bus_tx, shutdown), bus_rx)
    }

    struct CountingShooter(Arc<AtomicU32>);

    impl Shoot for CountingShooter {
        fn shoot(&mut self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn center_hit_scores_max_and_marks_the_field() {
        let (state, writer) = RangeState::new(Heatmap::new(256, 30.0, 1.5));
        let (sender, mut bus_rx) = test_sender();
        let scorer = Scorer::new(10.0);

        register_hit(&writer, &scorer, &sender, 0.5, 0.5);

        let session = state.session();
        assert_eq!(session.shot_count, 1);
        assert_eq!(session.total_score, 10.0);
        let heatmap = state.heatmap();
        assert!(heatmap.cells[128 * 256 + 128] > 0.0);

        // Hit event then session snapshot on the bus
        let msg = bus_rx.try_recv().unwrap();
        match msg.event {
            DeadeyeEvent::Hit(hit) => assert_eq!(hit.score, 10.0),
            other => panic!("expected hit event, got {other:?}"),
        }
        assert!(matches!(
            bus_rx.try_recv().unwrap().event,
            DeadeyeEvent::Session(_)
        ));
    }

    #[test]
    fn off_board_hit_is_clamped_to_the_edge() {
        let (state, writer) = RangeState::new(Heatmap::new(64, 30.0, 1.5));
        let (sender, _bus_rx) = test_sender();
        let scorer = Scorer::new(10.0);

        register_hit(&writer, &scorer, &sender, 2.0, -1.0);

        let heatmap = state.heatmap();
        // Edge cell (63, 0) took the impact
        assert!(heatmap.cells[63] > 0.0);
        assert_eq!(state.session().total_score, 1.0);
    }

    #[test]
    fn trigger_samples_flow_through_to_fire_commands() {
        let (tx, mut drain) = command_channel();
        let mut edge = crate::actors::controller::TriggerEdge::new();

        // Held trigger across the middle two samples fires once.
        let frames: [&[u8]; 5] = [
            b"0 0 0 1 0 0",
            b"0 0 0 1 0 1",
            b"0 0 0 1 0 1",
            b"0 0 0 1 0 0",
            b"0 0 0 1 0 1",
        ];
        for frame in frames {
            let sample = deadeye::InputSample::parse(frame).unwrap();
            if edge.observe(sample.trigger_pressed) {
                tx.enqueue(FireCommand).unwrap();
            }
        }

        assert_eq!(drain.drain_all().len(), 2);
    }

    #[test]
    fn each_drained_command_shoots_exactly_once() {
        let (tx, mut drain) = command_channel();
        let shots = Arc::new(AtomicU32::new(0));
        let mut shooter: Box<dyn Shoot> = Box::new(CountingShooter(Arc::clone(&shots)));

        for _ in 0..3 {
            tx.enqueue(FireCommand).unwrap();
        }
        for _cmd in drain.drain_all() {
            shooter.shoot();
        }

        assert_eq!(shots.load(Ordering::Relaxed), 3);
        assert!(drain.drain_all().is_empty());
    }
}
