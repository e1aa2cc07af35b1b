//! Mock controller actor — pulls the trigger on a fixed cadence.
//!
//! No hardware needed. Synthesizes `InputSample`s and runs them through the
//! same edge-detect -> enqueue path as the UDP controller, so the whole
//! pipeline downstream of the socket is exercised for real.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use super::Actor;
use super::controller::TriggerEdge;
use crate::bus::{BusReceiver, BusSender};
use crate::channel::{CommandSender, FireCommand};
use crate::state::SystemState;
use deadeye::{ActorState, ActorStatus, ControllerEvent, DeadeyeMessage, InputSample};

/// Mock controller actor. Generates trigger pulses at a fixed interval.
pub struct MockControllerActor {
    pub pulse_secs: u64,
    pub commands: CommandSender,
}

impl Actor for MockControllerActor {
    fn start(&self, _state: Arc<SystemState>, sender: BusSender, receiver: BusReceiver) {
        let interval = Duration::from_secs(self.pulse_secs.max(1));
        let commands = self.commands.clone();
        let thread_name = format!("device:{}", sender.actor_id());

        std::thread::Builder::new()
            .name(thread_name)
            .spawn(move || run(interval, commands, sender, receiver))
            .expect("failed to spawn mock controller thread");
    }
}

fn telemetry(pulses: u64) -> HashMap<String, String> {
    HashMap::from([
        ("device_info".into(), "Mock Controller (simulated)".into()),
        ("trigger_pulls".into(), pulses.to_string()),
    ])
}

/// Synthesize the sample for one step: a slow wobble around identity, with
/// the trigger held for one step out of every pulse.
fn generate_sample(step: u64, pressed: bool) -> InputSample {
    let angle = (step as f64 * 0.1).sin() * 0.05;
    InputSample {
        rotation: [angle, 0.0, 0.0, (1.0 - angle * angle).sqrt()],
        reload_requested: false,
        trigger_pressed: pressed,
    }
}

fn run(interval: Duration, commands: CommandSender, sender: BusSender, mut receiver: BusReceiver) {
    let mut pulses: u64 = 0;
    let mut step: u64 = 0;
    let mut trigger_edge = TriggerEdge::new();
    // Backdate so the first pulse fires after ~1s instead of a full interval.
    let mut last_pulse = Instant::now() - interval + Duration::from_secs(1);

    sender.send(DeadeyeMessage::new(ActorState::new(
        ActorStatus::Listening,
        telemetry(pulses),
    )));
    info!("mock: ready -- pulling the trigger every {interval:?}");

    loop {
        if receiver.poll().is_err() {
            sender.send(DeadeyeMessage::new(ActorState::new(
                ActorStatus::Stopped,
                HashMap::new(),
            )));
            return;
        }

        step += 1;
        let pressed = last_pulse.elapsed() >= interval;
        let sample = generate_sample(step, pressed);

        if trigger_edge.observe(sample.trigger_pressed) {
            pulses += 1;
            last_pulse = Instant::now();
            if commands.enqueue(FireCommand).is_err() {
                info!("mock: command channel closed, stopping");
                sender.send(DeadeyeMessage::new(ActorState::new(
                    ActorStatus::Stopped,
                    HashMap::new(),
                )));
                return;
            }
            info!("mock: trigger pull #{pulses}");
            sender.send(DeadeyeMessage::new(ControllerEvent::TriggerPulled));
            sender.send(DeadeyeMessage::new(ActorState::new(
                ActorStatus::Listening,
                telemetry(pulses),
            )));
        }

        std::thread::sleep(Duration::from_millis(250));
    }
}
