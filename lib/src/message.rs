//! Unified `DeadeyeMessage` bus types.
//!
//! All events flow through a single `broadcast<DeadeyeMessage>` channel.
//! Each message has a source (ID of the originating actor), a timestamp, and
//! a typed event. Producers create messages; consumers subscribe and filter.
//!
//! Fire commands do NOT ride the bus — they travel on the dedicated command
//! channel, which guarantees FIFO order and exactly-once execution. The bus
//! carries everything else: commands into the range actor, hit/session
//! events out of it, and actor status/alert traffic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ActorState, AlertMessage, HitRecord, SessionSnapshot};

// ---------------------------------------------------------------------------
// Top-level message
// ---------------------------------------------------------------------------

/// A single event on the unified bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadeyeMessage {
    #[serde(default)]
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub event: DeadeyeEvent,
}

impl DeadeyeMessage {
    /// Create a new message with the current UTC timestamp. Use `.source()`
    /// to attach the originator.
    pub fn new(event: impl Into<DeadeyeEvent>) -> Self {
        Self {
            source: String::new(),
            timestamp: Utc::now(),
            event: event.into(),
        }
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

// ---------------------------------------------------------------------------
// From impls — inner event types -> DeadeyeEvent
// ---------------------------------------------------------------------------

impl From<ControllerEvent> for DeadeyeEvent {
    fn from(event: ControllerEvent) -> Self {
        DeadeyeEvent::Controller(ControllerRecv { event })
    }
}

impl From<RangeCommandEvent> for DeadeyeEvent {
    fn from(event: RangeCommandEvent) -> Self {
        DeadeyeEvent::RangeCommand(RangeCommand { event })
    }
}

impl From<HitRecord> for DeadeyeEvent {
    fn from(hit: HitRecord) -> Self {
        DeadeyeEvent::Hit(hit)
    }
}

impl From<SessionSnapshot> for DeadeyeEvent {
    fn from(session: SessionSnapshot) -> Self {
        DeadeyeEvent::Session(session)
    }
}

impl From<ShotFired> for DeadeyeEvent {
    fn from(shot: ShotFired) -> Self {
        DeadeyeEvent::Shot(shot)
    }
}

impl From<ActorState> for DeadeyeEvent {
    fn from(state: ActorState) -> Self {
        DeadeyeEvent::ActorStatus(state)
    }
}

impl From<AlertMessage> for DeadeyeEvent {
    fn from(alert: AlertMessage) -> Self {
        DeadeyeEvent::Alert(alert)
    }
}

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// The typed event payload carried by a `DeadeyeMessage`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeadeyeEvent {
    /// Input activity observed by a controller actor.
    Controller(ControllerRecv),
    /// Command into the range actor (from the web layer or a WS client).
    RangeCommand(RangeCommand),
    /// A shot was executed by the range actor.
    Shot(ShotFired),
    /// A hit was registered and scored.
    Hit(HitRecord),
    /// Session counters changed (after a hit or a reset).
    Session(SessionSnapshot),
    /// Generic actor status update.
    ActorStatus(ActorState),
    /// Alert for user-visible warn/error conditions.
    Alert(AlertMessage),
}

// ---------------------------------------------------------------------------
// Controller — input activity from a controller actor
// ---------------------------------------------------------------------------

/// Envelope for events from a controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerRecv {
    pub event: ControllerEvent,
}

/// Individual events from a controller. Emitted on flag rising edges only —
/// a held trigger produces exactly one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerEvent {
    TriggerPulled,
    ReloadRequested,
}

// ---------------------------------------------------------------------------
// RangeCommand — into the range actor
// ---------------------------------------------------------------------------

/// A command to mutate range state, originating from the web layer or a WS
/// client. Processed exclusively by the range actor, which owns the heatmap
/// and session counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeCommand {
    pub event: RangeCommandEvent,
}

/// The specific range mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RangeCommandEvent {
    /// A projectile intersected the board at normalized coordinate `(u, v)`.
    /// Out-of-range coordinates are clamped by the range actor.
    RegisterHit { u: f64, v: f64 },
    /// Zero the session counters and the heatmap. All-or-nothing.
    Reset,
}

// ---------------------------------------------------------------------------
// ShotFired — out of the range actor
// ---------------------------------------------------------------------------

/// Emitted once per fire command executed by the range actor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShotFired {
    /// Running count of executed fire commands this process lifetime.
    pub number: u64,
}
