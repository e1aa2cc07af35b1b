//! Shared domain types used by both the unified bus and the range thread.
//!
//! These are pure data structures with no channel affinity. The bus message
//! types in `message.rs` reference them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

/// One registered hit on the target board.
///
/// `(u, v)` is the board-plane coordinate, normalized to `[0, 1]` on each
/// axis with `(0.5, 0.5)` at the board center. Emitted on the bus once per
/// hit; the core keeps no hit history beyond the session counters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HitRecord {
    pub u: f64,
    pub v: f64,
    pub score: f64,
}

/// Session counters at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub shot_count: u32,
    pub total_score: f64,
}

// ---------------------------------------------------------------------------
// ActorStatus — generic actor lifecycle
// ---------------------------------------------------------------------------

/// Generic actor lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorStatus {
    Starting,
    Listening,
    Retrying,
    Stopped,
}

impl std::fmt::Display for ActorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Starting => write!(f, "starting"),
            Self::Listening => write!(f, "listening"),
            Self::Retrying => write!(f, "retrying"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Actor state emitted on the bus. Carries lifecycle status and
/// actor-specific key/value telemetry (bind address, packet counts, etc.).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorState {
    pub status: ActorStatus,
    #[serde(default)]
    pub telemetry: HashMap<String, String>,
}

impl ActorState {
    pub fn new(status: ActorStatus, telemetry: HashMap<String, String>) -> Self {
        Self { status, telemetry }
    }
}

// ---------------------------------------------------------------------------
// AlertMessage — user-visible warn/error notifications
// ---------------------------------------------------------------------------

/// Severity level for alert messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Warn,
    Error,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Warn => write!(f, "warn"),
            AlertLevel::Error => write!(f, "error"),
        }
    }
}

/// A user-visible alert. Info/debug/trace stays in the tracing backend;
/// warn/error conditions surface here for bus consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertMessage {
    pub level: AlertLevel,
    pub message: String,
}
