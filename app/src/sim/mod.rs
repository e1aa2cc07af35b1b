//! Simulation core — heatmap accumulation, scoring, and session counters.

pub mod heatmap;
pub mod scoring;
pub mod session;

pub use heatmap::Heatmap;
pub use scoring::Scorer;
pub use session::Session;

/// Downstream shot capability, invoked by the range actor exactly once per
/// drained fire command. What a shot does (spawn a projectile, play a
/// sound) is the implementor's business.
pub trait Shoot: Send {
    fn shoot(&mut self);
}

/// Default shooter for the bridge binary: a shot is a log line.
pub struct LogShooter;

impl Shoot for LogShooter {
    fn shoot(&mut self) {
        tracing::info!("shot fired");
    }
}
