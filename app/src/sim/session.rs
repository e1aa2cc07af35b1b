//! Session counters — shots registered and score accumulated this session.

use deadeye::SessionSnapshot;

#[derive(Debug, Default)]
pub struct Session {
    shot_count: u32,
    total_score: f64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one scored shot. The score is rounded to the nearest whole
    /// point before accumulating, so the running total stays integral.
    pub fn register_shot(&mut self, score: f64) {
        self.shot_count += 1;
        self.total_score += score.round();
    }

    /// Zero both counters. The caller resets the heatmap in the same
    /// operation — there is no partial reset.
    pub fn reset(&mut self) {
        self.shot_count = 0;
        self.total_score = 0.0;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            shot_count: self.shot_count,
            total_score: self.total_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registering_accumulates_rounded_scores() {
        let mut session = Session::new();
        session.register_shot(8.2);
        session.register_shot(9.6);
        session.register_shot(1.0);

        let snap = session.snapshot();
        assert_eq!(snap.shot_count, 3);
        assert_eq!(snap.total_score, 19.0); // 8 + 10 + 1
    }

    #[test]
    fn reset_zeroes_both_counters() {
        let mut session = Session::new();
        session.register_shot(10.0);
        session.reset();

        assert_eq!(session.snapshot(), SessionSnapshot::default());
    }
}
