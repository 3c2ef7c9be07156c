//! Overlay tick counter and wall-clock time

use std::time::{Duration, Instant};

/// Tick counter advanced once per drawn frame, plus time since creation
#[derive(Debug, Clone)]
pub struct Clock {
    ticks: u64,
    created: Instant,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self {
            ticks: 0,
            created: Instant::now(),
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn advance(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    /// Time since the clock was created
    pub fn elapsed(&self) -> Duration {
        self.created.elapsed()
    }
}

/// Format a duration as `MM:SS.mmm`
///
/// Minutes keep counting past 99 rather than wrapping.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_millis = elapsed.as_millis();
    let minutes = total_millis / 60_000;
    let seconds = (total_millis / 1000) % 60;
    let millis = total_millis % 1000;
    format!("{:02}:{:02}.{:03}", minutes, seconds, millis)
}
