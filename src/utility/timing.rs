// ============================================
// TIMING UTILITY
// ============================================
// Usage:
//   let timer = Timer::start_with_threshold("poll cycle", 10_000);
//   ... work ...
//   timer.stop();   // logs through tracing, warns above the threshold
// ============================================

use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Measures a span of work and reports it to the log when stopped
pub struct Timer {
    name: String,
    start: Instant,
    threshold_ms: u128,
}

impl Timer {
    /// Timer that warns when the work takes `threshold_ms` or longer
    pub fn start_with_threshold(name: impl Into<String>, threshold_ms: u128) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            threshold_ms,
        }
    }

    pub fn stop(self) -> Duration {
        let duration = self.start.elapsed();
        let ms = duration.as_millis();

        if is_slow(ms, self.threshold_ms) {
            warn!(name = %self.name, elapsed_ms = ms as u64, "Slow operation");
        } else {
            debug!(name = %self.name, elapsed_ms = ms as u64, "Timed operation");
        }

        duration
    }
}

fn is_slow(elapsed_ms: u128, threshold_ms: u128) -> bool {
    elapsed_ms >= threshold_ms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold() {
        assert!(is_slow(10_000, 10_000));
        assert!(!is_slow(9_999, 10_000));
        assert!(!is_slow(5, u128::MAX));
    }

    #[test]
    fn test_stop_returns_elapsed() {
        let timer = Timer::start_with_threshold("sleep", u128::MAX);
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.stop() >= Duration::from_millis(5));
    }
}
