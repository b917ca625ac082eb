use std::time::Duration;

/// Most firings a timer reports for a single advance; older backlog is dropped.
pub const MAX_CATCH_UP: u32 = 4;

/// Repeating wall-clock timer advanced by the frame clock.
///
/// One advance fires at most [`MAX_CATCH_UP`] times; any further backlog is dropped, keeping
/// its phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalTimer {
    interval: Duration,
    elapsed: Duration,
}

impl IntervalTimer {
    /// Timer firing every `interval` (at least 1 ms).
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            elapsed: Duration::ZERO,
        }
    }

    /// Configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time accumulated toward the next firing.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Advance by `dt` and return how many times the timer fired.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        self.elapsed = self.elapsed.saturating_add(dt);
        let mut fired = 0;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            fired += 1;
            if fired == MAX_CATCH_UP {
                let rem = self.elapsed.as_nanos() % self.interval.as_nanos();
                self.elapsed = Duration::from_nanos(u64::try_from(rem).unwrap_or(0));
                break;
            }
        }
        fired
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/timer.rs"]
mod tests;
