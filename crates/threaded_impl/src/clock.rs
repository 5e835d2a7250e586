use std::thread;
use std::time::{Duration, Instant};

/// Fixed-rate frame boundaries measured from a start instant.
///
/// Deadlines advance by exactly one period per frame, so a slow frame does
/// not shift every later deadline.
pub struct FrameClock {
    period: Duration,
    next_tick: Instant,
}

impl FrameClock {
    pub fn new(period: Duration) -> Self {
        Self::starting_at(period, Instant::now())
    }

    pub fn starting_at(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next_tick: start,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Blocks until the next frame boundary. Returns how late the wake-up was.
    pub fn wait(&mut self) -> i64 {
        let expected = self.next_tick;
        self.next_tick += self.period;

        let now = Instant::now();
        if now < expected {
            thread::sleep(expected - now);
        }

        Instant::now().saturating_duration_since(expected).as_nanos() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_roughly_one_period_per_frame() {
        let period = Duration::from_millis(5);
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(period, start);

        for _ in 0..4 {
            let lateness = clock.wait();
            assert!(lateness >= 0);
        }

        // Frames at t = 0, 5, 10, 15 ms.
        assert!(start.elapsed() >= Duration::from_millis(15));
    }
}
