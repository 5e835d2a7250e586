use std::time::Duration;

use crate::input::InputEvent;
use crate::simulation::{FrameStatus, Simulation};

/// Ticks a stalled caller may catch up in one call; older debt is dropped.
pub const MAX_CATCH_UP_TICKS: u32 = 4;

/// Fixed-rate tick gate for callers that are woken at an irregular rate,
/// such as a GUI repainting on every input event.
///
/// Events are held until the next due tick so that each tick still receives
/// its batch in arrival order.
#[derive(Debug)]
pub struct FixedStep {
    period: Duration,
    accumulated: Duration,
    pending: Vec<InputEvent>,
}

impl FixedStep {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            accumulated: Duration::ZERO,
            pending: Vec::new(),
        }
    }

    pub fn pending(&self) -> &[InputEvent] {
        &self.pending
    }

    pub fn queue<I: IntoIterator<Item = InputEvent>>(&mut self, events: I) {
        self.pending.extend(events);
    }

    /// Drops held events and elapsed time.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.accumulated = Duration::ZERO;
    }

    /// Time left before the next tick is due.
    pub fn until_next_tick(&self) -> Duration {
        self.period.saturating_sub(self.accumulated)
    }

    /// Adds `elapsed` and runs every tick that has come due. The first tick
    /// gets the held events; catch-up ticks run with none.
    ///
    /// Returns the number of ticks run and whether any of them saw a quit.
    pub fn advance(&mut self, sim: &mut Simulation, elapsed: Duration) -> (u32, FrameStatus) {
        self.accumulated = self.accumulated.saturating_add(elapsed);

        let mut ticks = 0;
        let mut status = FrameStatus::Running;
        while self.accumulated >= self.period && ticks < MAX_CATCH_UP_TICKS {
            self.accumulated -= self.period;
            let events = std::mem::take(&mut self.pending);
            if sim.frame(&events) == FrameStatus::Quit {
                status = FrameStatus::Quit;
            }
            ticks += 1;
            if status == FrameStatus::Quit {
                break;
            }
        }

        if self.accumulated >= self.period {
            log::debug!(
                "Dropping {:?} of tick debt after {} catch-up ticks",
                self.accumulated,
                ticks
            );
            self.accumulated = Duration::ZERO;
        }
        (ticks, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::point::Point2D;

    const PERIOD: Duration = Duration::from_millis(16);

    fn sim() -> Simulation {
        Simulation::new(SimulationConfig::default()).unwrap()
    }

    #[test]
    fn frequent_wakeups_do_not_speed_up_ticks() {
        let mut sim = sim();
        let mut step = FixedStep::new(PERIOD);

        // 64 wake-ups of 1 ms, as a pointer drag would cause.
        let mut total = 0;
        for _ in 0..64 {
            step.queue([InputEvent::PointerMove { x: 5.0, y: 6.0 }]);
            total += step.advance(&mut sim, Duration::from_millis(1)).0;
        }

        assert_eq!(total, 4);
        assert_eq!(sim.tick_count(), 4);
    }

    #[test]
    fn events_are_held_until_the_tick_and_kept_in_order() {
        let mut sim = sim();
        let mut step = FixedStep::new(PERIOD);

        step.queue([InputEvent::SecondaryClick { x: 10.0, y: 10.0 }]);
        assert_eq!(step.advance(&mut sim, Duration::from_millis(5)).0, 0);
        step.queue([InputEvent::SecondaryClick { x: 600.0, y: 450.0 }]);
        assert_eq!(step.pending().len(), 2);
        assert_eq!(sim.target(), Point2D::new(400.0, 300.0));

        assert_eq!(step.advance(&mut sim, Duration::from_millis(11)).0, 1);
        assert!(step.pending().is_empty());
        assert_eq!(sim.target(), Point2D::new(600.0, 450.0));
        assert_eq!(sim.agent().history().len(), 1);
    }

    #[test]
    fn stall_is_capped_and_quit_stops_catch_up() {
        let mut sim = sim();
        let mut step = FixedStep::new(PERIOD);

        let (ticks, status) = step.advance(&mut sim, Duration::from_secs(10));
        assert_eq!((ticks, status), (MAX_CATCH_UP_TICKS, FrameStatus::Running));
        assert_eq!(step.until_next_tick(), PERIOD);

        step.queue([InputEvent::Quit]);
        let (ticks, status) = step.advance(&mut sim, PERIOD * 3);
        assert_eq!((ticks, status), (1, FrameStatus::Quit));
    }

    #[test]
    fn clear_drops_events_and_elapsed_time() {
        let mut step = FixedStep::new(PERIOD);
        let mut sim = sim();
        step.queue([InputEvent::Quit]);
        step.advance(&mut sim, Duration::from_millis(10));

        step.clear();
        assert!(step.pending().is_empty());
        assert_eq!(step.until_next_tick(), PERIOD);
    }
}
