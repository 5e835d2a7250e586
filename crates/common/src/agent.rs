use crate::history::HistoryBuffer;
use crate::point::Point2D;

/// The drone: a point mass whose `force` acts directly as a velocity.
#[derive(Debug, Clone)]
pub struct AgentState {
    position: Point2D,
    force: Point2D,
    history: HistoryBuffer,
}

impl AgentState {
    pub fn new(position: Point2D, force: Point2D, memory_len: usize) -> Self {
        Self {
            position,
            force,
            history: HistoryBuffer::new(memory_len),
        }
    }

    pub fn position(&self) -> Point2D {
        self.position
    }

    pub fn force(&self) -> Point2D {
        self.force
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// One unit of simulated time: accumulate, integrate, remember.
    pub fn tick(&mut self, force_increment: Point2D) {
        self.force += force_increment;
        self.position += self.force;
        self.history.push(self.position);
    }

    /// Impulsive pull toward `click`, scaled per axis by the current position.
    ///
    /// An axis whose position is exactly zero gets no impulse.
    pub fn apply_impulse(&mut self, click: Point2D, pull_force: f64) -> Point2D {
        let impulse = Point2D::new(
            pull_axis(click.x, self.position.x, pull_force),
            pull_axis(click.y, self.position.y, pull_force),
        );
        self.force += impulse;
        impulse
    }

    pub(crate) fn clear_history(&mut self) {
        self.history.clear();
    }
}

fn pull_axis(click: f64, position: f64, pull_force: f64) -> f64 {
    if position == 0.0 {
        0.0
    } else {
        (click - position) / position * pull_force
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn tick_integrates_force_into_position() {
        let mut agent = AgentState::new(Point2D::new(100.0, 100.0), Point2D::new(1.0, 1.0), 10);
        agent.tick(Point2D::ZERO);

        assert_eq!(agent.force(), Point2D::new(1.0, 1.0));
        assert_eq!(agent.position(), Point2D::new(101.0, 101.0));
        assert_eq!(agent.history().iter().collect::<Vec<_>>(), vec![Point2D::new(101.0, 101.0)]);

        agent.tick(Point2D::new(0.5, -2.0));
        assert_eq!(agent.force(), Point2D::new(1.5, -1.0));
        assert_eq!(agent.position(), Point2D::new(102.5, 100.0));
        assert_eq!(agent.history().len(), 2);
    }

    #[test]
    fn impulse_divides_by_current_position() {
        let mut agent = AgentState::new(Point2D::new(100.0, 200.0), Point2D::ZERO, 10);
        let impulse = agent.apply_impulse(Point2D::new(150.0, 100.0), 20.0);

        assert_relative_eq!(impulse.x, 50.0 / 100.0 * 20.0, epsilon = 1e-12);
        assert_relative_eq!(impulse.y, -100.0 / 200.0 * 20.0, epsilon = 1e-12);
        assert_eq!(agent.force(), impulse);
        assert!(agent.history().is_empty());
    }

    #[test]
    fn impulse_skips_axis_at_origin() {
        let mut agent = AgentState::new(Point2D::new(0.0, 50.0), Point2D::ZERO, 10);
        let impulse = agent.apply_impulse(Point2D::new(300.0, 100.0), 20.0);

        assert_eq!(impulse.x, 0.0);
        assert_relative_eq!(impulse.y, 20.0, epsilon = 1e-12);
        assert!(agent.force().is_finite());
    }
}
