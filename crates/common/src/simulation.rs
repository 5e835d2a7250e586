use serde::Serialize;

use crate::agent::AgentState;
use crate::config::SimulationConfig;
use crate::error::SimResult;
use crate::error_model::ErrorModel;
use crate::input::InputEvent;
use crate::pid::{PidController, PidTerms};
use crate::point::Point2D;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Running,
    /// A quit was requested during this frame; no further frames should run.
    Quit,
}

/// Read-only view handed to whatever draws the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub tick: u64,
    pub position: Point2D,
    pub target: Point2D,
    pub force: Point2D,
    /// Cosmetic pointer vector; never read by the controller.
    pub applied_force: Point2D,
    pub history_len: usize,
}

/// Owns every piece of mutable state of one simulation session.
///
/// A frame is: apply the frame's input events in order, then run exactly one
/// controller tick.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    agent: AgentState,
    target: Point2D,
    applied_force: Point2D,
    controller: PidController,
    tick: u64,
    last_terms: PidTerms,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;

        let controller = PidController::new(config.gains, ErrorModel::new(config.frame_dims()));
        let agent = fresh_agent(&config);
        log::info!(
            "Simulation ready: frame {}x{}, start {}, target {}, gains kp={} ki={} kd={}",
            config.frame.width,
            config.frame.height,
            agent.position(),
            config.target,
            config.gains.kp,
            config.gains.ki,
            config.gains.kd,
        );

        Ok(Self {
            target: config.target,
            agent,
            applied_force: Point2D::ZERO,
            controller,
            tick: 0,
            last_terms: PidTerms::default(),
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn agent(&self) -> &AgentState {
        &self.agent
    }

    pub fn controller(&self) -> &PidController {
        &self.controller
    }

    pub fn target(&self) -> Point2D {
        self.target
    }

    pub fn applied_force(&self) -> Point2D {
        self.applied_force
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// PID terms computed by the most recent tick.
    pub fn last_terms(&self) -> PidTerms {
        self.last_terms
    }

    pub fn on_primary_click(&mut self, click: Point2D) {
        let impulse = self.agent.apply_impulse(click, self.config.agent.pull_force);
        let force = self.agent.force();
        log::info!(
            "Applying force => {:.4}, {:.4}  {:.4},{:.4}",
            impulse.x,
            impulse.y,
            force.x,
            force.y
        );
    }

    /// Moves the target and drops every history sample taken against the old one.
    pub fn on_secondary_click(&mut self, click: Point2D) {
        self.target = click;
        self.agent.clear_history();
        log::debug!("Target relocated to {}, history cleared", click);
    }

    pub fn on_pointer_move(&mut self, pos: Point2D) {
        self.applied_force = pos;
    }

    pub fn handle_event(&mut self, event: &InputEvent) -> FrameStatus {
        match *event {
            InputEvent::PrimaryClick { x, y } => self.on_primary_click(Point2D::new(x, y)),
            InputEvent::SecondaryClick { x, y } => self.on_secondary_click(Point2D::new(x, y)),
            InputEvent::PointerMove { x, y } => self.on_pointer_move(Point2D::new(x, y)),
            InputEvent::Quit => {
                log::info!("Quit requested at tick {}", self.tick);
                return FrameStatus::Quit;
            }
        }
        FrameStatus::Running
    }

    /// One controller tick. Returns the force increment that was applied.
    pub fn step(&mut self) -> Point2D {
        let terms = self.controller.compute_terms(
            self.target,
            self.agent.position(),
            self.agent.history(),
        );
        let increment = terms.total();
        self.agent.tick(increment);
        self.last_terms = terms;
        self.tick += 1;

        log::trace!(
            "tick {}: increment {} force {} position {}",
            self.tick,
            increment,
            self.agent.force(),
            self.agent.position()
        );
        increment
    }

    /// Drains `events` in order, then ticks once.
    ///
    /// A `Quit` does not cut the batch short: the remaining events and the
    /// tick still run, and the frame reports `FrameStatus::Quit`.
    pub fn frame(&mut self, events: &[InputEvent]) -> FrameStatus {
        let mut status = FrameStatus::Running;
        for event in events {
            if self.handle_event(event) == FrameStatus::Quit {
                status = FrameStatus::Quit;
            }
        }
        self.step();
        status
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            tick: self.tick,
            position: self.agent.position(),
            target: self.target,
            force: self.agent.force(),
            applied_force: self.applied_force,
            history_len: self.agent.history().len(),
        }
    }

    /// Recreates agent and target from the startup configuration.
    pub fn reset(&mut self) {
        self.agent = fresh_agent(&self.config);
        self.target = self.config.target;
        self.applied_force = Point2D::ZERO;
        self.last_terms = PidTerms::default();
        self.tick = 0;
        log::info!("Simulation reset");
    }
}

fn fresh_agent(config: &SimulationConfig) -> AgentState {
    AgentState::new(
        config.agent.initial_position,
        config.agent.initial_force,
        config.agent.memory_len,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::pid::Gains;

    #[test]
    fn first_tick_with_zero_gains_only_applies_seed_force() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        let status = sim.frame(&[]);

        assert_eq!(status, FrameStatus::Running);
        assert_eq!(sim.agent().force(), Point2D::new(1.0, 1.0));
        assert_eq!(sim.agent().position(), Point2D::new(101.0, 101.0));
        assert_eq!(
            sim.agent().history().iter().collect::<Vec<_>>(),
            vec![Point2D::new(101.0, 101.0)]
        );
        assert_eq!(sim.tick_count(), 1);
    }

    #[test]
    fn secondary_click_relocates_target_and_clears_history() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        for _ in 0..5 {
            sim.step();
        }
        assert_eq!(sim.agent().history().len(), 5);

        sim.handle_event(&InputEvent::SecondaryClick { x: 500.0, y: 500.0 });
        assert!(sim.agent().history().is_empty());
        assert_eq!(sim.target(), Point2D::new(500.0, 500.0));
    }

    #[test]
    fn pointer_move_is_cosmetic() {
        let mut config = SimulationConfig::default();
        config.gains = Gains::new(0.3, 0.01, 0.2);
        let mut with_moves = Simulation::new(config.clone()).unwrap();
        let mut without = Simulation::new(config).unwrap();

        for i in 0..20 {
            let mv = InputEvent::PointerMove { x: i as f64 * 10.0, y: 3.0 };
            with_moves.frame(&[mv]);
            without.frame(&[]);
        }

        assert_eq!(with_moves.agent().position(), without.agent().position());
        assert_eq!(with_moves.agent().force(), without.agent().force());
        assert_eq!(with_moves.applied_force(), Point2D::new(190.0, 3.0));
    }

    #[test]
    fn quit_still_finishes_the_frame() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        let status = sim.frame(&[
            InputEvent::Quit,
            InputEvent::SecondaryClick { x: 10.0, y: 10.0 },
        ]);

        assert_eq!(status, FrameStatus::Quit);
        assert_eq!(sim.target(), Point2D::new(10.0, 10.0));
        assert_eq!(sim.tick_count(), 1);
    }

    #[test]
    fn primary_click_injects_impulse_before_tick() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        sim.frame(&[InputEvent::PrimaryClick { x: 200.0, y: 150.0 }]);

        // (200-100)/100*20 = 20, (150-100)/100*20 = 10, plus the (1,1) seed.
        assert_eq!(sim.agent().force(), Point2D::new(21.0, 11.0));
        assert_eq!(sim.agent().position(), Point2D::new(121.0, 111.0));
    }

    #[test]
    fn reset_restores_startup_state() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        sim.frame(&[
            InputEvent::PrimaryClick { x: 300.0, y: 300.0 },
            InputEvent::SecondaryClick { x: 50.0, y: 60.0 },
        ]);
        sim.step();
        sim.reset();

        let snapshot = sim.snapshot();
        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.position, Point2D::new(100.0, 100.0));
        assert_eq!(snapshot.force, Point2D::new(1.0, 1.0));
        assert_eq!(snapshot.target, Point2D::new(400.0, 300.0));
        assert_eq!(snapshot.history_len, 0);
    }

    #[test]
    fn invalid_config_is_rejected_at_startup() {
        let mut config = SimulationConfig::default();
        config.frame.width = 0.0;
        assert!(matches!(Simulation::new(config), Err(SimError::Config(_))));
    }

    #[test]
    fn proportional_gain_pulls_toward_target() {
        let mut config = SimulationConfig::default();
        config.agent.initial_force = Point2D::ZERO;
        config.gains = Gains::new(1.0, 0.0, 0.0);
        let mut sim = Simulation::new(config).unwrap();

        let increment = sim.step();
        assert!(increment.x > 0.0 && increment.y > 0.0);
        assert!(sim.agent().position().x > 100.0);
        assert_eq!(sim.last_terms().total(), increment);
    }
}
