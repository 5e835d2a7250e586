use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{SimError, SimResult};
use crate::history::DEFAULT_MEMORY_LEN;
use crate::input::ScheduledEvent;
use crate::pid::Gains;
use crate::point::Point2D;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_rate_hz: f64,
    pub frame: FrameConfig,
    pub agent: AgentConfig,
    pub target: Point2D,
    pub gains: Gains,
    pub run: RunConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct FrameConfig {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub initial_position: Point2D,
    /// Seed for the force accumulator.
    pub initial_force: Point2D,
    pub memory_len: usize,
    pub pull_force: f64,
}

/// Settings for headless runs only; the visualiser ignores these.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct RunConfig {
    pub max_ticks: Option<u64>,
    pub enable_logging: bool,
    pub script: Vec<ScheduledEvent>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            frame: FrameConfig::default(),
            agent: AgentConfig::default(),
            target: Point2D::new(400.0, 300.0),
            gains: Gains::default(),
            run: RunConfig::default(),
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 800.0,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            initial_position: Point2D::new(100.0, 100.0),
            initial_force: Point2D::new(1.0, 1.0),
            memory_len: DEFAULT_MEMORY_LEN,
            pull_force: 20.0,
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> SimResult<SimulationConfig> {
    let content = fs::read_to_string(path)?;
    let config: SimulationConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl SimulationConfig {
    pub fn frame_dims(&self) -> Point2D {
        Point2D::new(self.frame.width, self.frame.height)
    }

    /// Saturates at `Duration::MAX` for rates `validate` would reject.
    pub fn tick_period(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.tick_rate_hz).unwrap_or(Duration::MAX)
    }

    /// Rejects anything that would make the controller divide by zero or
    /// start from a non-finite state.
    pub fn validate(&self) -> SimResult<()> {
        let FrameConfig { width, height } = self.frame;
        if !(width.is_finite() && width > 0.0) || !(height.is_finite() && height > 0.0) {
            return Err(SimError::Config(format!(
                "frame dimensions must be positive and finite, got {}x{}",
                width, height
            )));
        }
        let rate = self.tick_rate_hz;
        if !(rate.is_finite() && rate > 0.0) || Duration::try_from_secs_f64(1.0 / rate).is_err() {
            return Err(SimError::Config(format!(
                "tick_rate_hz must be positive, finite and give a representable period, got {}",
                rate
            )));
        }
        if self.agent.memory_len == 0 {
            return Err(SimError::Config("agent.memory_len must be at least 1".into()));
        }
        if !self.agent.pull_force.is_finite() {
            return Err(SimError::Config("agent.pull_force must be finite".into()));
        }

        let Gains { kp, ki, kd } = self.gains;
        if ![kp, ki, kd].iter().all(|g| g.is_finite()) {
            return Err(SimError::Config(format!(
                "gains must be finite, got kp={} ki={} kd={}",
                kp, ki, kd
            )));
        }

        for (name, p) in [
            ("agent.initial_position", self.agent.initial_position),
            ("agent.initial_force", self.agent.initial_force),
            ("target", self.target),
        ] {
            if !p.is_finite() {
                return Err(SimError::Config(format!("{} must be finite, got {}", name, p)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputEvent;

    #[test]
    fn empty_file_yields_defaults() {
        let config: SimulationConfig = toml::from_str("").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.frame_dims(), Point2D::new(1024.0, 800.0));
        assert_eq!(config.agent.memory_len, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_overrides_fields() {
        let config: SimulationConfig = toml::from_str(
            r#"
            tick_rate_hz = 30.0

            [gains]
            kp = 0.5

            [target]
            x = 10.0
            y = 20.0

            [run]
            max_ticks = 120

            [[run.script]]
            tick = 4
            kind = "primary_click"
            x = 300.0
            y = 200.0
            "#,
        )
        .unwrap();

        assert_eq!(config.tick_rate_hz, 30.0);
        assert_eq!(config.gains, Gains::new(0.5, 0.0, 0.0));
        assert_eq!(config.target, Point2D::new(10.0, 20.0));
        assert_eq!(config.frame.width, 1024.0);
        assert_eq!(config.run.max_ticks, Some(120));
        assert_eq!(config.run.script[0].event, InputEvent::PrimaryClick { x: 300.0, y: 200.0 });
    }

    #[test]
    fn zero_frame_dimension_is_rejected() {
        let mut config = SimulationConfig::default();
        config.frame.height = 0.0;
        assert!(matches!(config.validate(), Err(SimError::Config(_))));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut config = SimulationConfig::default();
        config.gains.ki = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.target = Point2D::new(f64::INFINITY, 0.0);
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.tick_rate_hz = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.agent.memory_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn vanishing_tick_rate_is_rejected() {
        let mut config = SimulationConfig::default();
        config.tick_rate_hz = 1e-300;
        assert!(matches!(config.validate(), Err(SimError::Config(_))));
        assert_eq!(config.tick_period(), Duration::MAX);

        // One tick a day is slow but still has a period.
        config.tick_rate_hz = 1.0 / 86_400.0;
        assert!(config.validate().is_ok());
        assert!((config.tick_period().as_secs_f64() - 86_400.0).abs() < 1e-6);
    }

    #[test]
    fn tick_period_matches_rate() {
        let config = SimulationConfig::default();
        let period = config.tick_period();
        assert!((period.as_secs_f64() - 1.0 / 60.0).abs() < 1e-9);
    }
}
