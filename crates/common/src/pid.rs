use serde::{Deserialize, Serialize};

use crate::error_model::ErrorModel;
use crate::history::HistoryBuffer;
use crate::point::Point2D;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Gains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Gains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

/// The three weighted contributions of one controller step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PidTerms {
    pub proportional: Point2D,
    pub integral: Point2D,
    pub derivative: Point2D,
}

impl PidTerms {
    pub fn total(&self) -> Point2D {
        self.proportional + self.integral + self.derivative
    }
}

/// Stateless 2D PID controller.
///
/// The integral and derivative terms are read from the agent's position
/// history, so the controller itself holds nothing between ticks.
/// History entries are compared as `error(entry, target)`, which flips the
/// sign relative to the proportional term's `error(target, position)`.
#[derive(Debug, Clone)]
pub struct PidController {
    gains: Gains,
    error_model: ErrorModel,
}

impl PidController {
    pub fn new(gains: Gains, error_model: ErrorModel) -> Self {
        Self { gains, error_model }
    }

    pub fn gains(&self) -> Gains {
        self.gains
    }

    pub fn compute_terms(
        &self,
        target: Point2D,
        position: Point2D,
        history: &HistoryBuffer,
    ) -> PidTerms {
        let Gains { kp, ki, kd } = self.gains;
        let model = &self.error_model;

        let proportional = model.error(target, position) * kp;

        let mut integral = Point2D::ZERO;
        for entry in history {
            integral -= model.error(entry, target);
        }
        let integral = integral * ki;

        let derivative = match history.last_two() {
            Some((prev, prev_prev)) => {
                (model.error(prev_prev, target) - model.error(prev, target)) * kd
            }
            None => Point2D::ZERO,
        };

        PidTerms {
            proportional,
            integral,
            derivative,
        }
    }

    /// Force increment for this tick.
    pub fn compute(&self, target: Point2D, position: Point2D, history: &HistoryBuffer) -> Point2D {
        self.compute_terms(target, position, history).total()
    }
}
