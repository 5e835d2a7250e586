pub mod agent;
pub mod config;
pub mod error;
pub mod error_model;
pub mod history;
pub mod input;
pub mod metrics;
pub mod pacing;
pub mod pid;
pub mod point;
pub mod run;
pub mod simulation;

pub use agent::AgentState;
pub use config::{load_config, SimulationConfig};
pub use error::{SimError, SimResult};
pub use error_model::ErrorModel;
pub use history::HistoryBuffer;
pub use input::{EventBatch, EventSource, InputEvent, ScheduledEvent, ScriptedInput};
pub use metrics::{TickRecord, TrajectoryRecorder};
pub use pacing::FixedStep;
pub use pid::{Gains, PidController, PidTerms};
pub use point::Point2D;
pub use run::{advance_frame, RunSummary, StopReason};
pub use simulation::{FrameStatus, RenderSnapshot, Simulation};
