//! Fixed-tick driver running the simulation as a tokio task.

pub mod driver;

pub use driver::{run_experiment, run_simulation, spawn_simulation, ChannelSource, MODE};
