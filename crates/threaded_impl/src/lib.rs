//! Fixed-tick driver running the simulation on an OS thread.

pub mod clock;
pub mod driver;

pub use clock::FrameClock;
pub use driver::{run_experiment, run_simulation, spawn_simulation, SimulationHandle, MODE};
