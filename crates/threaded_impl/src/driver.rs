use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use common::{
    advance_frame, EventSource, InputEvent, RunSummary, ScriptedInput, SimResult, Simulation,
    SimulationConfig, TrajectoryRecorder,
};

use crate::clock::FrameClock;

pub const MODE: &str = "threaded";

/// A simulation running on its own thread.
pub struct SimulationHandle {
    pub events: Sender<InputEvent>,
    pub recorder: TrajectoryRecorder,
    pub thread: JoinHandle<RunSummary>,
}

/// Runs the frame loop on the calling thread until quit, closed input or the
/// configured tick limit.
pub fn run_simulation<S: EventSource>(
    config: SimulationConfig,
    source: S,
    recorder: &TrajectoryRecorder,
) -> SimResult<RunSummary> {
    let sim = Simulation::new(config)?;
    Ok(drive(sim, source, recorder))
}

/// Validates `config` on the caller's thread, then moves the simulation onto
/// a dedicated thread fed through the returned sender. Without a tick limit
/// the recorder keeps only the most recent rows.
pub fn spawn_simulation(config: SimulationConfig) -> SimResult<SimulationHandle> {
    let sim = Simulation::new(config)?;
    let (tx, rx) = mpsc::channel();
    let recorder = TrajectoryRecorder::for_run(sim.config().run.max_ticks);

    let thread_recorder = recorder.clone();
    let thread = thread::Builder::new()
        .name("simulation".into())
        .spawn(move || drive(sim, rx, &thread_recorder))?;

    Ok(SimulationHandle {
        events: tx,
        recorder,
        thread,
    })
}

/// Replays the script embedded in `config.run`.
pub fn run_experiment(config: SimulationConfig) -> SimResult<TrajectoryRecorder> {
    if config.run.max_ticks.is_none()
        && !config.run.script.iter().any(|s| s.event == InputEvent::Quit)
    {
        log::warn!("Script has neither max_ticks nor a quit event; the run will not end on its own");
    }

    let recorder = TrajectoryRecorder::for_run(config.run.max_ticks);
    let script = ScriptedInput::new(config.run.script.clone());
    run_simulation(config, script, &recorder)?;
    Ok(recorder)
}

fn drive<S: EventSource>(
    mut sim: Simulation,
    mut source: S,
    recorder: &TrajectoryRecorder,
) -> RunSummary {
    let mut clock = FrameClock::new(sim.config().tick_period());
    log::info!("[{}] frame loop started, period {:?}", MODE, clock.period());

    loop {
        let lateness_ns = clock.wait();
        let batch = source.drain(sim.tick_count());
        if let Some(reason) = advance_frame(&mut sim, &batch, recorder, MODE, lateness_ns) {
            return RunSummary::new(&sim, recorder, MODE, reason);
        }
    }
}
