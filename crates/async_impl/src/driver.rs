use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use common::{
    advance_frame, EventBatch, EventSource, InputEvent, RunSummary, ScriptedInput, SimResult,
    Simulation, SimulationConfig, TrajectoryRecorder,
};

pub const MODE: &str = "async";

/// Adapts a tokio channel to the frame-batch interface.
pub struct ChannelSource(pub mpsc::Receiver<InputEvent>);

impl EventSource for ChannelSource {
    fn drain(&mut self, _tick: u64) -> EventBatch {
        let mut batch = EventBatch::default();
        loop {
            match self.0.try_recv() {
                Ok(event) => batch.events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    batch.exhausted = true;
                    break;
                }
            }
        }
        batch
    }
}

pub async fn run_simulation<S: EventSource>(
    config: SimulationConfig,
    source: S,
    recorder: &TrajectoryRecorder,
) -> SimResult<RunSummary> {
    let sim = Simulation::new(config)?;
    Ok(drive(sim, source, recorder).await)
}

/// Validates `config`, then runs the simulation as a tokio task fed through
/// the returned sender. Must be called from within a runtime. Without a tick
/// limit the recorder keeps only the most recent rows.
pub fn spawn_simulation(
    config: SimulationConfig,
    capacity: usize,
) -> SimResult<(mpsc::Sender<InputEvent>, TrajectoryRecorder, JoinHandle<RunSummary>)> {
    let sim = Simulation::new(config)?;
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let recorder = TrajectoryRecorder::for_run(sim.config().run.max_ticks);

    let task_recorder = recorder.clone();
    let task = tokio::spawn(async move { drive(sim, ChannelSource(rx), &task_recorder).await });

    Ok((tx, recorder, task))
}

pub async fn run_experiment(config: SimulationConfig) -> SimResult<TrajectoryRecorder> {
    if config.run.max_ticks.is_none()
        && !config.run.script.iter().any(|s| s.event == InputEvent::Quit)
    {
        log::warn!("Script has neither max_ticks nor a quit event; the run will not end on its own");
    }

    let recorder = TrajectoryRecorder::for_run(config.run.max_ticks);
    let script = ScriptedInput::new(config.run.script.clone());
    run_simulation(config, script, &recorder).await?;
    Ok(recorder)
}

async fn drive<S: EventSource>(
    mut sim: Simulation,
    mut source: S,
    recorder: &TrajectoryRecorder,
) -> RunSummary {
    let period = sim.config().tick_period();
    let mut next_tick = Instant::now();
    log::info!("[{}] frame loop started, period {:?}", MODE, period);

    loop {
        let expected = next_tick;
        next_tick += period;
        sleep_until(expected).await;

        let lateness_ns = Instant::now().saturating_duration_since(expected).as_nanos() as i64;
        let batch = source.drain(sim.tick_count());
        if let Some(reason) = advance_frame(&mut sim, &batch, recorder, MODE, lateness_ns) {
            return RunSummary::new(&sim, recorder, MODE, reason);
        }
    }
}
