use crate::input::EventBatch;
use crate::metrics::{TickRecord, TrajectoryRecorder};
use crate::simulation::{FrameStatus, RenderSnapshot, Simulation};

/// Ticks between the periodic progress lines a driver logs.
pub const PROGRESS_INTERVAL_TICKS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Quit,
    InputClosed,
    TickLimit,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub mode: String,
    pub ticks: u64,
    pub late_frames: usize,
    pub stop_reason: StopReason,
    pub final_snapshot: RenderSnapshot,
}

/// Applies one frame's batch, ticks, and records the result.
///
/// Returns why the run should stop after this frame, if it should.
pub fn advance_frame(
    sim: &mut Simulation,
    batch: &EventBatch,
    recorder: &TrajectoryRecorder,
    mode: &str,
    lateness_ns: i64,
) -> Option<StopReason> {
    let status = sim.frame(&batch.events);
    let snapshot = sim.snapshot();
    recorder.record(TickRecord::from_snapshot(&snapshot, mode, lateness_ns));

    if snapshot.tick % PROGRESS_INTERVAL_TICKS == 0 {
        let level = if sim.config().run.enable_logging {
            log::Level::Info
        } else {
            log::Level::Debug
        };
        log::log!(
            level,
            "[{}] tick {:>6}: position {} force {} target {} (late by {} ns)",
            mode,
            snapshot.tick,
            snapshot.position,
            snapshot.force,
            snapshot.target,
            lateness_ns
        );
    }

    if status == FrameStatus::Quit {
        return Some(StopReason::Quit);
    }
    if batch.exhausted {
        return Some(StopReason::InputClosed);
    }
    match sim.config().run.max_ticks {
        Some(max) if snapshot.tick >= max => Some(StopReason::TickLimit),
        _ => None,
    }
}

impl RunSummary {
    pub fn new(
        sim: &Simulation,
        recorder: &TrajectoryRecorder,
        mode: &str,
        stop_reason: StopReason,
    ) -> Self {
        let summary = Self {
            mode: mode.to_string(),
            ticks: sim.tick_count(),
            late_frames: recorder.late_frames(),
            stop_reason,
            final_snapshot: sim.snapshot(),
        };
        log::info!(
            "[{}] stopped after {} ticks ({:?}), {} late frames, final position {}",
            summary.mode,
            summary.ticks,
            summary.stop_reason,
            summary.late_frames,
            summary.final_snapshot.position
        );
        summary
    }
}
