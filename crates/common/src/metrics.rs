use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::error::SimResult;
use crate::simulation::RenderSnapshot;

/// Wake-up lateness beyond which a frame counts as late.
pub const LATE_FRAME_THRESHOLD_NS: i64 = 1_000_000;

/// Rows kept by recorders of open-ended interactive runs: ten minutes at 60 Hz.
pub const INTERACTIVE_RECORD_LIMIT: usize = 36_000;

/// One row of an exported trajectory.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TickRecord {
    pub tick: u64,
    pub mode: String,
    pub x: f64,
    pub y: f64,
    pub force_x: f64,
    pub force_y: f64,
    pub target_x: f64,
    pub target_y: f64,
    pub history_len: usize,
    /// How late the driver woke up for this frame.
    pub lateness_ns: i64,
}

impl TickRecord {
    pub fn from_snapshot(snapshot: &RenderSnapshot, mode: &str, lateness_ns: i64) -> Self {
        Self {
            tick: snapshot.tick,
            mode: mode.to_string(),
            x: snapshot.position.x,
            y: snapshot.position.y,
            force_x: snapshot.force.x,
            force_y: snapshot.force.y,
            target_x: snapshot.target.x,
            target_y: snapshot.target.y,
            history_len: snapshot.history_len,
            lateness_ns,
        }
    }
}

/// Collects tick records from a driver running on another thread or task.
/// Cloning shares the underlying storage.
///
/// `new` keeps every row and is meant for runs with a tick limit. A
/// `bounded` recorder keeps only the most recent rows.
#[derive(Clone, Default)]
pub struct TrajectoryRecorder {
    records: Arc<Mutex<VecDeque<TickRecord>>>,
    limit: Option<usize>,
    late_frames: Arc<AtomicUsize>,
}

impl TrajectoryRecorder {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(VecDeque::with_capacity(10_000))),
            limit: None,
            late_frames: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn bounded(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    /// Recorder for `max_ticks`: unbounded when the run has a tick limit.
    pub fn for_run(max_ticks: Option<u64>) -> Self {
        match max_ticks {
            Some(_) => Self::new(),
            None => Self::bounded(INTERACTIVE_RECORD_LIMIT),
        }
    }

    /// Late frames are counted even when the row itself is later evicted.
    pub fn record(&self, record: TickRecord) {
        if let Ok(mut data) = self.records.lock() {
            if record.lateness_ns > LATE_FRAME_THRESHOLD_NS {
                self.late_frames.fetch_add(1, Ordering::Relaxed);
            }
            if let Some(limit) = self.limit {
                if limit == 0 {
                    return;
                }
                while data.len() >= limit {
                    data.pop_front();
                }
            }
            data.push_back(record);
        }
    }

    pub fn late_frames(&self) -> usize {
        self.late_frames.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_results(&self) -> Vec<TickRecord> {
        self.records
            .lock()
            .map(|r| r.iter().cloned().collect::<Vec<_>>())
            .unwrap_or_default()
    }

    pub fn save_to_csv<P: AsRef<Path>>(&self, path: P) -> SimResult<usize> {
        let data = self.get_results();
        let mut wtr = csv::Writer::from_path(path.as_ref())?;
        for record in &data {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        log::info!("Saved {} records to {}", data.len(), path.as_ref().display());
        Ok(data.len())
    }
}
