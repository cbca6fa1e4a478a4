//! Transfer job collaborator surface.
//!
//! The core never executes jobs: it reads counters and flags from a
//! [`TransferJob`] and relays the pause/stop commands the presentation
//! layer issues. Job execution (file iteration, I/O, retries) lives with
//! the job runner, not here.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Monotonically non-decreasing byte counter shared between a job's own
/// writer and the estimation core. The core only ever reads it.
#[derive(Debug, Default)]
pub struct ByteCounter(AtomicU64);

impl ByteCounter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Record processed bytes (job side).
    pub fn add(&self, bytes: u64) {
        self.0.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Current count (estimation side).
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    /// Reset to zero, e.g. when the job moves on to its next file.
    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

/// What progress a job can report. Decided once when the engine is built,
/// never re-derived per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Whole-job percentage only.
    Simple,
    /// Per-file and whole-job byte counters; enables throughput figures,
    /// per-file ETA and the speed graph.
    FileAware,
}

/// Read surface of a running transfer job, plus the two commands the
/// presentation layer issues (`set_paused`, `stop`).
///
/// Getters must behave like atomic snapshot reads: they may race with the
/// job's own writer but must never block. Counters are expected to be
/// monotonically non-decreasing.
pub trait TransferJob: Send + Sync {
    /// True once the job has processed its last file or was stopped.
    fn has_finished(&self) -> bool;

    fn is_paused(&self) -> bool;

    /// Pause or resume the job. Command only; the job owns the state.
    fn set_paused(&self, paused: bool);

    /// Epoch millis of the most recent pause start, 0 if never paused.
    fn pause_start_millis(&self) -> i64;

    /// Elapsed job time excluding time spent paused.
    fn effective_elapsed(&self) -> Duration;

    /// Fraction of the whole job done, in [0, 1]. This is file-count
    /// based, not byte based, so treat it as an approximation.
    fn total_percent_done(&self) -> f32;

    /// Request the job to stop. Cooperative: in-flight I/O finishes on
    /// the job's own terms.
    fn stop(&self);

    /// Bytes processed across the whole job. Meaningful for
    /// [`JobKind::FileAware`] jobs only.
    fn total_bytes_transferred(&self) -> u64 {
        0
    }

    /// Bytes processed for the current file.
    fn current_file_bytes_transferred(&self) -> u64 {
        0
    }

    /// Size of the current file in bytes, -1 when unknown.
    fn current_file_size(&self) -> i64 {
        -1
    }

    /// Fraction of the current file done, in [0, 1].
    fn file_percent_done(&self) -> f32 {
        0.0
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scriptable job double shared by the engine and ticker tests.

    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeJob {
        pub finished: AtomicBool,
        pub paused: AtomicBool,
        pub stop_requests: AtomicU32,
        pub pause_start: AtomicI64,
        pub elapsed_ms: AtomicU64,
        pub total_bytes: AtomicU64,
        pub file_bytes: AtomicU64,
        pub file_size: AtomicI64,
        pub total_percent: Mutex<f32>,
        pub file_percent: Mutex<f32>,
    }

    impl FakeJob {
        pub fn new() -> Self {
            let job = Self::default();
            job.file_size.store(-1, Ordering::Relaxed);
            job
        }

        pub fn set_total_percent(&self, pct: f32) {
            *self.total_percent.lock().unwrap() = pct;
        }

        pub fn set_file_percent(&self, pct: f32) {
            *self.file_percent.lock().unwrap() = pct;
        }
    }

    impl TransferJob for FakeJob {
        fn has_finished(&self) -> bool {
            self.finished.load(Ordering::Relaxed)
        }

        fn is_paused(&self) -> bool {
            self.paused.load(Ordering::Relaxed)
        }

        fn set_paused(&self, paused: bool) {
            self.paused.store(paused, Ordering::Relaxed);
        }

        fn pause_start_millis(&self) -> i64 {
            self.pause_start.load(Ordering::Relaxed)
        }

        fn effective_elapsed(&self) -> Duration {
            Duration::from_millis(self.elapsed_ms.load(Ordering::Relaxed))
        }

        fn total_percent_done(&self) -> f32 {
            *self.total_percent.lock().unwrap()
        }

        fn stop(&self) {
            self.stop_requests.fetch_add(1, Ordering::Relaxed);
            self.finished.store(true, Ordering::Relaxed);
        }

        fn total_bytes_transferred(&self) -> u64 {
            self.total_bytes.load(Ordering::Relaxed)
        }

        fn current_file_bytes_transferred(&self) -> u64 {
            self.file_bytes.load(Ordering::Relaxed)
        }

        fn current_file_size(&self) -> i64 {
            self.file_size.load(Ordering::Relaxed)
        }

        fn file_percent_done(&self) -> f32 {
            *self.file_percent.lock().unwrap()
        }
    }
}
