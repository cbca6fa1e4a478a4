//! Simulated transfer job used by `tmon demo`.
//!
//! Advances its byte counters on a background task; the estimation core
//! only ever reads them, exactly as it would with a real job runner.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tmon_core::engine::now_millis;
use tmon_core::job::{ByteCounter, TransferJob};

/// How often the simulated counters advance.
const STEP: Duration = Duration::from_millis(100);

pub struct SimulatedJob {
    file_size: u64,
    files_total: u32,
    rate_bytes_per_sec: u64,

    total: ByteCounter,
    file: ByteCounter,
    files_done: AtomicU32,

    started_millis: i64,
    paused: AtomicBool,
    pause_start_millis: AtomicI64,
    paused_accum_ms: AtomicU64,
    finished: AtomicBool,
    stop_requested: AtomicBool,
}

impl SimulatedJob {
    pub fn new(files: u32, file_size: u64, rate_bytes_per_sec: u64) -> Arc<Self> {
        Arc::new(Self {
            file_size: file_size.max(1),
            files_total: files.max(1),
            rate_bytes_per_sec,
            total: ByteCounter::new(),
            file: ByteCounter::new(),
            files_done: AtomicU32::new(0),
            started_millis: now_millis(),
            paused: AtomicBool::new(false),
            pause_start_millis: AtomicI64::new(0),
            paused_accum_ms: AtomicU64::new(0),
            finished: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
        })
    }

    /// Spawn the counter-advancing task.
    pub fn spawn_driver(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let job = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(STEP);
            let step_bytes = job.rate_bytes_per_sec / 10;
            loop {
                interval.tick().await;
                if job.stop_requested.load(Ordering::Relaxed) {
                    break;
                }
                if job.paused.load(Ordering::Relaxed) {
                    continue;
                }
                job.file.add(step_bytes);
                job.total.add(step_bytes);
                if job.file.get() >= job.file_size {
                    job.file.reset();
                    let done = job.files_done.fetch_add(1, Ordering::Relaxed) + 1;
                    if done >= job.files_total {
                        break;
                    }
                }
            }
            job.finished.store(true, Ordering::Relaxed);
        })
    }
}

impl TransferJob for SimulatedJob {
    fn has_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    fn set_paused(&self, paused: bool) {
        let was = self.paused.swap(paused, Ordering::Relaxed);
        let now = now_millis();
        if paused && !was {
            self.pause_start_millis.store(now, Ordering::Relaxed);
        } else if !paused && was {
            let start = self.pause_start_millis.load(Ordering::Relaxed);
            self.paused_accum_ms
                .fetch_add((now - start).max(0) as u64, Ordering::Relaxed);
        }
    }

    fn pause_start_millis(&self) -> i64 {
        self.pause_start_millis.load(Ordering::Relaxed)
    }

    fn effective_elapsed(&self) -> Duration {
        let elapsed = (now_millis() - self.started_millis).max(0) as u64;
        let mut paused_ms = self.paused_accum_ms.load(Ordering::Relaxed);
        if self.paused.load(Ordering::Relaxed) {
            let start = self.pause_start_millis.load(Ordering::Relaxed);
            paused_ms += (now_millis() - start).max(0) as u64;
        }
        Duration::from_millis(elapsed.saturating_sub(paused_ms))
    }

    fn total_percent_done(&self) -> f32 {
        // File-count based, like real jobs report it.
        self.files_done.load(Ordering::Relaxed) as f32 / self.files_total as f32
    }

    fn stop(&self) {
        self.stop_requested.store(true, Ordering::Relaxed);
    }

    fn total_bytes_transferred(&self) -> u64 {
        self.total.get()
    }

    fn current_file_bytes_transferred(&self) -> u64 {
        self.file.get()
    }

    fn current_file_size(&self) -> i64 {
        self.file_size as i64
    }

    fn file_percent_done(&self) -> f32 {
        (self.file.get() as f32 / self.file_size as f32).min(1.0)
    }
}
