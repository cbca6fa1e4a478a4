//! Per-tick progress estimation.
//!
//! Each tick reads the job's counters once, derives instantaneous and
//! average throughput, projects the per-file and whole-job ETAs, and
//! appends one speed sample to the shared history. All numerically
//! dangerous cases (zero elapsed time, zero throughput, unknown file
//! size) degrade to sentinel outputs; nothing in here fails.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::format;
use crate::history::{SampleHistory, ThroughputSample};
use crate::job::{JobKind, TransferJob};

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Estimated time remaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eta {
    /// Cannot be computed (unknown file size, zero total percent).
    Unknown,
    /// Open-ended: observed throughput is currently zero.
    Infinite,
    /// Finite estimate in milliseconds.
    Millis(u64),
}

impl std::fmt::Display for Eta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Eta::Unknown => write!(f, "?"),
            Eta::Infinite => write!(f, "{}", format::INFINITE_SYMBOL),
            Eta::Millis(ms) => write!(f, "{}", format::format_duration_ms(*ms)),
        }
    }
}

/// Counter and flag values read from the job at the start of a tick.
/// Created and discarded within the tick.
#[derive(Debug, Clone)]
pub struct JobSnapshot {
    pub total_bytes_transferred: u64,
    pub current_file_bytes_transferred: u64,
    /// -1 when the job cannot tell the current file's size.
    pub current_file_size: i64,
    /// Effective (pause-excluded) elapsed time, clamped to >= 1 ms since
    /// all rate math divides by it.
    pub effective_elapsed_ms: u64,
    pub file_percent_done: f32,
    /// File-count based approximation in [0, 1].
    pub total_percent_done: f32,
    pub is_paused: bool,
    pub pause_start_millis: i64,
}

impl JobSnapshot {
    /// Read every counter once.
    pub fn observe(job: &dyn TransferJob) -> Self {
        Self {
            total_bytes_transferred: job.total_bytes_transferred(),
            current_file_bytes_transferred: job.current_file_bytes_transferred(),
            current_file_size: job.current_file_size(),
            effective_elapsed_ms: (job.effective_elapsed().as_millis() as u64).max(1),
            file_percent_done: job.file_percent_done(),
            total_percent_done: job.total_percent_done(),
            is_paused: job.is_paused(),
            pause_start_millis: job.pause_start_millis(),
        }
    }
}

/// Per-file transfer metrics, present for [`JobKind::FileAware`] jobs.
#[derive(Debug, Clone)]
pub struct TransferStats {
    pub file_percent: f32,
    /// "42% - 9 s" style label for the file progress bar.
    pub file_percent_text: String,
    pub file_eta: Eta,
    pub total_bytes: u64,
    /// Average over the whole effective job time.
    pub average_bps: i64,
    /// Speed since the previous tick; `None` right after a resume, when
    /// the delta would span the paused window.
    pub instantaneous_bps: Option<i64>,
    /// "1.2 MiB (340.5 KiB/s)" style label.
    pub transferred_label: String,
}

/// Display-ready output of one tick. Consumed by the presentation layer,
/// not retained.
#[derive(Debug, Clone)]
pub struct EstimationResult {
    pub total_percent: f32,
    pub total_percent_text: String,
    /// Projected from the file-count based total percentage, so this is a
    /// rough estimate.
    pub total_eta: Eta,
    pub elapsed_ms: u64,
    pub elapsed_label: String,
    /// `None` for [`JobKind::Simple`] jobs.
    pub transfer: Option<TransferStats>,
}

/// Derives throughput and ETA figures from job counters, one tick at a
/// time, and feeds the speed-sample history.
#[derive(Debug)]
pub struct EstimationEngine {
    kind: JobKind,
    history: Arc<SampleHistory>,
    prev_total_bytes: u64,
    prev_tick_millis: i64,
}

impl EstimationEngine {
    /// `start_millis` seeds the rolling previous-tick timestamp, normally
    /// the moment the job was confirmed started.
    pub fn new(kind: JobKind, history: Arc<SampleHistory>, start_millis: i64) -> Self {
        Self {
            kind,
            history,
            prev_total_bytes: 0,
            prev_tick_millis: start_millis,
        }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Run one estimation pass. Returns `None` while the job is paused:
    /// no computation, no sample, no rolling-state update.
    pub fn tick(&mut self, job: &dyn TransferJob, now_millis: i64) -> Option<EstimationResult> {
        let snap = JobSnapshot::observe(job);
        if snap.is_paused {
            return None;
        }

        let mut file_eta = Eta::Unknown;
        let mut transfer = None;

        if self.kind == JobKind::FileAware {
            let total = snap.total_bytes_transferred;
            let average_bps = (total.saturating_mul(1000) / snap.effective_elapsed_ms) as i64;

            file_eta = if snap.current_file_size < 0 {
                Eta::Unknown
            } else if average_bps == 0 {
                Eta::Infinite
            } else {
                let remaining = (snap.current_file_size as u64)
                    .saturating_sub(snap.current_file_bytes_transferred);
                Eta::Millis(remaining.saturating_mul(1000) / average_bps as u64)
            };

            // A delta spanning a paused window would report a spurious
            // spike on resume; skip the sample but keep the rolling state
            // moving so the next tick measures a clean interval.
            let instantaneous_bps = if self.prev_tick_millis > snap.pause_start_millis {
                let dt_ms = (now_millis - self.prev_tick_millis).max(1);
                let delta = total.saturating_sub(self.prev_total_bytes);
                let bps = (delta as i128 * 1000 / dt_ms as i128) as i64;
                self.history.push(ThroughputSample {
                    bytes_per_sec: bps,
                    taken_at_millis: now_millis,
                });
                Some(bps)
            } else {
                None
            };
            self.prev_total_bytes = total;
            self.prev_tick_millis = now_millis;

            let file_percent = snap.file_percent_done;
            transfer = Some(TransferStats {
                file_percent,
                file_percent_text: format!("{}% - {}", (file_percent * 100.0) as i32, file_eta),
                file_eta,
                total_bytes: total,
                average_bps,
                instantaneous_bps,
                transferred_label: format!(
                    "{} ({}/s)",
                    format::format_bytes(total),
                    format::format_bytes(average_bps.max(0) as u64),
                ),
            });
        }

        // The total ETA projects the remaining fraction over the pace so
        // far, then is clamped so the job never claims to finish before
        // its current file. An Unknown or Infinite file ETA gives nothing
        // to clamp against and leaves the projection as-is.
        let total_percent = snap.total_percent_done;
        let total_eta = if total_percent == 0.0 {
            Eta::Unknown
        } else {
            let pct = f64::from(total_percent);
            let mut eta_ms =
                ((1.0 - pct) * (snap.effective_elapsed_ms as f64 / pct)).round().max(0.0) as u64;
            if let Eta::Millis(file_ms) = file_eta {
                eta_ms = eta_ms.max(file_ms);
            }
            Eta::Millis(eta_ms)
        };

        Some(EstimationResult {
            total_percent,
            total_percent_text: format!("{}% - {}", (total_percent * 100.0) as i32, total_eta),
            total_eta,
            elapsed_ms: snap.effective_elapsed_ms,
            elapsed_label: format::format_duration_ms(snap.effective_elapsed_ms),
            transfer,
        })
    }
}
