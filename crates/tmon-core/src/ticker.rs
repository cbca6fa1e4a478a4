//! Periodic driver for the estimation engine.
//!
//! One background tokio task owns the engine and its rolling state, fires
//! at a fixed period, and pushes display-ready results through a bounded
//! channel to the presentation layer. Stopping is cooperative and
//! terminal: the task checks a liveness flag every iteration and never
//! fires again once it has exited.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::Notify;
use tokio::task::{JoinError, JoinHandle};

use crate::engine::{now_millis, EstimationEngine, EstimationResult};
use crate::job::TransferJob;

/// How often progress is re-estimated.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(1000);

/// Bounded queue between the ticker and the presentation layer. A slow
/// consumer drops updates instead of stalling the ticker.
const RESULT_CHANNEL_CAPACITY: usize = 8;

const STATE_IDLE: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_STOPPED: u8 = 2;

/// Lifecycle of the ticker. `Stopped` is terminal; there is no restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerState {
    Idle,
    Running,
    Stopped,
}

fn decode_state(raw: u8) -> TickerState {
    match raw {
        STATE_IDLE => TickerState::Idle,
        STATE_RUNNING => TickerState::Running,
        _ => TickerState::Stopped,
    }
}

#[derive(Debug, Error)]
pub enum TickerError {
    /// `start` was called on a ticker that already ran.
    #[error("ticker cannot be started twice; stopped is a terminal state")]
    NotIdle,
}

/// Periodic estimation driver. Build it Idle, `start` it once the job is
/// confirmed started, tear it down through the returned handle.
pub struct Ticker {
    job: Arc<dyn TransferJob>,
    engine: Option<EstimationEngine>,
    period: Duration,
    state: Arc<AtomicU8>,
}

/// Control surface for a started ticker.
pub struct TickerHandle {
    alive: Arc<AtomicBool>,
    wake: Arc<Notify>,
    state: Arc<AtomicU8>,
    task: JoinHandle<()>,
}

impl Ticker {
    pub fn new(job: Arc<dyn TransferJob>, engine: EstimationEngine, period: Duration) -> Self {
        Self {
            job,
            engine: Some(engine),
            period,
            state: Arc::new(AtomicU8::new(STATE_IDLE)),
        }
    }

    pub fn state(&self) -> TickerState {
        decode_state(self.state.load(Ordering::Relaxed))
    }

    /// Begin ticking. Returns the control handle and the result stream
    /// the presentation layer consumes. Fails once the ticker has left
    /// Idle; a stopped ticker cannot run again.
    pub fn start(
        &mut self,
    ) -> Result<(TickerHandle, mpsc::Receiver<EstimationResult>), TickerError> {
        let engine = self.engine.take().ok_or(TickerError::NotIdle)?;
        self.state.store(STATE_RUNNING, Ordering::Relaxed);

        let (tx, rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);
        let alive = Arc::new(AtomicBool::new(true));
        let wake = Arc::new(Notify::new());
        let task = tokio::spawn(run_loop(
            Arc::clone(&self.job),
            engine,
            self.period,
            Arc::clone(&alive),
            Arc::clone(&wake),
            Arc::clone(&self.state),
            tx,
        ));
        tracing::debug!(period_ms = self.period.as_millis() as u64, "ticker started");

        Ok((
            TickerHandle {
                alive,
                wake,
                state: Arc::clone(&self.state),
                task,
            },
            rx,
        ))
    }
}

async fn run_loop(
    job: Arc<dyn TransferJob>,
    mut engine: EstimationEngine,
    period: Duration,
    alive: Arc<AtomicBool>,
    wake: Arc<Notify>,
    state: Arc<AtomicU8>,
    tx: mpsc::Sender<EstimationResult>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        // Waking early (shutdown nudge) is not an error; the loop simply
        // re-evaluates liveness and job state.
        tokio::select! {
            _ = interval.tick() => {}
            _ = wake.notified() => {}
        }
        if !alive.load(Ordering::Relaxed) {
            break;
        }
        if job.has_finished() {
            tracing::debug!("job finished, ticker stopping");
            break;
        }
        if job.is_paused() {
            continue;
        }
        if let Some(result) = engine.tick(job.as_ref(), now_millis()) {
            match tx.try_send(result) {
                Ok(()) => {}
                // Consumer lagging: this update is disposable.
                Err(mpsc::error::TrySendError::Full(_)) => {}
                // Presentation gone: nothing left to report to.
                Err(mpsc::error::TrySendError::Closed(_)) => break,
            }
        }
    }
    state.store(STATE_STOPPED, Ordering::Relaxed);
}

impl TickerHandle {
    /// Request the loop to exit; returns immediately. The task observes
    /// the flag at once when sleeping, within one period at worst.
    pub fn shutdown(&self) {
        self.alive.store(false, Ordering::Relaxed);
        self.wake.notify_one();
    }

    pub fn state(&self) -> TickerState {
        decode_state(self.state.load(Ordering::Relaxed))
    }

    /// Wait for the task to exit. A collaborator panic during a tick
    /// surfaces here as the join error.
    pub async fn join(self) -> Result<(), JoinError> {
        self.task.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::SampleHistory;
    use crate::job::testing::FakeJob;
    use crate::job::JobKind;
    use std::sync::atomic::Ordering;
    use tokio::time::timeout;

    fn ticker_for(job: &Arc<FakeJob>) -> (Ticker, Arc<SampleHistory>) {
        let history = Arc::new(SampleHistory::default());
        let engine = EstimationEngine::new(JobKind::FileAware, Arc::clone(&history), now_millis());
        let ticker = Ticker::new(
            Arc::clone(job) as Arc<dyn TransferJob>,
            engine,
            DEFAULT_TICK_PERIOD,
        );
        (ticker, history)
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_results_and_stops_on_finish() {
        let job = Arc::new(FakeJob::new());
        job.elapsed_ms.store(1000, Ordering::Relaxed);
        job.total_bytes.store(1024, Ordering::Relaxed);
        let (mut ticker, history) = ticker_for(&job);
        assert_eq!(ticker.state(), TickerState::Idle);

        let (handle, mut rx) = ticker.start().unwrap();
        assert_eq!(handle.state(), TickerState::Running);

        let first = rx.recv().await.expect("first result");
        assert!(first.transfer.is_some());
        let _second = rx.recv().await.expect("second result");
        assert!(!history.is_empty());

        job.finished.store(true, Ordering::Relaxed);
        // Channel closes once the loop observes completion.
        while rx.recv().await.is_some() {}
        handle.join().await.unwrap();
        assert_eq!(ticker.state(), TickerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_job_produces_no_results() {
        let job = Arc::new(FakeJob::new());
        job.paused.store(true, Ordering::Relaxed);
        let (mut ticker, history) = ticker_for(&job);
        let (handle, mut rx) = ticker.start().unwrap();

        let waited = timeout(Duration::from_secs(10), rx.recv()).await;
        assert!(waited.is_err(), "paused ticks must stay silent");
        assert!(history.is_empty());

        handle.shutdown();
        handle.join().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_is_terminal() {
        let job = Arc::new(FakeJob::new());
        let (mut ticker, _history) = ticker_for(&job);
        let (handle, _rx) = ticker.start().unwrap();

        handle.shutdown();
        handle.join().await.unwrap();
        assert_eq!(ticker.state(), TickerState::Stopped);

        assert!(matches!(ticker.start(), Err(TickerError::NotIdle)));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_receiver_dropped() {
        let job = Arc::new(FakeJob::new());
        job.elapsed_ms.store(1000, Ordering::Relaxed);
        let (mut ticker, _history) = ticker_for(&job);
        let (handle, rx) = ticker.start().unwrap();

        drop(rx);
        handle.join().await.unwrap();
        assert_eq!(ticker.state(), TickerState::Stopped);
    }
}
