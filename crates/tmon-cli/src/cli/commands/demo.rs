//! `tmon demo` – drive a simulated job through the estimation core.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use tmon_core::config::MonitorConfig;
use tmon_core::engine::{now_millis, EstimationEngine, EstimationResult};
use tmon_core::format;
use tmon_core::history::SampleHistory;
use tmon_core::job::{JobKind, TransferJob};
use tmon_core::render::{self, GraphStyle};
use tmon_core::ticker::Ticker;

use crate::sim::SimulatedJob;

/// Terminal rendering surface for the final speed graph.
const GRAPH_COLS: u32 = 72;
const GRAPH_ROWS: u32 = 10;

pub async fn run_demo(
    cfg: &MonitorConfig,
    files: u32,
    file_kib: u64,
    rate_kib: u64,
    pause_after: Option<u64>,
    simple: bool,
) -> Result<()> {
    let job = SimulatedJob::new(files, file_kib * 1024, rate_kib * 1024);
    let driver = job.spawn_driver();

    let history = Arc::new(SampleHistory::new(cfg.history_capacity));
    let kind = if simple {
        JobKind::Simple
    } else {
        JobKind::FileAware
    };
    let engine = EstimationEngine::new(kind, Arc::clone(&history), now_millis());
    let mut ticker = Ticker::new(
        Arc::clone(&job) as Arc<dyn TransferJob>,
        engine,
        Duration::from_millis(cfg.refresh_rate_ms),
    );
    let (handle, mut rx) = ticker.start()?;

    // Scripted pause window to show the resume sample-skip in action.
    if let Some(secs) = pause_after {
        let job = Arc::clone(&job);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            println!("-- pausing --");
            job.set_paused(true);
            tokio::time::sleep(Duration::from_secs(3)).await;
            println!("-- resuming --");
            job.set_paused(false);
        });
    }

    loop {
        tokio::select! {
            maybe = rx.recv() => match maybe {
                Some(result) => print_result(&result),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!("-- stopping --");
                job.stop();
                handle.shutdown();
            }
        }
    }

    handle.join().await?;
    driver.await?;

    if !simple {
        print_graph(&history);
    }
    Ok(())
}

fn print_result(result: &EstimationResult) {
    match &result.transfer {
        Some(t) => {
            let instant = t
                .instantaneous_bps
                .map(|bps| format!("{}/s", format::format_bytes(bps.max(0) as u64)))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "total {:<16} file {:<16} {:<24} now {:<12} elapsed {}",
                result.total_percent_text,
                t.file_percent_text,
                t.transferred_label,
                instant,
                result.elapsed_label,
            );
        }
        None => println!(
            "total {:<16} elapsed {}",
            result.total_percent_text, result.elapsed_label
        ),
    }
}

/// Draw the sample history as an ASCII polyline, newest samples on the
/// right, matching what a pixel renderer would show.
fn print_graph(history: &SampleHistory) {
    let style = GraphStyle {
        line_spacing: 1,
        stroke_width: 1,
    };
    let points = render::polyline(&history.snapshot(), GRAPH_COLS, GRAPH_ROWS, &style);
    if points.is_empty() {
        return;
    }

    let mut grid = vec![vec![' '; GRAPH_COLS as usize]; GRAPH_ROWS as usize];
    for p in &points {
        let x = p.x.clamp(0, GRAPH_COLS as i32 - 1) as usize;
        let y = p.y.clamp(0, GRAPH_ROWS as i32 - 1) as usize;
        grid[y][x] = '*';
    }

    println!("speed graph (newest right):");
    for row in grid {
        println!("  {}", row.into_iter().collect::<String>());
    }
}
