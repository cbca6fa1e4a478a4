//! CLI surface for the `tmon` binary.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use tmon_core::config;

mod commands;


/// Top-level CLI for the TMON progress monitor.
#[derive(Debug, Parser)]
#[command(name = "tmon")]
#[command(about = "TMON: progress/ETA estimation for transfer jobs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run a simulated transfer job and show live estimation output.
    Demo {
        /// Number of files in the simulated job.
        #[arg(long, default_value_t = 4)]
        files: u32,

        /// Size of each simulated file in KiB.
        #[arg(long, default_value_t = 2048)]
        file_kib: u64,

        /// Simulated transfer rate in KiB/s.
        #[arg(long, default_value_t = 512)]
        rate_kib: u64,

        /// Pause the job after this many seconds (resumes 3 s later).
        #[arg(long)]
        pause_after: Option<u64>,

        /// Report whole-job progress only (no per-file counters or graph).
        #[arg(long)]
        simple: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Demo {
                files,
                file_kib,
                rate_kib,
                pause_after,
                simple,
            } => commands::demo::run_demo(&cfg, files, file_kib, rate_kib, pause_after, simple).await,
            CliCommand::Completions { shell } => {
                clap_complete::generate(shell, &mut Cli::command(), "tmon", &mut std::io::stdout());
                Ok(())
            }
        }
    }
}
