// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::app::services::queue::DEFAULT_SCRIPT_NAME;

#[derive(Parser, Debug)]
#[command(name = "batchscan", version, about, long_about = None)]
pub struct Cli {
    #[arg(
        short,
        long,
        global = true,
        value_name = "PATH",
        help = "Path to a TOML config file. When omitted, batchscan uses BATCHSCAN_CONFIG_PATH if set, otherwise the default config file location if available."
    )]
    pub config: Option<PathBuf>,
    /// Enable debug logging on stderr.
    #[arg(long, global = true)]
    pub debug: bool,
    /// Print results as JSON on stdout and errors as JSON on stderr.
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Find job directories under a root and report which ones finished.
    Report(ReportArgs),
    /// Pack many small jobs into a few staged submit scripts.
    Tether(TetherArgs),
    /// Manage the local submit queue.
    Queue(QueueArgs),
    /// Show the Slurm queue for a user.
    Status(StatusArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Directory to search recursively.
    pub root: PathBuf,
    /// File whose presence marks a job directory.
    #[arg(short = 'f', long = "filename", default_value = DEFAULT_SCRIPT_NAME)]
    pub filename: String,
    /// Record unclassifiable directories instead of failing.
    #[arg(long)]
    pub annotate: bool,
    /// Also write the report as JSON to this path.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// Number of directories inspected concurrently.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,
}

#[derive(Args, Debug)]
pub struct TetherArgs {
    /// Directory to search recursively.
    pub root: PathBuf,
    /// Directory receiving the numbered staged scripts.
    #[arg(long, value_name = "DIR")]
    pub staging: PathBuf,
    /// Calculations per staged script.
    #[arg(long, value_name = "N")]
    pub per_job: usize,
    /// File holding the scheduler header lines.
    #[arg(long, value_name = "FILE")]
    pub header: PathBuf,
    /// Command run in each directory; must end with '&'.
    #[arg(long = "exec", value_name = "LINE", allow_hyphen_values = true)]
    pub executable: String,
    /// File whose presence marks a job directory.
    #[arg(short = 'f', long = "filename", default_value = DEFAULT_SCRIPT_NAME)]
    pub filename: String,
    /// Name of each staged script.
    #[arg(long, default_value = DEFAULT_SCRIPT_NAME)]
    pub script_name: String,
}

#[derive(Args, Debug)]
pub struct QueueArgs {
    #[command(subcommand)]
    pub cmd: QueueCmd,
}

#[derive(Subcommand, Debug)]
pub enum QueueCmd {
    /// Queue a job directory for submission.
    Add(QueueAddArgs),
    /// List queued jobs, highest priority first.
    List,
    /// Remove every queued job for a directory.
    Remove(QueueRemoveArgs),
    /// Remove all queued jobs.
    Clear,
    /// Submit queued jobs with sbatch.
    Submit(QueueSubmitArgs),
}

#[derive(Args, Debug)]
pub struct QueueAddArgs {
    pub directory: PathBuf,
    /// Submit script inside the directory.
    #[arg(long, default_value = DEFAULT_SCRIPT_NAME)]
    pub script: String,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub priority: f64,
}

#[derive(Args, Debug)]
pub struct QueueRemoveArgs {
    pub directory: PathBuf,
}

#[derive(Args, Debug)]
pub struct QueueSubmitArgs {
    /// Submit at most this many jobs.
    #[arg(long, value_name = "N")]
    pub max: Option<usize>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Slurm user; defaults to slurm_user from the config, then the current user.
    #[arg(long)]
    pub user: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn report_defaults_marker_to_submit_script() {
        let args = Cli::parse_from(["batchscan", "report", "/runs"]);
        match args.cmd {
            Cmd::Report(report) => {
                assert_eq!(report.root, PathBuf::from("/runs"));
                assert_eq!(report.filename, "submit.sbatch");
                assert!(!report.annotate);
                assert!(report.workers.is_none());
            }
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn report_accepts_short_filename_and_annotate() {
        let args = Cli::parse_from([
            "batchscan", "report", "/runs", "-f", "run.sh", "--annotate", "--workers", "3",
        ]);
        match args.cmd {
            Cmd::Report(report) => {
                assert_eq!(report.filename, "run.sh");
                assert!(report.annotate);
                assert_eq!(report.workers, Some(3));
            }
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = Cli::parse_from(["batchscan", "queue", "list", "--json", "--debug"]);
        assert!(args.json);
        assert!(args.debug);
    }

    #[test]
    fn tether_requires_staging_and_exec() {
        assert!(Cli::try_parse_from(["batchscan", "tether", "/runs", "--per-job", "4"]).is_err());
        let args = Cli::parse_from([
            "batchscan",
            "tether",
            "/runs",
            "--staging",
            "/stage",
            "--per-job",
            "4",
            "--header",
            "header.txt",
            "--exec",
            "mpirun vasp_std &",
        ]);
        match args.cmd {
            Cmd::Tether(tether) => {
                assert_eq!(tether.per_job, 4);
                assert_eq!(tether.executable, "mpirun vasp_std &");
                assert_eq!(tether.script_name, "submit.sbatch");
            }
            _ => panic!("expected tether command"),
        }
    }

    #[test]
    fn queue_add_accepts_negative_priority() {
        let args = Cli::parse_from(["batchscan", "queue", "add", "job", "--priority", "-2.5"]);
        match args.cmd {
            Cmd::Queue(queue) => match queue.cmd {
                QueueCmd::Add(add) => {
                    assert_eq!(add.priority, -2.5);
                    assert_eq!(add.script, "submit.sbatch");
                }
                _ => panic!("expected queue add"),
            },
            _ => panic!("expected queue command"),
        }
    }
}
