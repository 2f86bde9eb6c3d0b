// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

mod console;
mod format;

use async_trait::async_trait;

use crate::app::commands::CommandResult;
use crate::app::errors::{AppError, AppResult};
use crate::app::ports::OutputPort;
use console::{CHECK, CROSS, print_stderr, print_stdout, print_with_red_cross_stderr};
use format::{format_queue_table, format_report, format_slurm_table, format_tether};

pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

fn local(err: anyhow::Error) -> AppError {
    AppError::local_error(err.to_string())
}

#[async_trait]
impl OutputPort for TerminalOutput {
    async fn render(&self, result: &CommandResult) -> AppResult<()> {
        let text = match result {
            CommandResult::Report {
                root,
                report,
                output,
            } => {
                if let Some(path) = output {
                    print_stderr(&format!("Report written to {}\n", path.display()))
                        .map_err(local)?;
                }
                format_report(root, report)
            }
            CommandResult::Tether { staging, scripts } => format_tether(staging, scripts),
            CommandResult::QueueList { jobs } => format_queue_table(jobs),
            CommandResult::QueueAdd { job, queued } => format!(
                "{CHECK} queued {} ({} in queue)\n",
                job.directory.join(&job.script_name).display(),
                queued
            ),
            CommandResult::QueueRemove { directory, removed } => format!(
                "Removed {removed} queued job(s) for {}\n",
                directory.display()
            ),
            CommandResult::QueueClear { removed } => {
                format!("Cleared {removed} queued job(s)\n")
            }
            CommandResult::QueueSubmit {
                submitted,
                remaining,
            } => {
                let mut text = String::new();
                for job in submitted {
                    text.push_str(&format!(
                        "{CHECK} submitted batch job {} from {}\n",
                        job.job_id,
                        job.directory.display()
                    ));
                }
                if submitted.is_empty() {
                    text.push_str(&format!("{CROSS} nothing to submit\n"));
                }
                text.push_str(&format!("{remaining} job(s) left in queue\n"));
                text
            }
            CommandResult::SlurmStatus { user, jobs } => format_slurm_table(user, jobs),
        };
        print_stdout(&text).map_err(local)
    }

    async fn render_error(&self, error: &AppError) -> AppResult<()> {
        print_with_red_cross_stderr(&error.message).map_err(local)
    }
}
