// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::app::AppContext;
use crate::app::commands::*;
use crate::app::errors::{AppError, AppResult};
use crate::app::services::persist::save_json;
use crate::app::services::queue::SubmitQueue;
use crate::app::services::report::{ReportSettings, generate_report};
use crate::app::services::slurm::{parse_job_id, parse_squeue, sbatch_command, squeue_command};
use crate::app::services::tether::{TetherSettings, write_tether};

pub async fn handle_report(ctx: &AppContext, cmd: ReportCommand) -> AppResult<CommandResult> {
    let config = &ctx.config;
    let settings = ReportSettings {
        kinds: config.kinds.clone(),
        tail_lines: config.tail_lines,
        workers: config.workers,
        policy: config.on_classification_error,
    };
    let report = generate_report(ctx.fs.clone(), &settings, &cmd.root, &cmd.marker).await?;
    if let Some(path) = cmd.output.as_deref() {
        save_json(&report, path, true)?;
        info!(path = %path.display(), entries = report.len(), "report written");
    }
    Ok(CommandResult::Report {
        root: cmd.root,
        report,
        output: cmd.output,
    })
}

pub async fn handle_tether(_ctx: &AppContext, cmd: TetherCommand) -> AppResult<CommandResult> {
    let settings = TetherSettings {
        root: cmd.root,
        marker: cmd.marker,
        staging: cmd.staging.clone(),
        per_job: cmd.per_job,
        header: cmd.header,
        executable: cmd.executable,
        script_name: cmd.script_name,
    };
    let scripts = tokio::task::spawn_blocking(move || write_tether(&settings))
        .await
        .map_err(|err| AppError::internal_error(format!("tether task failed: {err}")))??;
    Ok(CommandResult::Tether {
        staging: cmd.staging,
        scripts,
    })
}

pub async fn handle_queue_add(ctx: &AppContext, cmd: QueueAddCommand) -> AppResult<CommandResult> {
    let directory = absolute(&cmd.directory)?;
    let script = directory.join(&cmd.script_name);
    let present = ctx
        .fs
        .file_len(&script)
        .map_err(|err| AppError::io(format!("failed to inspect {}: {err}", script.display())))?;
    if present.is_none() {
        return Err(AppError::invalid_argument(format!(
            "{} does not exist",
            script.display()
        )));
    }

    let path = &ctx.config.queue_path;
    let mut queue = SubmitQueue::load(path)?;
    let job = queue
        .add(directory, cmd.script_name, cmd.priority)?
        .clone();
    queue.save(path)?;
    Ok(CommandResult::QueueAdd {
        job,
        queued: queue.len(),
    })
}

pub async fn handle_queue_list(ctx: &AppContext) -> AppResult<CommandResult> {
    let queue = SubmitQueue::load(&ctx.config.queue_path)?;
    Ok(CommandResult::QueueList {
        jobs: queue.ordered(),
    })
}

pub async fn handle_queue_remove(
    ctx: &AppContext,
    cmd: QueueRemoveCommand,
) -> AppResult<CommandResult> {
    let directory = absolute(&cmd.directory)?;
    let path = &ctx.config.queue_path;
    let mut queue = SubmitQueue::load(path)?;
    let removed = queue.remove(&directory);
    if removed == 0 {
        return Err(AppError::invalid_argument(format!(
            "{} is not queued",
            directory.display()
        )));
    }
    queue.save(path)?;
    Ok(CommandResult::QueueRemove { directory, removed })
}

pub async fn handle_queue_clear(ctx: &AppContext) -> AppResult<CommandResult> {
    let path = &ctx.config.queue_path;
    let mut queue = SubmitQueue::load(path)?;
    let removed = queue.clear();
    queue.save(path)?;
    Ok(CommandResult::QueueClear { removed })
}

pub async fn handle_queue_submit(
    ctx: &AppContext,
    cmd: QueueSubmitCommand,
) -> AppResult<CommandResult> {
    if cmd.max == Some(0) {
        return Err(AppError::invalid_argument("--max must be greater than zero"));
    }
    let path = &ctx.config.queue_path;
    let mut queue = SubmitQueue::load(path)?;
    let limit = cmd.max.unwrap_or(queue.len());
    let mut submitted = Vec::new();

    for job in queue.ordered().into_iter().take(limit) {
        let capture = ctx
            .shell
            .exec_capture(&sbatch_command(&job.script_name), Some(&job.directory))
            .await;
        let failure = match capture {
            Ok(capture) if capture.exit_code == 0 => match parse_job_id(&capture.stdout) {
                Some(job_id) => {
                    info!(
                        directory = %job.directory.display(),
                        job_id,
                        "submitted job"
                    );
                    queue.remove_job(&job);
                    submitted.push(SubmittedJob {
                        directory: job.directory,
                        script_name: job.script_name,
                        job_id,
                    });
                    continue;
                }
                None => format!(
                    "unrecognised sbatch output: {}",
                    capture.stdout.trim()
                ),
            },
            Ok(capture) => format!(
                "sbatch exited with {}: {}",
                capture.exit_code,
                capture.stderr.trim()
            ),
            Err(err) => err.message,
        };

        warn!(directory = %job.directory.display(), "submission stopped: {failure}");
        queue.save(path)?;
        return Err(AppError::scheduler(format!(
            "failed to submit {} after {} successful submission(s): {failure}",
            job.directory.display(),
            submitted.len()
        )));
    }

    queue.save(path)?;
    Ok(CommandResult::QueueSubmit {
        submitted,
        remaining: queue.len(),
    })
}

pub async fn handle_status(ctx: &AppContext, cmd: StatusCommand) -> AppResult<CommandResult> {
    let user = match cmd.user.or_else(|| ctx.config.slurm_user.clone()) {
        Some(user) => user,
        None => current_user(ctx).await?,
    };
    let capture = ctx.shell.exec_capture(&squeue_command(&user), None).await?;
    if capture.exit_code != 0 {
        return Err(AppError::scheduler(format!(
            "squeue exited with {}: {}",
            capture.exit_code,
            capture.stderr.trim()
        )));
    }
    let jobs = parse_squeue(&capture.stdout)?;
    Ok(CommandResult::SlurmStatus { user, jobs })
}

async fn current_user(ctx: &AppContext) -> AppResult<String> {
    let capture = ctx.shell.exec_capture("whoami", None).await?;
    let user = capture.stdout.trim();
    if capture.exit_code != 0 || user.is_empty() {
        return Err(AppError::invalid_argument(
            "could not determine the current user; pass --user",
        ));
    }
    Ok(user.to_string())
}

fn absolute(path: &Path) -> AppResult<PathBuf> {
    std::path::absolute(path)
        .map_err(|err| AppError::invalid_argument(format!("invalid path {}: {err}", path.display())))
}
