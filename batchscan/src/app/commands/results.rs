// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::path::PathBuf;

use serde::Serialize;

use crate::app::services::queue::QueuedJob;
use crate::app::services::report::Report;
use crate::app::services::slurm::SlurmJob;
use crate::app::services::tether::StagedScript;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittedJob {
    pub directory: PathBuf,
    pub script_name: String,
    pub job_id: u64,
}

#[derive(Debug, Clone)]
pub enum CommandResult {
    Report {
        root: PathBuf,
        report: Report,
        output: Option<PathBuf>,
    },
    Tether {
        staging: PathBuf,
        scripts: Vec<StagedScript>,
    },
    QueueList {
        jobs: Vec<QueuedJob>,
    },
    QueueAdd {
        job: QueuedJob,
        queued: usize,
    },
    QueueRemove {
        directory: PathBuf,
        removed: usize,
    },
    QueueClear {
        removed: usize,
    },
    QueueSubmit {
        submitted: Vec<SubmittedJob>,
        remaining: usize,
    },
    SlurmStatus {
        user: String,
        jobs: Vec<SlurmJob>,
    },
}
