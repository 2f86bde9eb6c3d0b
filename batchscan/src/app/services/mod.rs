// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

pub mod classify;
pub mod completion;
pub mod kinds;
pub mod persist;
pub mod queue;
pub mod report;
pub mod search;
pub mod slurm;
pub mod tail;
pub mod tether;

pub use classify::{ClassifyError, Classifier};
pub use completion::{CompletionChecker, CompletionError, DEFAULT_TAIL_LINES};
pub use kinds::{CompletionRule, JobKind, KindSpec, KindTable};
pub use persist::{PersistError, read_json, save_json};
pub use queue::{QueueError, QueuedJob, SubmitQueue};
pub use report::{
    ClassificationPolicy, JobStatus, Report, ReportSettings, ScanError, generate_report,
};
pub use search::{SearchError, find_marked_directories};
pub use slurm::{SlurmError, SlurmJob};
pub use tether::{StagedScript, TetherError, TetherSettings, write_tether};
