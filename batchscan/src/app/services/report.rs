// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::app::ports::FilesystemPort;
use crate::app::services::classify::{ClassifyError, Classifier};
use crate::app::services::completion::{CompletionChecker, CompletionError};
use crate::app::services::kinds::{JobKind, KindTable};
use crate::app::services::search::{SearchError, find_marked_directories};

/// What to do with a marked directory that cannot be classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationPolicy {
    /// Stop and fail the whole report.
    #[default]
    Abort,
    /// Record the directory under `anomalies` and keep going.
    Annotate,
}

impl ClassificationPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassificationPolicy::Abort => "abort",
            ClassificationPolicy::Annotate => "annotate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub kind: JobKind,
    pub complete: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub jobs: BTreeMap<PathBuf, JobStatus>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub anomalies: BTreeMap<PathBuf, String>,
}

impl Report {
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty() && self.anomalies.is_empty()
    }

    pub fn complete_count(&self) -> usize {
        self.jobs.values().filter(|status| status.complete).count()
    }

    pub fn incomplete_count(&self) -> usize {
        self.jobs.len() - self.complete_count()
    }

    /// Per-kind `(complete, incomplete)` counts.
    pub fn tally(&self) -> BTreeMap<JobKind, (usize, usize)> {
        let mut tally = BTreeMap::new();
        for status in self.jobs.values() {
            let entry = tally.entry(status.kind).or_insert((0, 0));
            if status.complete {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }
        tally
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error("worker for {} failed: {message}", .directory.display())]
    Worker { directory: PathBuf, message: String },
}

#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub kinds: Arc<KindTable>,
    pub tail_lines: usize,
    pub workers: usize,
    pub policy: ClassificationPolicy,
}

/// Classifies one directory and runs its completion protocol.
pub fn inspect_directory(
    fs: &dyn FilesystemPort,
    kinds: &KindTable,
    tail_lines: usize,
    directory: &Path,
) -> Result<JobStatus, ScanError> {
    let kind = Classifier::new(fs, kinds).classify(directory)?;
    let complete = CompletionChecker::new(fs, kinds, tail_lines).check_status(directory, kind)?;
    Ok(JobStatus { kind, complete })
}

fn is_classification_anomaly(err: &ScanError) -> bool {
    matches!(
        err,
        ScanError::Classify(ClassifyError::Ambiguous { .. })
            | ScanError::Classify(ClassifyError::Unclassifiable { .. })
    )
}

/// Builds a status report for every directory under `root` that contains
/// `marker`. Directories are inspected in parallel on blocking workers, at
/// most `settings.workers` at a time.
pub async fn generate_report(
    fs: Arc<dyn FilesystemPort>,
    settings: &ReportSettings,
    root: &Path,
    marker: &str,
) -> Result<Report, ScanError> {
    let directories = {
        let search_root = root.to_path_buf();
        let marker = marker.to_string();
        tokio::task::spawn_blocking(move || find_marked_directories(&search_root, &marker))
            .await
            .map_err(|err| ScanError::Worker {
                directory: root.to_path_buf(),
                message: err.to_string(),
            })??
    };
    info!(
        root = %root.display(),
        marker,
        count = directories.len(),
        "found marked directories"
    );

    let semaphore = Arc::new(Semaphore::new(settings.workers.max(1)));
    let mut tasks = JoinSet::new();
    let mut owners = HashMap::new();
    let mut report = Report::default();

    for directory in directories {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|err| ScanError::Worker {
                directory: directory.clone(),
                message: err.to_string(),
            })?;
        let fs = fs.clone();
        let kinds = settings.kinds.clone();
        let tail_lines = settings.tail_lines;
        let task_directory = directory.clone();
        let handle = tasks.spawn_blocking(move || {
            let _permit = permit;
            let outcome = inspect_directory(fs.as_ref(), &kinds, tail_lines, &task_directory);
            (task_directory, outcome)
        });
        owners.insert(handle.id(), directory);

        while let Some(joined) = tasks.try_join_next() {
            if let Err(err) = collect(joined, &owners, settings.policy, &mut report) {
                tasks.abort_all();
                return Err(err);
            }
        }
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = collect(joined, &owners, settings.policy, &mut report) {
            tasks.abort_all();
            return Err(err);
        }
    }

    info!(
        jobs = report.jobs.len(),
        complete = report.complete_count(),
        anomalies = report.anomalies.len(),
        "report generated"
    );
    Ok(report)
}

type Joined = Result<(PathBuf, Result<JobStatus, ScanError>), tokio::task::JoinError>;

fn collect(
    joined: Joined,
    owners: &HashMap<tokio::task::Id, PathBuf>,
    policy: ClassificationPolicy,
    report: &mut Report,
) -> Result<(), ScanError> {
    let (directory, outcome) = match joined {
        Ok(done) => done,
        Err(err) => {
            let directory = owners.get(&err.id()).cloned().unwrap_or_default();
            return Err(ScanError::Worker {
                directory,
                message: err.to_string(),
            });
        }
    };
    match outcome {
        Ok(status) => {
            debug!(
                directory = %directory.display(),
                kind = %status.kind,
                complete = status.complete,
                "job inspected"
            );
            report.jobs.insert(directory, status);
            Ok(())
        }
        Err(err) if policy == ClassificationPolicy::Annotate && is_classification_anomaly(&err) => {
            warn!(directory = %directory.display(), "{err}");
            report.anomalies.insert(directory, err.to_string());
            Ok(())
        }
        Err(err) => Err(err),
    }
}
