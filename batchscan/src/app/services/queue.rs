// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::app::services::persist::{PersistError, read_json, save_json};

pub const DEFAULT_SCRIPT_NAME: &str = "submit.sbatch";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedJob {
    pub directory: PathBuf,
    pub script_name: String,
    #[serde(default)]
    pub priority: f64,
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("{} ({script_name}) is already queued", .directory.display())]
    Duplicate {
        directory: PathBuf,
        script_name: String,
    },
    #[error("priority must be a finite number, got {0}")]
    InvalidPriority(f64),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Jobs waiting to be handed to the scheduler, persisted as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitQueue {
    #[serde(default)]
    jobs: Vec<QueuedJob>,
}

impl SubmitQueue {
    /// Loads the queue at `path`; a missing file is an empty queue.
    pub fn load(path: &Path) -> Result<Self, QueueError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Ok(read_json(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), QueueError> {
        save_json(self, path, true)?;
        Ok(())
    }

    pub fn jobs(&self) -> &[QueuedJob] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn add(
        &mut self,
        directory: PathBuf,
        script_name: impl Into<String>,
        priority: f64,
    ) -> Result<&QueuedJob, QueueError> {
        let script_name = script_name.into();
        if !priority.is_finite() {
            return Err(QueueError::InvalidPriority(priority));
        }
        if self
            .jobs
            .iter()
            .any(|job| job.directory == directory && job.script_name == script_name)
        {
            return Err(QueueError::Duplicate {
                directory,
                script_name,
            });
        }
        info!(
            directory = %directory.display(),
            script_name = %script_name,
            priority,
            "queueing job"
        );
        self.jobs.push(QueuedJob {
            directory,
            script_name,
            priority,
        });
        Ok(&self.jobs[self.jobs.len() - 1])
    }

    /// Removes every job queued from `directory`, returning how many.
    pub fn remove(&mut self, directory: &Path) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|job| job.directory != directory);
        before - self.jobs.len()
    }

    pub fn clear(&mut self) -> usize {
        let removed = self.jobs.len();
        self.jobs.clear();
        removed
    }

    /// Highest priority first; equal priorities keep insertion order.
    pub fn ordered(&self) -> Vec<QueuedJob> {
        let mut jobs = self.jobs.clone();
        jobs.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        jobs
    }

    pub(crate) fn remove_job(&mut self, job: &QueuedJob) {
        if let Some(index) = self.jobs.iter().position(|queued| queued == job) {
            self.jobs.remove(index);
        }
    }
}
