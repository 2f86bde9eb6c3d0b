// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::path::PathBuf;

mod results;

pub use results::{CommandResult, SubmittedJob};

#[derive(Debug, Clone)]
pub enum Command {
    Report(ReportCommand),
    Tether(TetherCommand),
    Queue(QueueCommand),
    Status(StatusCommand),
}

#[derive(Debug, Clone)]
pub struct ReportCommand {
    pub root: PathBuf,
    pub marker: String,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct TetherCommand {
    pub root: PathBuf,
    pub marker: String,
    pub staging: PathBuf,
    pub per_job: usize,
    pub header: PathBuf,
    pub executable: String,
    pub script_name: String,
}

#[derive(Debug, Clone)]
pub enum QueueCommand {
    Add(QueueAddCommand),
    List,
    Remove(QueueRemoveCommand),
    Clear,
    Submit(QueueSubmitCommand),
}

#[derive(Debug, Clone)]
pub struct QueueAddCommand {
    pub directory: PathBuf,
    pub script_name: String,
    pub priority: f64,
}

#[derive(Debug, Clone)]
pub struct QueueRemoveCommand {
    pub directory: PathBuf,
}

#[derive(Debug, Clone)]
pub struct QueueSubmitCommand {
    pub max: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct StatusCommand {
    pub user: Option<String>,
}
