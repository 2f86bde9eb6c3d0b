// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::collections::BTreeSet;
use std::io;
use std::path::Path;

use async_trait::async_trait;

use crate::app::commands::CommandResult;
use crate::app::errors::{AppError, AppResult};

/// Read-only view of job directories.
///
/// Missing files are reported as `None` rather than errors so callers can
/// tell "not produced yet" apart from a failing read.
pub trait FilesystemPort: Send + Sync {
    /// Names of the immediate entries of `directory`.
    fn list_names(&self, directory: &Path) -> io::Result<BTreeSet<String>>;
    /// Size in bytes of a regular file, `None` if there is no such file.
    fn file_len(&self, path: &Path) -> io::Result<Option<u64>>;
    /// Last `lines` lines of a regular file, `None` if there is no such file.
    fn read_tail(&self, path: &Path, lines: usize) -> io::Result<Option<Vec<String>>>;
}

#[derive(Debug, Clone)]
pub struct ExecCapture {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

#[async_trait]
pub trait ShellPort: Send + Sync {
    async fn exec_capture(&self, command: &str, cwd: Option<&Path>) -> AppResult<ExecCapture>;
}

#[async_trait]
pub trait OutputPort: Send + Sync {
    async fn render(&self, result: &CommandResult) -> AppResult<()>;
    async fn render_error(&self, error: &AppError) -> AppResult<()>;
}
