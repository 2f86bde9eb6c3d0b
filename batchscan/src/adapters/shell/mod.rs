// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::app::errors::{AppError, AppResult};
use crate::app::ports::{ExecCapture, ShellPort};

/// Runs commands through `sh -c` on the local machine.
pub struct LocalShell;

#[async_trait]
impl ShellPort for LocalShell {
    async fn exec_capture(&self, command: &str, cwd: Option<&Path>) -> AppResult<ExecCapture> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        debug!(command, cwd = ?cwd, "running shell command");
        let output = cmd
            .output()
            .await
            .map_err(|err| AppError::local_error(format!("failed to run '{command}': {err}")))?;
        Ok(ExecCapture {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}
