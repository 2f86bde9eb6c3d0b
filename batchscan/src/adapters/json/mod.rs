// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::app::commands::CommandResult;
use crate::app::errors::{AppError, AppResult};
use crate::app::ports::OutputPort;

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutputPort for JsonOutput {
    async fn render(&self, result: &CommandResult) -> AppResult<()> {
        let payload = json!({
            "ok": true,
            "result": result_to_json(result)?,
        });
        let output = serde_json::to_string_pretty(&payload)
            .map_err(|err| AppError::internal_error(err.to_string()))?;
        println!("{output}");
        Ok(())
    }

    async fn render_error(&self, error: &AppError) -> AppResult<()> {
        let payload = error_to_json(error);
        let output = serde_json::to_string_pretty(&payload)
            .map_err(|err| AppError::internal_error(err.to_string()))?;
        eprintln!("{output}");
        Ok(())
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|err| AppError::internal_error(err.to_string()))
}

fn error_to_json(error: &AppError) -> Value {
    json!({
        "ok": false,
        "errorType": error.kind.as_str(),
        "reason": error.message,
        "exitCode": error.exit_code,
    })
}

fn result_to_json(result: &CommandResult) -> AppResult<Value> {
    Ok(match result {
        CommandResult::Report {
            root,
            report,
            output,
        } => json!({
            "root": root,
            "jobs": to_value(&report.jobs)?,
            "anomalies": to_value(&report.anomalies)?,
            "summary": {
                "total": report.len(),
                "complete": report.complete_count(),
                "incomplete": report.incomplete_count(),
            },
            "output": output,
        }),
        CommandResult::Tether { staging, scripts } => json!({
            "staging": staging,
            "scripts": to_value(scripts)?,
        }),
        CommandResult::QueueList { jobs } => json!({ "jobs": to_value(jobs)? }),
        CommandResult::QueueAdd { job, queued } => json!({
            "job": to_value(job)?,
            "queued": queued,
        }),
        CommandResult::QueueRemove { directory, removed } => json!({
            "directory": directory,
            "removed": removed,
        }),
        CommandResult::QueueClear { removed } => json!({ "removed": removed }),
        CommandResult::QueueSubmit {
            submitted,
            remaining,
        } => json!({
            "submitted": to_value(submitted)?,
            "remaining": remaining,
        }),
        CommandResult::SlurmStatus { user, jobs } => json!({
            "user": user,
            "jobs": to_value(jobs)?,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::errors::ErrorType;
    use crate::app::services::kinds::JobKind;
    use crate::app::services::report::{JobStatus, Report};
    use std::path::PathBuf;

    #[test]
    fn report_result_keys_jobs_by_directory() {
        let mut report = Report::default();
        report.jobs.insert(
            PathBuf::from("/runs/mp-1/VASP"),
            JobStatus {
                kind: JobKind::Vasp,
                complete: true,
            },
        );
        let value = result_to_json(&CommandResult::Report {
            root: PathBuf::from("/runs"),
            report,
            output: None,
        })
        .unwrap();
        assert_eq!(
            value["jobs"]["/runs/mp-1/VASP"],
            json!({"kind": "VASP", "complete": true})
        );
        assert_eq!(value["summary"]["complete"], json!(1));
        assert_eq!(value["output"], Value::Null);
    }

    #[test]
    fn error_payload_carries_type_and_exit_code() {
        let err = AppError::new(ErrorType::Classification, "ambiguous");
        let value = error_to_json(&err);
        assert_eq!(value["errorType"], json!("CLASSIFICATION_ERROR"));
        assert_eq!(value["exitCode"], json!(3));
        assert_eq!(value["ok"], json!(false));
    }
}
