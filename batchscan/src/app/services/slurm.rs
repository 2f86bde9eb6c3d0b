// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SQUEUE_COLUMNS: usize = 8;

/// One row of `squeue -h` default output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlurmJob {
    pub job_id: String,
    pub partition: String,
    pub name: String,
    pub user: String,
    pub state: String,
    pub time: String,
    pub nodes: String,
    pub nodelist: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlurmError {
    #[error("squeue row has {found} columns, expected at least {SQUEUE_COLUMNS}: {line:?}")]
    MalformedRow { line: String, found: usize },
    #[error("squeue returned jobs for more than one user: {}", .users.join(", "))]
    MultipleUsers { users: Vec<String> },
}

pub fn sh_escape(p: &str) -> String {
    let mut out = String::from("'");
    out.push_str(&p.replace('\'', r"'\''"));
    out.push('\'');
    out
}

pub fn squeue_command(user: &str) -> String {
    format!("squeue -h -u {}", sh_escape(user))
}

pub fn sbatch_command(script: &str) -> String {
    format!("sbatch {}", sh_escape(script))
}

/// Extracts the id from sbatch's `Submitted batch job <id>` line.
pub fn parse_job_id(output: &str) -> Option<u64> {
    const MARKER: &str = "Submitted batch job ";
    output.lines().find_map(|line| {
        let idx = line.find(MARKER)?;
        line[idx + MARKER.len()..].trim().parse::<u64>().ok()
    })
}

/// Parses headerless squeue output. Columns past the eighth are folded
/// into the node list, which may contain spaces for pending reasons.
pub fn parse_squeue(output: &str) -> Result<Vec<SlurmJob>, SlurmError> {
    let mut jobs = Vec::new();
    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < SQUEUE_COLUMNS {
            return Err(SlurmError::MalformedRow {
                line: line.to_string(),
                found: fields.len(),
            });
        }
        jobs.push(SlurmJob {
            job_id: fields[0].to_string(),
            partition: fields[1].to_string(),
            name: fields[2].to_string(),
            user: fields[3].to_string(),
            state: fields[4].to_string(),
            time: fields[5].to_string(),
            nodes: fields[6].to_string(),
            nodelist: fields[7..].join(" "),
        });
    }

    let mut users: Vec<String> = jobs.iter().map(|job| job.user.clone()).collect();
    users.sort();
    users.dedup();
    if users.len() > 1 {
        return Err(SlurmError::MultipleUsers { users });
    }
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUEUE: &str = "\
  4242101     batch   vasp-01    alice  R    1:02:03      2 node[01-02]
  4242102     batch   feff-02    alice PD       0:00      1 (Priority)
";

    #[test]
    fn parses_rows() {
        let jobs = parse_squeue(SQUEUE).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].job_id, "4242101");
        assert_eq!(jobs[0].state, "R");
        assert_eq!(jobs[0].nodelist, "node[01-02]");
        assert_eq!(jobs[1].state, "PD");
        assert_eq!(jobs[1].nodelist, "(Priority)");
    }

    #[test]
    fn extra_columns_fold_into_nodelist() {
        let jobs = parse_squeue("1 gpu job bob PD 0:00 1 (Resources) waiting\n").unwrap();
        assert_eq!(jobs[0].nodelist, "(Resources) waiting");
    }

    #[test]
    fn empty_output_is_no_jobs() {
        assert!(parse_squeue("\n  \n").unwrap().is_empty());
    }

    #[test]
    fn short_row_is_rejected() {
        let err = parse_squeue("1 batch job alice R\n").unwrap_err();
        assert!(matches!(err, SlurmError::MalformedRow { found: 5, .. }));
    }

    #[test]
    fn mixed_users_are_rejected() {
        let output = "1 batch a alice R 0:01 1 n1\n2 batch b bob R 0:01 1 n2\n";
        assert_eq!(
            parse_squeue(output).unwrap_err(),
            SlurmError::MultipleUsers {
                users: vec!["alice".into(), "bob".into()]
            }
        );
    }

    #[test]
    fn parses_submitted_job_id() {
        assert_eq!(parse_job_id("Submitted batch job 11\n"), Some(11));
        assert_eq!(
            parse_job_id("warning: partition default\nSubmitted batch job 987654\n"),
            Some(987654)
        );
        assert_eq!(parse_job_id("sbatch: error: invalid partition"), None);
    }

    #[test]
    fn commands_quote_arguments() {
        assert_eq!(squeue_command("alice"), "squeue -h -u 'alice'");
        assert_eq!(sbatch_command("it's.sbatch"), r"sbatch 'it'\''s.sbatch'");
    }
}
