// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::path::Path;

use crate::app::services::queue::QueuedJob;
use crate::app::services::report::Report;
use crate::app::services::slurm::SlurmJob;
use crate::app::services::tether::StagedScript;

use super::console::{CHECK, CROSS, NOTICE};

/// Left-aligned columns separated by two spaces, header first.
pub(super) fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| str_width(h)).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(str_width(cell));
        }
    }

    let mut output = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_row(&mut output, &header_cells, &widths);
    for row in rows {
        push_row(&mut output, row, &widths);
    }
    output
}

fn push_row(output: &mut String, cells: &[String], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    for (idx, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if idx == last {
            output.push_str(cell);
        } else {
            output.push_str(cell);
            output.push_str(&" ".repeat(width - str_width(cell) + 2));
        }
    }
    output.push('\n');
}

fn display_relative(root: &Path, directory: &Path) -> String {
    match directory.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.display().to_string(),
        Err(_) => directory.display().to_string(),
    }
}

pub(super) fn format_report(root: &Path, report: &Report) -> String {
    if report.is_empty() {
        return format!("No marked job directories under {}\n", root.display());
    }

    let mut output = String::new();
    for (directory, status) in &report.jobs {
        let symbol = if status.complete { CHECK } else { CROSS };
        output.push_str(&format!(
            "{symbol} {:<4}  {}\n",
            status.kind.as_str(),
            display_relative(root, directory)
        ));
    }
    for (directory, reason) in &report.anomalies {
        output.push_str(&format!(
            "{NOTICE} {}: {reason}\n",
            display_relative(root, directory)
        ));
    }

    output.push('\n');
    output.push_str(&format!(
        "{} job(s): {} complete, {} incomplete",
        report.len(),
        report.complete_count(),
        report.incomplete_count()
    ));
    if !report.anomalies.is_empty() {
        output.push_str(&format!(", {} unclassified", report.anomalies.len()));
    }
    output.push('\n');
    for (kind, (complete, incomplete)) in report.tally() {
        output.push_str(&format!(
            "  {:<4}  {complete} complete, {incomplete} incomplete\n",
            kind.as_str()
        ));
    }
    output
}

pub(super) fn format_tether(staging: &Path, scripts: &[StagedScript]) -> String {
    let jobs: usize = scripts.iter().map(|s| s.directories.len()).sum();
    let mut output = format!(
        "{CHECK} staged {jobs} job(s) into {} script(s) under {}\n",
        scripts.len(),
        staging.display()
    );
    for script in scripts {
        output.push_str(&format!(
            "  {}  ({} job(s))\n",
            display_relative(staging, &script.script),
            script.directories.len()
        ));
    }
    output
}

pub(super) fn format_queue_table(jobs: &[QueuedJob]) -> String {
    if jobs.is_empty() {
        return "Submit queue is empty\n".to_string();
    }
    let rows: Vec<Vec<String>> = jobs
        .iter()
        .map(|job| {
            vec![
                format!("{}", job.priority),
                job.script_name.clone(),
                job.directory.display().to_string(),
            ]
        })
        .collect();
    format_table(&["priority", "script", "directory"], &rows)
}

pub(super) fn format_slurm_table(user: &str, jobs: &[SlurmJob]) -> String {
    if jobs.is_empty() {
        return format!("No jobs in the queue for {user}\n");
    }
    let rows: Vec<Vec<String>> = jobs
        .iter()
        .map(|job| {
            vec![
                job.job_id.clone(),
                job.partition.clone(),
                job.name.clone(),
                job.state.clone(),
                job.time.clone(),
                job.nodes.clone(),
                job.nodelist.clone(),
            ]
        })
        .collect();
    format_table(
        &["jobid", "partition", "name", "state", "time", "nodes", "nodelist"],
        &rows,
    )
}

fn str_width(value: &str) -> usize {
    value.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::kinds::JobKind;
    use crate::app::services::report::JobStatus;
    use std::path::PathBuf;

    #[test]
    fn table_pads_all_but_last_column() {
        let table = format_table(
            &["id", "name"],
            &[
                vec!["1".into(), "relax".into()],
                vec!["1024".into(), "xanes".into()],
            ],
        );
        assert_eq!(table, "id    name\n1     relax\n1024  xanes\n");
    }

    #[test]
    fn report_lists_jobs_relative_to_root_with_summary() {
        let root = PathBuf::from("/scratch/runs");
        let mut report = Report::default();
        report.jobs.insert(
            root.join("mp-1/VASP"),
            JobStatus {
                kind: JobKind::Vasp,
                complete: true,
            },
        );
        report.jobs.insert(
            root.join("mp-1/FEFF"),
            JobStatus {
                kind: JobKind::Feff,
                complete: false,
            },
        );
        report
            .anomalies
            .insert(root.join("junk"), "does not match any known job kind".into());

        let text = format_report(&root, &report);
        assert!(text.contains("✓ VASP  mp-1/VASP\n"));
        assert!(text.contains("✗ FEFF  mp-1/FEFF\n"));
        assert!(text.contains("! junk: does not match any known job kind\n"));
        assert!(text.contains("2 job(s): 1 complete, 1 incomplete, 1 unclassified\n"));
    }

    #[test]
    fn empty_report_says_so() {
        let text = format_report(Path::new("/runs"), &Report::default());
        assert_eq!(text, "No marked job directories under /runs\n");
    }

    #[test]
    fn empty_queue_table() {
        assert_eq!(format_queue_table(&[]), "Submit queue is empty\n");
    }
}
