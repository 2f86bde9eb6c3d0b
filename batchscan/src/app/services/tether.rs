// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

//! Packs many small jobs into a few scheduler scripts.
//!
//! Each staged script changes into its directories one by one and launches
//! the executable line in the background, then waits for all of them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::Context;
use thiserror::Error;
use tracing::{debug, info};

use crate::app::services::search::{SearchError, find_marked_directories};
use crate::app::services::slurm::sh_escape;

const SCRIPT_TEMPLATE: &str = "{{ header }}\n\n{% for directory in directories %}cd {{ directory }}\n{{ executable }}\n{% endfor %}\nwait\nexit\n";

#[derive(Debug, Error)]
pub enum TetherError {
    #[error("executable line {0:?} must contain '&' so staged jobs run in parallel")]
    MissingBackgroundOperator(String),
    #[error("calculations per staged job must be greater than zero")]
    InvalidChunkSize,
    #[error("no directories containing {marker} under {}", .root.display())]
    NoDirectories { root: PathBuf, marker: String },
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("failed to render staged script: {0}")]
    Template(#[from] tera::Error),
    #[error("staging directory {} already exists", .0.display())]
    StagingExists(PathBuf),
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct TetherSettings {
    pub root: PathBuf,
    pub marker: String,
    pub staging: PathBuf,
    pub per_job: usize,
    pub header: PathBuf,
    pub executable: String,
    pub script_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedScript {
    pub script: PathBuf,
    pub directories: Vec<PathBuf>,
}

#[derive(Serialize)]
struct ScriptValues<'a> {
    header: &'a str,
    executable: &'a str,
    directories: Vec<String>,
}

/// Digits needed to label `count` staged scripts.
pub fn index_width(count: usize) -> usize {
    count.max(1).ilog10() as usize + 1
}

pub fn render_script(
    header: &str,
    directories: &[PathBuf],
    executable: &str,
) -> Result<String, TetherError> {
    let values = ScriptValues {
        header: header.trim_end_matches(['\n', '\r']),
        executable,
        directories: directories
            .iter()
            .map(|dir| sh_escape(&dir.to_string_lossy()))
            .collect(),
    };
    let context = Context::from_serialize(values)?;
    Ok(tera::Tera::one_off(SCRIPT_TEMPLATE, &context, false)?)
}

/// Validates everything, renders all scripts, then writes them.
///
/// Nothing is written when any check fails, including an existing index
/// directory under the staging root.
pub fn write_tether(settings: &TetherSettings) -> Result<Vec<StagedScript>, TetherError> {
    if !settings.executable.contains('&') {
        return Err(TetherError::MissingBackgroundOperator(
            settings.executable.clone(),
        ));
    }
    if settings.per_job == 0 {
        return Err(TetherError::InvalidChunkSize);
    }
    let header = fs::read_to_string(&settings.header).map_err(|source| TetherError::Io {
        path: settings.header.clone(),
        source,
    })?;
    let root = std::path::absolute(&settings.root).map_err(|source| TetherError::Io {
        path: settings.root.clone(),
        source,
    })?;

    info!(
        root = %root.display(),
        marker = %settings.marker,
        per_job = settings.per_job,
        "tethering jobs"
    );
    let directories = find_marked_directories(&root, &settings.marker)?;
    if directories.is_empty() {
        return Err(TetherError::NoDirectories {
            root,
            marker: settings.marker.clone(),
        });
    }

    let chunks: Vec<&[PathBuf]> = directories.chunks(settings.per_job).collect();
    let width = index_width(chunks.len());
    let mut planned = Vec::with_capacity(chunks.len());
    for (index, chunk) in chunks.into_iter().enumerate() {
        let index_dir = settings.staging.join(format!("{index:0width$}"));
        if index_dir.exists() {
            return Err(TetherError::StagingExists(index_dir));
        }
        let body = render_script(&header, chunk, &settings.executable)?;
        planned.push((index_dir, body, chunk.to_vec()));
    }

    info!(
        scripts = planned.len(),
        staging = %settings.staging.display(),
        "writing staged scripts"
    );
    let mut staged = Vec::with_capacity(planned.len());
    for (index_dir, body, directories) in planned {
        fs::create_dir_all(&index_dir).map_err(|source| TetherError::Io {
            path: index_dir.clone(),
            source,
        })?;
        let script = index_dir.join(&settings.script_name);
        fs::write(&script, body).map_err(|source| TetherError::Io {
            path: script.clone(),
            source,
        })?;
        debug!(script = %script.display(), jobs = directories.len(), "staged script written");
        staged.push(StagedScript {
            script,
            directories,
        });
    }
    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture(count: usize) -> (TempDir, TetherSettings) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("jobs");
        for n in 0..count {
            let dir = root.join(format!("mp-{n:02}"));
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("submit.sbatch"), b"").unwrap();
        }
        let header = tmp.path().join("header.txt");
        fs::write(&header, "#!/bin/bash\n#SBATCH -N 1\n").unwrap();
        let settings = TetherSettings {
            root,
            marker: "submit.sbatch".into(),
            staging: tmp.path().join("staging"),
            per_job: 4,
            header,
            executable: "mpirun -np 4 vasp_std > job.out &".into(),
            script_name: "submit.sbatch".into(),
        };
        (tmp, settings)
    }

    #[test]
    fn index_width_follows_magnitude() {
        assert_eq!(index_width(1), 1);
        assert_eq!(index_width(9), 1);
        assert_eq!(index_width(10), 2);
        assert_eq!(index_width(100), 3);
    }

    #[test]
    fn render_script_layout() {
        let body = render_script(
            "#!/bin/bash\n#SBATCH -N 1\n",
            &[PathBuf::from("/jobs/a"), PathBuf::from("/jobs/b")],
            "run &",
        )
        .unwrap();
        assert_eq!(
            body,
            "#!/bin/bash\n#SBATCH -N 1\n\ncd '/jobs/a'\nrun &\ncd '/jobs/b'\nrun &\n\nwait\nexit\n"
        );
    }

    #[test]
    fn chunks_directories_into_padded_indices() {
        let (tmp, mut settings) = fixture(11);
        settings.per_job = 1;
        let staged = write_tether(&settings).unwrap();
        assert_eq!(staged.len(), 11);
        assert!(tmp.path().join("staging/00/submit.sbatch").is_file());
        assert!(tmp.path().join("staging/10/submit.sbatch").is_file());
    }

    #[test]
    fn last_chunk_holds_the_remainder() {
        let (_tmp, settings) = fixture(10);
        let staged = write_tether(&settings).unwrap();
        let sizes: Vec<_> = staged.iter().map(|s| s.directories.len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        let body = fs::read_to_string(&staged[2].script).unwrap();
        assert_eq!(body.matches("vasp_std").count(), 2);
        assert!(body.ends_with("\nwait\nexit\n"));
    }

    #[test]
    fn executable_without_ampersand_writes_nothing() {
        let (tmp, mut settings) = fixture(3);
        settings.executable = "mpirun vasp_std".into();
        assert!(matches!(
            write_tether(&settings),
            Err(TetherError::MissingBackgroundOperator(_))
        ));
        assert!(!tmp.path().join("staging").exists());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let (_tmp, mut settings) = fixture(3);
        settings.per_job = 0;
        assert!(matches!(
            write_tether(&settings),
            Err(TetherError::InvalidChunkSize)
        ));
    }

    #[test]
    fn existing_index_directory_is_not_overwritten() {
        let (tmp, settings) = fixture(5);
        fs::create_dir_all(tmp.path().join("staging/1")).unwrap();
        match write_tether(&settings).unwrap_err() {
            TetherError::StagingExists(path) => assert!(path.ends_with("staging/1")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!tmp.path().join("staging/0").exists());
    }

    #[test]
    fn empty_tree_is_an_error() {
        let (_tmp, settings) = fixture(0);
        fs::create_dir_all(&settings.root).unwrap();
        assert!(matches!(
            write_tether(&settings),
            Err(TetherError::NoDirectories { .. })
        ));
    }
}
