// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::app::ports::FilesystemPort;
use crate::app::services::kinds::{JobKind, KindTable};

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("{} matches more than one job kind ({})", .directory.display(), join_kinds(.kinds))]
    Ambiguous {
        directory: PathBuf,
        kinds: Vec<JobKind>,
    },
    #[error("{} does not match any known job kind", .directory.display())]
    Unclassifiable { directory: PathBuf },
    #[error("failed to list {}: {source}", .directory.display())]
    Io {
        directory: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ClassifyError {
    pub fn directory(&self) -> &Path {
        match self {
            ClassifyError::Ambiguous { directory, .. }
            | ClassifyError::Unclassifiable { directory }
            | ClassifyError::Io { directory, .. } => directory,
        }
    }
}

fn join_kinds(kinds: &[JobKind]) -> String {
    kinds
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Kinds whose fingerprint is fully contained in `names`.
///
/// An empty fingerprint never matches.
pub fn matching_kinds(names: &BTreeSet<String>, kinds: &KindTable) -> Vec<JobKind> {
    kinds
        .iter()
        .filter(|(_, spec)| !spec.inputs.is_empty() && spec.inputs.is_subset(names))
        .map(|(kind, _)| kind)
        .collect()
}

pub struct Classifier<'a> {
    fs: &'a dyn FilesystemPort,
    kinds: &'a KindTable,
}

impl<'a> Classifier<'a> {
    pub fn new(fs: &'a dyn FilesystemPort, kinds: &'a KindTable) -> Self {
        Self { fs, kinds }
    }

    pub fn classify(&self, directory: &Path) -> Result<JobKind, ClassifyError> {
        let names = self
            .fs
            .list_names(directory)
            .map_err(|source| ClassifyError::Io {
                directory: directory.to_path_buf(),
                source,
            })?;
        let matched = matching_kinds(&names, self.kinds);
        match matched.as_slice() {
            [kind] => {
                debug!(directory = %directory.display(), kind = %kind, "classified");
                Ok(*kind)
            }
            [] => Err(ClassifyError::Unclassifiable {
                directory: directory.to_path_buf(),
            }),
            _ => Err(ClassifyError::Ambiguous {
                directory: directory.to_path_buf(),
                kinds: matched,
            }),
        }
    }
}
