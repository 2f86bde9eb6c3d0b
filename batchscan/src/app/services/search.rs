// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search root {} is not a directory", .root.display())]
    NotADirectory { root: PathBuf },
    #[error("failed to walk {}: {source}", .root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Lazily yields every directory under `root` that directly contains an
/// entry named `marker`. Symlinked directories are not followed.
pub fn marked_directories<'a>(
    root: &'a Path,
    marker: &'a str,
) -> impl Iterator<Item = Result<PathBuf, SearchError>> + 'a {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    return Some(Err(SearchError::Walk {
                        root: root.to_path_buf(),
                        source,
                    }));
                }
            };
            if entry.file_type().is_dir() || entry.file_name() != marker {
                return None;
            }
            entry.path().parent().map(|parent| Ok(parent.to_path_buf()))
        })
}

/// Sorted, de-duplicated list of directories containing `marker`.
pub fn find_marked_directories(root: &Path, marker: &str) -> Result<Vec<PathBuf>, SearchError> {
    if !root.is_dir() {
        return Err(SearchError::NotADirectory {
            root: root.to_path_buf(),
        });
    }
    let mut directories = marked_directories(root, marker).collect::<Result<Vec<_>, _>>()?;
    directories.sort();
    directories.dedup();
    Ok(directories)
}
