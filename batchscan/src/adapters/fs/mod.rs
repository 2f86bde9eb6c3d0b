// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::collections::BTreeSet;
use std::fs::File;
use std::io;
use std::path::Path;

use crate::app::ports::FilesystemPort;
use crate::app::services::tail::tail_lines;

pub struct StdFilesystem;

fn absent_as_none<T>(result: io::Result<T>) -> io::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

impl FilesystemPort for StdFilesystem {
    fn list_names(&self, directory: &Path) -> io::Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for entry in std::fs::read_dir(directory)? {
            let entry = entry?;
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn file_len(&self, path: &Path) -> io::Result<Option<u64>> {
        let Some(metadata) = absent_as_none(std::fs::metadata(path))? else {
            return Ok(None);
        };
        Ok(metadata.is_file().then(|| metadata.len()))
    }

    fn read_tail(&self, path: &Path, lines: usize) -> io::Result<Option<Vec<String>>> {
        let Some(mut file) = absent_as_none(File::open(path))? else {
            return Ok(None);
        };
        if !file.metadata()?.is_file() {
            return Ok(None);
        }
        tail_lines(&mut file, lines).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn lists_entry_names() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("INCAR"), b"").unwrap();
        fs::create_dir(dir.path().join("relax")).unwrap();
        let names = StdFilesystem.list_names(dir.path()).unwrap();
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["INCAR".to_string(), "relax".to_string()]
        );
    }

    #[test]
    fn missing_files_are_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("OUTCAR");
        assert_eq!(StdFilesystem.file_len(&path).unwrap(), None);
        assert_eq!(StdFilesystem.read_tail(&path, 10).unwrap(), None);
    }

    #[test]
    fn directories_are_not_files() {
        let dir = TempDir::new().unwrap();
        assert_eq!(StdFilesystem.file_len(dir.path()).unwrap(), None);
    }

    #[test]
    fn reads_tail_and_length() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log");
        fs::write(&path, "a\nb\nc\n").unwrap();
        assert_eq!(StdFilesystem.file_len(&path).unwrap(), Some(6));
        assert_eq!(
            StdFilesystem.read_tail(&path, 2).unwrap(),
            Some(vec!["b".to_string(), "c".to_string()])
        );
    }
}
