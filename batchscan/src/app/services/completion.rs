// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::app::ports::FilesystemPort;
use crate::app::services::kinds::{CompletionRule, JobKind, KindTable};

pub const DEFAULT_TAIL_LINES: usize = 100;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("no completion protocol configured for {kind}")]
    NoProtocol { kind: JobKind },
    #[error(
        "completion marker {marker:?} appears {count} times in the last lines of {}",
        .path.display()
    )]
    DuplicateMarker {
        path: PathBuf,
        marker: String,
        count: usize,
    },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Number of occurrences of `marker` across `lines`.
pub fn count_marker(lines: &[String], marker: &str) -> usize {
    if marker.is_empty() {
        return 0;
    }
    lines.iter().map(|line| line.matches(marker).count()).sum()
}

/// Applies a kind's completion protocol to a classified directory.
///
/// `Ok(false)` means "not confirmed complete"; errors are reserved for
/// unreadable files and integrity violations.
pub struct CompletionChecker<'a> {
    fs: &'a dyn FilesystemPort,
    kinds: &'a KindTable,
    tail_lines: usize,
}

impl<'a> CompletionChecker<'a> {
    pub fn new(fs: &'a dyn FilesystemPort, kinds: &'a KindTable, tail_lines: usize) -> Self {
        Self {
            fs,
            kinds,
            tail_lines,
        }
    }

    pub fn check_status(&self, directory: &Path, kind: JobKind) -> Result<bool, CompletionError> {
        let spec = self
            .kinds
            .spec(kind)
            .ok_or(CompletionError::NoProtocol { kind })?;
        for rule in &spec.checks {
            if !self.check_rule(directory, rule)? {
                debug!(
                    directory = %directory.display(),
                    file = %rule.file,
                    "completion rule not satisfied"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn check_rule(&self, directory: &Path, rule: &CompletionRule) -> Result<bool, CompletionError> {
        let path = directory.join(&rule.file);
        let Some(marker) = rule.marker.as_deref() else {
            let len = self.fs.file_len(&path).map_err(|source| CompletionError::Io {
                path: path.clone(),
                source,
            })?;
            return Ok(matches!(len, Some(len) if len > 0));
        };

        let lines = self
            .fs
            .read_tail(&path, self.tail_lines)
            .map_err(|source| CompletionError::Io {
                path: path.clone(),
                source,
            })?;
        let Some(lines) = lines else {
            return Ok(false);
        };
        let count = count_marker(&lines, marker);
        if rule.unique && count > 1 {
            return Err(CompletionError::DuplicateMarker {
                path,
                marker: marker.to_string(),
                count,
            });
        }
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fs::StdFilesystem;
    use crate::app::services::kinds::{KindSpec, VASP_TIMING_BANNER};
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    const FEFF_BANNER: &str = "feff ends at";

    fn vasp_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in ["INCAR", "KPOINTS", "POSCAR", "POTCAR"] {
            fs::write(dir.path().join(name), b"input\n").unwrap();
        }
        dir
    }

    fn outcar_with_banner_at(lines_from_end: usize) -> String {
        let mut out = String::new();
        for n in 0..400 {
            out.push_str(&format!("   {n}        1.558   3.465   0.000   0.000   5.023\n"));
        }
        out.push_str(&format!(" {VASP_TIMING_BANNER}\n"));
        out.push_str(" ========================================================\n");
        for n in 0..lines_from_end.saturating_sub(2) {
            out.push_str(&format!("   Elapsed time (sec):     {n}.002\n"));
        }
        out
    }

    fn feff_table() -> KindTable {
        KindTable::default().with_kind(
            JobKind::Feff,
            KindSpec::new(
                ["feff.inp"],
                vec![
                    CompletionRule::non_empty("xmu.dat"),
                    CompletionRule::contains_once("log.dat", FEFF_BANNER),
                ],
            ),
        )
    }

    #[test]
    fn outcar_with_timing_banner_is_complete() {
        let dir = vasp_dir();
        fs::write(dir.path().join("OUTCAR"), outcar_with_banner_at(20)).unwrap();
        let kinds = KindTable::default();
        let checker = CompletionChecker::new(&StdFilesystem, &kinds, 50);
        assert!(checker.check_status(dir.path(), JobKind::Vasp).unwrap());
    }

    #[test]
    fn outcar_without_banner_is_incomplete() {
        let dir = vasp_dir();
        let mut outcar = outcar_with_banner_at(20);
        outcar = outcar.replace(VASP_TIMING_BANNER, "Iteration 12( 30)");
        fs::write(dir.path().join("OUTCAR"), outcar).unwrap();
        let kinds = KindTable::default();
        let checker = CompletionChecker::new(&StdFilesystem, &kinds, 50);
        assert!(!checker.check_status(dir.path(), JobKind::Vasp).unwrap());
    }

    #[test]
    fn banner_outside_window_is_incomplete() {
        let dir = vasp_dir();
        fs::write(dir.path().join("OUTCAR"), outcar_with_banner_at(120)).unwrap();
        let kinds = KindTable::default();
        let checker = CompletionChecker::new(&StdFilesystem, &kinds, 100);
        assert!(!checker.check_status(dir.path(), JobKind::Vasp).unwrap());
    }

    #[test]
    fn marker_with_trailing_timestamp_matches() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("xmu.dat"), b"# omega e k mu\n").unwrap();
        fs::write(
            dir.path().join("log.dat"),
            format!("running\n{FEFF_BANNER} 2024-03-11 12:04:55\n"),
        )
        .unwrap();
        let kinds = feff_table();
        let checker = CompletionChecker::new(&StdFilesystem, &kinds, DEFAULT_TAIL_LINES);
        assert!(checker.check_status(dir.path(), JobKind::Feff).unwrap());
    }

    #[test]
    fn missing_outcar_is_incomplete_not_error() {
        let dir = vasp_dir();
        let kinds = KindTable::default();
        let checker = CompletionChecker::new(&StdFilesystem, &kinds, DEFAULT_TAIL_LINES);
        assert!(!checker.check_status(dir.path(), JobKind::Vasp).unwrap());
    }

    #[test]
    fn missing_xmu_is_incomplete() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("feff.inp"), b"TITLE test\n").unwrap();
        let kinds = KindTable::default();
        let checker = CompletionChecker::new(&StdFilesystem, &kinds, DEFAULT_TAIL_LINES);
        assert!(!checker.check_status(dir.path(), JobKind::Feff).unwrap());
    }

    #[test]
    fn empty_xmu_is_incomplete() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("feff.inp"), b"TITLE test\n").unwrap();
        fs::write(dir.path().join("xmu.dat"), b"").unwrap();
        let kinds = KindTable::default();
        let checker = CompletionChecker::new(&StdFilesystem, &kinds, DEFAULT_TAIL_LINES);
        assert!(!checker.check_status(dir.path(), JobKind::Feff).unwrap());
    }

    #[test]
    fn existence_rule_does_not_end_the_protocol() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("xmu.dat"), b"data\n").unwrap();
        let kinds = feff_table();
        let checker = CompletionChecker::new(&StdFilesystem, &kinds, DEFAULT_TAIL_LINES);
        // xmu.dat passes, but log.dat is still missing.
        assert!(!checker.check_status(dir.path(), JobKind::Feff).unwrap());
    }

    #[test]
    fn duplicate_unique_marker_is_surfaced() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("xmu.dat"), b"data\n").unwrap();
        fs::write(
            dir.path().join("log.dat"),
            format!("{FEFF_BANNER} 10:00\nrestart\n{FEFF_BANNER} 11:00\n"),
        )
        .unwrap();
        let kinds = feff_table();
        let checker = CompletionChecker::new(&StdFilesystem, &kinds, DEFAULT_TAIL_LINES);
        match checker.check_status(dir.path(), JobKind::Feff).unwrap_err() {
            CompletionError::DuplicateMarker { marker, count, .. } => {
                assert_eq!(marker, FEFF_BANNER);
                assert_eq!(count, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn repeated_checks_agree() {
        let dir = vasp_dir();
        fs::write(dir.path().join("OUTCAR"), outcar_with_banner_at(30)).unwrap();
        let kinds = KindTable::default();
        let checker = CompletionChecker::new(&StdFilesystem, &kinds, DEFAULT_TAIL_LINES);
        let first = checker.check_status(dir.path(), JobKind::Vasp).unwrap();
        let second = checker.check_status(dir.path(), JobKind::Vasp).unwrap();
        assert_eq!(first, second);
        assert!(first);
    }

    #[test]
    fn unconfigured_kind_has_no_protocol() {
        let kinds = KindTable::new(Default::default()).with_kind(
            JobKind::Vasp,
            KindSpec::new(["INCAR"], vec![CompletionRule::non_empty("OUTCAR")]),
        );
        let dir = TempDir::new().unwrap();
        let checker = CompletionChecker::new(&StdFilesystem, &kinds, DEFAULT_TAIL_LINES);
        assert!(matches!(
            checker.check_status(dir.path(), JobKind::Feff).unwrap_err(),
            CompletionError::NoProtocol { kind: JobKind::Feff }
        ));
    }

    struct DeniedFilesystem;

    impl FilesystemPort for DeniedFilesystem {
        fn list_names(&self, _directory: &Path) -> io::Result<BTreeSet<String>> {
            Ok(BTreeSet::new())
        }

        fn file_len(&self, _path: &Path) -> io::Result<Option<u64>> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        }

        fn read_tail(&self, _path: &Path, _lines: usize) -> io::Result<Option<Vec<String>>> {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        }
    }

    #[test]
    fn unreadable_output_propagates_io_error() {
        let kinds = KindTable::default();
        let checker = CompletionChecker::new(&DeniedFilesystem, &kinds, DEFAULT_TAIL_LINES);
        let err = checker
            .check_status(Path::new("/jobs/mp-390/VASP"), JobKind::Vasp)
            .unwrap_err();
        match err {
            CompletionError::Io { path, source } => {
                assert_eq!(path, Path::new("/jobs/mp-390/VASP/OUTCAR"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
