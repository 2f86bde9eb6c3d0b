// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Printed by VASP at the very end of OUTCAR once the run has finished.
pub const VASP_TIMING_BANNER: &str = "General timing and accounting informations for this job:";

/// The kinds of computation a job directory can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JobKind {
    /// Plane-wave DFT (VASP).
    #[serde(rename = "VASP")]
    Vasp,
    /// X-ray absorption (FEFF).
    #[serde(rename = "FEFF")]
    Feff,
}

impl JobKind {
    pub const ALL: [JobKind; 2] = [JobKind::Vasp, JobKind::Feff];

    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::Vasp => "VASP",
            JobKind::Feff => "FEFF",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a completion protocol.
///
/// Without a marker the rule only requires `file` to exist and be non-empty.
/// With a marker, the trailing window of `file` must contain it; `unique`
/// additionally rejects a window holding the marker more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRule {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,
}

impl CompletionRule {
    pub fn non_empty(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            marker: None,
            unique: false,
        }
    }

    pub fn contains(file: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            marker: Some(marker.into()),
            unique: false,
        }
    }

    pub fn contains_once(file: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            marker: Some(marker.into()),
            unique: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindSpec {
    /// Input files that must all be present (the fingerprint).
    pub inputs: BTreeSet<String>,
    /// Ordered completion protocol.
    pub checks: Vec<CompletionRule>,
}

impl KindSpec {
    pub fn new<I, S>(inputs: I, checks: Vec<CompletionRule>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            checks,
        }
    }
}

/// Fingerprints and completion protocols for every known job kind.
///
/// Shared read-only by the classifier and the completion checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindTable {
    kinds: BTreeMap<JobKind, KindSpec>,
}

impl KindTable {
    pub fn new(kinds: BTreeMap<JobKind, KindSpec>) -> Self {
        Self { kinds }
    }

    pub fn with_kind(mut self, kind: JobKind, spec: KindSpec) -> Self {
        self.kinds.insert(kind, spec);
        self
    }

    pub fn spec(&self, kind: JobKind) -> Option<&KindSpec> {
        self.kinds.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (JobKind, &KindSpec)> {
        self.kinds.iter().map(|(kind, spec)| (*kind, spec))
    }
}

impl Default for KindTable {
    fn default() -> Self {
        let mut kinds = BTreeMap::new();
        kinds.insert(
            JobKind::Vasp,
            KindSpec::new(
                ["INCAR", "KPOINTS", "POSCAR", "POTCAR"],
                vec![CompletionRule::contains("OUTCAR", VASP_TIMING_BANNER)],
            ),
        );
        kinds.insert(
            JobKind::Feff,
            KindSpec::new(["feff.inp"], vec![CompletionRule::non_empty("xmu.dat")]),
        );
        Self { kinds }
    }
}
