// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

use std::fmt;

use crate::app::services::classify::ClassifyError;
use crate::app::services::completion::CompletionError;
use crate::app::services::persist::PersistError;
use crate::app::services::queue::QueueError;
use crate::app::services::report::ScanError;
use crate::app::services::search::SearchError;
use crate::app::services::slurm::SlurmError;
use crate::app::services::tether::TetherError;

pub const EXIT_CODE_OTHER: i32 = 1;
pub const EXIT_CODE_USAGE: i32 = 2;
pub const EXIT_CODE_CLASSIFICATION: i32 = 3;
pub const EXIT_CODE_INTEGRITY: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    InvalidArgument,
    Classification,
    Integrity,
    Io,
    Scheduler,
    LocalError,
    InternalError,
}

impl ErrorType {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorType::InvalidArgument => "INVALID_ARGUMENT",
            ErrorType::Classification => "CLASSIFICATION_ERROR",
            ErrorType::Integrity => "INTEGRITY_ERROR",
            ErrorType::Io => "IO_ERROR",
            ErrorType::Scheduler => "SCHEDULER_ERROR",
            ErrorType::LocalError => "LOCAL_ERROR",
            ErrorType::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn default_exit_code(self) -> i32 {
        match self {
            ErrorType::InvalidArgument => EXIT_CODE_USAGE,
            ErrorType::Classification => EXIT_CODE_CLASSIFICATION,
            ErrorType::Integrity | ErrorType::Io => EXIT_CODE_INTEGRITY,
            _ => EXIT_CODE_OTHER,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppError {
    pub kind: ErrorType,
    pub message: String,
    pub exit_code: i32,
}

impl AppError {
    pub fn new(kind: ErrorType, message: impl Into<String>) -> Self {
        let message = message.into();
        let exit_code = kind.default_exit_code();
        Self {
            kind,
            message,
            exit_code,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorType::InvalidArgument, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorType::Io, message)
    }

    pub fn scheduler(message: impl Into<String>) -> Self {
        Self::new(ErrorType::Scheduler, message)
    }

    pub fn local_error(message: impl Into<String>) -> Self {
        Self::new(ErrorType::LocalError, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorType::InternalError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::NotADirectory { .. } => AppError::invalid_argument(err.to_string()),
            SearchError::Walk { .. } => AppError::io(err.to_string()),
        }
    }
}

impl From<ClassifyError> for AppError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::Io { .. } => AppError::io(err.to_string()),
            _ => AppError::new(ErrorType::Classification, err.to_string()),
        }
    }
}

impl From<CompletionError> for AppError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::DuplicateMarker { .. } => {
                AppError::new(ErrorType::Integrity, err.to_string())
            }
            CompletionError::Io { .. } => AppError::io(err.to_string()),
            CompletionError::NoProtocol { .. } => AppError::local_error(err.to_string()),
        }
    }
}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Search(err) => err.into(),
            ScanError::Classify(err) => err.into(),
            ScanError::Completion(err) => err.into(),
            ScanError::Worker { .. } => AppError::internal_error(err.to_string()),
        }
    }
}

impl From<PersistError> for AppError {
    fn from(err: PersistError) -> Self {
        match err {
            PersistError::Io { .. } => AppError::io(err.to_string()),
            PersistError::Json { .. } => AppError::local_error(err.to_string()),
        }
    }
}

impl From<QueueError> for AppError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Persist(err) => err.into(),
            _ => AppError::invalid_argument(err.to_string()),
        }
    }
}

impl From<TetherError> for AppError {
    fn from(err: TetherError) -> Self {
        match err {
            TetherError::Search(err) => err.into(),
            TetherError::Io { .. } => AppError::io(err.to_string()),
            TetherError::Template(_) => AppError::local_error(err.to_string()),
            _ => AppError::invalid_argument(err.to_string()),
        }
    }
}

impl From<SlurmError> for AppError {
    fn from(err: SlurmError) -> Self {
        AppError::scheduler(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::kinds::JobKind;
    use std::path::PathBuf;

    #[test]
    fn classification_errors_exit_with_three() {
        let err: AppError = ScanError::Classify(ClassifyError::Ambiguous {
            directory: PathBuf::from("/jobs/x"),
            kinds: vec![JobKind::Feff, JobKind::Vasp],
        })
        .into();
        assert_eq!(err.kind, ErrorType::Classification);
        assert_eq!(err.exit_code, EXIT_CODE_CLASSIFICATION);
    }

    #[test]
    fn duplicate_marker_is_an_integrity_error() {
        let err: AppError = ScanError::Completion(CompletionError::DuplicateMarker {
            path: PathBuf::from("/jobs/x/OUTCAR"),
            marker: "done".into(),
            count: 2,
        })
        .into();
        assert_eq!(err.kind, ErrorType::Integrity);
        assert_eq!(err.exit_code, EXIT_CODE_INTEGRITY);
        assert!(err.message.contains("appears 2 times"));
    }

    #[test]
    fn tether_argument_errors_are_usage_errors() {
        let err: AppError = TetherError::InvalidChunkSize.into();
        assert_eq!(err.exit_code, EXIT_CODE_USAGE);
    }
}
