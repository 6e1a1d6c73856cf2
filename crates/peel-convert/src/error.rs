use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// A rejected option value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value \"{value}\" for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Walk(#[from] peel_archive::Error),

    #[error("I/O error at '{path}': {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to build record batch: {0}")]
    Schema(#[from] ArrowError),

    #[error("failed to write parquet: {0}")]
    Parquet(#[from] ParquetError),

    #[error("leaf path '{path}' escapes the extraction directory")]
    UnsafePath { path: String },

    /// A leaf landed where an earlier leaf already made a file or a
    /// directory, e.g. a member `x` followed by a member `x/y`.
    #[error("leaf output '{path}' conflicts with an earlier leaf: {source}")]
    PathConflict { path: PathBuf, source: io::Error },

    #[error("failed to start walker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Failures caused by one input's bytes rather than by the output side.
    /// These are the errors [`ErrorPolicy::Skip`](crate::ErrorPolicy::Skip)
    /// steps over.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Walk(_) | Self::UnsafePath { .. } | Self::PathConflict { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors() {
        let conflict = Error::PathConflict {
            path: "out/x".into(),
            source: io::Error::from(io::ErrorKind::AlreadyExists),
        };
        assert!(conflict.is_input_error());
        assert!(Error::UnsafePath { path: "../x".into() }.is_input_error());
        assert!(!Error::io("out", io::Error::other("disk full")).is_input_error());
    }
}
