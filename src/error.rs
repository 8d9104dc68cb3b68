use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or producing election data files.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {message}", path.display())]
    Json { path: PathBuf, message: String },

    #[error("invalid GeoJSON in {}: {message}", path.display())]
    GeoJson { path: PathBuf, message: String },

    #[error("{}: missing column `{column}`", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("{}:{line}: cannot parse `{value}` in column `{column}`", path.display())]
    BadCell {
        path: PathBuf,
        line: usize,
        column: String,
        value: String,
    },

    #[error("unknown state `{0}`")]
    UnknownState(String),
}

impl DataError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DataError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        DataError::Json {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
