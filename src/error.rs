//! Error types for classpath indexing.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Path {} doesn't exist", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("Failed to walk directory {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        source: ignore::Error,
    },

    #[error("Error compiling resource ignore pattern `{pattern}`: {source}")]
    Configuration {
        pattern: String,
        source: regex::Error,
    },
}

impl IndexError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn archive(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.into(),
            source,
        }
    }
}

/// Result type for indexing operations
pub type IndexResult<T> = Result<T, IndexError>;
