//! Error types for the import workflow

use std::path::PathBuf;
use thiserror::Error;

/// Error kinds that can occur while importing a library
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportErrorKind {
    /// Permission denied when accessing a file or directory
    PermissionDenied,
    /// File or directory not found
    NotFound,
    /// I/O error during file operations
    Io,
    /// Database operation failed
    Database,
    /// Hash computation failed
    Hash,
    /// Invalid path encoding
    InvalidPath,
    /// Unknown error
    Unknown,
}

/// Represents an error raised by the scanner or the record store
#[derive(Debug, Error)]
#[error("{kind:?}: {message} (path: {path:?})")]
pub struct ImportError {
    /// The kind of error
    pub kind: ImportErrorKind,
    /// The path where the error occurred
    pub path: Option<PathBuf>,
    /// Human-readable error message
    pub message: String,
}

impl ImportError {
    /// Create a new import error
    pub fn new(kind: ImportErrorKind, path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(path: PathBuf) -> Self {
        Self::new(
            ImportErrorKind::PermissionDenied,
            Some(path.clone()),
            format!("Permission denied: {:?}", path),
        )
    }

    /// Create a not found error
    pub fn not_found(path: PathBuf) -> Self {
        Self::new(
            ImportErrorKind::NotFound,
            Some(path.clone()),
            format!("Not found: {:?}", path),
        )
    }

    /// Create an I/O error
    pub fn io(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(ImportErrorKind::Io, path, message)
    }

    /// Create a database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ImportErrorKind::Database, None, message)
    }

    /// Create a hash computation error
    pub fn hash(path: PathBuf, message: impl Into<String>) -> Self {
        Self::new(ImportErrorKind::Hash, Some(path), message)
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::PermissionDenied => ImportErrorKind::PermissionDenied,
            std::io::ErrorKind::NotFound => ImportErrorKind::NotFound,
            _ => ImportErrorKind::Io,
        };
        Self::new(kind, None, err.to_string())
    }
}

impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        Self::database(err.to_string())
    }
}
