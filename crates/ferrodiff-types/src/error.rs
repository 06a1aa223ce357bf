//! Error types and handling for ferrodiff
//!
//! Errors fall into two groups. Configuration-level errors (bad arguments,
//! missing roots) abort an operation before any work starts. Per-file errors
//! (an unreadable file while hashing, a failed copy or hardlink) only affect
//! the path they were raised for and are collected by the caller.

use std::path::{Path, PathBuf};

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Affects a single path, the operation continues
    Low,
    /// The operation must be aborted
    High,
}

/// Main error type for ferrodiff operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found
        path: PathBuf,
    },

    /// Permission denied
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// Path to the file with permission issues
        path: PathBuf,
    },

    /// A scan root is missing or unusable
    #[error("Invalid root '{path}': {reason}")]
    InvalidRoot {
        /// Root path as given by the caller
        path: PathBuf,
        /// Why the root was rejected
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Replacing a duplicate with a hardlink failed
    #[error("Link error for '{path}': {message}")]
    Link {
        /// Duplicate that could not be replaced
        path: PathBuf,
        /// Underlying cause
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O related errors
    Io,
    /// Configuration and argument errors
    Config,
    /// Hardlink errors
    Link,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::FileNotFound { .. } | Self::PermissionDenied { .. } => {
                ErrorKind::Io
            }
            Self::InvalidRoot { .. } | Self::Config { .. } => ErrorKind::Config,
            Self::Link { .. } => ErrorKind::Link,
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Io { .. } | Self::FileNotFound { .. } | Self::PermissionDenied { .. } => {
                ErrorSeverity::Low
            }
            Self::Link { .. } => ErrorSeverity::Low,
            Self::InvalidRoot { .. } | Self::Config { .. } => ErrorSeverity::High,
        }
    }

    /// Whether this error must abort the whole operation
    pub fn is_fatal(&self) -> bool {
        self.severity() == ErrorSeverity::High
    }

    /// Wrap an I/O error raised while working on `path`
    pub fn io_at(path: impl AsRef<Path>, error: std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io {
                message: format!("{}: {}", path.display(), error),
            },
        }
    }

    /// Create a new invalid-root error
    pub fn invalid_root(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::InvalidRoot {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new link error
    pub fn link(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Link {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}
