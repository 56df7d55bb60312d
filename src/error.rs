//! Error types for tether operations.
//!
//! This module defines [`TetherError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `TetherError` for fatal, run-aborting errors (a manifest that cannot
//!   be trusted, unreadable configuration)
//! - Per-declaration resolution failures are *not* errors: they are recorded
//!   in that declaration's outcome so the run always produces a full report
//! - Use `anyhow::Error` (via `TetherError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tether operations.
#[derive(Debug, Error)]
pub enum TetherError {
    /// The manifest document does not exist or is unreadable.
    #[error("Manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    /// A recognized dependency section exists but cannot be trusted.
    /// Fatal: resolving against a broken manifest is unsafe.
    #[error("Malformed manifest at {path}:{line}: {message}")]
    MalformedManifest {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Failed to parse the configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Failed to persist or load run state.
    #[error("State error at {path}: {message}")]
    State { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for tether operations.
pub type Result<T> = std::result::Result<T, TetherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_not_found_displays_path() {
        let err = TetherError::ManifestNotFound {
            path: PathBuf::from("/repo/README.md"),
        };
        assert!(err.to_string().contains("/repo/README.md"));
    }

    #[test]
    fn malformed_manifest_displays_location_and_message() {
        let err = TetherError::MalformedManifest {
            path: PathBuf::from("/repo/README.md"),
            line: 12,
            message: "duplicate declaration 'libfoo'".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/repo/README.md"));
        assert!(msg.contains("12"));
        assert!(msg.contains("libfoo"));
    }

    #[test]
    fn config_parse_displays_path_and_message() {
        let err = TetherError::ConfigParse {
            path: PathBuf::from("/repo/.tether.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains(".tether.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: TetherError = io_err.into();
        assert!(matches!(err, TetherError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(TetherError::State {
                path: PathBuf::from("x"),
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
