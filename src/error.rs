//! Error types for nbview
//!
//! This module defines all custom error types used throughout the viewer.
//! Error types are organized by category so the controller can decide which
//! failures are fatal and which degrade to a placeholder.

use std::path::PathBuf;
use thiserror::Error;

/// Main application error type encompassing all error categories
#[derive(Error, Debug)]
pub enum AppError {
    /// Source file related errors
    #[error(transparent)]
    FileIO(#[from] FileError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Notebook parsing errors
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Rendering capability errors
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// File I/O related errors
#[derive(Error, Debug)]
pub enum FileError {
    /// No document source could be obtained at mount
    #[error("Notebook source unavailable: {path}")]
    SourceUnavailable { path: PathBuf },

    /// File is too large to open
    #[error("File too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Error reading file
    #[error("Could not read file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing file
    #[error("Could not write file: {path}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error renaming temp file to target
    #[error("Could not complete file write (rename failed): {path}")]
    RenameError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Could not load configuration: {0}")]
    LoadError(String),

    /// Error parsing configuration
    #[error("Invalid configuration format: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// Configuration directory error
    #[error("Could not access configuration directory")]
    DirectoryError,
}

/// Notebook parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Text is not a serialized notebook (JSON object with a `cells` array)
    #[error("Failed to parse notebook: {0}")]
    MalformedSource(String),

    /// No markdown engine is registered under the requested compiler name
    #[error("Notebook rendering engine not loaded: {compiler}")]
    EngineMissing { compiler: String },
}

/// Rendering capability that can be absent at the point of use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Highlighter,
    Math,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Capability::Highlighter => "syntax highlighter",
            Capability::Math => "math engine",
        };
        f.write_str(name)
    }
}

/// Rendering capability errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A required capability is not installed
    #[error("Rendering capability missing: {0}")]
    CapabilityMissing(Capability),

    /// Highlighting a code block failed
    #[error("Highlighting failed for {language}: {message}")]
    Highlighting { language: String, message: String },

    /// KaTeX rejected a formula
    #[error("Typesetting failed for {tex:?}: {message}")]
    Typesetting { tex: String, message: String },
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for file operations
pub type FileResult<T> = Result<T, FileError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for notebook parsing
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type alias for rendering capability operations
pub type RenderResult<T> = Result<T, RenderError>;

impl AppError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            AppError::FileIO(e) => e.to_string(),
            AppError::Config(e) => format!("Configuration error: {}", e),
            AppError::Parse(e) => e.to_string(),
            AppError::Render(e) => e.to_string(),
        }
    }

    /// Whether this error prevents any render of the document
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::FileIO(FileError::SourceUnavailable { .. })
                | AppError::FileIO(FileError::FileTooLarge { .. })
                | AppError::FileIO(FileError::ReadError { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FileError::SourceUnavailable {
            path: PathBuf::from("/test/notebook.ipynb"),
        };
        assert!(err.to_string().contains("/test/notebook.ipynb"));

        let err = ParseError::MalformedSource("expected value at line 1 column 1".into());
        assert_eq!(
            err.to_string(),
            "Failed to parse notebook: expected value at line 1 column 1"
        );
    }

    #[test]
    fn test_app_error_from() {
        let file_err = FileError::SourceUnavailable {
            path: PathBuf::from("/test"),
        };
        let app_err: AppError = file_err.into();
        assert!(matches!(app_err, AppError::FileIO(_)));
        assert!(app_err.is_fatal());

        let app_err: AppError = ParseError::MalformedSource("bad".into()).into();
        assert!(!app_err.is_fatal());
    }

    #[test]
    fn test_capability_display() {
        let err = RenderError::CapabilityMissing(Capability::Highlighter);
        assert_eq!(err.to_string(), "Rendering capability missing: syntax highlighter");
    }
}
