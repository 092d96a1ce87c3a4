//! Error types for promptdock
//!
//! This module defines the error type shared by the storage manager, the
//! input adapter and the command surface. Messages are kept user-friendly
//! because they end up in dialogs shown by the widget.

use thiserror::Error;

/// Result type alias for promptdock operations
pub type Result<T> = std::result::Result<T, DockError>;

/// Why an import payload was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormatKind {
    /// Nothing (or only whitespace) was provided
    Empty,
    /// The text could not be parsed as JSON
    NotJson,
    /// Valid JSON, but neither a prompt array nor a `{prompts, folders}` object
    WrongShape,
}

impl std::fmt::Display for ImportFormatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ImportFormatKind::Empty => "empty file",
            ImportFormatKind::NotJson => "not valid JSON",
            ImportFormatKind::WrongShape => "expected an array of prompts or an object with prompts",
        };
        f.write_str(s)
    }
}

/// Main error type for promptdock
#[derive(Debug, Error)]
pub enum DockError {
    /// Command not found in registry
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// Invalid command arguments
    #[error("Invalid arguments for command '{command}': {reason}")]
    InvalidArgs { command: String, reason: String },

    /// Validation error (empty title/content, empty folder name, ...)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// No prompt with the given uuid
    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    /// No folder with the given id
    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    /// Import payload rejected
    #[error("Invalid import format: {kind}")]
    InvalidFormat { kind: ImportFormatKind, detail: String },

    /// Persistence substrate failure (quota, unreadable file, ...)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The host page has no recognizable text input
    #[error("No input box found on this page{}", waited_suffix(.0))]
    InputBoxNotFound(Option<u64>),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error (catch-all)
    #[error("{0}")]
    Other(String),
}

fn waited_suffix(waited_ms: &Option<u64>) -> String {
    match waited_ms {
        Some(ms) => format!(" after {}ms", ms),
        None => String::new(),
    }
}

impl From<anyhow::Error> for DockError {
    fn from(err: anyhow::Error) -> Self {
        DockError::Other(err.to_string())
    }
}

impl From<String> for DockError {
    fn from(err: String) -> Self {
        DockError::Other(err)
    }
}

impl From<&str> for DockError {
    fn from(err: &str) -> Self {
        DockError::Other(err.to_string())
    }
}

impl From<notify::Error> for DockError {
    fn from(err: notify::Error) -> Self {
        DockError::StorageError(format!("file watcher: {}", err))
    }
}

impl From<url::ParseError> for DockError {
    fn from(err: url::ParseError) -> Self {
        DockError::ValidationError(format!("Invalid page URL: {}", err))
    }
}

impl DockError {
    pub(crate) fn invalid_format(kind: ImportFormatKind, detail: impl Into<String>) -> Self {
        DockError::InvalidFormat {
            kind,
            detail: detail.into(),
        }
    }

    /// Get user-friendly error message for display in the widget
    pub fn user_message(&self) -> String {
        match self {
            DockError::CommandNotFound(cmd) => {
                format!("Command '{}' not found.", cmd)
            },
            DockError::InvalidArgs { command, reason } => {
                format!("Invalid arguments for '{}': {}", command, reason)
            },
            DockError::ValidationError(msg) => msg.clone(),
            DockError::PromptNotFound(_) => "That prompt no longer exists.".to_string(),
            DockError::FolderNotFound(_) => "That folder no longer exists.".to_string(),
            DockError::InvalidFormat { kind, detail } if !detail.is_empty() => {
                format!("Import failed ({}): {}", kind, detail)
            },
            DockError::InvalidFormat { kind, .. } => format!("Import failed: {}", kind),
            DockError::StorageError(msg) => {
                format!("Could not access prompt storage: {}", msg)
            },
            _ => self.to_string(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            DockError::CommandNotFound(_) => "command",
            DockError::InvalidArgs { .. } => "arguments",
            DockError::ValidationError(_) => "validation",
            DockError::PromptNotFound(_) | DockError::FolderNotFound(_) => "not_found",
            DockError::InvalidFormat { .. } => "import",
            DockError::StorageError(_) => "storage",
            DockError::SerdeError(_) => "serialization",
            DockError::IoError(_) => "io",
            DockError::InputBoxNotFound(_) => "adapter",
            DockError::ConfigError(_) => "config",
            DockError::Other(_) => "other",
        }
    }
}
