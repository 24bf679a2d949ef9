//! Error types for compilation database and configuration loading.

use thiserror::Error;

/// Errors that can occur while loading databases and edit configuration.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// `compile_commands.json` parsing or output serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Edit configuration parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A `PathMatch` or `PathExclude` pattern does not compile.
    #[error("invalid path pattern: {0}")]
    RegexError(#[from] regex::Error),

    /// A database entry's `command` string cannot be split into arguments,
    /// or the entry has neither `command` nor `arguments`.
    #[error("invalid command for {file}: {reason}")]
    InvalidCommand { file: String, reason: String },

    /// No entry exists for the file and none could be inferred.
    #[error("no compile command for {0}")]
    NotFound(String),
}

/// Convenience alias for results with [`DatabaseError`].
pub type Result<T> = std::result::Result<T, DatabaseError>;
