//! Unified error types for the atomic workspace.
//!
//! Only [`AtomicError::NotFound`] is ever recovered locally (an inspection
//! that finds nothing becomes `exists == false`). Every other variant aborts
//! the current subcommand.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum AtomicError {
    /// The inspected entity does not exist, or an absent record was accessed.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Type of the missing entity.
        kind: &'static str,
        /// Name the entity was looked up by.
        name: String,
    },

    /// The container engine exited with a non-zero status.
    #[error("command `{command}` failed ({}): {output}", status.map_or_else(|| "killed by signal".to_string(), |c| format!("exit status {c}")))]
    EngineInvocation {
        /// Full command line that was executed.
        command: String,
        /// Exit code, if the process exited normally.
        status: Option<i32>,
        /// Captured diagnostic output (empty when stdio was inherited).
        output: String,
    },

    /// A required label or field is absent and has no default.
    #[error("missing configuration: {key}")]
    MissingConfiguration {
        /// The label or field that was required.
        key: String,
    },

    /// A label value could not be parsed.
    #[error("invalid value for label {key}: {value:?}")]
    InvalidLabel {
        /// Label key.
        key: String,
        /// Offending raw value.
        value: String,
    },

    /// A local precondition on the caller's arguments failed.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the violated precondition.
        message: String,
    },

    /// An I/O operation failed, including failure to spawn a program.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path (or program) involved in the failed operation.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl AtomicError {
    /// Returns whether this error only reports an absent entity.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, AtomicError>;
