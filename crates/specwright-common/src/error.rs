//! Unified error types for the specwright workspace.
//!
//! Resolution failures fall into three fatal families: unresolved
//! references ([`SpecError::Lookup`]), malformed input
//! ([`SpecError::Validation`]), and requests that contradict the current
//! state of the system ([`SpecError::PolicyConflict`]). Non-fatal findings
//! are never errors; they travel as warning strings next to a successful
//! result.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum SpecError {
    /// An image, container, pod, or network reference did not resolve.
    #[error("{kind} not found: {id}")]
    Lookup {
        /// Type of the missing resource.
        kind: &'static str,
        /// Reference that failed to resolve.
        id: String,
    },

    /// Caller or stored input is malformed.
    #[error("invalid input: {message}")]
    Validation {
        /// Description of the malformed input.
        message: String,
    },

    /// The request conflicts with the current state of the system.
    #[error("policy conflict: {message}")]
    PolicyConflict {
        /// Description of the conflict.
        message: String,
    },

    /// A configuration file or value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
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

impl SpecError {
    /// Shorthand for a [`SpecError::Lookup`].
    pub fn lookup(kind: &'static str, id: impl Into<String>) -> Self {
        Self::Lookup {
            kind,
            id: id.into(),
        }
    }

    /// Shorthand for a [`SpecError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Returns `true` when the error is a failed reference lookup.
    #[must_use]
    pub const fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup { .. })
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, SpecError>;
