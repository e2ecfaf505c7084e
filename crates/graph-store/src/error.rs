//! Error types for the graph-store crate.
//!
//! Every store operation returns [`Result`]. Variants carry enough context
//! (user name, operation, file/line) for the service layer to map them onto
//! its own taxonomy and for logs to be useful on their own.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by a graph store or while loading seed data into one.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Uniqueness constraint on User.name was violated
    #[error("User already exists: {name}")]
    UserExists { name: String },

    /// Operation targeted a user that is not in the graph
    #[error("User not found: {name}")]
    UserNotFound { name: String },

    /// A value handed to the store breaks a graph invariant
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Seed file could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a seed file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Line in a seed file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// The store has been closed; no further operations are accepted
    #[error("Store connection is closed")]
    Closed,

    /// A store call did not complete in time
    #[error("Store operation '{operation}' timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Graph failed an integrity check
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl StoreError {
    /// Whether the caller may reasonably try the same call again later.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Timeout { .. })
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, StoreError>;
