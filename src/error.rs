//! Error types for the package editor core.
//!
//! The taxonomy separates invalid input at the value-domain boundary
//! (`InvalidValue`), failed lookups (`KeyNotFound`, `OutOfRange`), API misuse
//! (`LogicError`, `ActiveTransaction`), refused user edits (`UserError`) and
//! I/O or parse failures of the persisted format. Invariant breaches that can
//! only come from a bug inside this crate are asserted, never returned.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for editor core operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors that can occur in the package editor core.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A constrained value type rejected its input at construction.
    #[error("Invalid value for {field}: {actual}")]
    InvalidValue {
        /// Name of the constrained type or field.
        field: &'static str,
        /// The rejected input, rendered for diagnostics.
        actual: String,
    },

    /// A list lookup by UUID or name found nothing.
    #[error("No {kind} with key {key}")]
    KeyNotFound {
        /// Element kind, e.g. the list's s-expression tag name.
        kind: &'static str,
        /// The key that was looked up.
        key: String,
    },

    /// A list index was out of bounds for a non-forgiving operation.
    #[error("Index {index} out of range (length {count})")]
    OutOfRange {
        /// The requested index.
        index: usize,
        /// The number of elements in the list.
        count: usize,
    },

    /// An API was used out of order.
    #[error("Logic error: {context}")]
    LogicError {
        /// Description of the violated protocol.
        context: &'static str,
    },

    /// A command was executed while a command group is still active.
    #[error("Another command is active at the moment. Please finish that command to continue.")]
    ActiveTransaction,

    /// A user-initiated edit was refused.
    #[error("{message}")]
    UserError {
        /// Message suitable for direct display to the user.
        message: String,
    },

    /// Failed to read a file of the library.
    #[error("Failed to read file: {path}")]
    FileRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write a file of the library.
    #[error("Failed to write file: {path}")]
    FileWrite {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to parse an s-expression document.
    #[error("Parse error at {line}:{column}: {message}")]
    Parse {
        /// 1-based line of the offending input.
        line: usize,
        /// 1-based column of the offending input.
        column: usize,
        /// Description of what's wrong.
        message: String,
    },

    /// A tagged document node misses a required child or value.
    #[error("Invalid {node} element: {message}")]
    InvalidElement {
        /// Tag name of the node being deserialized.
        node: &'static str,
        /// Description of what's wrong.
        message: String,
    },
}

impl EditorError {
    /// Creates an invalid value error.
    pub fn invalid_value(field: &'static str, actual: impl ToString) -> Self {
        Self::InvalidValue {
            field,
            actual: actual.to_string(),
        }
    }

    /// Creates a key not found error.
    pub fn key_not_found(kind: &'static str, key: impl ToString) -> Self {
        Self::KeyNotFound {
            kind,
            key: key.to_string(),
        }
    }

    /// Creates an out of range error.
    #[must_use]
    pub const fn out_of_range(index: usize, count: usize) -> Self {
        Self::OutOfRange { index, count }
    }

    /// Creates a logic error.
    #[must_use]
    pub const fn logic(context: &'static str) -> Self {
        Self::LogicError { context }
    }

    /// Creates a user error.
    pub fn user(message: impl Into<String>) -> Self {
        Self::UserError {
            message: message.into(),
        }
    }

    /// Creates a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a file write error.
    pub fn file_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse error.
    pub fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    /// Creates an invalid element error.
    pub fn invalid_element(node: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidElement {
            node,
            message: message.into(),
        }
    }

    /// Whether this error should be surfaced to the user rather than logged
    /// as a defect.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::UserError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_display() {
        let err = EditorError::invalid_value("UnsignedLength", "-42");
        assert_eq!(err.to_string(), "Invalid value for UnsignedLength: -42");
    }

    #[test]
    fn key_not_found_display() {
        let err = EditorError::key_not_found("pad", "A1");
        assert_eq!(err.to_string(), "No pad with key A1");
    }

    #[test]
    fn out_of_range_display() {
        let err = EditorError::out_of_range(7, 3);
        assert_eq!(err.to_string(), "Index 7 out of range (length 3)");
    }

    #[test]
    fn user_error_is_user_error() {
        assert!(EditorError::user("duplicate pad name").is_user_error());
        assert!(!EditorError::logic("redo before execute").is_user_error());
    }
}
