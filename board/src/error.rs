//! Error types for board operations

use crate::types::{TagId, TodoId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by board operations
///
/// Every operation that returns one of these has left the board untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardError {
    /// A required field was missing or malformed
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Name of the offending field
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// The operation referenced a todo that does not exist
    #[error("todo {0} not found")]
    TodoNotFound(TodoId),

    /// The operation referenced a tag that does not exist
    #[error("tag {0} not found")]
    TagNotFound(TagId),

    /// A persisted snapshot could not be turned back into a board
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl BoardError {
    /// Shorthand for a validation failure
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable kind, used as a metrics label
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::TodoNotFound(_) | Self::TagNotFound(_) => "not_found",
            Self::InvalidSnapshot(_) => "invalid_snapshot",
        }
    }

    /// True for the "operation referencing a nonexistent id" family
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::TodoNotFound(_) | Self::TagNotFound(_))
    }
}

/// Convenience alias for board results
pub type Result<T> = std::result::Result<T, BoardError>;
