//! Error types for the planpoker crates.

use thiserror::Error;

/// A shared error type for the planpoker core.
///
/// Only two things can go wrong inside the core: a caller hands in invalid
/// input, or a creating operation names an owner that does not exist.
/// Deleting or mutating a missing entity is an idempotent no-op, and
/// persistence failures are reported to the log only, so neither surfaces
/// here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PokerError {
    /// Invalid input, rejected before any mutation
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced owner entity does not exist
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
}

impl PokerError {
    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A type alias for `Result<T, PokerError>`.
pub type Result<T> = std::result::Result<T, PokerError>;
