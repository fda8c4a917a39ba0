//! Validator error types

use thiserror::Error;

/// Result type alias for validator operations
pub type Result<T> = std::result::Result<T, ValidatorError>;

/// Errors that can occur during validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidatorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A tree failed the structural checks
    #[error("Structural error in tree {tree_id}: {message}")]
    Structure {
        /// Offending tree
        tree_id: String,
        /// Description of the first issue found
        message: String,
    },
}
