//! Error types for tree construction

use delab_domain::{PostId, RawIdKind};
use thiserror::Error;

/// Result type alias for tree operations
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors that abort the construction of one conversation tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// A non-root record carries no recognized parent relation
    #[error("Malformed record {post_id}: no recognized parent relation")]
    MalformedRecord {
        /// Offending post
        post_id: PostId,
    },

    /// The raw conversation reached the configured post cap
    #[error("Conversation too large: {size} posts (max: {max})")]
    ConversationTooLarge {
        /// Posts collected when the cap was hit
        size: usize,
        /// Configured cap
        max: usize,
    },

    /// Post and parent ids of one tree use different representations
    #[error("Inconsistent id types in tree {tree_id}: {first} and {second}")]
    IdTypeInconsistency {
        /// Tree the rows belong to
        tree_id: String,
        /// First representation seen
        first: RawIdKind,
        /// Conflicting representation
        second: RawIdKind,
    },

    /// An id has no canonical string form
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// A post id is already present in the tree
    #[error("Duplicate post: {0}")]
    DuplicatePost(PostId),

    /// No root record was found
    #[error("Root not found in conversation {0}")]
    RootNotFound(String),

    /// More than one record claims to be the root
    #[error("Conversation {tree_id} has {count} root candidates")]
    MultipleRoots {
        /// Tree the rows belong to
        tree_id: String,
        /// Number of parentless rows
        count: usize,
    },
}
