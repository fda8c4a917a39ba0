//! DeLab Validator
//!
//! Decides whether a reconstructed conversation tree is worth keeping.
//!
//! The validator provides:
//! - Platform-agnostic structural checks (non-empty, root present, no duplicates)
//! - Per-platform size policy (exclusive bounds)
//! - Per-platform depth policy (inclusive bound)
//! - Candidate pre-screening on advertised reply counts
//!
//! | platform | min size (exclusive) | max size (exclusive) | min depth (inclusive) |
//! |----------|----------------------|----------------------|-----------------------|
//! | Twitter  | 5                    | 500                  | 5                     |
//! | Reddit   | 5                    | 50                   | 5                     |
//! | Mastodon | 5                    | 500                  | 3                     |
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use delab_domain::{Platform, PostRecord};
//! use delab_tree::ConversationTree;
//! use delab_validator::{TreeValidator, ValidationStatus};
//!
//! let at = Utc.timestamp_opt(0, 0).unwrap();
//! let tree = ConversationTree::new(PostRecord::new("r", "a", "hello", at, Platform::Reddit));
//!
//! let result = TreeValidator::default_config().validate(&tree);
//! assert_eq!(result.status, ValidationStatus::Rejected);
//! assert_eq!(result.size, 1);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod validator;

pub use config::{
    PlatformPolicy, ValidationConfig, MAX_CONVERSATION_LENGTH, MAX_CONVERSATION_LENGTH_REDDIT,
    MIN_CONVERSATION_DEPTH, MIN_CONVERSATION_DEPTH_MASTODON, MIN_CONVERSATION_LENGTH,
    MIN_CONVERSATION_LENGTH_MASTODON,
};
pub use error::{Result, ValidatorError};
pub use validator::{RejectionReason, TreeValidator, ValidationResult, ValidationStatus};
