//! DeLab Trees
//!
//! Reconstructs conversation trees from reply-structured post streams and
//! extracts root-to-leaf conversation flows from them.
//!
//! # Architecture
//!
//! ```text
//! posts → TreeBuilder → (orphans) → OrphanResolver → ConversationTree
//!       → FlowExtractor → flows
//! ```
//!
//! - **TreeBuilder**: sorts candidates by creation time and attaches each one
//!   under its structural parent through an id index
//! - **OrphanResolver**: retries posts whose parent was not yet present until a
//!   pass attaches nothing (fixed point)
//! - **ConversationTree**: rooted tree with `total_number_of_posts`, `depth`,
//!   `validate` and `get_conversation_flows`
//! - **FlowExtractor**: root-to-leaf paths filtered by sequence-level predicates
//! - **Forest**: a working set of trees used while sampling
//!
//! # Example Usage
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use delab_domain::{Platform, PostRecord};
//! use delab_tree::{FlowExtractor, FlowFilterConfig, TreeBuilder};
//!
//! let at = |s| Utc.timestamp_opt(s, 0).unwrap();
//! let root = PostRecord::new("r", "alice", "Is this a good idea?", at(0), Platform::Mastodon);
//! let replies = vec![
//!     PostRecord::new("b", "alice", "Yes.", at(3), Platform::Mastodon).with_parent("a"),
//!     PostRecord::new("a", "bob", "Why?", at(2), Platform::Mastodon).with_parent("r"),
//! ];
//!
//! let outcome = TreeBuilder::new().build(root, replies)?;
//! assert!(outcome.orphans.is_empty());
//! assert_eq!(outcome.tree.depth(), 2);
//!
//! let flows = FlowExtractor::from_config(&FlowFilterConfig::default()).extract(&outcome.tree);
//! assert_eq!(flows.len(), 1);
//! # Ok::<(), delab_tree::TreeError>(())
//! ```

#![warn(missing_docs)]

mod builder;
mod check;
mod error;
mod filter;
mod flows;
mod forest;
mod resolver;
mod rows;
mod tree;

pub use builder::{BuildOutcome, ConversationCollector, TreeBuilder};
pub use check::{StructuralChecks, StructuralIssue};
pub use error::{Result, TreeError};
pub use filter::{
    ContentFilter, FlowFilter, FlowFilterConfig, SelfAnswerFilter, DEFAULT_BLOCKED_PHRASES,
    DEFAULT_MAX_TEXT_LENGTH,
};
pub use flows::{Flow, FlowExtractor, FlowId, FlowSet};
pub use forest::Forest;
pub use resolver::{OrphanResolver, Resolution};
pub use rows::normalize_rows;
pub use tree::{Attachment, ConversationTree, TreeNode};
