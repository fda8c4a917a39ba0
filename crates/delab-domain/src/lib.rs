//! DeLab Domain Layer
//!
//! This crate contains the platform-neutral vocabulary shared by every other
//! DeLab crate: the canonical post record that platform fetchers produce, the
//! typed parent relations a post may carry, and the tabular row shape that
//! persistence consumes.
//!
//! ## Key Concepts
//!
//! - **PostRecord**: One normalized post (tweet, toot, comment) with its parent reference
//! - **RelationCandidate**: A typed edge (reply, quote, retweet) naming a target post
//! - **Relation priority**: `RepliedTo > Quoted > Retweeted` picks one structural parent
//! - **PostRow**: The flat, storage-facing representation of a post inside a tree
//!
//! ## Architecture
//!
//! - No I/O and no platform payload parsing
//! - Pure value types; tree assembly lives in `delab-tree`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod platform;
pub mod post;
pub mod relation;
pub mod row;

// Re-exports for convenience
pub use platform::{Language, Platform};
pub use post::{PostId, PostRecord};
pub use relation::{ParentRef, RelationCandidate, RelationKind};
pub use row::{PostRow, RawId, RawIdKind};
