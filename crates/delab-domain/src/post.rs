//! Post module - the canonical record platform fetchers hand to the core

use crate::{ParentRef, Platform, RelationCandidate, RelationKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform-unique post identifier in canonical string form
///
/// Every id entering a tree is normalized to this representation so that the
/// same logical post can never be compared as `123` against `"123"` or `123.0`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    /// Create a post id from its canonical string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the canonical string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PostId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for PostId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// A normalized post - the input unit of tree construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Unique identifier
    pub id: PostId,

    /// How this post names its parent
    #[serde(default)]
    pub parent: ParentRef,

    /// Author identifier
    pub author_id: String,

    /// Plain text content
    pub text: String,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Source platform
    pub platform: Platform,

    /// Detected language code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,

    /// Permalink
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Display name of the author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_display_name: Option<String>,
}

impl PostRecord {
    /// Create a record without a parent reference
    pub fn new(
        id: impl Into<PostId>,
        author_id: impl Into<String>,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
        platform: Platform,
    ) -> Self {
        Self {
            id: id.into(),
            parent: ParentRef::None,
            author_id: author_id.into(),
            text: text.into(),
            created_at,
            platform,
            lang: None,
            url: None,
            author_display_name: None,
        }
    }

    /// Set a direct parent id
    pub fn with_parent(mut self, parent_id: impl Into<PostId>) -> Self {
        self.parent = ParentRef::Direct(parent_id.into());
        self
    }

    /// Add a typed relation (Twitter)
    pub fn with_relation(mut self, kind: RelationKind, target: impl Into<PostId>) -> Self {
        let candidate = RelationCandidate::new(kind, target);
        match &mut self.parent {
            ParentRef::Relations(candidates) => candidates.push(candidate),
            other => *other = ParentRef::Relations(vec![candidate]),
        }
        self
    }

    /// Id of the structural parent, if one can be resolved
    pub fn parent_id(&self) -> Option<&PostId> {
        self.parent.parent_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_post_id_from_number() {
        assert_eq!(PostId::from(42u64).as_str(), "42");
        assert_eq!(PostId::from(42u64), PostId::from("42"));
    }

    #[test]
    fn test_with_relation_accumulates() {
        let post = PostRecord::new("t2", "a", "hi", at(1), Platform::Twitter)
            .with_relation(RelationKind::Quoted, "q")
            .with_relation(RelationKind::RepliedTo, "r");

        match &post.parent {
            ParentRef::Relations(c) => assert_eq!(c.len(), 2),
            other => panic!("Expected relations, got {:?}", other),
        }
        assert_eq!(post.parent_id().unwrap().as_str(), "r");
    }

    #[test]
    fn test_root_has_no_parent() {
        let post = PostRecord::new("root", "a", "hello", at(0), Platform::Mastodon);
        assert!(post.parent_id().is_none());
    }

    #[test]
    fn test_json_shape() {
        let post = PostRecord::new("c1", "a2", "reply", at(2), Platform::Reddit).with_parent("r");
        let json = serde_json::to_value(&post).unwrap();

        assert_eq!(json["id"], "c1");
        assert_eq!(json["parent"]["type"], "direct");
        assert_eq!(json["parent"]["value"], "r");
        assert_eq!(json["platform"], "reddit");
        assert!(json.get("url").is_none());
    }
}
