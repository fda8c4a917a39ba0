//! Relation module - how a post names its structural parent

use crate::PostId;
use serde::{Deserialize, Serialize};

/// Kind of reference edge a post may carry
///
/// Declaration order is the selection priority: a reply always wins over a
/// quote, and a quote over a retweet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// The post replies to the target
    RepliedTo,

    /// The post quotes the target
    Quoted,

    /// The post retweets the target
    Retweeted,
}

impl RelationKind {
    /// Get the relation name as used by the Twitter v2 API
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::RepliedTo => "replied_to",
            RelationKind::Quoted => "quoted",
            RelationKind::Retweeted => "retweeted",
        }
    }

    /// Parse a relation kind from its API name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "replied_to" => Some(RelationKind::RepliedTo),
            "quoted" => Some(RelationKind::Quoted),
            "retweeted" => Some(RelationKind::Retweeted),
            _ => None,
        }
    }
}

/// A typed reference from one post to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationCandidate {
    /// Type of the reference
    pub kind: RelationKind,

    /// Referenced post
    pub target: PostId,
}

impl RelationCandidate {
    /// Create a new relation candidate
    pub fn new(kind: RelationKind, target: impl Into<PostId>) -> Self {
        Self {
            kind,
            target: target.into(),
        }
    }
}

/// Parent reference carried by a post record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParentRef {
    /// No parent declared (only valid for the root of a conversation)
    #[default]
    None,

    /// Single unambiguous parent (Reddit, Mastodon)
    Direct(PostId),

    /// Typed references (Twitter); one is selected by priority
    Relations(Vec<RelationCandidate>),
}

impl ParentRef {
    /// Resolve the structural parent of a post
    ///
    /// For typed references the highest-priority kind wins; among several
    /// references of that kind the first one listed is used. Returns `None`
    /// when no parent can be determined.
    pub fn structural_parent(&self) -> Option<(&PostId, Option<RelationKind>)> {
        match self {
            ParentRef::None => None,
            ParentRef::Direct(id) => Some((id, None)),
            ParentRef::Relations(candidates) => candidates
                .iter()
                .enumerate()
                .min_by_key(|(position, candidate)| (candidate.kind, *position))
                .map(|(_, candidate)| (&candidate.target, Some(candidate.kind))),
        }
    }

    /// Id of the structural parent, if any
    pub fn parent_id(&self) -> Option<&PostId> {
        self.structural_parent().map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_beats_quote() {
        let parent = ParentRef::Relations(vec![
            RelationCandidate::new(RelationKind::Quoted, "q1"),
            RelationCandidate::new(RelationKind::RepliedTo, "r1"),
        ]);

        let (id, kind) = parent.structural_parent().unwrap();
        assert_eq!(id.as_str(), "r1");
        assert_eq!(kind, Some(RelationKind::RepliedTo));
    }

    #[test]
    fn test_quote_beats_retweet() {
        let parent = ParentRef::Relations(vec![
            RelationCandidate::new(RelationKind::Retweeted, "rt"),
            RelationCandidate::new(RelationKind::Quoted, "q"),
        ]);

        assert_eq!(parent.parent_id().unwrap().as_str(), "q");
    }

    #[test]
    fn test_first_of_same_kind_wins() {
        let parent = ParentRef::Relations(vec![
            RelationCandidate::new(RelationKind::RepliedTo, "first"),
            RelationCandidate::new(RelationKind::RepliedTo, "second"),
        ]);

        assert_eq!(parent.parent_id().unwrap().as_str(), "first");
    }

    #[test]
    fn test_no_parent() {
        assert!(ParentRef::None.structural_parent().is_none());
        assert!(ParentRef::Relations(vec![]).structural_parent().is_none());
    }

    #[test]
    fn test_direct_parent_has_no_kind() {
        let parent = ParentRef::Direct(PostId::from("p"));
        assert_eq!(parent.structural_parent(), Some((&PostId::from("p"), None)));
    }

    #[test]
    fn test_relation_kind_names() {
        for kind in [RelationKind::RepliedTo, RelationKind::Quoted, RelationKind::Retweeted] {
            assert_eq!(RelationKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(RelationKind::parse("liked"), None);
    }
}
