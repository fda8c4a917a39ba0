//! Structural validation of finished trees
//!
//! These checks re-derive the tree invariants from a full traversal instead of
//! trusting the builder, so construction bugs surface before a tree is stored.

use crate::ConversationTree;
use delab_domain::PostId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Optional structural checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralChecks {
    /// Reject trees where a child was created before its parent
    ///
    /// Off by default: Reddit and Mastodon clocks skew, and automoderator
    /// replies share their parent's timestamp.
    pub require_monotonic_timestamps: bool,
}

/// Why a tree failed structural validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralIssue {
    /// The tree holds no nodes
    Empty,

    /// The root id does not resolve to a parentless node
    MissingRoot,

    /// A node was reached twice during traversal
    DuplicateId(PostId),

    /// A child link points to a node that does not exist
    DanglingChild {
        /// Parent holding the link
        parent: PostId,
        /// Missing child id
        child: PostId,
    },

    /// A child's back-reference disagrees with the node listing it
    ParentMismatch {
        /// Child node
        child: PostId,
    },

    /// Nodes exist that cannot be reached from the root
    Unreachable(usize),

    /// A child predates its parent
    TimestampRegression {
        /// Parent node
        parent: PostId,
        /// Child node
        child: PostId,
    },
}

impl fmt::Display for StructuralIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralIssue::Empty => write!(f, "tree is empty"),
            StructuralIssue::MissingRoot => write!(f, "root node is missing"),
            StructuralIssue::DuplicateId(id) => write!(f, "post {} reached twice", id),
            StructuralIssue::DanglingChild { parent, child } => {
                write!(f, "post {} lists missing child {}", parent, child)
            }
            StructuralIssue::ParentMismatch { child } => {
                write!(f, "post {} has an inconsistent parent link", child)
            }
            StructuralIssue::Unreachable(n) => write!(f, "{} posts unreachable from root", n),
            StructuralIssue::TimestampRegression { parent, child } => {
                write!(f, "post {} was created before its parent {}", child, parent)
            }
        }
    }
}

impl ConversationTree {
    /// Run the structural checks, returning the first issue found
    pub fn check_structure(&self, checks: &StructuralChecks) -> Result<(), StructuralIssue> {
        if self.total_number_of_posts() == 0 {
            return Err(StructuralIssue::Empty);
        }

        let root = match self.root() {
            Some(root) if root.parent().is_none() => root,
            _ => return Err(StructuralIssue::MissingRoot),
        };

        let mut seen: HashSet<&PostId> = HashSet::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if !seen.insert(node.id()) {
                return Err(StructuralIssue::DuplicateId(node.id().clone()));
            }
            for child_id in node.children() {
                let child = self.get(child_id).ok_or_else(|| StructuralIssue::DanglingChild {
                    parent: node.id().clone(),
                    child: child_id.clone(),
                })?;
                if child.parent() != Some(node.id()) {
                    return Err(StructuralIssue::ParentMismatch {
                        child: child_id.clone(),
                    });
                }
                if checks.require_monotonic_timestamps
                    && child.record().created_at < node.record().created_at
                {
                    return Err(StructuralIssue::TimestampRegression {
                        parent: node.id().clone(),
                        child: child_id.clone(),
                    });
                }
                stack.push(child);
            }
        }

        let unreachable = self.nodes().filter(|n| !seen.contains(n.id())).count();
        if unreachable > 0 {
            return Err(StructuralIssue::Unreachable(unreachable));
        }

        Ok(())
    }

    /// Platform-agnostic structural validation with default checks
    ///
    /// When `verbose` is set, the reason for a failure is logged.
    pub fn validate(&self, verbose: bool) -> bool {
        match self.check_structure(&StructuralChecks::default()) {
            Ok(()) => true,
            Err(issue) => {
                if verbose {
                    tracing::error!("tree {} failed validation: {}", self.tree_id(), issue);
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use delab_domain::{Platform, PostRecord};

    fn post(id: &str, parent: &str, t: i64) -> PostRecord {
        PostRecord::new(id, "a", "t", Utc.timestamp_opt(t, 0).unwrap(), Platform::Twitter)
            .with_parent(parent)
    }

    fn root(t: i64) -> PostRecord {
        PostRecord::new("r", "a", "t", Utc.timestamp_opt(t, 0).unwrap(), Platform::Twitter)
    }

    #[test]
    fn test_built_tree_is_valid() {
        let mut tree = ConversationTree::new(root(0));
        tree.attach(post("a", "r", 1)).unwrap();
        tree.attach(post("b", "a", 2)).unwrap();

        assert!(tree.validate(true));
        assert_eq!(tree.check_structure(&StructuralChecks::default()), Ok(()));
    }

    #[test]
    fn test_timestamp_regression_only_when_requested() {
        let mut tree = ConversationTree::new(root(10));
        tree.attach(post("a", "r", 5)).unwrap();

        assert!(tree.validate(false));

        let strict = StructuralChecks {
            require_monotonic_timestamps: true,
        };
        assert_eq!(
            tree.check_structure(&strict),
            Err(StructuralIssue::TimestampRegression {
                parent: "r".into(),
                child: "a".into(),
            })
        );
    }

    #[test]
    fn test_equal_timestamps_are_monotonic() {
        let mut tree = ConversationTree::new(root(10));
        tree.attach(post("a", "r", 10)).unwrap();

        let strict = StructuralChecks {
            require_monotonic_timestamps: true,
        };
        assert!(tree.check_structure(&strict).is_ok());
    }

    fn chain() -> ConversationTree {
        let mut tree = ConversationTree::new(root(0));
        tree.attach(post("a", "r", 1)).unwrap();
        tree.attach(post("b", "a", 2)).unwrap();
        tree
    }

    fn issue(tree: &ConversationTree) -> StructuralIssue {
        assert!(!tree.validate(false));
        tree.check_structure(&StructuralChecks::default()).unwrap_err()
    }

    #[test]
    fn test_empty_tree() {
        let mut tree = ConversationTree::new(root(0));
        tree.remove_node(&"r".into());
        assert_eq!(issue(&tree), StructuralIssue::Empty);
    }

    #[test]
    fn test_missing_root() {
        let mut tree = chain();
        tree.remove_node(&"r".into());
        assert_eq!(issue(&tree), StructuralIssue::MissingRoot);

        let mut tree = chain();
        tree.set_parent_link(&"r".into(), Some("b".into()));
        assert_eq!(issue(&tree), StructuralIssue::MissingRoot);
    }

    #[test]
    fn test_node_reached_twice() {
        let mut tree = chain();
        tree.push_child_link(&"r".into(), "a");
        assert_eq!(issue(&tree), StructuralIssue::DuplicateId("a".into()));
    }

    #[test]
    fn test_dangling_child() {
        let mut tree = chain();
        tree.push_child_link(&"a".into(), "ghost");
        assert_eq!(
            issue(&tree),
            StructuralIssue::DanglingChild {
                parent: "a".into(),
                child: "ghost".into(),
            }
        );
    }

    #[test]
    fn test_parent_mismatch() {
        let mut tree = chain();
        tree.set_parent_link(&"b".into(), Some("r".into()));
        assert_eq!(
            issue(&tree),
            StructuralIssue::ParentMismatch { child: "b".into() }
        );
    }

    #[test]
    fn test_unreachable_nodes() {
        let mut tree = chain();
        tree.insert_unlinked(post("x", "r", 3));
        tree.insert_unlinked(post("y", "x", 4));
        assert_eq!(issue(&tree), StructuralIssue::Unreachable(2));
    }

    #[test]
    fn test_issue_display() {
        let issue = StructuralIssue::Unreachable(3);
        assert_eq!(issue.to_string(), "3 posts unreachable from root");
    }
}
