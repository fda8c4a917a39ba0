//! A working set of trees keyed by tree id

use crate::{ConversationTree, Flow, FlowExtractor, TreeError};
use delab_domain::{Platform, PostRow};
use std::collections::{BTreeMap, HashSet};

/// Many conversation trees, iterated in tree-id order
#[derive(Debug, Clone, Default)]
pub struct Forest {
    trees: BTreeMap<String, ConversationTree>,
}

impl Forest {
    /// Create an empty forest
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a forest from finished trees
    pub fn from_trees<I>(trees: I) -> Self
    where
        I: IntoIterator<Item = ConversationTree>,
    {
        let mut forest = Self::new();
        for tree in trees {
            forest.insert(tree);
        }
        forest
    }

    /// Group rows by `tree_id` and build one tree per group
    ///
    /// A group that cannot be built is skipped and reported; the remaining
    /// trees are still loaded.
    pub fn from_rows(rows: Vec<PostRow>, platform: Platform) -> (Self, Vec<(String, TreeError)>) {
        let mut groups: BTreeMap<String, Vec<PostRow>> = BTreeMap::new();
        for row in rows {
            groups.entry(row.tree_id.clone()).or_default().push(row);
        }

        let mut forest = Self::new();
        let mut failures = Vec::new();
        for (tree_id, rows) in groups {
            match ConversationTree::from_rows(rows, platform) {
                Ok(outcome) => {
                    forest.insert(outcome.tree);
                }
                Err(e) => {
                    tracing::error!("skipping tree {}: {}", tree_id, e);
                    failures.push((tree_id, e));
                }
            }
        }
        (forest, failures)
    }

    /// Add a tree, replacing any tree with the same id
    pub fn insert(&mut self, tree: ConversationTree) -> Option<ConversationTree> {
        self.trees.insert(tree.tree_id().to_string(), tree)
    }

    /// Look up a tree
    pub fn get(&self, tree_id: &str) -> Option<&ConversationTree> {
        self.trees.get(tree_id)
    }

    /// Number of trees
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Whether the forest is empty
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Tree ids in iteration order
    pub fn tree_ids(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }

    /// Iterate over the trees
    pub fn iter(&self) -> impl Iterator<Item = &ConversationTree> {
        self.trees.values()
    }

    /// Consume the forest, yielding its trees in id order
    pub fn into_trees(self) -> impl Iterator<Item = ConversationTree> {
        self.trees.into_values()
    }

    /// Evict every tree whose id is not in `keep`, returning the evicted ids
    pub fn keep<'a, I>(&mut self, keep: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keep: HashSet<&str> = keep.into_iter().collect();
        let evicted: Vec<String> = self
            .trees
            .keys()
            .filter(|id| !keep.contains(id.as_str()))
            .cloned()
            .collect();
        for id in &evicted {
            self.trees.remove(id);
        }
        evicted
    }

    /// Up to `n` accepted flows, taken tree by tree in id order
    pub fn flow_sample(&self, n: usize, extractor: &FlowExtractor) -> Vec<Flow> {
        let mut sample = Vec::new();
        for tree in self.trees.values() {
            if sample.len() >= n {
                break;
            }
            let remaining = n - sample.len();
            sample.extend(extractor.extract(tree).into_iter().take(remaining));
        }
        sample
    }
}
