//! Root-to-leaf flow extraction

use crate::{ConversationTree, FlowFilter, FlowFilterConfig};
use delab_domain::{PostId, PostRecord};
use std::fmt;

/// Identifies a flow by its tree and its leaf
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlowId {
    /// Tree the flow was taken from
    pub tree_id: String,
    /// Last post of the flow
    pub leaf: PostId,
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tree_id, self.leaf)
    }
}

/// One root-to-leaf chain of posts, root first
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    id: FlowId,
    posts: Vec<PostRecord>,
}

impl Flow {
    /// Flow id
    pub fn id(&self) -> &FlowId {
        &self.id
    }

    /// Tree this flow belongs to
    pub fn tree_id(&self) -> &str {
        &self.id.tree_id
    }

    /// Posts from root to leaf
    pub fn posts(&self) -> &[PostRecord] {
        &self.posts
    }

    /// Number of posts (edges + 1)
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Whether the flow holds no posts
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Consume the flow, keeping its posts
    pub fn into_posts(self) -> Vec<PostRecord> {
        self.posts
    }
}

/// Flows of one tree in leaf-discovery order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowSet {
    flows: Vec<Flow>,
}

impl FlowSet {
    /// Number of flows
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    /// Whether no flow survived
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Iterate in leaf-discovery order
    pub fn iter(&self) -> std::slice::Iter<'_, Flow> {
        self.flows.iter()
    }

    /// Look a flow up by id
    pub fn get(&self, id: &FlowId) -> Option<&Flow> {
        self.flows.iter().find(|flow| &flow.id == id)
    }

    /// Id of the longest flow (first discovered wins ties)
    pub fn longest(&self) -> Option<&FlowId> {
        self.flows
            .iter()
            .fold(None::<&Flow>, |best, flow| match best {
                Some(b) if b.len() >= flow.len() => Some(b),
                _ => Some(flow),
            })
            .map(|flow| &flow.id)
    }

    /// Consume into a vector
    pub fn into_vec(self) -> Vec<Flow> {
        self.flows
    }
}

impl IntoIterator for FlowSet {
    type Item = Flow;
    type IntoIter = std::vec::IntoIter<Flow>;

    fn into_iter(self) -> Self::IntoIter {
        self.flows.into_iter()
    }
}

/// Enumerates root-to-leaf paths and keeps those every filter accepts
#[derive(Default)]
pub struct FlowExtractor {
    filters: Vec<Box<dyn FlowFilter>>,
}

impl fmt::Debug for FlowExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowExtractor")
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl FlowExtractor {
    /// Extractor without filters (keeps every flow)
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor with the filters enabled in `config`
    pub fn from_config(config: &FlowFilterConfig) -> Self {
        Self {
            filters: config.build_filters(),
        }
    }

    /// Add a filter
    pub fn with_filter<F: FlowFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Extract the accepted flows of `tree`
    ///
    /// Leaves are visited in pre-order with children in attachment order, so
    /// the result is stable for a given tree.
    pub fn extract(&self, tree: &ConversationTree) -> FlowSet {
        let filters: Vec<&dyn FlowFilter> = self.filters.iter().map(|f| f.as_ref()).collect();
        tree.get_conversation_flows(&filters)
    }
}

impl ConversationTree {
    /// All root-to-leaf flows that pass every filter
    pub fn get_conversation_flows(&self, filters: &[&dyn FlowFilter]) -> FlowSet {
        let mut flows = Vec::new();
        for leaf in self.leaves() {
            let posts: Vec<PostRecord> = self
                .path_from_root(leaf.id())
                .into_iter()
                .map(|node| node.record().clone())
                .collect();

            if filters.iter().all(|filter| filter.accept(&posts)) {
                flows.push(Flow {
                    id: FlowId {
                        tree_id: self.tree_id().to_string(),
                        leaf: leaf.id().clone(),
                    },
                    posts,
                });
            }
        }
        FlowSet { flows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SelfAnswerFilter, TreeBuilder};
    use chrono::{TimeZone, Utc};
    use delab_domain::Platform;

    fn post(id: &str, parent: Option<&str>, author: &str, t: i64) -> PostRecord {
        let at = Utc.timestamp_opt(t, 0).unwrap();
        let record = PostRecord::new(id, author, "text", at, Platform::Mastodon);
        match parent {
            Some(p) => record.with_parent(p),
            None => record,
        }
    }

    fn sample_tree() -> ConversationTree {
        TreeBuilder::new()
            .build(
                post("r", None, "a1", 0),
                vec![
                    post("c1", Some("r"), "a2", 2),
                    post("c2", Some("c1"), "a1", 3),
                    post("c3", Some("r"), "a3", 1),
                ],
            )
            .unwrap()
            .tree
    }

    fn ids(flow: &Flow) -> Vec<&str> {
        flow.posts().iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_one_flow_per_leaf() {
        let tree = sample_tree();
        let flows = FlowExtractor::new().extract(&tree);

        assert_eq!(flows.len(), 2);
        let all: Vec<Vec<&str>> = flows.iter().map(ids).collect();
        assert_eq!(all, vec![vec!["r", "c3"], vec!["r", "c1", "c2"]]);
    }

    #[test]
    fn test_longest_flow() {
        let tree = sample_tree();
        let flows = FlowExtractor::new().extract(&tree);
        let longest = flows.longest().unwrap();

        assert_eq!(longest.leaf.as_str(), "c2");
        assert_eq!(flows.get(longest).unwrap().len(), tree.depth() + 1);
    }

    #[test]
    fn test_root_only_tree_has_single_flow() {
        let tree = ConversationTree::new(post("r", None, "a", 0));
        let flows = FlowExtractor::new().extract(&tree);
        assert_eq!(flows.len(), 1);
        assert_eq!(flows.iter().next().unwrap().len(), 1);
    }

    #[test]
    fn test_filters_are_anded() {
        let mut tree = ConversationTree::new(post("r", None, "a", 0));
        tree.attach(post("x", Some("r"), "a", 1)).unwrap();
        tree.attach(post("y", Some("r"), "b", 2)).unwrap();

        let extractor = FlowExtractor::new()
            .with_filter(SelfAnswerFilter)
            .with_filter(|flow: &[PostRecord]| flow.len() > 1);
        let flows = extractor.extract(&tree);

        assert_eq!(flows.len(), 1);
        assert_eq!(flows.iter().next().unwrap().id().to_string(), "r/y");
    }
}
