//! Conversation tree and its nodes

use crate::{Result, TreeError};
use delab_domain::{Platform, PostId, PostRecord};
use std::collections::HashMap;

/// A post placed inside a conversation tree
///
/// The parent link is an id used for lookup only; the parent owns the
/// ordered list of child ids.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    record: PostRecord,
    parent: Option<PostId>,
    children: Vec<PostId>,
}

impl TreeNode {
    fn new(record: PostRecord, parent: Option<PostId>) -> Self {
        Self {
            record,
            parent,
            children: Vec::new(),
        }
    }

    /// Node id (the post id)
    pub fn id(&self) -> &PostId {
        &self.record.id
    }

    /// The post stored in this node
    pub fn record(&self) -> &PostRecord {
        &self.record
    }

    /// Id of the attached parent, `None` for the root
    pub fn parent(&self) -> Option<&PostId> {
        self.parent.as_ref()
    }

    /// Child ids in attachment order
    pub fn children(&self) -> &[PostId] {
        &self.children
    }

    /// Whether the node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Outcome of a single attachment attempt
#[derive(Debug)]
pub enum Attachment {
    /// The record was linked under its parent
    Attached,
    /// The parent is not (yet) in the tree; the record is handed back untouched
    Orphaned(PostRecord),
}

/// A rooted conversation tree with an id index over all nodes
#[derive(Debug, Clone)]
pub struct ConversationTree {
    tree_id: String,
    root: PostId,
    nodes: HashMap<PostId, TreeNode>,
}

impl ConversationTree {
    /// Create a tree holding only its root
    ///
    /// The tree id defaults to the root's post id, which is how Twitter and
    /// Mastodon identify conversations.
    pub fn new(root: PostRecord) -> Self {
        let root_id = root.id.clone();
        let mut nodes = HashMap::new();
        nodes.insert(root_id.clone(), TreeNode::new(root, None));

        Self {
            tree_id: root_id.to_string(),
            root: root_id,
            nodes,
        }
    }

    /// Override the tree id
    pub fn with_tree_id(mut self, tree_id: impl Into<String>) -> Self {
        self.tree_id = tree_id.into();
        self
    }

    /// Tree (conversation) id
    pub fn tree_id(&self) -> &str {
        &self.tree_id
    }

    /// Id of the root node
    pub fn root_id(&self) -> &PostId {
        &self.root
    }

    /// The root node
    pub fn root(&self) -> Option<&TreeNode> {
        self.nodes.get(&self.root)
    }

    /// Platform of the root post
    pub fn platform(&self) -> Option<Platform> {
        self.root().map(|node| node.record.platform)
    }

    /// Look up a node by id
    pub fn get(&self, id: &PostId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// Whether a node with this id is present
    pub fn contains(&self, id: &PostId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Total node count, root included
    pub fn total_number_of_posts(&self) -> usize {
        self.nodes.len()
    }

    /// Length in edges of the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(&self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(node) = self.nodes.get(id) {
                stack.extend(node.children.iter().map(|child| (child, depth + 1)));
            }
        }
        max_depth
    }

    /// Try to link a record under its structural parent
    ///
    /// Fails with [`TreeError::MalformedRecord`] when the record names no
    /// parent at all. A record whose parent is not in the tree is returned as
    /// [`Attachment::Orphaned`] and the tree is left unchanged.
    pub fn attach(&mut self, record: PostRecord) -> Result<Attachment> {
        let parent_id = match record.parent_id() {
            Some(id) => id.clone(),
            None => {
                return Err(TreeError::MalformedRecord {
                    post_id: record.id.clone(),
                })
            }
        };

        if self.nodes.contains_key(&record.id) {
            return Err(TreeError::DuplicatePost(record.id.clone()));
        }

        match self.nodes.get_mut(&parent_id) {
            Some(parent) => {
                parent.children.push(record.id.clone());
                let id = record.id.clone();
                self.nodes.insert(id, TreeNode::new(record, Some(parent_id)));
                Ok(Attachment::Attached)
            }
            None => Ok(Attachment::Orphaned(record)),
        }
    }

    /// Nodes in pre-order (children visited in attachment order)
    pub fn preorder(&self) -> Vec<&TreeNode> {
        let mut visited = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![&self.root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(id) {
                visited.push(node);
                stack.extend(node.children.iter().rev());
            }
        }
        visited
    }

    /// Leaves in pre-order discovery order
    pub fn leaves(&self) -> Vec<&TreeNode> {
        self.preorder().into_iter().filter(|n| n.is_leaf()).collect()
    }

    /// Nodes from the root down to `id`, inclusive
    ///
    /// Returns an empty path when `id` is not in the tree.
    pub fn path_from_root(&self, id: &PostId) -> Vec<&TreeNode> {
        let mut path = Vec::new();
        let mut current = self.nodes.get(id);
        while let Some(node) = current {
            path.push(node);
            current = node.parent.as_ref().and_then(|p| self.nodes.get(p));
        }
        path.reverse();
        path
    }

    /// All nodes, unordered
    pub(crate) fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.values()
    }
}

/// Corruption helpers for exercising the structural checks
#[cfg(test)]
impl ConversationTree {
    /// Append `child` to the child list of `parent` without touching the child
    pub(crate) fn push_child_link(&mut self, parent: &PostId, child: impl Into<PostId>) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child.into());
        }
    }

    /// Overwrite a node's parent back-reference
    pub(crate) fn set_parent_link(&mut self, id: &PostId, parent: Option<PostId>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = parent;
        }
    }

    /// Insert a node that no child list points to
    pub(crate) fn insert_unlinked(&mut self, record: PostRecord) {
        let parent = record.parent_id().cloned();
        self.nodes.insert(record.id.clone(), TreeNode::new(record, parent));
    }

    /// Drop a node, leaving any links to it in place
    pub(crate) fn remove_node(&mut self, id: &PostId) {
        self.nodes.remove(id);
    }
}
