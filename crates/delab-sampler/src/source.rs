//! Candidate sources and sampling context

use crate::SourceError;
use delab_domain::{Language, Platform, PostId, PostRecord};
use std::collections::HashSet;

/// Where the root of a raw conversation comes from
#[derive(Debug, Clone, PartialEq)]
pub enum RootSpec {
    /// Root supplied next to the replies
    Record(PostRecord),

    /// Root is one of the posts, identified by id
    Id(PostId),
}

/// One conversation as delivered by a source: a root and its replies in arrival order
#[derive(Debug, Clone, PartialEq)]
pub struct RawConversation {
    /// Identifier for the resulting tree
    pub tree_id: String,

    /// Root of the conversation
    pub root: RootSpec,

    /// Replies, in no particular order
    pub posts: Vec<PostRecord>,
}

impl RawConversation {
    /// Conversation with a separately supplied root; the tree id is the root id
    pub fn new(root: PostRecord, posts: Vec<PostRecord>) -> Self {
        Self {
            tree_id: root.id.to_string(),
            root: RootSpec::Record(root),
            posts,
        }
    }

    /// Conversation whose root is among `posts`
    pub fn rooted(root_id: impl Into<PostId>, posts: Vec<PostRecord>) -> Self {
        let root_id = root_id.into();
        Self {
            tree_id: root_id.to_string(),
            root: RootSpec::Id(root_id),
            posts,
        }
    }

    /// Override the tree id
    pub fn with_tree_id(mut self, tree_id: impl Into<String>) -> Self {
        self.tree_id = tree_id.into();
        self
    }
}

/// Sampler-owned state handed to the source with every request
#[derive(Debug, Clone)]
pub struct SamplingContext {
    /// Platform being sampled
    pub platform: Platform,

    /// Language being sampled
    pub language: Language,

    /// Batches requested so far (1-based during a request)
    pub batch: usize,

    tried_topics: HashSet<String>,
}

impl SamplingContext {
    /// Fresh context
    pub fn new(platform: Platform, language: Language) -> Self {
        Self {
            platform,
            language,
            batch: 0,
            tried_topics: HashSet::new(),
        }
    }

    /// Remember a topic; returns `false` if it was already tried
    pub fn mark_tried(&mut self, topic: impl Into<String>) -> bool {
        self.tried_topics.insert(topic.into())
    }

    /// Whether a topic was already tried
    pub fn has_tried(&self, topic: &str) -> bool {
        self.tried_topics.contains(topic)
    }

    /// Number of topics tried
    pub fn tried_count(&self) -> usize {
        self.tried_topics.len()
    }
}

/// Supplies batches of candidate conversations
///
/// Implementations wrap the platform fetchers. A source signals that it has
/// nothing left with [`SourceError::Exhausted`]; any other error is treated
/// as transient by the sampler.
pub trait TreeSource {
    /// Draw the next batch of candidates
    fn next_batch(
        &mut self,
        context: &mut SamplingContext,
    ) -> Result<Vec<RawConversation>, SourceError>;
}
