//! Tree assembly from an unordered stream of posts

use crate::{Attachment, ConversationTree, OrphanResolver, Result, TreeError};
use delab_domain::{PostId, PostRecord};
use std::collections::HashSet;

/// Collects raw posts of one conversation while enforcing a size cap
///
/// Fetchers push records page by page; once the collected count reaches
/// `max_posts` the conversation is abandoned with
/// [`TreeError::ConversationTooLarge`] before any tree work is done.
/// A cap of `0` disables the check.
#[derive(Debug, Clone, Default)]
pub struct ConversationCollector {
    max_posts: usize,
    records: Vec<PostRecord>,
}

impl ConversationCollector {
    /// Create a collector with the given cap (`0` = unlimited)
    pub fn new(max_posts: usize) -> Self {
        Self {
            max_posts,
            records: Vec::new(),
        }
    }

    /// Add one record
    pub fn push(&mut self, record: PostRecord) -> Result<()> {
        self.records.push(record);
        let size = self.records.len();
        if self.max_posts > 0 && size >= self.max_posts {
            return Err(TreeError::ConversationTooLarge {
                size,
                max: self.max_posts,
            });
        }
        Ok(())
    }

    /// Add a page of records, stopping at the cap
    pub fn extend<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = PostRecord>,
    {
        for record in records {
            self.push(record)?;
        }
        Ok(())
    }

    /// Number of records collected so far
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been collected
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Hand the collected records over
    pub fn into_records(self) -> Vec<PostRecord> {
        self.records
    }
}

/// A tree together with what could not be placed in it
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// The assembled tree
    pub tree: ConversationTree,

    /// Records whose parent never appeared
    pub orphans: Vec<PostRecord>,

    /// Orphans after the initial insertion pass, before resolution
    pub initial_orphans: usize,

    /// Resolver passes needed to reach the fixed point
    pub resolver_passes: usize,
}

/// Assembles conversation trees from a root and its candidate replies
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    sort_by_time: bool,
    max_posts: usize,
    resolver: OrphanResolver,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Builder that sorts candidates by creation time and has no size cap
    pub fn new() -> Self {
        Self {
            sort_by_time: true,
            max_posts: 0,
            resolver: OrphanResolver::new(),
        }
    }

    /// Insert candidates in arrival order instead of creation order
    pub fn unsorted(mut self) -> Self {
        self.sort_by_time = false;
        self
    }

    /// Abort conversations whose candidate count reaches `max_posts` (`0` = unlimited)
    pub fn with_max_posts(mut self, max_posts: usize) -> Self {
        self.max_posts = max_posts;
        self
    }

    /// Build a tree from a separately supplied root
    ///
    /// Candidates equal to the root, and repeated candidates, are dropped
    /// (first occurrence wins). With time sorting enabled, candidates are
    /// inserted in ascending `created_at` order; ties keep arrival order.
    pub fn build<I>(&self, root: PostRecord, candidates: I) -> Result<BuildOutcome>
    where
        I: IntoIterator<Item = PostRecord>,
    {
        let mut collector = ConversationCollector::new(self.max_posts);
        collector.extend(candidates)?;
        let mut candidates = collector.into_records();

        let mut seen: HashSet<PostId> = HashSet::with_capacity(candidates.len() + 1);
        seen.insert(root.id.clone());
        candidates.retain(|record| seen.insert(record.id.clone()));

        if self.sort_by_time {
            candidates.sort_by_key(|record| record.created_at);
        }

        let mut tree = ConversationTree::new(root);
        let mut orphans = Vec::new();
        for record in candidates {
            if let Attachment::Orphaned(record) = tree.attach(record)? {
                orphans.push(record);
            }
        }

        let initial_orphans = orphans.len();
        tracing::debug!(
            "{} orphaned posts for conversation {} before resolution",
            initial_orphans,
            tree.tree_id()
        );

        let resolution = self.resolver.resolve(&mut tree, orphans)?;
        if !resolution.is_complete() {
            tracing::warn!(
                "{} orphaned posts for conversation {} ({} placed)",
                resolution.residue.len(),
                tree.tree_id(),
                tree.total_number_of_posts()
            );
        }

        Ok(BuildOutcome {
            tree,
            orphans: resolution.residue,
            initial_orphans,
            resolver_passes: resolution.passes,
        })
    }

    /// Build a tree whose root is part of the record stream
    pub fn build_rooted<I>(&self, root_id: &PostId, records: I) -> Result<BuildOutcome>
    where
        I: IntoIterator<Item = PostRecord>,
    {
        let mut root = None;
        let mut candidates = Vec::new();
        for record in records {
            if root.is_none() && &record.id == root_id {
                root = Some(record);
            } else {
                candidates.push(record);
            }
        }

        let root = root.ok_or_else(|| TreeError::RootNotFound(root_id.to_string()))?;
        self.build(root, candidates)
    }
}
