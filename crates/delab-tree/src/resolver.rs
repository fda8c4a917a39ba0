//! Fixed-point orphan resolution

use crate::{Attachment, ConversationTree, Result};
use delab_domain::PostRecord;

/// Result of resolving a worklist of orphans against a tree
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Records whose parent never appeared
    pub residue: Vec<PostRecord>,

    /// Full passes made over the worklist
    pub passes: usize,

    /// Records attached during resolution
    pub attached: usize,
}

impl Resolution {
    /// Whether every orphan found its parent
    pub fn is_complete(&self) -> bool {
        self.residue.is_empty()
    }
}

/// Retries orphaned records until a pass attaches nothing
///
/// Each pass sees the tree as it stands after every attachment made earlier in
/// the same pass, so a chain of orphans delivered child-first can resolve in
/// one pass once its top-most parent is present. The orphan count never grows
/// and drops on every pass but the last, which bounds the loop; the worst case
/// is O(n²) when each pass frees exactly one record.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrphanResolver;

impl OrphanResolver {
    /// Create a resolver
    pub fn new() -> Self {
        Self
    }

    /// Attach as many orphans as possible and return the rest
    ///
    /// An empty worklist is a no-op: zero passes, empty residue.
    pub fn resolve(
        &self,
        tree: &mut ConversationTree,
        orphans: Vec<PostRecord>,
    ) -> Result<Resolution> {
        let mut worklist = orphans;
        let mut resolution = Resolution::default();

        while !worklist.is_empty() {
            resolution.passes += 1;
            let before = worklist.len();
            let mut remaining = Vec::with_capacity(before);

            for record in worklist {
                match tree.attach(record)? {
                    Attachment::Attached => resolution.attached += 1,
                    Attachment::Orphaned(record) => remaining.push(record),
                }
            }

            worklist = remaining;
            tracing::trace!(
                "orphan pass {} attached {} of {}",
                resolution.passes,
                before - worklist.len(),
                before
            );

            if worklist.len() == before {
                break;
            }
        }

        resolution.residue = worklist;
        Ok(resolution)
    }
}
