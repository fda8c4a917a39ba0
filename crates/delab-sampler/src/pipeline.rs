//! Per-conversation pipeline: build, resolve, validate

use crate::{RawConversation, RootSpec, SamplerConfig};
use delab_tree::{BuildOutcome, ConversationTree, FlowExtractor, TreeBuilder, TreeError};
use delab_validator::{TreeValidator, ValidationResult};

/// What became of one conversation
#[derive(Debug, Clone)]
pub enum Processed {
    /// The tree passed validation
    Accepted(ConversationTree),

    /// The tree was built but failed validation
    Rejected(ValidationResult),
}

/// Builder, validator and extractor for one sampling configuration
///
/// Holds no per-conversation state, so a single pipeline can be shared by
/// concurrent tasks.
#[derive(Debug)]
pub struct Pipeline {
    builder: TreeBuilder,
    validator: TreeValidator,
    extractor: FlowExtractor,
}

impl Pipeline {
    /// Assemble the pipeline described by `config`
    pub fn from_config(config: &SamplerConfig) -> Self {
        Self {
            builder: TreeBuilder::new().with_max_posts(config.max_posts_per_conversation),
            validator: TreeValidator::new(config.validation.clone()),
            extractor: FlowExtractor::from_config(&config.filters),
        }
    }

    /// The flow extractor
    pub fn extractor(&self) -> &FlowExtractor {
        &self.extractor
    }

    /// The tree validator
    pub fn validator(&self) -> &TreeValidator {
        &self.validator
    }

    /// Build and validate one conversation
    ///
    /// Fails only when the build is aborted (malformed record, size cap);
    /// a rejected tree is a normal outcome.
    pub fn process(&self, conversation: RawConversation) -> Result<Processed, TreeError> {
        let RawConversation {
            tree_id,
            root,
            posts,
        } = conversation;

        let BuildOutcome { tree, .. } = match root {
            RootSpec::Record(root) => self.builder.build(root, posts)?,
            RootSpec::Id(root_id) => self.builder.build_rooted(&root_id, posts)?,
        };
        let tree = tree.with_tree_id(tree_id);

        let result = self.validator.validate(&tree);
        if result.is_accepted() {
            Ok(Processed::Accepted(tree))
        } else {
            Ok(Processed::Rejected(result))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use delab_domain::{Platform, PostRecord};

    fn post(id: usize, parent: Option<usize>) -> PostRecord {
        let record = PostRecord::new(
            id as u64,
            format!("u{}", id % 2),
            "text",
            Utc.timestamp_opt(id as i64, 0).unwrap(),
            Platform::Mastodon,
        );
        match parent {
            Some(p) => record.with_parent(p as u64),
            None => record,
        }
    }

    fn chain(len: usize) -> Vec<PostRecord> {
        (1..=len).map(|i| post(i, Some(i - 1))).collect()
    }

    fn pipeline() -> Pipeline {
        Pipeline::from_config(&SamplerConfig::default().with_platform(Platform::Mastodon))
    }

    #[test]
    fn test_accepts_deep_conversation() {
        let conversation = RawConversation::new(post(0, None), chain(5)).with_tree_id("t-1");
        match pipeline().process(conversation).unwrap() {
            Processed::Accepted(tree) => {
                assert_eq!(tree.tree_id(), "t-1");
                assert_eq!(tree.depth(), 5);
            }
            other => panic!("Expected Accepted, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_small_conversation() {
        let conversation = RawConversation::new(post(0, None), chain(2));
        match pipeline().process(conversation).unwrap() {
            Processed::Rejected(result) => assert_eq!(result.size, 3),
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_root_inside_posts() {
        let mut posts = chain(5);
        posts.push(post(0, None));
        let conversation = RawConversation::rooted(0u64, posts);
        assert!(matches!(
            pipeline().process(conversation).unwrap(),
            Processed::Accepted(_)
        ));
    }

    #[test]
    fn test_size_cap_aborts() {
        let config = SamplerConfig {
            max_posts_per_conversation: 3,
            ..SamplerConfig::default()
        };
        let conversation = RawConversation::new(post(0, None), chain(5));
        let err = Pipeline::from_config(&config).process(conversation).unwrap_err();
        assert!(matches!(err, TreeError::ConversationTooLarge { max: 3, .. }));
    }
}
