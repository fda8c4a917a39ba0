//! Tree validation logic

use crate::{Result, ValidationConfig, ValidatorError};
use delab_domain::Platform;
use delab_tree::{ConversationTree, StructuralIssue};
use std::fmt;

/// Result of tree validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// Whether the tree passed validation
    pub status: ValidationStatus,

    /// Rejection reasons (if any)
    pub reasons: Vec<RejectionReason>,

    /// Platform whose policy was applied
    pub platform: Platform,

    /// Number of posts in the tree
    pub size: usize,

    /// Longest root-to-leaf path, in edges
    pub depth: usize,
}

impl ValidationResult {
    /// Whether the tree was accepted
    pub fn is_accepted(&self) -> bool {
        self.status == ValidationStatus::Accepted
    }
}

/// Validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Tree accepted
    Accepted,

    /// Tree rejected
    Rejected,
}

/// Reasons for rejection
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// Size not above the exclusive minimum
    TooSmall {
        /// Measured size
        size: usize,
        /// Exclusive minimum
        min: usize,
    },

    /// Size not below the exclusive maximum
    TooLarge {
        /// Measured size
        size: usize,
        /// Exclusive maximum
        max: usize,
    },

    /// Depth below the inclusive minimum
    TooShallow {
        /// Measured depth
        depth: usize,
        /// Inclusive minimum
        min: usize,
    },

    /// The tree is structurally broken
    Structure(StructuralIssue),
}

impl RejectionReason {
    /// Short machine-readable label
    pub fn label(&self) -> &'static str {
        match self {
            RejectionReason::TooSmall { .. } => "too_small",
            RejectionReason::TooLarge { .. } => "too_large",
            RejectionReason::TooShallow { .. } => "too_shallow",
            RejectionReason::Structure(_) => "structure",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::TooSmall { size, min } => {
                write!(f, "size {} is not above {}", size, min)
            }
            RejectionReason::TooLarge { size, max } => {
                write!(f, "size {} is not below {}", size, max)
            }
            RejectionReason::TooShallow { depth, min } => {
                write!(f, "depth {} is below {}", depth, min)
            }
            RejectionReason::Structure(issue) => write!(f, "{}", issue),
        }
    }
}

/// Applies structural checks and the platform size/depth policy to trees
#[derive(Debug, Clone, Default)]
pub struct TreeValidator {
    config: ValidationConfig,
}

impl TreeValidator {
    /// Create a validator with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a validator, rejecting an unusable configuration
    pub fn try_new(config: ValidationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Create a validator with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// The active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a tree against the policy of its own platform
    ///
    /// Trees without a known platform fall back to the Twitter thresholds.
    pub fn validate(&self, tree: &ConversationTree) -> ValidationResult {
        let platform = tree.platform().unwrap_or(Platform::Twitter);
        self.validate_for(tree, platform)
    }

    /// Validate a tree against the policy of `platform`
    pub fn validate_for(&self, tree: &ConversationTree, platform: Platform) -> ValidationResult {
        let policy = self.config.policy(platform);
        let size = tree.total_number_of_posts();
        let depth = tree.depth();
        let mut reasons = Vec::new();

        // 1. Structure
        if let Err(issue) = tree.check_structure(&self.config.structure) {
            reasons.push(RejectionReason::Structure(issue));
        }

        // 2. Size, exclusive on both ends
        if size <= policy.min_size {
            reasons.push(RejectionReason::TooSmall {
                size,
                min: policy.min_size,
            });
        }
        if size >= policy.max_size {
            reasons.push(RejectionReason::TooLarge {
                size,
                max: policy.max_size,
            });
        }

        // 3. Depth, inclusive
        if !policy.depth_within(depth) {
            reasons.push(RejectionReason::TooShallow {
                depth,
                min: policy.min_depth,
            });
        }

        let status = if reasons.is_empty() {
            ValidationStatus::Accepted
        } else {
            ValidationStatus::Rejected
        };

        tracing::debug!(
            "tree {} ({}): size {}, depth {}, {:?}",
            tree.tree_id(),
            platform,
            size,
            depth,
            status
        );
        if self.config.verbose {
            for reason in &reasons {
                tracing::info!("tree {} rejected: {}", tree.tree_id(), reason);
            }
        }

        ValidationResult {
            status,
            reasons,
            platform,
            size,
            depth,
        }
    }

    /// Fail with [`ValidatorError::Structure`] unless the tree is structurally sound
    pub fn ensure_structure(&self, tree: &ConversationTree) -> Result<()> {
        tree.check_structure(&self.config.structure)
            .map_err(|issue| ValidatorError::Structure {
                tree_id: tree.tree_id().to_string(),
                message: issue.to_string(),
            })
    }
}
