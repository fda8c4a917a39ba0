//! Validator configuration
//!
//! Per-platform size and depth thresholds. Size bounds are exclusive, the
//! depth bound is inclusive.

use crate::ValidatorError;
use delab_domain::Platform;
use delab_tree::StructuralChecks;
use serde::{Deserialize, Serialize};

/// Minimum conversation size (exclusive)
pub const MIN_CONVERSATION_LENGTH: usize = 5;

/// Maximum conversation size (exclusive)
pub const MAX_CONVERSATION_LENGTH: usize = 500;

/// Minimum conversation depth (inclusive)
pub const MIN_CONVERSATION_DEPTH: usize = 5;

/// Maximum Reddit conversation size (exclusive)
pub const MAX_CONVERSATION_LENGTH_REDDIT: usize = 50;

/// Minimum Mastodon conversation size (exclusive)
pub const MIN_CONVERSATION_LENGTH_MASTODON: usize = 5;

/// Minimum Mastodon conversation depth (inclusive)
pub const MIN_CONVERSATION_DEPTH_MASTODON: usize = 3;

/// Size and depth thresholds for one platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformPolicy {
    /// Trees must hold more posts than this
    pub min_size: usize,

    /// Trees must hold fewer posts than this
    pub max_size: usize,

    /// Trees must be at least this deep (edges)
    pub min_depth: usize,
}

impl PlatformPolicy {
    /// Create a policy
    pub const fn new(min_size: usize, max_size: usize, min_depth: usize) -> Self {
        Self {
            min_size,
            max_size,
            min_depth,
        }
    }

    /// Default thresholds for a platform
    pub const fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Twitter => Self::new(
                MIN_CONVERSATION_LENGTH,
                MAX_CONVERSATION_LENGTH,
                MIN_CONVERSATION_DEPTH,
            ),
            Platform::Reddit => Self::new(
                MIN_CONVERSATION_LENGTH,
                MAX_CONVERSATION_LENGTH_REDDIT,
                MIN_CONVERSATION_DEPTH,
            ),
            Platform::Mastodon => Self::new(
                MIN_CONVERSATION_LENGTH_MASTODON,
                MAX_CONVERSATION_LENGTH,
                MIN_CONVERSATION_DEPTH_MASTODON,
            ),
        }
    }

    /// `min_size < size < max_size`
    pub fn size_within(&self, size: usize) -> bool {
        self.min_size < size && size < self.max_size
    }

    /// `depth >= min_depth`
    pub fn depth_within(&self, depth: usize) -> bool {
        depth >= self.min_depth
    }

    /// Whether a tree with these measurements passes
    pub fn accepts(&self, size: usize, depth: usize) -> bool {
        self.size_within(size) && self.depth_within(depth)
    }

    /// Pre-download screen on a candidate's advertised reply count
    ///
    /// `min_size / 2 < reply_count < max_size`. Used to skip candidates that
    /// cannot plausibly produce an acceptable tree before fetching them.
    pub fn plausible_reply_count(&self, reply_count: usize) -> bool {
        self.min_size / 2 < reply_count && reply_count < self.max_size
    }
}

/// Configuration for tree validation
///
/// # Examples
///
/// ```
/// use delab_domain::Platform;
/// use delab_validator::ValidationConfig;
///
/// let config = ValidationConfig::default();
/// assert_eq!(config.policy(Platform::Reddit).max_size, 50);
/// assert_eq!(config.policy(Platform::Mastodon).min_depth, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Log the reason for every rejection
    #[serde(default)]
    pub verbose: bool,

    /// Thresholds for Twitter, also the fallback for trees of unknown platform
    #[serde(default = "default_twitter")]
    pub twitter: PlatformPolicy,

    /// Thresholds for Reddit
    #[serde(default = "default_reddit")]
    pub reddit: PlatformPolicy,

    /// Thresholds for Mastodon
    #[serde(default = "default_mastodon")]
    pub mastodon: PlatformPolicy,

    /// Optional structural checks
    #[serde(default)]
    pub structure: StructuralChecks,
}

fn default_twitter() -> PlatformPolicy {
    PlatformPolicy::for_platform(Platform::Twitter)
}

fn default_reddit() -> PlatformPolicy {
    PlatformPolicy::for_platform(Platform::Reddit)
}

fn default_mastodon() -> PlatformPolicy {
    PlatformPolicy::for_platform(Platform::Mastodon)
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            twitter: default_twitter(),
            reddit: default_reddit(),
            mastodon: default_mastodon(),
            structure: StructuralChecks::default(),
        }
    }
}

impl ValidationConfig {
    /// Accept any structurally sound tree
    pub fn permissive() -> Self {
        let open = PlatformPolicy::new(0, u32::MAX as usize, 0);
        Self {
            verbose: false,
            twitter: open,
            reddit: open,
            mastodon: open,
            structure: StructuralChecks::default(),
        }
    }

    /// Default thresholds plus timestamp monotonicity, logging every rejection
    pub fn strict() -> Self {
        Self {
            structure: StructuralChecks {
                require_monotonic_timestamps: true,
            },
            verbose: true,
            ..Self::default()
        }
    }

    /// Thresholds for a platform
    pub fn policy(&self, platform: Platform) -> &PlatformPolicy {
        match platform {
            Platform::Twitter => &self.twitter,
            Platform::Reddit => &self.reddit,
            Platform::Mastodon => &self.mastodon,
        }
    }

    /// Override the thresholds for a platform
    pub fn with_policy(mut self, platform: Platform, policy: PlatformPolicy) -> Self {
        match platform {
            Platform::Twitter => self.twitter = policy,
            Platform::Reddit => self.reddit = policy,
            Platform::Mastodon => self.mastodon = policy,
        }
        self
    }

    /// See [`PlatformPolicy::plausible_reply_count`]
    pub fn plausible_reply_count(&self, platform: Platform, reply_count: usize) -> bool {
        self.policy(platform).plausible_reply_count(reply_count)
    }

    /// Validate the configuration
    ///
    /// A policy whose exclusive size window is empty would reject everything.
    pub fn validate(&self) -> Result<(), ValidatorError> {
        for platform in Platform::ALL {
            let policy = self.policy(platform);
            if policy.max_size <= policy.min_size.saturating_add(1) {
                return Err(ValidatorError::Config(format!(
                    "{}: no size satisfies {} < size < {}",
                    platform, policy.min_size, policy.max_size
                )));
            }
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ValidatorError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| ValidatorError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ValidatorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ValidatorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert_eq!(config.twitter, PlatformPolicy::new(5, 500, 5));
        assert_eq!(config.reddit, PlatformPolicy::new(5, 50, 5));
        assert_eq!(config.mastodon, PlatformPolicy::new(5, 500, 3));
        assert!(!config.structure.require_monotonic_timestamps);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_permissive_config() {
        let config = ValidationConfig::permissive();
        assert!(config.policy(Platform::Reddit).accepts(1, 0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strict_config() {
        let config = ValidationConfig::strict();
        assert!(config.structure.require_monotonic_timestamps);
        assert_eq!(config.reddit.max_size, MAX_CONVERSATION_LENGTH_REDDIT);
    }

    #[test]
    fn test_policy_bounds() {
        let policy = PlatformPolicy::new(5, 50, 5);
        assert!(!policy.accepts(5, 5));
        assert!(policy.accepts(6, 5));
        assert!(policy.accepts(49, 9));
        assert!(!policy.accepts(50, 9));
        assert!(!policy.accepts(10, 4));
    }

    #[test]
    fn test_plausible_reply_count() {
        let config = ValidationConfig::default();
        assert!(!config.plausible_reply_count(Platform::Reddit, 2));
        assert!(config.plausible_reply_count(Platform::Reddit, 3));
        assert!(config.plausible_reply_count(Platform::Reddit, 49));
        assert!(!config.plausible_reply_count(Platform::Reddit, 50));
        assert!(config.plausible_reply_count(Platform::Twitter, 400));
    }

    #[test]
    fn test_empty_window_rejected() {
        let config = ValidationConfig::default()
            .with_policy(Platform::Mastodon, PlatformPolicy::new(5, 6, 3));
        assert!(matches!(config.validate(), Err(ValidatorError::Config(_))));
    }

    #[test]
    fn test_toml_partial_override() {
        let toml = r#"
            verbose = true

            [reddit]
            min_size = 3
            max_size = 100
            min_depth = 2
        "#;
        let config = ValidationConfig::from_toml(toml).unwrap();
        assert!(config.verbose);
        assert_eq!(config.reddit, PlatformPolicy::new(3, 100, 2));
        assert_eq!(config.twitter, PlatformPolicy::for_platform(Platform::Twitter));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ValidationConfig::strict();
        let toml = config.to_toml().unwrap();
        assert_eq!(ValidationConfig::from_toml(&toml).unwrap(), config);
    }
}
