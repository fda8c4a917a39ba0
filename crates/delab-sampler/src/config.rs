//! Configuration for sampling runs
//!
//! Defines the flow quota, the batch cap and the per-batch sample size, plus
//! the validation and filter settings handed to the pipeline.

use crate::SamplerError;
use delab_domain::{Language, Platform};
use delab_tree::FlowFilterConfig;
use delab_validator::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Flows a daily sample needs
pub const DAILY_FLOWS_NEEDED: usize = 50;

/// Flows taken from each accepted batch
pub const FLOWS_PER_BATCH: usize = 5;

/// Configuration for the daily sampler
///
/// # Examples
///
/// ```
/// use delab_sampler::SamplerConfig;
///
/// // Default configuration
/// let config = SamplerConfig::default();
/// assert_eq!(config.quota, 50);
///
/// // Small quota for smoke runs
/// let config = SamplerConfig::quick();
/// assert_eq!(config.quota, 10);
///
/// // Large quota, many attempts
/// let config = SamplerConfig::thorough();
/// assert_eq!(config.quota, 200);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Flows to collect before stopping
    /// Default: 50
    #[serde(default = "default_quota")]
    pub quota: usize,

    /// Batches to draw before giving up, quota reached or not
    /// Default: 100
    #[serde(default = "default_max_batches")]
    pub max_batches: usize,

    /// Flows sampled from each batch
    /// Default: 5
    #[serde(default = "default_flows_per_batch")]
    pub flows_per_batch: usize,

    /// Platform to sample
    /// Default: reddit
    #[serde(default = "default_platform")]
    pub platform: Platform,

    /// Language to sample
    /// Default: en
    #[serde(default)]
    pub language: Language,

    /// Abort a conversation once this many raw posts arrive (0 = unlimited)
    /// Default: 0
    #[serde(default)]
    pub max_posts_per_conversation: usize,

    /// Pause between batches in the background worker (milliseconds)
    /// Default: 1000
    #[serde(default = "default_batch_interval_ms")]
    pub batch_interval_ms: u64,

    /// Flow filters
    #[serde(default)]
    pub filters: FlowFilterConfig,

    /// Tree validation thresholds
    #[serde(default)]
    pub validation: ValidationConfig,
}

fn default_quota() -> usize {
    DAILY_FLOWS_NEEDED
}

fn default_max_batches() -> usize {
    100
}

fn default_flows_per_batch() -> usize {
    FLOWS_PER_BATCH
}

fn default_platform() -> Platform {
    Platform::Reddit
}

fn default_batch_interval_ms() -> u64 {
    1000
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            quota: DAILY_FLOWS_NEEDED,
            max_batches: default_max_batches(),
            flows_per_batch: FLOWS_PER_BATCH,
            platform: default_platform(),
            language: Language::default(),
            max_posts_per_conversation: 0,
            batch_interval_ms: default_batch_interval_ms(),
            filters: FlowFilterConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl SamplerConfig {
    /// Small quota and few attempts, for smoke runs
    pub fn quick() -> Self {
        Self {
            quota: 10,
            max_batches: 20,
            batch_interval_ms: 100,
            ..Self::default()
        }
    }

    /// Large quota with many attempts
    pub fn thorough() -> Self {
        Self {
            quota: 200,
            max_batches: 1000,
            ..Self::default()
        }
    }

    /// Sample a different platform
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Pause between worker batches as Duration
    pub fn batch_interval(&self) -> Duration {
        Duration::from_millis(self.batch_interval_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), SamplerError> {
        if self.quota == 0 {
            return Err(SamplerError::Config("quota must be greater than 0".to_string()));
        }
        if self.max_batches == 0 {
            return Err(SamplerError::Config(
                "max_batches must be greater than 0".to_string(),
            ));
        }
        if self.flows_per_batch == 0 {
            return Err(SamplerError::Config(
                "flows_per_batch must be greater than 0".to_string(),
            ));
        }
        self.filters.validate().map_err(SamplerError::Config)?;
        self.validation
            .validate()
            .map_err(|e| SamplerError::Config(e.to_string()))?;
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, SamplerError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| SamplerError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SamplerError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SamplerError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, SamplerError> {
        toml::to_string_pretty(self)
            .map_err(|e| SamplerError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SamplerConfig::default();
        assert_eq!(config.quota, 50);
        assert_eq!(config.max_batches, 100);
        assert_eq!(config.flows_per_batch, 5);
        assert_eq!(config.platform, Platform::Reddit);
        assert_eq!(config.language, Language::English);
        assert_eq!(config.max_posts_per_conversation, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_quick_config() {
        let config = SamplerConfig::quick();
        assert_eq!(config.quota, 10);
        assert_eq!(config.max_batches, 20);
        assert!(config.quota < SamplerConfig::default().quota);
    }

    #[test]
    fn test_thorough_config() {
        let config = SamplerConfig::thorough();
        assert_eq!(config.quota, 200);
        assert!(config.max_batches > SamplerConfig::default().max_batches);
    }

    #[test]
    fn test_zero_quota_rejected() {
        let config = SamplerConfig {
            quota: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SamplerError::Config(_))));
    }

    #[test]
    fn test_from_toml_with_nested_tables() {
        let toml = r#"
            quota = 20
            platform = "mastodon"
            language = "de"

            [filters]
            reject_self_answers = false

            [validation.mastodon]
            min_size = 4
            max_size = 100
            min_depth = 2
        "#;
        let config = SamplerConfig::from_toml(toml).unwrap();
        assert_eq!(config.quota, 20);
        assert_eq!(config.platform, Platform::Mastodon);
        assert_eq!(config.language, Language::German);
        assert!(!config.filters.reject_self_answers);
        assert!(config.filters.filter_content);
        assert_eq!(config.validation.mastodon.min_depth, 2);
        assert_eq!(config.max_batches, 100);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "quota = 7\nflows_per_batch = 2").unwrap();

        let config = SamplerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.quota, 7);
        assert_eq!(config.flows_per_batch, 2);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SamplerConfig::from_file(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(SamplerError::Config(_))));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = SamplerConfig::quick().with_platform(Platform::Twitter);
        let toml = config.to_toml().unwrap();
        assert_eq!(SamplerConfig::from_toml(&toml).unwrap(), config);
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = SamplerConfig::default();
        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: SamplerConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }
}
