//! Sequence-level flow filters
//!
//! Filters judge a whole flow rather than single posts because some policies
//! (self answers) depend on neighbouring posts. Configured filters are ANDed.

use delab_domain::PostRecord;
use serde::{Deserialize, Serialize};

/// Posts at or above this many characters disqualify a flow
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 500;

/// Substrings marking removed posts or moderator commands
pub const DEFAULT_BLOCKED_PHRASES: [&str; 4] = ["[removed]", "[entfernt]", "!approve", "!ban"];

/// A predicate over an entire flow (root first)
pub trait FlowFilter: Send + Sync {
    /// Whether the flow may be kept
    fn accept(&self, flow: &[PostRecord]) -> bool;
}

impl<F> FlowFilter for F
where
    F: Fn(&[PostRecord]) -> bool + Send + Sync,
{
    fn accept(&self, flow: &[PostRecord]) -> bool {
        self(flow)
    }
}

/// Every post must be short and free of removal/moderation markers
#[derive(Debug, Clone)]
pub struct ContentFilter {
    max_text_length: usize,
    blocked_phrases: Vec<String>,
}

impl ContentFilter {
    /// Create a content filter
    pub fn new(max_text_length: usize, blocked_phrases: Vec<String>) -> Self {
        Self {
            max_text_length,
            blocked_phrases,
        }
    }

    /// Check a single post
    pub fn accept_post(&self, post: &PostRecord) -> bool {
        post.text.chars().count() < self.max_text_length
            && !self
                .blocked_phrases
                .iter()
                .any(|phrase| post.text.contains(phrase.as_str()))
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_TEXT_LENGTH,
            DEFAULT_BLOCKED_PHRASES.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl FlowFilter for ContentFilter {
    fn accept(&self, flow: &[PostRecord]) -> bool {
        flow.iter().all(|post| self.accept_post(post))
    }
}

/// Rejects flows where an author answers their own post
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfAnswerFilter;

impl FlowFilter for SelfAnswerFilter {
    fn accept(&self, flow: &[PostRecord]) -> bool {
        flow.windows(2).all(|pair| pair[0].author_id != pair[1].author_id)
    }
}

/// Configuration for the standard flow filters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowFilterConfig {
    /// Enable the content filter
    #[serde(default = "default_true")]
    pub filter_content: bool,

    /// Exclusive upper bound on post length (characters)
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// Substrings that disqualify a post
    #[serde(default = "default_blocked_phrases")]
    pub blocked_phrases: Vec<String>,

    /// Enable the self-answer filter
    #[serde(default = "default_true")]
    pub reject_self_answers: bool,
}

fn default_true() -> bool {
    true
}

fn default_max_text_length() -> usize {
    DEFAULT_MAX_TEXT_LENGTH
}

fn default_blocked_phrases() -> Vec<String> {
    DEFAULT_BLOCKED_PHRASES.iter().map(|s| s.to_string()).collect()
}

impl Default for FlowFilterConfig {
    fn default() -> Self {
        Self {
            filter_content: true,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            blocked_phrases: default_blocked_phrases(),
            reject_self_answers: true,
        }
    }
}

impl FlowFilterConfig {
    /// Keep every flow
    pub fn permissive() -> Self {
        Self {
            filter_content: false,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            blocked_phrases: Vec::new(),
            reject_self_answers: false,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.filter_content && self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.blocked_phrases.iter().any(|p| p.is_empty()) {
            return Err("blocked_phrases must not contain empty strings".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }

    /// Instantiate the enabled filters
    pub fn build_filters(&self) -> Vec<Box<dyn FlowFilter>> {
        let mut filters: Vec<Box<dyn FlowFilter>> = Vec::new();
        if self.filter_content {
            filters.push(Box::new(ContentFilter::new(
                self.max_text_length,
                self.blocked_phrases.clone(),
            )));
        }
        if self.reject_self_answers {
            filters.push(Box::new(SelfAnswerFilter));
        }
        filters
    }
}
