//! Metrics collection for sampling runs

use delab_validator::ValidationResult;
use std::collections::BTreeMap;

/// Metrics collected while sampling
///
/// Tracks batches drawn, tree outcomes and accepted flows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SamplerMetrics {
    /// Batches requested from the source
    pub batches: usize,

    /// Batch requests that failed without exhausting the source
    pub source_errors: usize,

    /// Conversations received
    pub trees_drawn: usize,

    /// Trees that passed validation
    pub trees_accepted: usize,

    /// Trees that failed validation
    pub trees_rejected: usize,

    /// Accepted trees dropped because their tree id was already taken
    pub trees_duplicated: usize,

    /// Rejections per reason label (a tree may count under several)
    pub rejections: BTreeMap<&'static str, usize>,

    /// Conversations whose build was aborted (malformed or too large)
    pub conversations_aborted: usize,

    /// Accepted trees dropped because none of their flows was sampled
    pub trees_evicted: usize,

    /// Flows added to the sample
    pub flows_accepted: usize,

    /// Total runtime in milliseconds
    pub total_runtime_ms: u64,
}

impl SamplerMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a batch request
    pub fn record_batch(&mut self) {
        self.batches += 1;
    }

    /// Record a failed batch request
    pub fn record_source_error(&mut self) {
        self.source_errors += 1;
    }

    /// Record conversations received
    pub fn record_drawn(&mut self, count: usize) {
        self.trees_drawn += count;
    }

    /// Record an accepted tree
    pub fn record_accepted(&mut self) {
        self.trees_accepted += 1;
    }

    /// Record a rejected tree and its reasons
    pub fn record_rejection(&mut self, result: &ValidationResult) {
        self.trees_rejected += 1;
        for reason in &result.reasons {
            *self.rejections.entry(reason.label()).or_insert(0) += 1;
        }
    }

    /// Record an accepted tree whose id was already taken
    pub fn record_duplicate(&mut self) {
        self.trees_duplicated += 1;
    }

    /// Record an aborted conversation
    pub fn record_aborted(&mut self) {
        self.conversations_aborted += 1;
    }

    /// Record evicted trees
    pub fn record_evictions(&mut self, count: usize) {
        self.trees_evicted += count;
    }

    /// Record accepted flows
    pub fn record_flows(&mut self, count: usize) {
        self.flows_accepted += count;
    }

    /// Fold another set of metrics into this one
    pub fn merge(&mut self, other: &SamplerMetrics) {
        self.batches += other.batches;
        self.source_errors += other.source_errors;
        self.trees_drawn += other.trees_drawn;
        self.trees_accepted += other.trees_accepted;
        self.trees_rejected += other.trees_rejected;
        self.trees_duplicated += other.trees_duplicated;
        for (&label, count) in &other.rejections {
            *self.rejections.entry(label).or_insert(0) += count;
        }
        self.conversations_aborted += other.conversations_aborted;
        self.trees_evicted += other.trees_evicted;
        self.flows_accepted += other.flows_accepted;
        self.total_runtime_ms += other.total_runtime_ms;
    }

    /// Share of drawn conversations that produced an accepted tree
    pub fn acceptance_rate(&self) -> f64 {
        if self.trees_drawn == 0 {
            0.0
        } else {
            self.trees_accepted as f64 / self.trees_drawn as f64
        }
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Sampler Metrics Summary".to_string(),
            "=======================".to_string(),
            format!("Batches: {} ({} failed)", self.batches, self.source_errors),
            format!("Total runtime: {}ms", self.total_runtime_ms),
            String::new(),
            format!("Trees drawn: {}", self.trees_drawn),
            format!(
                "Trees accepted: {} ({:.1}%)",
                self.trees_accepted,
                self.acceptance_rate() * 100.0
            ),
            format!("Trees rejected: {}", self.trees_rejected),
            format!("Duplicate trees dropped: {}", self.trees_duplicated),
            format!("Conversations aborted: {}", self.conversations_aborted),
            format!("Trees evicted: {}", self.trees_evicted),
            format!("Flows accepted: {}", self.flows_accepted),
        ];

        if !self.rejections.is_empty() {
            lines.push(String::new());
            lines.push("Rejections by reason:".to_string());
            for (label, count) in &self.rejections {
                lines.push(format!("  {}: {}", label, count));
            }
        }

        lines.join("\n")
    }
}
