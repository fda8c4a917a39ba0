//! Daily sampling loop
//!
//! Draws candidate batches from a [`TreeSource`] until enough flows have been
//! collected, the source runs dry, or the batch cap is hit.

use crate::{
    Pipeline, Processed, RawConversation, SamplerConfig, SamplerError, SamplerMetrics,
    SamplingContext, TreeSource,
};
use delab_tree::{Flow, Forest};
use std::collections::HashSet;
use std::time::Instant;

/// Sampler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    /// Still collecting flows
    Accumulating,

    /// Quota reached
    Done,
}

/// Why a sampling run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Enough flows were collected
    QuotaReached,

    /// The source has nothing left
    SourceExhausted,

    /// `max_batches` batches were drawn without reaching the quota
    BatchLimit,

    /// A shutdown signal arrived
    Interrupted,
}

/// Collects a daily sample of conversation flows
///
/// Each batch goes through build → validate → extract. Accepted trees form a
/// per-batch forest; up to `flows_per_batch` flows are sampled from it, the
/// trees that contributed are retained and every other tree is evicted. The
/// flow accumulator only grows.
///
/// # Examples
///
/// ```
/// use delab_sampler::{
///     DailySampler, RawConversation, SamplerConfig, SamplingContext, SourceError, StopReason,
///     TreeSource,
/// };
///
/// struct Empty;
///
/// impl TreeSource for Empty {
///     fn next_batch(
///         &mut self,
///         _context: &mut SamplingContext,
///     ) -> Result<Vec<RawConversation>, SourceError> {
///         Err(SourceError::Exhausted)
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut sampler = DailySampler::new(SamplerConfig::default())?;
/// assert_eq!(sampler.run(&mut Empty), StopReason::SourceExhausted);
/// assert!(sampler.flows().is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DailySampler {
    config: SamplerConfig,
    pipeline: Pipeline,
    context: SamplingContext,
    state: SamplerState,
    flows: Vec<Flow>,
    retained: Forest,
    metrics: SamplerMetrics,
    // Survives metrics resets; the batch cap is checked against it.
    batches_drawn: usize,
}

impl DailySampler {
    /// Create a sampler, rejecting an invalid configuration
    pub fn new(config: SamplerConfig) -> Result<Self, SamplerError> {
        config.validate()?;
        Ok(Self {
            pipeline: Pipeline::from_config(&config),
            context: SamplingContext::new(config.platform, config.language),
            state: SamplerState::Accumulating,
            flows: Vec::new(),
            retained: Forest::new(),
            metrics: SamplerMetrics::new(),
            batches_drawn: 0,
            config,
        })
    }

    /// Create a sampler with default configuration
    pub fn default_config() -> Result<Self, SamplerError> {
        Self::new(SamplerConfig::default())
    }

    /// The active configuration
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Current state
    pub fn state(&self) -> SamplerState {
        self.state
    }

    /// Flows collected so far
    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    /// Trees that contributed at least one flow
    pub fn retained(&self) -> &Forest {
        &self.retained
    }

    /// Sampling context shared with the source
    pub fn context(&self) -> &SamplingContext {
        &self.context
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &SamplerMetrics {
        &self.metrics
    }

    /// Batches drawn since the sampler was created
    pub fn batches_drawn(&self) -> usize {
        self.batches_drawn
    }

    /// Reset metrics counters
    ///
    /// The batch cap keeps counting from [`batches_drawn`](Self::batches_drawn).
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Hand over the collected flows and retained trees
    pub fn into_sample(self) -> (Vec<Flow>, Forest) {
        (self.flows, self.retained)
    }

    /// Draw and process one batch
    ///
    /// Returns the state after the batch. Source errors are passed through;
    /// the caller decides whether they end the run.
    pub fn step<S: TreeSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<SamplerState, SamplerError> {
        if self.state == SamplerState::Done {
            return Ok(self.state);
        }

        let start = Instant::now();
        self.metrics.record_batch();
        self.batches_drawn += 1;
        self.context.batch += 1;

        let batch = source.next_batch(&mut self.context);
        let result = batch
            .map_err(SamplerError::from)
            .map(|batch| self.process_batch(batch));
        self.metrics.total_runtime_ms += start.elapsed().as_millis() as u64;

        result.map(|()| self.state)
    }

    /// Run batches until the quota, source exhaustion or the batch cap
    pub fn run<S: TreeSource + ?Sized>(&mut self, source: &mut S) -> StopReason {
        tracing::info!(
            "Sampling {} flows from {} ({}), at most {} batches",
            self.config.quota,
            self.config.platform,
            self.config.language,
            self.config.max_batches
        );

        let reason = loop {
            if let Some(reason) = self.advance(source) {
                break reason;
            }
        };

        tracing::info!(
            "Sampling stopped ({:?}) with {} flows. Final metrics:\n{}",
            reason,
            self.flows.len(),
            self.metrics.summary()
        );
        reason
    }

    /// One step plus the stop decision; `None` means keep going
    pub(crate) fn advance<S: TreeSource + ?Sized>(&mut self, source: &mut S) -> Option<StopReason> {
        if self.state == SamplerState::Done {
            return Some(StopReason::QuotaReached);
        }
        if self.batches_drawn >= self.config.max_batches {
            return Some(StopReason::BatchLimit);
        }

        match self.step(source) {
            Ok(SamplerState::Done) => return Some(StopReason::QuotaReached),
            Ok(SamplerState::Accumulating) => {}
            Err(e) if e.is_exhausted() => {
                tracing::info!("Source exhausted after {} batches", self.batches_drawn);
                return Some(StopReason::SourceExhausted);
            }
            Err(e) => {
                self.metrics.record_source_error();
                tracing::warn!("Batch {} failed: {}", self.batches_drawn, e);
            }
        }

        if self.batches_drawn >= self.config.max_batches {
            tracing::warn!(
                "Batch limit {} reached with {}/{} flows",
                self.config.max_batches,
                self.flows.len(),
                self.config.quota
            );
            return Some(StopReason::BatchLimit);
        }
        None
    }

    fn process_batch(&mut self, batch: Vec<RawConversation>) {
        self.metrics.record_drawn(batch.len());

        let mut accepted = Vec::new();
        let mut taken: HashSet<String> = self.retained.tree_ids().map(str::to_string).collect();
        for conversation in batch {
            let tree_id = conversation.tree_id.clone();
            match self.pipeline.process(conversation) {
                Ok(Processed::Accepted(tree)) => {
                    // First tree with a given id wins, within the batch and across batches.
                    if taken.insert(tree_id.clone()) {
                        self.metrics.record_accepted();
                        accepted.push(tree);
                    } else {
                        self.metrics.record_duplicate();
                        tracing::warn!("Dropping accepted tree {}: tree id already taken", tree_id);
                    }
                }
                Ok(Processed::Rejected(result)) => {
                    self.metrics.record_rejection(&result);
                }
                Err(e) => {
                    self.metrics.record_aborted();
                    tracing::error!("Conversation {} aborted: {}", tree_id, e);
                }
            }
        }

        if accepted.is_empty() {
            tracing::debug!("Batch {} produced no valid trees", self.context.batch);
            return;
        }

        let mut forest = Forest::from_trees(accepted);
        let sample = forest.flow_sample(self.config.flows_per_batch, self.pipeline.extractor());
        let contributors: Vec<String> = sample.iter().map(|f| f.tree_id().to_string()).collect();
        let evicted = forest.keep(contributors.iter().map(String::as_str));

        self.metrics.record_evictions(evicted.len());
        self.metrics.record_flows(sample.len());
        tracing::debug!(
            "Batch {}: {} flows from {} trees, {} evicted",
            self.context.batch,
            sample.len(),
            forest.len(),
            evicted.len()
        );

        self.flows.extend(sample);
        for tree in forest.into_trees() {
            self.retained.insert(tree);
        }

        if self.flows.len() >= self.config.quota {
            self.state = SamplerState::Done;
        }
    }
}
