//! Background worker for continuous sampling

use crate::{DailySampler, SamplerConfig, SamplerError, SamplerMetrics, StopReason, TreeSource};
use tokio::time::{interval, Duration};

/// Background worker that draws batches on a schedule
///
/// Runs the [`DailySampler`] one batch per tick until it stops on its own or
/// a shutdown signal (Ctrl+C) arrives.
///
/// # Examples
///
/// ```no_run
/// use delab_sampler::{
///     RawConversation, SamplerConfig, SamplerWorker, SamplingContext, SourceError, TreeSource,
/// };
///
/// struct Fetcher;
///
/// impl TreeSource for Fetcher {
///     fn next_batch(
///         &mut self,
///         _context: &mut SamplingContext,
///     ) -> Result<Vec<RawConversation>, SourceError> {
///         Err(SourceError::Exhausted)
///     }
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut worker = SamplerWorker::new(SamplerConfig::default())?;
///
///     // Run until done or Ctrl+C
///     let reason = worker.run(&mut Fetcher).await?;
///     println!("stopped: {:?}", reason);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct SamplerWorker {
    sampler: DailySampler,
    interval: Duration,
}

impl SamplerWorker {
    /// Create a new background worker with the given configuration
    pub fn new(config: SamplerConfig) -> Result<Self, SamplerError> {
        // tokio intervals must be non-zero
        let interval = config.batch_interval().max(Duration::from_millis(1));
        Ok(Self {
            sampler: DailySampler::new(config)?,
            interval,
        })
    }

    /// Create a worker with default configuration
    pub fn default_config() -> Result<Self, SamplerError> {
        Self::new(SamplerConfig::default())
    }

    /// Run until the sampler stops or a shutdown signal is received
    pub async fn run<S: TreeSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<StopReason, SamplerError> {
        let mut ticker = interval(self.interval);

        tracing::info!("Sampler worker started (interval: {:?})", self.interval);

        let reason = loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some(reason) = self.sampler.advance(source) {
                        break reason;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping sampler");
                    break StopReason::Interrupted;
                }
            }
        };

        tracing::info!(
            "Sampler worker stopped ({:?}). Final metrics:\n{}",
            reason,
            self.sampler.metrics().summary()
        );
        Ok(reason)
    }

    /// Run at most `batches` batches (useful for testing)
    ///
    /// Returns the stop reason if the sampler stopped on its own.
    pub async fn run_batches<S: TreeSource + ?Sized>(
        &mut self,
        source: &mut S,
        batches: usize,
    ) -> Option<StopReason> {
        let mut ticker = interval(self.interval);

        for batch in 0..batches {
            ticker.tick().await;
            tracing::debug!("Starting batch {}/{}", batch + 1, batches);

            if let Some(reason) = self.sampler.advance(source) {
                tracing::info!("Sampler stopped after {} batches: {:?}", batch + 1, reason);
                return Some(reason);
            }
        }
        None
    }

    /// The wrapped sampler
    pub fn sampler(&self) -> &DailySampler {
        &self.sampler
    }

    /// Consume the worker, returning the sampler and its collected sample
    pub fn into_sampler(self) -> DailySampler {
        self.sampler
    }

    /// Get a reference to the sampler's current metrics
    pub fn metrics(&self) -> &SamplerMetrics {
        self.sampler.metrics()
    }

    /// Reset the sampler's metrics counters
    pub fn reset_metrics(&mut self) {
        self.sampler.reset_metrics();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RawConversation, SamplingContext, SourceError};
    use chrono::{TimeZone, Utc};
    use delab_domain::{Platform, PostRecord};

    // Mock source: `remaining` deep threads, then exhaustion
    struct MockSource {
        remaining: usize,
    }

    impl TreeSource for MockSource {
        fn next_batch(
            &mut self,
            _context: &mut SamplingContext,
        ) -> Result<Vec<RawConversation>, SourceError> {
            if self.remaining == 0 {
                return Err(SourceError::Exhausted);
            }
            self.remaining -= 1;

            let tree = format!("t{}", self.remaining);
            let post = |i: usize| {
                PostRecord::new(
                    format!("{}-{}", tree, i),
                    format!("u{}", i % 2),
                    "text",
                    Utc.timestamp_opt(i as i64, 0).unwrap(),
                    Platform::Reddit,
                )
            };
            let posts = (1..=6)
                .map(|i| post(i).with_parent(format!("{}-{}", tree, i - 1)))
                .collect();
            Ok(vec![RawConversation::new(post(0), posts).with_tree_id(tree.clone())])
        }
    }

    fn config(quota: usize) -> SamplerConfig {
        SamplerConfig {
            quota,
            batch_interval_ms: 1,
            ..SamplerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_worker_creation() {
        let worker = SamplerWorker::default_config().unwrap();
        assert_eq!(worker.metrics().batches, 0);
    }

    #[tokio::test]
    async fn test_run_batches() {
        let mut worker = SamplerWorker::new(config(10)).unwrap();
        let mut source = MockSource { remaining: 5 };

        assert_eq!(worker.run_batches(&mut source, 2).await, None);
        assert_eq!(worker.metrics().batches, 2);
        assert_eq!(worker.sampler().flows().len(), 2);
    }

    #[tokio::test]
    async fn test_run_until_quota() {
        let mut worker = SamplerWorker::new(config(3)).unwrap();
        let mut source = MockSource { remaining: 5 };

        let reason = worker.run(&mut source).await.unwrap();
        assert_eq!(reason, StopReason::QuotaReached);
        assert_eq!(source.remaining, 2);

        let (flows, trees) = worker.into_sampler().into_sample();
        assert_eq!(flows.len(), 3);
        assert_eq!(trees.len(), 3);
    }

    #[tokio::test]
    async fn test_run_until_exhausted() {
        let mut worker = SamplerWorker::new(config(50)).unwrap();
        let mut source = MockSource { remaining: 2 };

        let reason = worker.run_batches(&mut source, 10).await;
        assert_eq!(reason, Some(StopReason::SourceExhausted));
        assert_eq!(worker.sampler().flows().len(), 2);
    }

    #[tokio::test]
    async fn test_reset_metrics() {
        let mut worker = SamplerWorker::new(config(10)).unwrap();
        let mut source = MockSource { remaining: 1 };

        worker.run_batches(&mut source, 1).await;
        assert_eq!(worker.metrics().batches, 1);

        worker.reset_metrics();
        assert_eq!(worker.metrics().batches, 0);
    }
}
