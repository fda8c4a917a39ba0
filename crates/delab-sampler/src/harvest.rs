//! Parallel per-conversation harvesting

use crate::{Pipeline, Processed, RawConversation, SamplerConfig, SamplerError, SamplerMetrics};
use delab_tree::{Flow, Forest};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Everything harvested from a set of conversations
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    /// Accepted flows, grouped by tree in tree-id order
    pub flows: Vec<Flow>,

    /// Accepted trees
    pub trees: Forest,

    /// Outcome counters
    pub metrics: SamplerMetrics,
}

/// Runs the build → validate → extract pipeline for many conversations concurrently
///
/// Each conversation is an independent task; results are merged into one
/// accumulator behind a single mutex. A conversation whose build aborts is
/// counted and skipped without affecting the others.
#[derive(Debug, Clone)]
pub struct Harvester {
    pipeline: Arc<Pipeline>,
}

impl Harvester {
    /// Create a harvester, rejecting an invalid configuration
    pub fn new(config: &SamplerConfig) -> Result<Self, SamplerError> {
        config.validate()?;
        Ok(Self {
            pipeline: Arc::new(Pipeline::from_config(config)),
        })
    }

    /// Harvest every accepted flow from `conversations`
    pub async fn harvest(
        &self,
        conversations: Vec<RawConversation>,
    ) -> Result<Harvest, SamplerError> {
        let start = Instant::now();
        let total = conversations.len();
        let accumulator = Arc::new(Mutex::new(Harvest::default()));
        let mut tasks = JoinSet::new();

        for conversation in conversations {
            let pipeline = Arc::clone(&self.pipeline);
            let accumulator = Arc::clone(&accumulator);
            tasks.spawn(async move {
                let tree_id = conversation.tree_id.clone();
                let outcome = pipeline.process(conversation);

                let mut harvest = accumulator.lock().await;
                harvest.metrics.record_drawn(1);
                match outcome {
                    Ok(Processed::Accepted(_)) if harvest.trees.get(&tree_id).is_some() => {
                        harvest.metrics.record_duplicate();
                        tracing::warn!("Dropping accepted tree {}: tree id already taken", tree_id);
                    }
                    Ok(Processed::Accepted(tree)) => {
                        let flows = pipeline.extractor().extract(&tree).into_vec();
                        harvest.metrics.record_accepted();
                        harvest.metrics.record_flows(flows.len());
                        harvest.flows.extend(flows);
                        harvest.trees.insert(tree);
                    }
                    Ok(Processed::Rejected(result)) => {
                        harvest.metrics.record_rejection(&result);
                    }
                    Err(e) => {
                        harvest.metrics.record_aborted();
                        tracing::error!("Conversation {} aborted: {}", tree_id, e);
                    }
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            joined.map_err(|e| SamplerError::Worker(format!("Harvest task failed: {}", e)))?;
        }

        let accumulator = Arc::try_unwrap(accumulator)
            .map_err(|_| SamplerError::Worker("Harvest accumulator still shared".to_string()))?;
        let mut harvest = accumulator.into_inner();

        // Tasks finish in any order; flows of one tree stay contiguous.
        harvest.flows.sort_by(|a, b| a.tree_id().cmp(b.tree_id()));
        harvest.metrics.total_runtime_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Harvested {} flows from {} of {} conversations",
            harvest.flows.len(),
            harvest.metrics.trees_accepted,
            total
        );
        Ok(harvest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use delab_domain::{Platform, PostRecord};

    fn conversation(tree: &str, len: usize) -> RawConversation {
        let post = |i: usize| {
            PostRecord::new(
                format!("{}-{}", tree, i),
                format!("u{}", i % 2),
                "text",
                Utc.timestamp_opt(i as i64, 0).unwrap(),
                Platform::Mastodon,
            )
        };
        let posts = (1..=len)
            .map(|i| post(i).with_parent(format!("{}-{}", tree, i - 1)))
            .collect();
        RawConversation::new(post(0), posts).with_tree_id(tree)
    }

    #[tokio::test]
    async fn test_harvest_merges_results() {
        let harvester = Harvester::new(&SamplerConfig::default()).unwrap();
        let conversations = vec![
            conversation("c", 6),
            conversation("a", 5),
            conversation("small", 2),
            RawConversation::rooted("nowhere", Vec::new()),
            conversation("b", 5),
        ];

        let harvest = harvester.harvest(conversations).await.unwrap();

        assert_eq!(harvest.metrics.trees_drawn, 5);
        assert_eq!(harvest.metrics.trees_accepted, 3);
        assert_eq!(harvest.metrics.trees_rejected, 1);
        assert_eq!(harvest.metrics.conversations_aborted, 1);
        assert_eq!(harvest.trees.len(), 3);

        let order: Vec<&str> = harvest.flows.iter().map(|f| f.tree_id()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_harvest_drops_duplicate_tree_ids() {
        let harvester = Harvester::new(&SamplerConfig::default()).unwrap();
        let conversations = vec![conversation("a", 5), conversation("a", 6)];

        let harvest = harvester.harvest(conversations).await.unwrap();

        assert_eq!(harvest.metrics.trees_accepted, 1);
        assert_eq!(harvest.metrics.trees_duplicated, 1);
        assert_eq!(harvest.trees.len(), 1);
        assert_eq!(harvest.flows.len(), 1);
    }

    #[tokio::test]
    async fn test_harvest_empty_input() {
        let harvester = Harvester::new(&SamplerConfig::quick()).unwrap();
        let harvest = harvester.harvest(Vec::new()).await.unwrap();

        assert!(harvest.flows.is_empty());
        assert_eq!(harvest.metrics.trees_drawn, 0);
    }
}
