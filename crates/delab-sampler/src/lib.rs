//! DeLab Sampler
//!
//! Repeated build → validate → extract cycles that collect a daily sample of
//! conversation flows.
//!
//! # Overview
//!
//! The sampler is responsible for:
//! - **Drawing batches** of candidate conversations from a [`TreeSource`]
//! - **Building and validating** each conversation independently
//! - **Sampling flows** from the accepted trees of every batch
//! - **Evicting** trees that contributed no flow
//! - **Stopping** on quota, source exhaustion or the batch cap
//!
//! ## Sampler Lifecycle
//!
//! | State | Entered when | Next |
//! |-------|--------------|------|
//! | **Accumulating** | sampler created | stays until the flow count reaches the quota |
//! | **Done** | flow count ≥ quota | terminal |
//!
//! Source exhaustion and the batch cap end a run while still accumulating.
//! Rejected trees, aborted conversations and transient source errors never do.
//!
//! # Usage
//!
//! ## One-shot Harvest
//!
//! ```no_run
//! use delab_sampler::{Harvester, RawConversation, SamplerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let conversations: Vec<RawConversation> = Vec::new();
//!     let harvester = Harvester::new(&SamplerConfig::default())?;
//!
//!     let harvest = harvester.harvest(conversations).await?;
//!     println!("{}", harvest.metrics.summary());
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration Presets
//!
//! ```
//! use delab_sampler::SamplerConfig;
//!
//! // Default: 50 flows, 5 per batch, at most 100 batches
//! let config = SamplerConfig::default();
//!
//! // Quick: 10 flows, at most 20 batches
//! let config = SamplerConfig::quick();
//!
//! // Thorough: 200 flows, at most 1000 batches
//! let config = SamplerConfig::thorough();
//! ```
//!
//! # Configuration
//!
//! The sampler can be configured via TOML:
//!
//! ```toml
//! quota = 50
//! max_batches = 100
//! flows_per_batch = 5
//! platform = "reddit"
//! language = "en"
//! max_posts_per_conversation = 0
//! batch_interval_ms = 1000
//!
//! [filters]
//! max_text_length = 500
//! reject_self_answers = true
//!
//! [validation.reddit]
//! min_size = 5
//! max_size = 50
//! min_depth = 5
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod harvest;
mod metrics;
mod pipeline;
mod sampler;
mod source;
mod worker;

pub use config::{SamplerConfig, DAILY_FLOWS_NEEDED, FLOWS_PER_BATCH};
pub use error::{SamplerError, SourceError};
pub use harvest::{Harvest, Harvester};
pub use metrics::SamplerMetrics;
pub use pipeline::{Pipeline, Processed};
pub use sampler::{DailySampler, SamplerState, StopReason};
pub use source::{RawConversation, RootSpec, SamplingContext, TreeSource};
pub use worker::SamplerWorker;
