//! Relayer submission and settlement tracking.
//!
//! The relayer is reached only through [`RelayerInterface`]. On top of it,
//! [`SettlementTracker`] submits signed intents, polls the relayer's feeds
//! until an intent resolves, and aggregates the feeds into [`Order`] records.
//!
//! [`Order`]: swap_types::Order

use async_trait::async_trait;
use swap_types::ConfigSchema;
use thiserror::Error;

pub mod implementations {
	pub mod http;
}
pub mod orders;
pub mod tracker;
pub mod types;

pub use orders::aggregate_orders;
pub use tracker::{SettlementTracker, TrackerSettings, TrackingSession};
pub use types::{ActivityEntry, IntentSubmission, PendingOrder, WireIntent};

#[derive(Debug, Error)]
pub enum SettlementError {
	#[error("Network error: {0}")]
	Network(String),
	/// The relayer refused the intent; the reason is the relayer's own text.
	#[error("{0}")]
	RelayerRejected(String),
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
}

/// Narrow HTTP contract of the matching relayer.
#[async_trait]
pub trait RelayerInterface: Send + Sync {
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Settled intents, successful or not.
	async fn activity(&self) -> Result<Vec<ActivityEntry>, SettlementError>;

	/// Intents accepted but not yet settled.
	async fn pending_orders(&self) -> Result<Vec<PendingOrder>, SettlementError>;

	async fn submit_intent(&self, submission: &IntentSubmission) -> Result<(), SettlementError>;
}
