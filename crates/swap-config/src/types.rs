//! Configuration types for the swap pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use swap_types::{TokenInfo, TokenRegistry};

/// Complete pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Intent construction settings
	#[serde(default)]
	pub swap: SwapSettings,
	/// Chain endpoint and contract layout
	pub chain: ChainConfig,
	/// Relayer endpoint
	pub relayer: RelayerConfig,
	/// Settlement polling
	#[serde(default)]
	pub tracker: TrackerConfig,
	/// Signing oracle backend
	pub account: AccountConfig,
	/// Known tokens
	#[serde(default)]
	pub tokens: Vec<TokenInfo>,
}

impl Config {
	pub fn token_registry(&self) -> TokenRegistry {
		TokenRegistry::new(self.tokens.clone())
	}
}

/// Intent construction settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SwapSettings {
	/// Name used in logs
	#[serde(default = "default_name")]
	pub name: String,
	/// Length of an intent's validity window in seconds
	#[serde(default = "default_intent_ttl")]
	pub intent_ttl_secs: u64,
	/// Tolerated drop from the expected buy amount, in basis points
	#[serde(default = "default_slippage")]
	pub slippage_bps: u32,
}

impl Default for SwapSettings {
	fn default() -> Self {
		Self {
			name: default_name(),
			intent_ttl_secs: default_intent_ttl(),
			slippage_bps: default_slippage(),
		}
	}
}

/// Chain endpoint and contract layout
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
	/// REST endpoint of a full node
	pub rest_url: String,
	/// Address publishing the escrow and intent modules
	pub contract_address: String,
	#[serde(default = "default_escrow_module")]
	pub escrow_module: String,
	#[serde(default = "default_intent_module")]
	pub intent_module: String,
	#[serde(default = "default_max_gas")]
	pub max_gas_amount: u64,
	#[serde(default = "default_gas_price")]
	pub gas_unit_price: u64,
	/// How long a built transaction stays valid
	#[serde(default = "default_transaction_ttl")]
	pub transaction_ttl_secs: u64,
	/// How long to wait for a submitted transaction to commit
	#[serde(default = "default_confirmation_timeout")]
	pub confirmation_timeout_secs: u64,
}

impl ChainConfig {
	/// Fully qualified id of a function in the escrow module.
	pub fn escrow_function(&self, name: &str) -> String {
		format!("{}::{}::{}", self.contract_address, self.escrow_module, name)
	}

	/// Fully qualified id of a function in the intent module.
	pub fn intent_function(&self, name: &str) -> String {
		format!("{}::{}::{}", self.contract_address, self.intent_module, name)
	}

	pub fn confirmation_timeout(&self) -> Duration {
		Duration::from_secs(self.confirmation_timeout_secs)
	}
}

/// Relayer endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayerConfig {
	/// Base URL serving `/activity`, `/orders` and `/intents`
	pub url: String,
	#[serde(default = "default_request_timeout")]
	pub request_timeout_ms: u64,
}

impl RelayerConfig {
	pub fn request_timeout(&self) -> Duration {
		Duration::from_millis(self.request_timeout_ms)
	}
}

/// Settlement polling
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
	#[serde(default = "default_poll_interval")]
	pub poll_interval_secs: u64,
	/// Wall-clock budget for one tracking session
	#[serde(default = "default_tracker_timeout")]
	pub timeout_secs: u64,
	/// How far before submission a maker's settlement may be attributed to
	/// the intent when the relayer does not echo the hash
	#[serde(default = "default_recency_window")]
	pub recency_window_secs: u64,
	/// Cap on aggregated order history
	#[serde(default = "default_history_limit")]
	pub order_history_limit: usize,
}

impl TrackerConfig {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_secs(self.poll_interval_secs)
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}

	pub fn recency_window(&self) -> Duration {
		Duration::from_secs(self.recency_window_secs)
	}
}

impl Default for TrackerConfig {
	fn default() -> Self {
		Self {
			poll_interval_secs: default_poll_interval(),
			timeout_secs: default_tracker_timeout(),
			recency_window_secs: default_recency_window(),
			order_history_limit: default_history_limit(),
		}
	}
}

/// Signing oracle backend selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Backend name, e.g. "custody"
	pub implementation: String,
	/// Backend-specific table, validated by the backend's schema
	#[serde(default = "empty_table")]
	pub config: toml::Value,
}

fn default_name() -> String {
	"intent-swap".to_string()
}

fn default_intent_ttl() -> u64 {
	600
}

fn default_slippage() -> u32 {
	500
}

fn default_escrow_module() -> String {
	"escrow".to_string()
}

fn default_intent_module() -> String {
	"intent".to_string()
}

fn default_max_gas() -> u64 {
	20_000
}

fn default_gas_price() -> u64 {
	100
}

fn default_transaction_ttl() -> u64 {
	60
}

fn default_confirmation_timeout() -> u64 {
	60
}

fn default_request_timeout() -> u64 {
	10_000
}

fn default_poll_interval() -> u64 {
	5
}

fn default_tracker_timeout() -> u64 {
	300
}

fn default_recency_window() -> u64 {
	120
}

fn default_history_limit() -> usize {
	20
}

fn empty_table() -> toml::Value {
	toml::Value::Table(Default::default())
}
