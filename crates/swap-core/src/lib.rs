//! Swap pipeline.
//!
//! Wires the components together in the order a swap needs them: escrow
//! reconciliation, nonce read, intent construction and signing, relayer
//! submission, then settlement tracking on a detached task.

use std::collections::HashMap;
use std::sync::Arc;
use swap_account::{AccountError, AccountInterface, AccountService};
use swap_config::Config;
use swap_delivery::{DeliveryError, DeliveryInterface, DeliveryService};
use swap_escrow::{EscrowContract, EscrowError, EscrowReconciler};
use swap_intent::IntentError;
use swap_settlement::{RelayerInterface, SettlementError, SettlementTracker, TrackerSettings};
use swap_types::QuoteError;
use thiserror::Error;

pub mod engine;
pub mod event_bus;
pub mod session;

pub use engine::{SwapEngine, SwapReceipt};
pub use event_bus::EventBus;
pub use session::SwapSession;

const EVENT_BUS_CAPACITY: usize = 1000;

#[derive(Debug, Error)]
pub enum SwapError {
	#[error("Encoding error: {0}")]
	Encoding(IntentError),
	#[error("Signing error: {0}")]
	Signing(AccountError),
	#[error("Insufficient funds: {0}")]
	InsufficientFunds(String),
	#[error("Deposit failed: {0}")]
	DepositFailed(String),
	#[error("Relayer rejected intent: {0}")]
	RelayerRejected(String),
	#[error("Relayer error: {0}")]
	Relayer(String),
	#[error("Chain error: {0}")]
	Chain(String),
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Invalid quote: {0}")]
	InvalidQuote(String),
}

impl From<IntentError> for SwapError {
	fn from(e: IntentError) -> Self {
		SwapError::Encoding(e)
	}
}

impl From<AccountError> for SwapError {
	fn from(e: AccountError) -> Self {
		match e {
			AccountError::Intent(inner) => SwapError::Encoding(inner),
			other => SwapError::Signing(other),
		}
	}
}

impl From<EscrowError> for SwapError {
	fn from(e: EscrowError) -> Self {
		match e {
			err @ EscrowError::InsufficientFunds { .. } => {
				SwapError::InsufficientFunds(err.to_string())
			}
			EscrowError::DepositFailed(DeliveryError::Signing(inner)) => SwapError::Signing(inner),
			EscrowError::DepositFailed(inner) => SwapError::DepositFailed(inner.to_string()),
		}
	}
}

impl From<SettlementError> for SwapError {
	fn from(e: SettlementError) -> Self {
		match e {
			SettlementError::RelayerRejected(reason) => SwapError::RelayerRejected(reason),
			other => SwapError::Relayer(other.to_string()),
		}
	}
}

impl From<QuoteError> for SwapError {
	fn from(e: QuoteError) -> Self {
		SwapError::InvalidQuote(e.to_string())
	}
}

type AccountFactory =
	Box<dyn Fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> + Send>;
type DeliveryFactory =
	Box<dyn Fn(&toml::Value) -> Result<Box<dyn DeliveryInterface>, DeliveryError> + Send>;
type RelayerFactory =
	Box<dyn Fn(&toml::Value) -> Result<Box<dyn RelayerInterface>, SettlementError> + Send>;

/// Builds a [`SwapEngine`] from configuration and backend factories.
pub struct SwapBuilder {
	config: Config,
	account_factories: HashMap<String, AccountFactory>,
	delivery_factory: Option<DeliveryFactory>,
	relayer_factory: Option<RelayerFactory>,
}

impl SwapBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			account_factories: HashMap::new(),
			delivery_factory: None,
			relayer_factory: None,
		}
	}

	/// Registers a signing backend selectable by `account.implementation`.
	pub fn with_account_factory<F>(mut self, name: &str, factory: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> + Send + 'static,
	{
		self.account_factories
			.insert(name.to_string(), Box::new(factory));
		self
	}

	pub fn with_delivery_factory<F>(mut self, factory: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<Box<dyn DeliveryInterface>, DeliveryError> + Send + 'static,
	{
		self.delivery_factory = Some(Box::new(factory));
		self
	}

	pub fn with_relayer_factory<F>(mut self, factory: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<Box<dyn RelayerInterface>, SettlementError> + Send + 'static,
	{
		self.relayer_factory = Some(Box::new(factory));
		self
	}

	pub fn build(self) -> Result<SwapEngine, SwapError> {
		let config = self.config;

		// Signing oracle
		let implementation = &config.account.implementation;
		let account_factory = self.account_factories.get(implementation).ok_or_else(|| {
			SwapError::Config(format!("Unknown account implementation: {}", implementation))
		})?;
		let provider =
			account_factory(&config.account.config).map_err(|e| SwapError::Config(e.to_string()))?;
		let account = Arc::new(AccountService::new(provider));

		// Chain client
		let chain_section = toml::Value::try_from(&config.chain)
			.map_err(|e| SwapError::Config(format!("chain section: {}", e)))?;
		let chain = self
			.delivery_factory
			.ok_or_else(|| SwapError::Config("Delivery factory not provided".into()))?(
			&chain_section,
		)
		.map_err(|e| SwapError::Config(e.to_string()))?;
		let delivery = Arc::new(DeliveryService::new(chain, account.clone()));

		// Escrow
		let escrow = EscrowReconciler::new(
			delivery.clone(),
			EscrowContract::new(&config.chain.contract_address, &config.chain.escrow_module),
		);

		// Relayer and tracker
		let relayer_section = toml::Value::try_from(&config.relayer)
			.map_err(|e| SwapError::Config(format!("relayer section: {}", e)))?;
		let relayer = self
			.relayer_factory
			.ok_or_else(|| SwapError::Config("Relayer factory not provided".into()))?(
			&relayer_section,
		)
		.map_err(|e| SwapError::Config(e.to_string()))?;
		let tracker = Arc::new(SettlementTracker::new(
			Arc::from(relayer),
			TrackerSettings {
				poll_interval: config.tracker.poll_interval(),
				timeout: config.tracker.timeout(),
				recency_window: config.tracker.recency_window(),
			},
			config.token_registry(),
			config.tracker.order_history_limit,
		));

		Ok(SwapEngine::new(
			config,
			account,
			delivery,
			escrow,
			tracker,
			EventBus::new(EVENT_BUS_CAPACITY),
		))
	}
}
