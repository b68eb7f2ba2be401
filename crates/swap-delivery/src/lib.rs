//! Chain access for the swap pipeline.
//!
//! [`DeliveryInterface`] is the narrow chain-client contract: read-only view
//! calls plus the build / signing-message / submit / confirm steps of an
//! entry-function transaction. [`DeliveryService`] strings those steps
//! together with the signing orchestrator.

use async_trait::async_trait;
use std::sync::Arc;
use swap_account::{AccountError, AccountService};
use swap_types::{
	Authenticator, ConfigSchema, EntryFunction, TransactionHash, TransactionReceipt,
	UnsignedTransaction, WalletHandle,
};
use thiserror::Error;
use tracing::{info, instrument};

pub mod implementations {
	pub mod aptos;
}

#[derive(Debug, Error)]
pub enum DeliveryError {
	#[error("Network error: {0}")]
	Network(String),
	#[error("View call {function} failed: {message}")]
	View { function: String, message: String },
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	#[error("Transaction {hash} failed: {vm_status}")]
	TransactionFailed {
		hash: TransactionHash,
		vm_status: String,
	},
	#[error("Timed out waiting for transaction {0}")]
	ConfirmationTimeout(TransactionHash),
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
	#[error(transparent)]
	Signing(#[from] AccountError),
}

/// Chain client contract.
#[async_trait]
pub trait DeliveryInterface: Send + Sync {
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Executes a read-only function and returns its decoded return values.
	async fn view(&self, call: &EntryFunction) -> Result<Vec<serde_json::Value>, DeliveryError>;

	/// Builds an unsigned transaction calling `payload` on behalf of `sender`.
	async fn build_transaction(
		&self,
		sender: &str,
		payload: EntryFunction,
	) -> Result<UnsignedTransaction, DeliveryError>;

	/// Returns the exact bytes the sender must sign to authorize `tx`.
	async fn get_signing_message(&self, tx: &UnsignedTransaction) -> Result<Vec<u8>, DeliveryError>;

	async fn submit(
		&self,
		tx: &UnsignedTransaction,
		authenticator: &Authenticator,
	) -> Result<TransactionHash, DeliveryError>;

	/// Waits until the chain has committed the transaction.
	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, DeliveryError>;
}

/// Reads a view result's first return value as an unsigned integer.
///
/// Move `u64` values come back as JSON strings; plain numbers are accepted too.
pub fn first_u64(values: &[serde_json::Value]) -> Result<u64, DeliveryError> {
	let value = values
		.first()
		.ok_or_else(|| DeliveryError::InvalidResponse("view returned no values".into()))?;
	match value {
		serde_json::Value::String(s) => s.parse().ok(),
		serde_json::Value::Number(n) => n.as_u64(),
		_ => None,
	}
	.ok_or_else(|| DeliveryError::InvalidResponse(format!("expected u64, got {}", value)))
}

pub struct DeliveryService {
	provider: Box<dyn DeliveryInterface>,
	account: Arc<AccountService>,
}

impl DeliveryService {
	pub fn new(provider: Box<dyn DeliveryInterface>, account: Arc<AccountService>) -> Self {
		Self { provider, account }
	}

	pub async fn view(&self, call: &EntryFunction) -> Result<Vec<serde_json::Value>, DeliveryError> {
		self.provider.view(call).await
	}

	/// Builds, authorizes, submits and confirms one entry-function call.
	///
	/// A transaction that commits but does not execute successfully is an
	/// error carrying the chain's status verbatim.
	#[instrument(skip_all, fields(sender = %wallet.address, function = %payload.function))]
	pub async fn deliver(
		&self,
		wallet: &WalletHandle,
		payload: EntryFunction,
	) -> Result<TransactionReceipt, DeliveryError> {
		let tx = self
			.provider
			.build_transaction(&wallet.address, payload)
			.await?;
		let message = self.provider.get_signing_message(&tx).await?;
		let authenticator = self.account.authorize(wallet, &message).await?;

		let hash = self.provider.submit(&tx, &authenticator).await?;
		info!(tx_hash = %hash, "Submitted transaction");

		let receipt = self.provider.wait_for_confirmation(&hash).await?;
		if !receipt.success {
			return Err(DeliveryError::TransactionFailed {
				hash: receipt.hash,
				vm_status: receipt.vm_status,
			});
		}

		info!(tx_hash = %receipt.hash, "Transaction confirmed");
		Ok(receipt)
	}
}
