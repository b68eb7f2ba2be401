//! Escrow reconciliation.
//!
//! Before an intent can settle, the custodial contract must already hold the
//! maker's sell amount. [`EscrowReconciler::ensure_funded`] reads the recorded
//! balance and, when it falls short, deposits exactly the difference.
//!
//! The read-then-deposit sequence is not atomic. Two swaps for the same maker
//! may both see the same balance; the contract rejects whatever it cannot
//! cover and that surfaces as an ordinary deposit failure.

use std::sync::Arc;
use swap_delivery::{first_u64, DeliveryError, DeliveryService};
use swap_types::{EntryFunction, TransactionReceipt, WalletHandle};
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum EscrowError {
	#[error("Insufficient funds to deposit {shortfall}: {vm_status}")]
	InsufficientFunds { shortfall: u64, vm_status: String },
	#[error("Deposit failed: {0}")]
	DepositFailed(DeliveryError),
}

/// Function ids of the custodial escrow module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowContract {
	/// View `get_balance<Token>(maker): u64`
	pub balance_function: String,
	/// Entry `deposit<Token>(amount: u64)`
	pub deposit_function: String,
}

impl EscrowContract {
	pub fn new(contract_address: &str, module: &str) -> Self {
		Self {
			balance_function: format!("{}::{}::get_balance", contract_address, module),
			deposit_function: format!("{}::{}::deposit", contract_address, module),
		}
	}
}

/// Result of a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Funding {
	/// The recorded balance already covered the requirement.
	Sufficient { balance: u64 },
	/// A deposit for the shortfall was confirmed on chain.
	ToppedUp {
		balance: u64,
		deposited: u64,
		receipt: TransactionReceipt,
	},
}

pub struct EscrowReconciler {
	delivery: Arc<DeliveryService>,
	contract: EscrowContract,
}

impl EscrowReconciler {
	pub fn new(delivery: Arc<DeliveryService>, contract: EscrowContract) -> Self {
		Self { delivery, contract }
	}

	/// Recorded escrow balance of `maker` in `token`.
	///
	/// A failing view, typically an account the contract has never seen, reads
	/// as zero.
	pub async fn balance(&self, maker: &str, token: &str) -> u64 {
		let call = EntryFunction::new(
			self.contract.balance_function.clone(),
			vec![token.to_string()],
			vec![serde_json::Value::String(maker.to_string())],
		);

		let result = match self.delivery.view(&call).await {
			Ok(values) => first_u64(&values),
			Err(e) => Err(e),
		};

		result.unwrap_or_else(|e| {
			warn!(maker, token, error = %e, "Escrow balance unavailable, assuming zero");
			0
		})
	}

	/// Makes sure the escrow holds at least `required` of `token` for the wallet.
	#[instrument(skip_all, fields(maker = %wallet.address, token = %token, required = required))]
	pub async fn ensure_funded(
		&self,
		wallet: &WalletHandle,
		token: &str,
		required: u64,
	) -> Result<Funding, EscrowError> {
		let balance = self.balance(&wallet.address, token).await;
		if balance >= required {
			return Ok(Funding::Sufficient { balance });
		}

		let shortfall = required - balance;
		info!(balance, shortfall, "Escrow short, depositing");

		let deposit = EntryFunction::new(
			self.contract.deposit_function.clone(),
			vec![token.to_string()],
			vec![serde_json::Value::String(shortfall.to_string())],
		);

		match self.delivery.deliver(wallet, deposit).await {
			Ok(receipt) => Ok(Funding::ToppedUp {
				balance,
				deposited: shortfall,
				receipt,
			}),
			Err(DeliveryError::TransactionFailed { vm_status, .. })
				if vm_status.contains("INSUFFICIENT_BALANCE") =>
			{
				Err(EscrowError::InsufficientFunds {
					shortfall,
					vm_status,
				})
			}
			Err(e) => Err(EscrowError::DepositFailed(e)),
		}
	}
}
