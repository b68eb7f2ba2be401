//! Transaction delivery types for the swap pipeline.
//!
//! This module defines the chain-facing shapes used when reading contract
//! state and submitting entry-function transactions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a submitted transaction, as returned by the chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHash(pub String);

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// A call to a published Move function.
///
/// Used both for read-only view calls and as the payload of entry-function
/// transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryFunction {
	/// Fully qualified function id, `<address>::<module>::<name>`.
	pub function: String,
	/// Generic type arguments, as type tags.
	pub type_arguments: Vec<String>,
	/// JSON-encoded arguments.
	pub arguments: Vec<serde_json::Value>,
}

impl EntryFunction {
	pub fn new(
		function: impl Into<String>,
		type_arguments: Vec<String>,
		arguments: Vec<serde_json::Value>,
	) -> Self {
		Self {
			function: function.into(),
			type_arguments,
			arguments,
		}
	}
}

/// Transaction built by the chain client but not yet authorized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
	pub sender: String,
	pub sequence_number: u64,
	pub max_gas_amount: u64,
	pub gas_unit_price: u64,
	pub expiration_timestamp_secs: u64,
	pub payload: EntryFunction,
}

/// Outcome of a transaction once the chain has committed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TransactionHash,
	/// Whether the transaction executed successfully.
	pub success: bool,
	/// Chain-reported execution status, kept verbatim for error messages.
	pub vm_status: String,
}
