//! Intent commitment for the swap pipeline.
//!
//! Turns an [`Intent`] into the bytes and digests that get signed: the
//! canonical encoding, the SHA3-256 intent hash that identifies it everywhere
//! downstream, and the text envelope whose Keccak-256 digest is handed to the
//! signing oracle.

use swap_types::{Intent, IntentHash, IntentViolation};
use thiserror::Error;

pub mod encoder;
pub mod envelope;
pub mod hasher;

pub use encoder::{encode, INTENT_DOMAIN_TAG};
pub use envelope::{signing_nonce, SigningEnvelope, DEFAULT_ENVELOPE_PREFIX};
pub use hasher::{hash_encoded, keccak256};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntentError {
	#[error("Invalid maker address: {0}")]
	InvalidAddress(String),
	#[error("{field} does not fit in 64 bits: {value}")]
	IntegerOverflow { field: &'static str, value: String },
	#[error("Invalid intent: {0}")]
	InvalidIntent(#[from] IntentViolation),
}

/// Validates, encodes and hashes an intent.
///
/// This is the only path by which an intent gets its identifier, so an
/// intent that breaks its invariants never receives a hash.
pub fn commit(intent: &Intent) -> Result<IntentHash, IntentError> {
	intent.validate()?;
	let encoded = encode(intent)?;
	Ok(hash_encoded(&encoded))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal::Decimal;

	#[test]
	fn test_commit_rejects_invalid_intent() {
		let intent = Intent {
			maker: "0x1234567890abcdef1234567890abcdef12345678".to_string(),
			nonce: 0,
			sell_token: "0x1::aptos_coin::AptosCoin".to_string(),
			buy_token: "0x1::aptos_coin::AptosCoin".to_string(),
			sell_amount: Decimal::from(10u64),
			start_buy_amount: Decimal::from(5u64),
			end_buy_amount: Decimal::from(5u64),
			start_time: 10,
			end_time: 20,
		};

		assert!(matches!(
			commit(&intent),
			Err(IntentError::InvalidIntent(IntentViolation::SameToken(_)))
		));
	}
}
