//! Swap intent types.
//!
//! An [`Intent`] is the unit of exchange a maker authorizes. It is built fresh
//! for every swap attempt, hashed once, signed once and submitted once.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::{Authenticator, PublicKey, Signature};

/// Terms of a swap the maker is willing to have filled.
///
/// Amounts are expressed in the smallest unit of each token. They are kept as
/// decimals because quote arithmetic may leave a fractional remainder; the
/// canonical encoding truncates toward zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
	/// Maker's on-chain address, hex encoded.
	pub maker: String,
	/// Maker's intent counter, read from chain right before signing.
	pub nonce: u64,
	/// Type tag of the token being sold.
	pub sell_token: String,
	/// Type tag of the token being bought.
	pub buy_token: String,
	pub sell_amount: Decimal,
	/// Buy amount the maker starts asking for.
	pub start_buy_amount: Decimal,
	/// Lowest buy amount the maker accepts by `end_time`.
	pub end_buy_amount: Decimal,
	/// Start of the validity window, unix seconds.
	pub start_time: u64,
	/// End of the validity window, unix seconds.
	pub end_time: u64,
}

/// Broken intent invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentViolation {
	#[error("sell amount must be positive")]
	NonPositiveSellAmount,
	#[error("end buy amount {end} exceeds start buy amount {start}")]
	BuyRangeInverted { start: Decimal, end: Decimal },
	#[error("buy amounts must not be negative")]
	NegativeBuyAmount,
	#[error("end time {end} must be after start time {start}")]
	EmptyWindow { start: u64, end: u64 },
	#[error("sell and buy token are both {0}")]
	SameToken(String),
}

impl Intent {
	/// Checks the invariants every intent must hold before it is hashed.
	pub fn validate(&self) -> Result<(), IntentViolation> {
		if self.sell_amount <= Decimal::ZERO {
			return Err(IntentViolation::NonPositiveSellAmount);
		}
		if self.end_buy_amount.is_sign_negative() || self.start_buy_amount.is_sign_negative() {
			return Err(IntentViolation::NegativeBuyAmount);
		}
		if self.end_buy_amount > self.start_buy_amount {
			return Err(IntentViolation::BuyRangeInverted {
				start: self.start_buy_amount,
				end: self.end_buy_amount,
			});
		}
		if self.end_time <= self.start_time {
			return Err(IntentViolation::EmptyWindow {
				start: self.start_time,
				end: self.end_time,
			});
		}
		if self.sell_token == self.buy_token {
			return Err(IntentViolation::SameToken(self.sell_token.clone()));
		}
		Ok(())
	}

	/// Whether the intent asks for a single fixed buy amount.
	pub fn is_fixed_price(&self) -> bool {
		self.start_buy_amount == self.end_buy_amount
	}
}

/// 256-bit content hash identifying an intent.
///
/// Used for deduplication, status lookup and as the on-chain commitment
/// reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntentHash(pub [u8; 32]);

impl IntentHash {
	/// Lowercase hex, no prefix.
	pub fn to_hex(&self) -> String {
		hex::encode(self.0)
	}

	/// Lowercase hex with a `0x` prefix, as sent to the relayer.
	pub fn to_prefixed_hex(&self) -> String {
		format!("0x{}", self.to_hex())
	}

	/// Whether `reference` names this hash, ignoring prefix and case.
	pub fn matches(&self, reference: &str) -> bool {
		let trimmed = reference.trim();
		let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
		digits.eq_ignore_ascii_case(&self.to_hex())
	}
}

impl fmt::Display for IntentHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_prefixed_hex())
	}
}

/// An intent together with everything needed to submit it.
///
/// Produced by the signing orchestrator and consumed exactly once by
/// submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIntent {
	pub intent: Intent,
	pub hash: IntentHash,
	pub authenticator: Authenticator,
	/// Hex encoding of the UTF-8 bytes of the decimal nonce.
	pub signing_nonce: String,
}

impl SignedIntent {
	pub fn signature(&self) -> &Signature {
		&self.authenticator.signature
	}

	pub fn public_key(&self) -> &PublicKey {
		&self.authenticator.public_key
	}
}
