//! Account-related types for the swap pipeline.
//!
//! This module defines on-chain addresses, wallet handles understood by the
//! signing oracle, and the authenticator attached to anything submitted on a
//! maker's behalf.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Width of an address once laid out in the canonical encoding.
pub const ADDRESS_LENGTH: usize = 32;

/// Shortest native address representation accepted.
pub const MIN_ADDRESS_LENGTH: usize = 20;

/// Errors produced while parsing an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
	#[error("address is not valid hex: {0}")]
	InvalidHex(String),
	#[error("address must be {min}-{max} bytes, got {actual}")]
	InvalidLength {
		min: usize,
		max: usize,
		actual: usize,
	},
}

/// On-chain account address.
///
/// Stores the raw bytes as parsed, between 20 and 32 bytes long. Shorter
/// representations are right-aligned into 32 bytes by [`Address::to_padded`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub Vec<u8>);

impl Address {
	/// Parses a hex address, with or without a `0x` prefix.
	///
	/// Odd-length input is treated as if it carried one leading zero nibble.
	pub fn parse(input: &str) -> Result<Self, AddressError> {
		let trimmed = input.trim();
		let digits = trimmed
			.strip_prefix("0x")
			.or_else(|| trimmed.strip_prefix("0X"))
			.unwrap_or(trimmed);

		if digits.is_empty() {
			return Err(AddressError::InvalidHex(input.to_string()));
		}

		let normalized = if digits.len() % 2 == 1 {
			format!("0{}", digits)
		} else {
			digits.to_string()
		};

		let bytes =
			hex::decode(&normalized).map_err(|_| AddressError::InvalidHex(input.to_string()))?;

		if bytes.len() < MIN_ADDRESS_LENGTH || bytes.len() > ADDRESS_LENGTH {
			return Err(AddressError::InvalidLength {
				min: MIN_ADDRESS_LENGTH,
				max: ADDRESS_LENGTH,
				actual: bytes.len(),
			});
		}

		Ok(Self(bytes))
	}

	/// Returns the address as a fixed 32-byte field, zero-padded at the
	/// most-significant end.
	pub fn to_padded(&self) -> [u8; ADDRESS_LENGTH] {
		let mut out = [0u8; ADDRESS_LENGTH];
		out[ADDRESS_LENGTH - self.0.len()..].copy_from_slice(&self.0);
		out
	}

	/// Returns the 32-byte form as `0x`-prefixed lowercase hex.
	pub fn to_hex(&self) -> String {
		format!("0x{}", hex::encode(self.to_padded()))
	}

	/// Compares two textual addresses after padding both to 32 bytes.
	///
	/// Unparseable input falls back to a case-insensitive string comparison.
	pub fn same(a: &str, b: &str) -> bool {
		match (Address::parse(a), Address::parse(b)) {
			(Ok(left), Ok(right)) => left.to_padded() == right.to_padded(),
			_ => a.trim().eq_ignore_ascii_case(b.trim()),
		}
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_hex())
	}
}

/// Handle identifying a wallet held by the signing oracle.
///
/// The oracle owns the key material; callers only ever see the handle and
/// the on-chain address the wallet controls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletHandle {
	/// Oracle-side identifier of the wallet.
	pub id: String,
	/// On-chain address controlled by the wallet.
	pub address: String,
}

impl WalletHandle {
	pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			address: address.into(),
		}
	}
}

/// Normalized 32-byte public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
	pub fn to_hex(&self) -> String {
		format!("0x{}", hex::encode(self.0))
	}
}

/// Raw signature bytes as returned by the signing oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(pub Vec<u8>);

impl Signature {
	pub fn to_hex(&self) -> String {
		format!("0x{}", hex::encode(&self.0))
	}
}

/// Proof of authorization for a transaction or message.
///
/// The receiving chain verifies `signature` against `public_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authenticator {
	pub public_key: PublicKey,
	pub signature: Signature,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_twenty_byte_address_is_left_padded() {
		let address = Address::parse("0x1234567890abcdef1234567890abcdef12345678").unwrap();
		let padded = address.to_padded();

		assert_eq!(&padded[..12], &[0u8; 12]);
		assert_eq!(
			hex::encode(&padded[12..]),
			"1234567890abcdef1234567890abcdef12345678"
		);
	}

	#[test]
	fn test_full_width_address_passes_through() {
		let raw = "f22bede237a07e121b56d91a491eb7bcdfd1f5907926a9e58338f964a01b17fa";
		let address = Address::parse(raw).unwrap();

		assert_eq!(hex::encode(address.to_padded()), raw);
	}

	#[test]
	fn test_rejects_bad_lengths_and_hex() {
		assert!(matches!(
			Address::parse("0x1234"),
			Err(AddressError::InvalidLength { actual: 2, .. })
		));
		assert!(matches!(
			Address::parse(&format!("0x{}", "11".repeat(33))),
			Err(AddressError::InvalidLength { actual: 33, .. })
		));
		assert!(matches!(
			Address::parse("0xnothex"),
			Err(AddressError::InvalidHex(_))
		));
		assert!(Address::parse("").is_err());
	}

	#[test]
	fn test_same_ignores_padding_and_case() {
		assert!(Address::same(
			"0x1234567890ABCDEF1234567890abcdef12345678",
			"0x0000000000000000000000001234567890abcdef1234567890abcdef12345678",
		));
		assert!(!Address::same(
			"0x1234567890abcdef1234567890abcdef12345678",
			"0x1234567890abcdef1234567890abcdef12345679",
		));
	}
}
