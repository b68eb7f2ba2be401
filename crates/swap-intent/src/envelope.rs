//! Signing envelope.
//!
//! The oracle never signs the intent hash directly. The hash is wrapped in a
//! short text message that also names the network and the nonce, and that
//! message is digested again before signing:
//!
//! ```text
//! APTOS
//! message: <intent hash, lowercase hex, no prefix>
//! nonce: <decimal nonce>
//! ```

use swap_types::IntentHash;

use crate::hasher::keccak256;

/// First line of the envelope.
pub const DEFAULT_ENVELOPE_PREFIX: &str = "APTOS";

/// The message a maker actually authorizes for an intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningEnvelope {
	prefix: String,
	hash: IntentHash,
	nonce: u64,
}

impl SigningEnvelope {
	pub fn new(hash: IntentHash, nonce: u64) -> Self {
		Self::with_prefix(DEFAULT_ENVELOPE_PREFIX, hash, nonce)
	}

	pub fn with_prefix(prefix: impl Into<String>, hash: IntentHash, nonce: u64) -> Self {
		Self {
			prefix: prefix.into(),
			hash,
			nonce,
		}
	}

	/// Envelope text, lines joined with `\n` and no trailing newline.
	pub fn message(&self) -> String {
		format!(
			"{}\nmessage: {}\nnonce: {}",
			self.prefix,
			self.hash.to_hex(),
			self.nonce
		)
	}

	/// Keccak-256 of the envelope text; the 32 bytes handed to the oracle.
	pub fn digest(&self) -> [u8; 32] {
		keccak256(self.message().as_bytes())
	}

	/// Nonce in the form the relayer expects alongside the signature.
	pub fn signing_nonce(&self) -> String {
		signing_nonce(self.nonce)
	}
}

/// Hex encoding of the UTF-8 bytes of the decimal nonce, without `0x`.
///
/// Nonce `1` becomes `"31"`, nonce `42` becomes `"3432"`.
pub fn signing_nonce(nonce: u64) -> String {
	hex::encode(nonce.to_string())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn hash() -> IntentHash {
		let mut bytes = [0u8; 32];
		bytes[0] = 0xab;
		bytes[31] = 0x01;
		IntentHash(bytes)
	}

	#[test]
	fn test_message_layout() {
		let envelope = SigningEnvelope::new(hash(), 7);

		assert_eq!(
			envelope.message(),
			format!(
				"APTOS\nmessage: ab{}01\nnonce: 7",
				"00".repeat(30)
			)
		);
	}

	#[test]
	fn test_digest_binds_every_part() {
		let base = SigningEnvelope::new(hash(), 7);

		assert_eq!(base.digest(), keccak256(base.message().as_bytes()));
		assert_ne!(base.digest(), SigningEnvelope::new(hash(), 8).digest());
		assert_ne!(
			base.digest(),
			SigningEnvelope::with_prefix("SUI", hash(), 7).digest()
		);
		assert_ne!(base.digest(), SigningEnvelope::new(IntentHash([0u8; 32]), 7).digest());
	}

	#[test]
	fn test_signing_nonce() {
		assert_eq!(signing_nonce(0), "30");
		assert_eq!(signing_nonce(1), "31");
		assert_eq!(signing_nonce(42), "3432");
		assert_eq!(SigningEnvelope::new(hash(), 1234).signing_nonce(), "31323334");
	}
}
