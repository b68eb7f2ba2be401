//! Digests used by the pipeline.
//!
//! The intent hash is SHA3-256 over the canonical encoding. The signing
//! envelope is digested with Keccak-256, which shares the sponge but not the
//! padding, so the two never collide for the same input.

use sha3::{Digest, Keccak256, Sha3_256};
use swap_types::IntentHash;

/// SHA3-256 of canonically encoded intent bytes.
pub fn hash_encoded(encoded: &[u8]) -> IntentHash {
	IntentHash(Sha3_256::digest(encoded).into())
}

/// Keccak-256 of arbitrary bytes.
pub fn keccak256(bytes: &[u8]) -> [u8; 32] {
	Keccak256::digest(bytes).into()
}
