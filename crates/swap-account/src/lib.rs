//! Signing for the swap pipeline.
//!
//! Key material never lives in this process. A signing oracle holds it and
//! exposes two capabilities per wallet: sign raw bytes and report the public
//! key. [`AccountService`] builds everything that needs authorizing on top of
//! those two calls.

use async_trait::async_trait;
use swap_intent::{IntentError, SigningEnvelope};
use swap_types::{
	Authenticator, ConfigSchema, Intent, PublicKey, Signature, SignedIntent, WalletHandle,
};
use thiserror::Error;
use tracing::{debug, instrument};

pub mod implementations {
	pub mod custody;
}

#[derive(Debug, Error)]
pub enum AccountError {
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	#[error("Invalid public key: expected 32 or 33 bytes, got {0}")]
	InvalidPublicKey(usize),
	#[error("Provider error: {0}")]
	Provider(String),
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
	#[error(transparent)]
	Intent(#[from] IntentError),
}

/// Capability contract of a signing oracle.
#[async_trait]
pub trait AccountInterface: Send + Sync {
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Signs `payload` with the wallet's key and returns the raw signature.
	async fn sign(&self, wallet: &WalletHandle, payload: &[u8]) -> Result<Signature, AccountError>;

	/// Returns the wallet's public key as reported by the backend, 32 or 33 bytes.
	async fn public_key(&self, wallet: &WalletHandle) -> Result<Vec<u8>, AccountError>;
}

/// Normalizes a backend-reported public key to 32 bytes.
///
/// Some backends prepend a one-byte scheme marker; that byte is dropped.
pub fn normalize_public_key(raw: &[u8]) -> Result<PublicKey, AccountError> {
	let key = match raw.len() {
		33 => &raw[1..],
		32 => raw,
		other => return Err(AccountError::InvalidPublicKey(other)),
	};
	let mut out = [0u8; 32];
	out.copy_from_slice(key);
	Ok(PublicKey(out))
}

/// Signing orchestrator.
///
/// Oracle failures are returned as-is and never retried here; a retry must
/// re-drive the whole swap so the nonce and hash are derived again.
pub struct AccountService {
	provider: Box<dyn AccountInterface>,
	envelope_prefix: String,
}

impl AccountService {
	pub fn new(provider: Box<dyn AccountInterface>) -> Self {
		Self {
			provider,
			envelope_prefix: swap_intent::DEFAULT_ENVELOPE_PREFIX.to_string(),
		}
	}

	/// Overrides the first line of the signing envelope.
	pub fn with_envelope_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.envelope_prefix = prefix.into();
		self
	}

	/// Signs `payload` and pairs the signature with the wallet's public key.
	pub async fn authorize(
		&self,
		wallet: &WalletHandle,
		payload: &[u8],
	) -> Result<Authenticator, AccountError> {
		let signature = self.provider.sign(wallet, payload).await?;
		let raw_key = self.provider.public_key(wallet).await?;
		let public_key = normalize_public_key(&raw_key)?;

		Ok(Authenticator {
			public_key,
			signature,
		})
	}

	/// Hashes the intent, signs the digest of its envelope and returns the
	/// submission-ready result.
	#[instrument(skip_all, fields(maker = %intent.maker, nonce = intent.nonce))]
	pub async fn sign_intent(
		&self,
		wallet: &WalletHandle,
		intent: Intent,
	) -> Result<SignedIntent, AccountError> {
		let hash = swap_intent::commit(&intent)?;
		let envelope = SigningEnvelope::with_prefix(&self.envelope_prefix, hash, intent.nonce);
		debug!(intent_hash = %hash, "Signing intent envelope");

		let authenticator = self.authorize(wallet, &envelope.digest()).await?;

		Ok(SignedIntent {
			signing_nonce: envelope.signing_nonce(),
			intent,
			hash,
			authenticator,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal::Decimal;
	use std::sync::{Arc, Mutex};
	use swap_types::{Schema, ValidationError};

	struct NoSchema;

	impl ConfigSchema for NoSchema {
		fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
			Schema::new(vec![], vec![]).validate(config)
		}
	}

	struct MockOracle {
		key: Vec<u8>,
		fail: bool,
		payloads: Arc<Mutex<Vec<Vec<u8>>>>,
	}

	impl MockOracle {
		fn with_key(key: Vec<u8>) -> Self {
			Self {
				key,
				fail: false,
				payloads: Arc::new(Mutex::new(Vec::new())),
			}
		}
	}

	#[async_trait]
	impl AccountInterface for MockOracle {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			Box::new(NoSchema)
		}

		async fn sign(
			&self,
			_wallet: &WalletHandle,
			payload: &[u8],
		) -> Result<Signature, AccountError> {
			if self.fail {
				return Err(AccountError::SigningFailed("wallet locked".into()));
			}
			self.payloads.lock().unwrap().push(payload.to_vec());
			Ok(Signature(vec![0x55; 64]))
		}

		async fn public_key(&self, _wallet: &WalletHandle) -> Result<Vec<u8>, AccountError> {
			Ok(self.key.clone())
		}
	}

	fn wallet() -> WalletHandle {
		WalletHandle::new("wallet-1", "0x1234567890abcdef1234567890abcdef12345678")
	}

	fn intent() -> Intent {
		Intent {
			maker: "0x1234567890abcdef1234567890abcdef12345678".to_string(),
			nonce: 1,
			sell_token: "0x1::aptos_coin::AptosCoin".to_string(),
			buy_token:
				"0xf22bede237a07e121b56d91a491eb7bcdfd1f5907926a9e58338f964a01b17fa::asset::USDC"
					.to_string(),
			sell_amount: Decimal::from(100_000_000u64),
			start_buy_amount: Decimal::from(5_000_000u64),
			end_buy_amount: Decimal::from(4_750_000u64),
			start_time: 1_700_000_000,
			end_time: 1_700_000_600,
		}
	}

	#[test]
	fn test_normalize_public_key() {
		let mut prefixed = vec![0x00];
		prefixed.extend_from_slice(&[0x11; 32]);

		assert_eq!(normalize_public_key(&prefixed).unwrap().0, [0x11; 32]);
		assert_eq!(normalize_public_key(&[0x22; 32]).unwrap().0, [0x22; 32]);
		assert!(matches!(
			normalize_public_key(&[0x33; 31]),
			Err(AccountError::InvalidPublicKey(31))
		));
		assert!(matches!(
			normalize_public_key(&[0x33; 34]),
			Err(AccountError::InvalidPublicKey(34))
		));
	}

	#[tokio::test]
	async fn test_sign_intent_signs_envelope_digest() {
		let mut key = vec![0x00];
		key.extend_from_slice(&[0xaa; 32]);
		let oracle = MockOracle::with_key(key);
		let service = AccountService::new(Box::new(oracle));

		let signed = service.sign_intent(&wallet(), intent()).await.unwrap();

		assert_eq!(
			signed.hash.to_hex(),
			"7ee5040b95647fc9d14e4c01cd487648ca573b93461330b1e78f6b6972456d5a"
		);
		assert_eq!(signed.signing_nonce, "31");
		assert_eq!(signed.public_key().0, [0xaa; 32]);
		assert_eq!(signed.signature().0, vec![0x55; 64]);
	}

	#[tokio::test]
	async fn test_oracle_receives_envelope_digest() {
		let oracle = MockOracle::with_key(vec![0xbb; 32]);
		let payloads = oracle.payloads.clone();
		let service = AccountService::new(Box::new(oracle));

		let signed = service.sign_intent(&wallet(), intent()).await.unwrap();

		let expected = SigningEnvelope::new(signed.hash, 1).digest();
		assert_eq!(*payloads.lock().unwrap(), vec![expected.to_vec()]);
	}

	#[tokio::test]
	async fn test_oracle_failure_is_surfaced() {
		let oracle = MockOracle {
			key: vec![0xbb; 32],
			fail: true,
			payloads: Arc::new(Mutex::new(Vec::new())),
		};
		let service = AccountService::new(Box::new(oracle));

		let result = service.sign_intent(&wallet(), intent()).await;
		assert!(matches!(result, Err(AccountError::SigningFailed(m)) if m == "wallet locked"));
	}

	#[tokio::test]
	async fn test_bad_public_key_is_terminal() {
		let service = AccountService::new(Box::new(MockOracle::with_key(vec![0xbb; 20])));

		let result = service.authorize(&wallet(), b"signing message").await;
		assert!(matches!(result, Err(AccountError::InvalidPublicKey(20))));
	}

	#[tokio::test]
	async fn test_invalid_intent_never_reaches_oracle() {
		let service = AccountService::new(Box::new(MockOracle::with_key(vec![0xbb; 32])));
		let mut bad = intent();
		bad.end_time = bad.start_time;

		let result = service.sign_intent(&wallet(), bad).await;
		assert!(matches!(result, Err(AccountError::Intent(_))));
	}
}
