//! Remote custody signing oracle.
//!
//! Talks to a hosted wallet API that keeps keys server-side:
//!
//! - `POST {api_url}/wallets/{id}/raw_sign` with `{"params": {"hash": "0x.."}}`
//!   answers `{"data": {"signature": "0x.."}}`
//! - `GET {api_url}/wallets/{id}` answers `{"public_key": "0x..", ..}`
//!
//! Requests authenticate with HTTP basic auth using the app id and secret.

use crate::{AccountError, AccountInterface};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use swap_types::{ConfigSchema, Field, FieldType, Schema, Signature, ValidationError, WalletHandle};
use tracing::debug;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Signing oracle backed by a remote custody API.
pub struct CustodyAccount {
	client: reqwest::Client,
	api_url: String,
	app_id: String,
	app_secret: String,
}

impl CustodyAccount {
	pub fn new(
		api_url: impl Into<String>,
		app_id: impl Into<String>,
		app_secret: impl Into<String>,
		timeout: Duration,
	) -> Result<Self, AccountError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| AccountError::Provider(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			api_url: api_url.into().trim_end_matches('/').to_string(),
			app_id: app_id.into(),
			app_secret: app_secret.into(),
		})
	}

	fn wallet_url(&self, wallet: &WalletHandle) -> String {
		format!("{}/wallets/{}", self.api_url, wallet.id)
	}

	async fn read_json<T: for<'de> Deserialize<'de>>(
		response: reqwest::Response,
		what: &str,
	) -> Result<T, AccountError> {
		let status = response.status();
		if !status.is_success() {
			let body = response
				.text()
				.await
				.unwrap_or_else(|e| format!("<unreadable body: {}>", e));
			return Err(AccountError::SigningFailed(format!(
				"{} returned {}: {}",
				what, status, body
			)));
		}
		response
			.json()
			.await
			.map_err(|e| AccountError::Provider(format!("Malformed {} response: {}", what, e)))
	}
}

#[derive(Debug, Deserialize)]
struct RawSignResponse {
	data: RawSignData,
}

#[derive(Debug, Deserialize)]
struct RawSignData {
	signature: String,
}

#[derive(Debug, Deserialize)]
struct WalletResponse {
	public_key: String,
}

fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>, AccountError> {
	let digits = value.strip_prefix("0x").unwrap_or(value);
	hex::decode(digits)
		.map_err(|e| AccountError::Provider(format!("Invalid hex in {}: {}", field, e)))
}

/// Configuration schema for CustodyAccount.
pub struct CustodyAccountSchema;

impl ConfigSchema for CustodyAccountSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let non_empty = |value: &toml::Value| match value.as_str() {
			Some(s) if !s.trim().is_empty() => Ok(()),
			_ => Err("must not be empty".to_string()),
		};

		let schema = Schema::new(
			// Required fields
			vec![
				Field::new("api_url", FieldType::Url),
				Field::new("app_id", FieldType::String).with_validator(non_empty),
				Field::new("app_secret", FieldType::String).with_validator(non_empty),
			],
			// Optional fields
			vec![Field::new(
				"timeout_ms",
				FieldType::Integer {
					min: Some(1),
					max: None,
				},
			)],
		);

		schema.validate(config)
	}
}

#[async_trait]
impl AccountInterface for CustodyAccount {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(CustodyAccountSchema)
	}

	async fn sign(&self, wallet: &WalletHandle, payload: &[u8]) -> Result<Signature, AccountError> {
		debug!(wallet = %wallet.id, bytes = payload.len(), "Requesting raw signature");

		let body = serde_json::json!({
			"params": { "hash": format!("0x{}", hex::encode(payload)) }
		});
		let response = self
			.client
			.post(format!("{}/raw_sign", self.wallet_url(wallet)))
			.basic_auth(&self.app_id, Some(&self.app_secret))
			.json(&body)
			.send()
			.await
			.map_err(|e| AccountError::Provider(format!("raw_sign request failed: {}", e)))?;

		let signed: RawSignResponse = Self::read_json(response, "raw_sign").await?;
		Ok(Signature(decode_hex("signature", &signed.data.signature)?))
	}

	async fn public_key(&self, wallet: &WalletHandle) -> Result<Vec<u8>, AccountError> {
		let response = self
			.client
			.get(self.wallet_url(wallet))
			.basic_auth(&self.app_id, Some(&self.app_secret))
			.send()
			.await
			.map_err(|e| AccountError::Provider(format!("wallet lookup failed: {}", e)))?;

		let info: WalletResponse = Self::read_json(response, "wallet lookup").await?;
		decode_hex("public_key", &info.public_key)
	}
}

/// Factory function to create a custody signing oracle from configuration.
///
/// Configuration parameters:
/// - `api_url`: base URL of the custody API
/// - `app_id` / `app_secret`: API credentials
/// - `timeout_ms`: optional per-request timeout (default 10000)
pub fn create_account(config: &toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> {
	CustodyAccountSchema
		.validate(config)
		.map_err(|e| AccountError::InvalidConfig(e.to_string()))?;

	let get = |key: &str| {
		config
			.get(key)
			.and_then(|v| v.as_str())
			.map(str::to_string)
			.ok_or_else(|| AccountError::InvalidConfig(format!("{} is required", key)))
	};
	let timeout_ms = config
		.get("timeout_ms")
		.and_then(|v| v.as_integer())
		.map(|v| v as u64)
		.unwrap_or(DEFAULT_TIMEOUT_MS);

	Ok(Box::new(CustodyAccount::new(
		get("api_url")?,
		get("app_id")?,
		get("app_secret")?,
		Duration::from_millis(timeout_ms),
	)?))
}
