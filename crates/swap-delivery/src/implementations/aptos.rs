//! Aptos full-node REST client.
//!
//! Endpoints used, relative to `rest_url`:
//!
//! - `POST /view` for read-only calls
//! - `GET /accounts/{address}` for the sender's sequence number
//! - `POST /transactions/encode_submission` for the signing message
//! - `POST /transactions` to submit with an ed25519 authenticator
//! - `GET /transactions/by_hash/{hash}` to await commitment

use crate::{DeliveryError, DeliveryInterface};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use swap_types::{
	Authenticator, ConfigSchema, EntryFunction, Field, FieldType, Schema, TransactionHash,
	TransactionReceipt, UnsignedTransaction, ValidationError,
};
use tracing::{debug, info};

const DEFAULT_CONFIRMATION_POLL: Duration = Duration::from_secs(1);

/// Chain client for an Aptos full node.
pub struct AptosRestClient {
	client: reqwest::Client,
	rest_url: String,
	max_gas_amount: u64,
	gas_unit_price: u64,
	transaction_ttl_secs: u64,
	confirmation_timeout: Duration,
	confirmation_poll: Duration,
}

impl AptosRestClient {
	pub fn new(rest_url: impl Into<String>) -> Result<Self, DeliveryError> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| DeliveryError::Network(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			rest_url: rest_url.into().trim_end_matches('/').to_string(),
			max_gas_amount: 20_000,
			gas_unit_price: 100,
			transaction_ttl_secs: 60,
			confirmation_timeout: Duration::from_secs(60),
			confirmation_poll: DEFAULT_CONFIRMATION_POLL,
		})
	}

	pub fn with_gas(mut self, max_gas_amount: u64, gas_unit_price: u64) -> Self {
		self.max_gas_amount = max_gas_amount;
		self.gas_unit_price = gas_unit_price;
		self
	}

	pub fn with_transaction_ttl(mut self, secs: u64) -> Self {
		self.transaction_ttl_secs = secs;
		self
	}

	pub fn with_confirmation(mut self, timeout: Duration, poll: Duration) -> Self {
		self.confirmation_timeout = timeout;
		self.confirmation_poll = poll;
		self
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.rest_url, path)
	}

	async fn post_json<B: Serialize + ?Sized>(
		&self,
		path: &str,
		body: &B,
	) -> Result<reqwest::Response, DeliveryError> {
		self.client
			.post(self.url(path))
			.json(body)
			.send()
			.await
			.map_err(|e| DeliveryError::Network(format!("POST {} failed: {}", path, e)))
	}
}

/// Aptos JSON representation of a transaction. Integers travel as strings.
#[derive(Debug, Serialize)]
struct TransactionRequest<'a> {
	sender: &'a str,
	sequence_number: String,
	max_gas_amount: String,
	gas_unit_price: String,
	expiration_timestamp_secs: String,
	payload: EntryFunctionPayload<'a>,
	#[serde(skip_serializing_if = "Option::is_none")]
	signature: Option<Ed25519Signature>,
}

#[derive(Debug, Serialize)]
struct EntryFunctionPayload<'a> {
	#[serde(rename = "type")]
	kind: &'static str,
	function: &'a str,
	type_arguments: &'a [String],
	arguments: &'a [serde_json::Value],
}

#[derive(Debug, Serialize)]
struct Ed25519Signature {
	#[serde(rename = "type")]
	kind: &'static str,
	public_key: String,
	signature: String,
}

impl<'a> TransactionRequest<'a> {
	fn new(tx: &'a UnsignedTransaction) -> Self {
		Self {
			sender: &tx.sender,
			sequence_number: tx.sequence_number.to_string(),
			max_gas_amount: tx.max_gas_amount.to_string(),
			gas_unit_price: tx.gas_unit_price.to_string(),
			expiration_timestamp_secs: tx.expiration_timestamp_secs.to_string(),
			payload: EntryFunctionPayload {
				kind: "entry_function_payload",
				function: &tx.payload.function,
				type_arguments: &tx.payload.type_arguments,
				arguments: &tx.payload.arguments,
			},
			signature: None,
		}
	}
}

#[derive(Debug, Deserialize)]
struct AccountResource {
	sequence_number: String,
}

#[derive(Debug, Deserialize)]
struct SubmittedTransaction {
	hash: String,
}

#[derive(Debug, Deserialize)]
struct CommittedTransaction {
	#[serde(rename = "type")]
	kind: String,
	hash: String,
	#[serde(default)]
	success: bool,
	#[serde(default)]
	vm_status: String,
}

async fn error_body(response: reqwest::Response) -> String {
	let status = response.status();
	match response.text().await {
		Ok(body) => format!("{}: {}", status, body),
		Err(e) => format!("{}: <unreadable body: {}>", status, e),
	}
}

/// Upper bound on `transaction_ttl_secs`.
pub const MAX_TRANSACTION_TTL_SECS: u64 = 86_400;

/// Configuration schema for the Aptos REST client.
pub struct AptosRestSchema;

impl ConfigSchema for AptosRestSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let positive = || FieldType::Integer {
			min: Some(1),
			max: None,
		};
		let schema = Schema::new(
			vec![Field::new("rest_url", FieldType::Url)],
			vec![
				Field::new("max_gas_amount", positive()),
				Field::new("gas_unit_price", positive()),
				Field::new(
					"transaction_ttl_secs",
					FieldType::Integer {
						min: Some(1),
						max: Some(MAX_TRANSACTION_TTL_SECS as i64),
					},
				),
				Field::new("confirmation_timeout_secs", positive()),
			],
		);

		schema.validate(config)
	}
}

#[async_trait]
impl DeliveryInterface for AptosRestClient {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(AptosRestSchema)
	}

	async fn view(&self, call: &EntryFunction) -> Result<Vec<serde_json::Value>, DeliveryError> {
		let view_error = |message: String| DeliveryError::View {
			function: call.function.clone(),
			message,
		};

		let response = self.post_json("/view", call).await?;
		if !response.status().is_success() {
			return Err(view_error(error_body(response).await));
		}
		response
			.json()
			.await
			.map_err(|e| view_error(format!("malformed response: {}", e)))
	}

	async fn build_transaction(
		&self,
		sender: &str,
		payload: EntryFunction,
	) -> Result<UnsignedTransaction, DeliveryError> {
		let path = format!("/accounts/{}", sender);
		let response = self
			.client
			.get(self.url(&path))
			.send()
			.await
			.map_err(|e| DeliveryError::Network(format!("GET {} failed: {}", path, e)))?;
		if !response.status().is_success() {
			return Err(DeliveryError::InvalidResponse(error_body(response).await));
		}

		let account: AccountResource = response
			.json()
			.await
			.map_err(|e| DeliveryError::InvalidResponse(e.to_string()))?;
		let sequence_number = account.sequence_number.parse().map_err(|_| {
			DeliveryError::InvalidResponse(format!(
				"sequence number is not an integer: {}",
				account.sequence_number
			))
		})?;

		let now = chrono::Utc::now().timestamp().max(0) as u64;

		Ok(UnsignedTransaction {
			sender: sender.to_string(),
			sequence_number,
			max_gas_amount: self.max_gas_amount,
			gas_unit_price: self.gas_unit_price,
			expiration_timestamp_secs: now.saturating_add(self.transaction_ttl_secs),
			payload,
		})
	}

	async fn get_signing_message(&self, tx: &UnsignedTransaction) -> Result<Vec<u8>, DeliveryError> {
		let response = self
			.post_json("/transactions/encode_submission", &TransactionRequest::new(tx))
			.await?;
		if !response.status().is_success() {
			return Err(DeliveryError::InvalidResponse(error_body(response).await));
		}

		let encoded: String = response
			.json()
			.await
			.map_err(|e| DeliveryError::InvalidResponse(e.to_string()))?;
		hex::decode(encoded.trim_start_matches("0x"))
			.map_err(|e| DeliveryError::InvalidResponse(format!("signing message: {}", e)))
	}

	async fn submit(
		&self,
		tx: &UnsignedTransaction,
		authenticator: &Authenticator,
	) -> Result<TransactionHash, DeliveryError> {
		let mut request = TransactionRequest::new(tx);
		request.signature = Some(Ed25519Signature {
			kind: "ed25519_signature",
			public_key: authenticator.public_key.to_hex(),
			signature: authenticator.signature.to_hex(),
		});

		let response = self.post_json("/transactions", &request).await?;
		if !response.status().is_success() {
			return Err(DeliveryError::InvalidResponse(error_body(response).await));
		}

		let submitted: SubmittedTransaction = response
			.json()
			.await
			.map_err(|e| DeliveryError::InvalidResponse(e.to_string()))?;
		debug!(tx_hash = %submitted.hash, sequence_number = tx.sequence_number, "Transaction accepted");

		Ok(TransactionHash(submitted.hash))
	}

	async fn wait_for_confirmation(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionReceipt, DeliveryError> {
		let path = format!("/transactions/by_hash/{}", hash);
		let deadline = tokio::time::Instant::now() + self.confirmation_timeout;
		info!(tx_hash = %hash, "Waiting for confirmation");

		loop {
			let response = self
				.client
				.get(self.url(&path))
				.send()
				.await
				.map_err(|e| DeliveryError::Network(format!("GET {} failed: {}", path, e)))?;

			if response.status().is_success() {
				let tx: CommittedTransaction = response
					.json()
					.await
					.map_err(|e| DeliveryError::InvalidResponse(e.to_string()))?;

				if tx.kind != "pending_transaction" {
					return Ok(TransactionReceipt {
						hash: TransactionHash(tx.hash),
						success: tx.success,
						vm_status: tx.vm_status,
					});
				}
			} else if response.status() != reqwest::StatusCode::NOT_FOUND {
				return Err(DeliveryError::InvalidResponse(error_body(response).await));
			}

			if tokio::time::Instant::now() + self.confirmation_poll > deadline {
				return Err(DeliveryError::ConfirmationTimeout(hash.clone()));
			}
			tokio::time::sleep(self.confirmation_poll).await;
		}
	}
}

/// Factory function to create an Aptos chain client from configuration.
///
/// Configuration parameters:
/// - `rest_url`: full node REST endpoint
/// - `max_gas_amount`, `gas_unit_price`: gas settings for built transactions
/// - `transaction_ttl_secs`: expiration offset for built transactions
/// - `confirmation_timeout_secs`: how long to wait for a commit
pub fn create_delivery(config: &toml::Value) -> Result<Box<dyn DeliveryInterface>, DeliveryError> {
	AptosRestSchema
		.validate(config)
		.map_err(|e| DeliveryError::InvalidConfig(e.to_string()))?;

	let rest_url = config
		.get("rest_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| DeliveryError::InvalidConfig("rest_url is required".into()))?;
	let int = |key: &str, default: u64| {
		config
			.get(key)
			.and_then(|v| v.as_integer())
			.map(|v| v as u64)
			.unwrap_or(default)
	};

	let client = AptosRestClient::new(rest_url)?
		.with_gas(int("max_gas_amount", 20_000), int("gas_unit_price", 100))
		.with_transaction_ttl(int("transaction_ttl_secs", 60))
		.with_confirmation(
			Duration::from_secs(int("confirmation_timeout_secs", 60)),
			DEFAULT_CONFIRMATION_POLL,
		);

	Ok(Box::new(client))
}
