//! HTTP relayer client.
//!
//! - `GET {url}/activity` answers `{"orders": [ActivityEntry]}`
//! - `GET {url}/orders` answers `{"orders": [PendingOrder]}`
//! - `POST {url}/intents` accepts an [`IntentSubmission`]; a refusal carries
//!   `{"error": "..."}`

use crate::types::{ActivityResponse, ErrorPayload, PendingResponse};
use crate::{ActivityEntry, IntentSubmission, PendingOrder, RelayerInterface, SettlementError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use swap_types::{ConfigSchema, Field, FieldType, Schema, ValidationError};
use tracing::{debug, warn};

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub struct HttpRelayer {
	client: reqwest::Client,
	base_url: String,
}

impl HttpRelayer {
	pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SettlementError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| SettlementError::Network(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
		})
	}

	async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SettlementError> {
		let url = format!("{}{}", self.base_url, path);
		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(|e| SettlementError::Network(format!("GET {} failed: {}", path, e)))?;

		let status = response.status();
		if !status.is_success() {
			return Err(SettlementError::Network(format!(
				"GET {} returned {}",
				path, status
			)));
		}

		response
			.json()
			.await
			.map_err(|e| SettlementError::InvalidResponse(format!("{}: {}", path, e)))
	}
}

/// Configuration schema for the HTTP relayer.
pub struct HttpRelayerSchema;

impl ConfigSchema for HttpRelayerSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(
			vec![Field::new("url", FieldType::Url)],
			vec![Field::new(
				"request_timeout_ms",
				FieldType::Integer {
					min: Some(1),
					max: None,
				},
			)],
		)
		.validate(config)
	}
}

#[async_trait]
impl RelayerInterface for HttpRelayer {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpRelayerSchema)
	}

	async fn activity(&self) -> Result<Vec<ActivityEntry>, SettlementError> {
		let response: ActivityResponse = self.get("/activity").await?;
		Ok(response.orders)
	}

	async fn pending_orders(&self) -> Result<Vec<PendingOrder>, SettlementError> {
		let response: PendingResponse = self.get("/orders").await?;
		Ok(response.orders)
	}

	async fn submit_intent(&self, submission: &IntentSubmission) -> Result<(), SettlementError> {
		let response = self
			.client
			.post(format!("{}/intents", self.base_url))
			.json(submission)
			.send()
			.await
			.map_err(|e| SettlementError::Network(format!("POST /intents failed: {}", e)))?;

		let status = response.status();
		let body = response.text().await;
		debug!(%status, "Relayer answered submission");

		submission_result(status, body)
	}
}

/// Interprets the relayer's answer to `POST /intents`.
///
/// An `{"error"}` payload is a rejection whatever the status. Other non-2xx
/// answers are rejections carrying the body, or the status and the read
/// failure when the body could not be read.
fn submission_result<E: std::fmt::Display>(
	status: reqwest::StatusCode,
	body: Result<String, E>,
) -> Result<(), SettlementError> {
	let body = match body {
		Ok(body) => body,
		Err(e) if status.is_success() => {
			warn!(%status, error = %e, "Accepted submission with unreadable body");
			return Ok(());
		}
		Err(e) => {
			return Err(SettlementError::RelayerRejected(format!(
				"{} (response body unreadable: {})",
				status, e
			)))
		}
	};

	if let Ok(payload) = serde_json::from_str::<ErrorPayload>(&body) {
		return Err(SettlementError::RelayerRejected(payload.error));
	}
	if !status.is_success() {
		let reason = if body.trim().is_empty() {
			status.to_string()
		} else {
			body
		};
		return Err(SettlementError::RelayerRejected(reason));
	}

	Ok(())
}

/// Factory function to create an HTTP relayer client from configuration.
///
/// Configuration parameters:
/// - `url`: relayer base URL
/// - `request_timeout_ms`: optional per-request timeout (default 10000)
pub fn create_relayer(config: &toml::Value) -> Result<Box<dyn RelayerInterface>, SettlementError> {
	HttpRelayerSchema
		.validate(config)
		.map_err(|e| SettlementError::InvalidConfig(e.to_string()))?;

	let url = config
		.get("url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| SettlementError::InvalidConfig("url is required".into()))?;
	let timeout_ms = config
		.get("request_timeout_ms")
		.and_then(|v| v.as_integer())
		.map(|v| v as u64)
		.unwrap_or(DEFAULT_TIMEOUT_MS);

	Ok(Box::new(HttpRelayer::new(
		url,
		Duration::from_millis(timeout_ms),
	)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::WireIntent;
	use rust_decimal::Decimal;
	use wiremock::matchers::{body_partial_json, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn relayer(server: &MockServer) -> HttpRelayer {
		HttpRelayer::new(server.uri(), Duration::from_secs(5)).unwrap()
	}

	fn submission() -> IntentSubmission {
		IntentSubmission {
			intent: WireIntent {
				maker: "0x1234".into(),
				nonce: 1,
				sell_token_type: "0x1::aptos_coin::AptosCoin".into(),
				buy_token_type: "0xabc::asset::USDC".into(),
				sell_amount: Decimal::from(100),
				buy_amount: None,
				start_buy_amount: Some(Decimal::from(50)),
				end_buy_amount: Some(Decimal::from(45)),
				start_time: Some(1),
				end_time: Some(2),
			},
			signature: "0x01".into(),
			public_key: "0x02".into(),
			signing_nonce: "31".into(),
			intent_hash: "0xab".into(),
		}
	}

	#[tokio::test]
	async fn test_fetches_feeds() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/activity"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"orders": [{
					"hash": "0xs1",
					"success": true,
					"timestamp": 1700000000000u64,
					"intent": {
						"maker": "0x1234",
						"sell_token_type": "a::b::C",
						"buy_token_type": "d::e::F",
						"sell_amount": "10",
						"buy_amount": "20",
						"nonce": 4,
					},
				}],
			})))
			.mount(&server)
			.await;
		Mock::given(method("GET"))
			.and(path("/orders"))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"orders": [],
			})))
			.mount(&server)
			.await;

		let relayer = relayer(&server);
		let activity = relayer.activity().await.unwrap();
		assert_eq!(activity.len(), 1);
		assert_eq!(activity[0].intent.nonce, 4);
		assert!(relayer.pending_orders().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_submit_posts_camel_case_fields() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/intents"))
			.and(body_partial_json(serde_json::json!({
				"signingNonce": "31",
				"intentHash": "0xab",
				"publicKey": "0x02",
			})))
			.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
				"status": "accepted",
			})))
			.expect(1)
			.mount(&server)
			.await;

		relayer(&server).submit_intent(&submission()).await.unwrap();
	}

	#[tokio::test]
	async fn test_rejection_reason_is_verbatim() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/intents"))
			.respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
				"error": "Invalid nonce: expected 2, got 1",
			})))
			.mount(&server)
			.await;

		let err = relayer(&server)
			.submit_intent(&submission())
			.await
			.unwrap_err();
		assert!(matches!(&err, SettlementError::RelayerRejected(reason)
			if reason == "Invalid nonce: expected 2, got 1"));
		assert_eq!(err.to_string(), "Invalid nonce: expected 2, got 1");
	}

	#[test]
	fn test_unreadable_rejection_body_keeps_read_error() {
		let result = submission_result(
			reqwest::StatusCode::BAD_GATEWAY,
			Err::<String, _>("connection reset by peer"),
		);
		match result {
			Err(SettlementError::RelayerRejected(reason)) => {
				assert!(reason.starts_with("502 Bad Gateway"));
				assert!(reason.contains("connection reset by peer"));
			}
			other => panic!("unexpected result: {:?}", other),
		}

		assert!(submission_result(reqwest::StatusCode::OK, Err::<String, _>("eof")).is_ok());
		assert!(matches!(
			submission_result::<String>(reqwest::StatusCode::BAD_REQUEST, Ok(String::new())),
			Err(SettlementError::RelayerRejected(reason)) if reason == "400 Bad Request"
		));
	}

	#[tokio::test]
	async fn test_feed_outage_is_network_error() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/activity"))
			.respond_with(ResponseTemplate::new(503))
			.mount(&server)
			.await;

		assert!(matches!(
			relayer(&server).activity().await,
			Err(SettlementError::Network(_))
		));
	}
}
