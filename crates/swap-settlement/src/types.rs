//! Relayer wire format.
//!
//! Intent fields travel in snake_case; the authentication fields around them
//! are camelCase. Relayers are inconsistent about numbers, so integers and
//! amounts are accepted either as JSON numbers or as decimal strings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use swap_types::{Address, Intent, IntentHash, SignedIntent};

/// Intent as the relayer represents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireIntent {
	pub maker: String,
	#[serde(with = "lenient::number")]
	pub nonce: u64,
	pub sell_token_type: String,
	pub buy_token_type: String,
	pub sell_amount: Decimal,
	/// Realized buy amount, reported on settled entries.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub buy_amount: Option<Decimal>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub start_buy_amount: Option<Decimal>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub end_buy_amount: Option<Decimal>,
	#[serde(
		default,
		with = "lenient::optional_number",
		skip_serializing_if = "Option::is_none"
	)]
	pub start_time: Option<u64>,
	#[serde(
		default,
		with = "lenient::optional_number",
		skip_serializing_if = "Option::is_none"
	)]
	pub end_time: Option<u64>,
}

impl WireIntent {
	/// Buy amount to show: realized if settled, otherwise the requested
	/// opening amount, otherwise the floor.
	pub fn display_buy_amount(&self) -> Decimal {
		self.buy_amount
			.or(self.start_buy_amount)
			.or(self.end_buy_amount)
			.unwrap_or_default()
	}

	pub fn is_from(&self, maker: &str) -> bool {
		Address::same(&self.maker, maker)
	}
}

impl From<&Intent> for WireIntent {
	fn from(intent: &Intent) -> Self {
		Self {
			maker: intent.maker.clone(),
			nonce: intent.nonce,
			sell_token_type: intent.sell_token.clone(),
			buy_token_type: intent.buy_token.clone(),
			sell_amount: intent.sell_amount.trunc(),
			buy_amount: None,
			start_buy_amount: Some(intent.start_buy_amount.trunc()),
			end_buy_amount: Some(intent.end_buy_amount.trunc()),
			start_time: Some(intent.start_time),
			end_time: Some(intent.end_time),
		}
	}
}

/// Entry of `GET /activity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
	/// Settlement reference.
	pub hash: String,
	/// Intent hash, when the relayer echoes it.
	#[serde(
		default,
		rename = "intentHash",
		alias = "intent_hash",
		skip_serializing_if = "Option::is_none"
	)]
	pub intent_hash: Option<String>,
	pub success: bool,
	/// Unix milliseconds.
	#[serde(with = "lenient::number")]
	pub timestamp: u64,
	pub intent: WireIntent,
	#[serde(
		default,
		rename = "executionRateLabel",
		skip_serializing_if = "Option::is_none"
	)]
	pub execution_rate_label: Option<String>,
}

impl ActivityEntry {
	pub fn refers_to(&self, hash: &IntentHash) -> bool {
		hash.matches(&self.hash)
			|| self
				.intent_hash
				.as_deref()
				.is_some_and(|reference| hash.matches(reference))
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ActivityResponse {
	#[serde(default)]
	pub orders: Vec<ActivityEntry>,
}

/// Entry of `GET /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
	/// Relayer order id, normally the intent hash.
	pub id: String,
	pub intent: WireIntent,
	#[serde(default)]
	pub signature: String,
	#[serde(default, rename = "publicKey")]
	pub public_key: String,
	#[serde(default, rename = "signingNonce")]
	pub signing_nonce: String,
	/// Unix milliseconds.
	#[serde(with = "lenient::number")]
	pub timestamp: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct PendingResponse {
	#[serde(default)]
	pub orders: Vec<PendingOrder>,
}

/// Body of `POST /intents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSubmission {
	pub intent: WireIntent,
	pub signature: String,
	#[serde(rename = "publicKey")]
	pub public_key: String,
	/// Hex of the UTF-8 bytes of the decimal nonce.
	#[serde(rename = "signingNonce")]
	pub signing_nonce: String,
	/// `0x`-prefixed intent hash.
	#[serde(rename = "intentHash")]
	pub intent_hash: String,
}

impl From<&SignedIntent> for IntentSubmission {
	fn from(signed: &SignedIntent) -> Self {
		Self {
			intent: WireIntent::from(&signed.intent),
			signature: signed.signature().to_hex(),
			public_key: signed.public_key().to_hex(),
			signing_nonce: signed.signing_nonce.clone(),
			intent_hash: signed.hash.to_prefixed_hex(),
		}
	}
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
	pub error: String,
}

mod lenient {
	use serde::{Deserialize, Deserializer};

	#[derive(Deserialize)]
	#[serde(untagged)]
	enum NumberOrString {
		Number(u64),
		String(String),
	}

	impl NumberOrString {
		fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
			match self {
				NumberOrString::Number(n) => Ok(n),
				NumberOrString::String(s) => s
					.trim()
					.parse()
					.map_err(|_| E::custom(format!("expected unsigned integer, got {:?}", s))),
			}
		}
	}

	pub mod number {
		use super::*;
		use serde::Serializer;

		pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
			serializer.serialize_u64(*value)
		}

		pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
			NumberOrString::deserialize(deserializer)?.into_u64()
		}
	}

	pub mod optional_number {
		use super::*;
		use serde::Serializer;

		pub fn serialize<S: Serializer>(
			value: &Option<u64>,
			serializer: S,
		) -> Result<S::Ok, S::Error> {
			match value {
				Some(v) => serializer.serialize_some(v),
				None => serializer.serialize_none(),
			}
		}

		pub fn deserialize<'de, D: Deserializer<'de>>(
			deserializer: D,
		) -> Result<Option<u64>, D::Error> {
			Option::<NumberOrString>::deserialize(deserializer)?
				.map(NumberOrString::into_u64)
				.transpose()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use swap_types::{Authenticator, PublicKey, Signature};

	#[test]
	fn test_activity_accepts_strings_and_numbers() {
		let json = serde_json::json!({
			"hash": "0xabc",
			"success": true,
			"timestamp": "1700000000123",
			"intent": {
				"maker": "0x1234",
				"sell_token_type": "0x1::aptos_coin::AptosCoin",
				"buy_token_type": "0xf22b::asset::USDC",
				"sell_amount": "100000000",
				"buy_amount": 4900000,
				"nonce": "3",
			},
			"executionRateLabel": "1 APT = 4.9 USDC",
		});

		let entry: ActivityEntry = serde_json::from_value(json).unwrap();
		assert_eq!(entry.timestamp, 1_700_000_000_123);
		assert_eq!(entry.intent.nonce, 3);
		assert_eq!(entry.intent.sell_amount, Decimal::from(100_000_000u64));
		assert_eq!(entry.intent.display_buy_amount(), Decimal::from(4_900_000u64));
		assert_eq!(entry.execution_rate_label.as_deref(), Some("1 APT = 4.9 USDC"));
		assert!(entry.intent_hash.is_none());
	}

	#[test]
	fn test_pending_order_with_range() {
		let json = serde_json::json!({
			"id": "0xfeed",
			"intent": {
				"maker": "0x1234",
				"sell_token_type": "a::b::C",
				"buy_token_type": "d::e::F",
				"sell_amount": 10,
				"start_buy_amount": "50",
				"end_buy_amount": "45",
				"nonce": 0,
				"start_time": 1700000000,
				"end_time": "1700000600",
			},
			"signature": "0x01",
			"publicKey": "0x02",
			"signingNonce": "30",
			"timestamp": 1700000000000u64,
		});

		let order: PendingOrder = serde_json::from_value(json).unwrap();
		assert_eq!(order.intent.end_time, Some(1_700_000_600));
		assert_eq!(order.intent.display_buy_amount(), Decimal::from(50));
		assert_eq!(order.signing_nonce, "30");
	}

	#[test]
	fn test_submission_shape() {
		let intent = Intent {
			maker: "0x1234567890abcdef1234567890abcdef12345678".into(),
			nonce: 1,
			sell_token: "0x1::aptos_coin::AptosCoin".into(),
			buy_token: "0xabc::asset::USDC".into(),
			sell_amount: Decimal::from(100_000_000u64),
			start_buy_amount: Decimal::from(5_000_000u64),
			end_buy_amount: Decimal::new(47_500_005, 1),
			start_time: 1_700_000_000,
			end_time: 1_700_000_600,
		};
		let mut hash = [0u8; 32];
		hash[31] = 0x0f;
		let signed = SignedIntent {
			intent,
			hash: IntentHash(hash),
			authenticator: Authenticator {
				public_key: PublicKey([0xaa; 32]),
				signature: Signature(vec![0xbb; 64]),
			},
			signing_nonce: "31".into(),
		};

		let body = serde_json::to_value(IntentSubmission::from(&signed)).unwrap();

		assert_eq!(body["signingNonce"], "31");
		assert_eq!(body["intentHash"], format!("0x{}0f", "00".repeat(31)));
		assert_eq!(body["publicKey"], format!("0x{}", "aa".repeat(32)));
		assert_eq!(body["intent"]["sell_token_type"], "0x1::aptos_coin::AptosCoin");
		assert_eq!(body["intent"]["end_buy_amount"], "4750000");
		assert_eq!(body["intent"]["nonce"], 1);
		assert!(body["intent"].get("buy_amount").is_none());
	}
}
