//! Canonical intent encoding.
//!
//! Layout, in order:
//!
//! | field                     | bytes                     |
//! |---------------------------|---------------------------|
//! | domain tag                | `IntentSwap::Intent::V1`  |
//! | maker                     | 32, zero-padded at front  |
//! | nonce                     | u64 little-endian         |
//! | sell token type tag       | raw UTF-8, no length      |
//! | buy token type tag        | raw UTF-8, no length      |
//! | sell amount               | u64 little-endian         |
//! | start buy amount          | u64 little-endian         |
//! | end buy amount            | u64 little-endian         |
//! | start time                | u64 little-endian         |
//! | end time                  | u64 little-endian         |
//!
//! Type tags are not length prefixed. The trailing fixed-width fields frame
//! them, and the relayer hashes the same bytes, so the layout must not change.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use swap_types::{Address, Intent, ADDRESS_LENGTH};

use crate::IntentError;

/// Domain separator identifying the intent schema and its version.
pub const INTENT_DOMAIN_TAG: &[u8] = b"IntentSwap::Intent::V1";

/// Encodes an intent into its canonical byte form.
pub fn encode(intent: &Intent) -> Result<Vec<u8>, IntentError> {
	let maker = Address::parse(&intent.maker)
		.map_err(|e| IntentError::InvalidAddress(format!("{}: {}", intent.maker, e)))?;

	let mut out = Vec::with_capacity(
		INTENT_DOMAIN_TAG.len()
			+ ADDRESS_LENGTH
			+ intent.sell_token.len()
			+ intent.buy_token.len()
			+ 6 * 8,
	);

	out.extend_from_slice(INTENT_DOMAIN_TAG);
	out.extend_from_slice(&maker.to_padded());
	out.extend_from_slice(&intent.nonce.to_le_bytes());
	out.extend_from_slice(intent.sell_token.as_bytes());
	out.extend_from_slice(intent.buy_token.as_bytes());
	out.extend_from_slice(&amount_le("sell_amount", intent.sell_amount)?);
	out.extend_from_slice(&amount_le("start_buy_amount", intent.start_buy_amount)?);
	out.extend_from_slice(&amount_le("end_buy_amount", intent.end_buy_amount)?);
	out.extend_from_slice(&intent.start_time.to_le_bytes());
	out.extend_from_slice(&intent.end_time.to_le_bytes());

	Ok(out)
}

/// Truncates toward zero and lays out as u64 little-endian.
fn amount_le(field: &'static str, amount: Decimal) -> Result<[u8; 8], IntentError> {
	amount
		.trunc()
		.to_u64()
		.map(u64::to_le_bytes)
		.ok_or_else(|| IntentError::IntegerOverflow {
			field,
			value: amount.to_string(),
		})
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use std::str::FromStr;

	pub(crate) const GOLDEN_ENCODING: &str = "496e74656e74537761703a3a496e74656e743a3a56310000000000000000000000001234567890abcdef1234567890abcdef1234567801000000000000003078313a3a6170746f735f636f696e3a3a4170746f73436f696e3078663232626564653233376130376531323162353664393161343931656237626364666431663539303739323661396535383333386639363461303162313766613a3a61737365743a3a5553444300e1f50500000000404b4c0000000000b07a48000000000000f153650000000058f3536500000000";

	pub(crate) fn golden_intent() -> Intent {
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
	fn test_golden_encoding() {
		let encoded = encode(&golden_intent()).unwrap();

		assert_eq!(encoded.len(), 207);
		assert_eq!(hex::encode(&encoded), GOLDEN_ENCODING);
	}

	#[test]
	fn test_encoding_is_deterministic_and_field_sensitive() {
		let base = encode(&golden_intent()).unwrap();
		assert_eq!(base, encode(&golden_intent()).unwrap());

		let changes: [(&str, fn(&mut Intent)); 9] = [
			("maker", |i: &mut Intent| {
				i.maker = "0x1234567890abcdef1234567890abcdef12345679".to_string()
			}),
			("nonce", |i: &mut Intent| i.nonce = 2),
			("sell_token", |i: &mut Intent| i.sell_token.push('2')),
			("buy_token", |i: &mut Intent| i.buy_token.push('T')),
			("sell_amount", |i: &mut Intent| i.sell_amount += Decimal::ONE),
			("start_buy_amount", |i: &mut Intent| i.start_buy_amount += Decimal::ONE),
			("end_buy_amount", |i: &mut Intent| i.end_buy_amount -= Decimal::ONE),
			("start_time", |i: &mut Intent| i.start_time += 1),
			("end_time", |i: &mut Intent| i.end_time += 1),
		];

		for (field, change) in changes {
			let mut changed = golden_intent();
			change(&mut changed);
			assert_ne!(encode(&changed).unwrap(), base, "changing {} kept the encoding", field);
		}
	}

	#[test]
	fn test_fractional_amounts_truncate() {
		let mut fractional = golden_intent();
		fractional.end_buy_amount = Decimal::from_str("4750000.9").unwrap();

		assert_eq!(
			encode(&fractional).unwrap(),
			encode(&golden_intent()).unwrap()
		);
	}

	#[test]
	fn test_full_width_maker_is_not_padded() {
		let mut intent = golden_intent();
		intent.maker =
			"0xf22bede237a07e121b56d91a491eb7bcdfd1f5907926a9e58338f964a01b17fa".to_string();
		let encoded = encode(&intent).unwrap();
		let tag = INTENT_DOMAIN_TAG.len();

		assert_eq!(
			hex::encode(&encoded[tag..tag + 32]),
			"f22bede237a07e121b56d91a491eb7bcdfd1f5907926a9e58338f964a01b17fa"
		);
	}

	#[test]
	fn test_errors() {
		let mut bad_maker = golden_intent();
		bad_maker.maker = "0xnot-an-address".to_string();
		assert!(matches!(
			encode(&bad_maker),
			Err(IntentError::InvalidAddress(_))
		));

		let mut short_maker = golden_intent();
		short_maker.maker = "0x1234".to_string();
		assert!(matches!(
			encode(&short_maker),
			Err(IntentError::InvalidAddress(_))
		));

		let mut huge = golden_intent();
		huge.sell_amount = Decimal::from(u64::MAX) + Decimal::ONE;
		assert!(matches!(
			encode(&huge),
			Err(IntentError::IntegerOverflow {
				field: "sell_amount",
				..
			})
		));
	}
}
