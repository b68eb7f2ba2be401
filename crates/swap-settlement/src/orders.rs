//! Order history aggregation.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use swap_types::{Order, OrderStatus, TokenRegistry};

use crate::{ActivityEntry, PendingOrder, WireIntent};

/// Merges both relayer feeds into a maker's order history.
///
/// Pending orders map to `PENDING`, or `EXPIRED` once their window has
/// closed. Settled entries map to `FILLED` or `CANCELLED` by their success
/// flag. A pending order that already appears in the activity feed is
/// dropped in favour of the settled record. The result is newest first and
/// holds at most `limit` records.
pub fn aggregate_orders(
	maker: &str,
	pending: &[PendingOrder],
	activity: &[ActivityEntry],
	tokens: &TokenRegistry,
	now: DateTime<Utc>,
	limit: usize,
) -> Vec<Order> {
	let settled_ids: HashSet<String> = activity
		.iter()
		.flat_map(|entry| {
			std::iter::once(entry.hash.to_ascii_lowercase())
				.chain(entry.intent_hash.iter().map(|h| h.to_ascii_lowercase()))
		})
		.collect();

	let pending_orders = pending
		.iter()
		.filter(|order| order.intent.is_from(maker))
		.filter(|order| !settled_ids.contains(&order.id.to_ascii_lowercase()))
		.map(|order| {
			let expired = order
				.intent
				.end_time
				.is_some_and(|end| end < now.timestamp().max(0) as u64);
			let status = if expired {
				OrderStatus::Expired
			} else {
				OrderStatus::Pending
			};
			build_order(&order.id, &order.intent, status, order.timestamp, None, None, tokens)
		});

	let settled_orders = activity
		.iter()
		.filter(|entry| entry.intent.is_from(maker))
		.map(|entry| {
			let status = if entry.success {
				OrderStatus::Filled
			} else {
				OrderStatus::Cancelled
			};
			build_order(
				entry.intent_hash.as_deref().unwrap_or(&entry.hash),
				&entry.intent,
				status,
				entry.timestamp,
				Some(entry.hash.clone()),
				entry.execution_rate_label.clone(),
				tokens,
			)
		});

	let mut orders: Vec<Order> = pending_orders.chain(settled_orders).collect();
	orders.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
	orders.truncate(limit);
	orders
}

fn build_order(
	id: &str,
	intent: &WireIntent,
	status: OrderStatus,
	timestamp_ms: u64,
	settlement_reference: Option<String>,
	execution_rate: Option<String>,
	tokens: &TokenRegistry,
) -> Order {
	let timestamp = i64::try_from(timestamp_ms)
		.ok()
		.and_then(DateTime::from_timestamp_millis)
		.unwrap_or_default();

	Order {
		id: id.to_string(),
		maker: intent.maker.clone(),
		sell_symbol: tokens.symbol_for(&intent.sell_token_type),
		buy_symbol: tokens.symbol_for(&intent.buy_token_type),
		sell_amount: tokens.to_human(&intent.sell_token_type, intent.sell_amount),
		buy_amount: tokens.to_human(&intent.buy_token_type, intent.display_buy_amount()),
		status,
		timestamp,
		settlement_reference,
		nonce: intent.nonce,
		execution_rate,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal::Decimal;
	use std::str::FromStr;
	use swap_types::TokenInfo;

	const MAKER: &str = "0x1234567890abcdef1234567890abcdef12345678";
	const NOW_SECS: i64 = 1_700_000_300;

	fn tokens() -> TokenRegistry {
		TokenRegistry::new(vec![
			TokenInfo {
				symbol: "APT".into(),
				type_tag: "0x1::aptos_coin::AptosCoin".into(),
				decimals: 8,
			},
			TokenInfo {
				symbol: "USDC".into(),
				type_tag: "0xabc::asset::USDC".into(),
				decimals: 6,
			},
		])
	}

	fn intent(maker: &str, nonce: u64, end_time: Option<u64>) -> WireIntent {
		WireIntent {
			maker: maker.to_string(),
			nonce,
			sell_token_type: "0x1::aptos_coin::AptosCoin".into(),
			buy_token_type: "0xabc::asset::USDC".into(),
			sell_amount: Decimal::from(150_000_000u64),
			buy_amount: None,
			start_buy_amount: Some(Decimal::from(7_500_000u64)),
			end_buy_amount: Some(Decimal::from(7_125_000u64)),
			start_time: Some(1_700_000_000),
			end_time,
		}
	}

	fn pending(id: &str, maker: &str, timestamp: u64, end_time: Option<u64>) -> PendingOrder {
		PendingOrder {
			id: id.into(),
			intent: intent(maker, 2, end_time),
			signature: "0x01".into(),
			public_key: "0x02".into(),
			signing_nonce: "32".into(),
			timestamp,
		}
	}

	fn settled(hash: &str, success: bool, timestamp: u64) -> ActivityEntry {
		let mut intent = intent(MAKER, 1, None);
		intent.buy_amount = Some(Decimal::from(7_400_000u64));
		ActivityEntry {
			hash: hash.into(),
			intent_hash: None,
			success,
			timestamp,
			intent,
			execution_rate_label: Some("1 APT = 4.93 USDC".into()),
		}
	}

	fn now() -> DateTime<Utc> {
		DateTime::from_timestamp(NOW_SECS, 0).unwrap()
	}

	#[test]
	fn test_merges_pending_and_settled() {
		let orders = aggregate_orders(
			MAKER,
			&[pending("0xp1", MAKER, 1_700_000_200_000, Some(1_700_000_600))],
			&[settled("0xs1", true, 1_700_000_100_000)],
			&tokens(),
			now(),
			10,
		);

		assert_eq!(orders.len(), 2);
		assert_eq!(orders[0].id, "0xp1");
		assert_eq!(orders[0].status, OrderStatus::Pending);
		assert_eq!(orders[0].sell_amount, Decimal::from_str("1.5").unwrap());
		assert_eq!(orders[0].buy_amount, Decimal::from_str("7.5").unwrap());
		assert_eq!(orders[0].settlement_reference, None);

		assert_eq!(orders[1].id, "0xs1");
		assert_eq!(orders[1].status, OrderStatus::Filled);
		assert_eq!(orders[1].sell_symbol, "APT");
		assert_eq!(orders[1].buy_symbol, "USDC");
		assert_eq!(orders[1].buy_amount, Decimal::from_str("7.4").unwrap());
		assert_eq!(orders[1].settlement_reference.as_deref(), Some("0xs1"));
		assert_eq!(orders[1].execution_rate.as_deref(), Some("1 APT = 4.93 USDC"));
	}

	#[test]
	fn test_status_mapping() {
		let orders = aggregate_orders(
			MAKER,
			&[pending("0xold", MAKER, 1_700_000_000_000, Some(1_700_000_200))],
			&[settled("0xfail", false, 1_700_000_050_000)],
			&tokens(),
			now(),
			10,
		);

		assert_eq!(orders[0].status, OrderStatus::Cancelled);
		assert_eq!(orders[1].status, OrderStatus::Expired);
	}

	#[test]
	fn test_filters_by_maker_sorts_and_truncates() {
		let other = "0x9999999999999999999999999999999999999999";
		let orders = aggregate_orders(
			MAKER,
			&[
				pending("0xa", MAKER, 3_000, None),
				pending("0xb", other, 9_000, None),
			],
			&[
				settled("0xc", true, 5_000),
				settled("0xd", true, 1_000),
				settled("0xe", false, 4_000),
			],
			&tokens(),
			now(),
			3,
		);

		let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
		assert_eq!(ids, vec!["0xc", "0xe", "0xa"]);
	}

	#[test]
	fn test_settled_replaces_pending_duplicate() {
		let mut entry = settled("0xsettle", true, 2_000);
		entry.intent_hash = Some("0xINTENT".into());

		let orders = aggregate_orders(
			MAKER,
			&[pending("0xintent", MAKER, 1_000, None)],
			&[entry],
			&tokens(),
			now(),
			10,
		);

		assert_eq!(orders.len(), 1);
		assert_eq!(orders[0].id, "0xINTENT");
		assert_eq!(orders[0].status, OrderStatus::Filled);
	}

	#[test]
	fn test_unknown_tokens_keep_raw_amounts() {
		let mut entry = settled("0xs", true, 1);
		entry.intent.buy_token_type = "0xdef::meme::MEME".into();

		let orders = aggregate_orders(MAKER, &[], &[entry], &tokens(), now(), 10);

		assert_eq!(orders[0].buy_symbol, "MEME");
		assert_eq!(orders[0].buy_amount, Decimal::from(7_400_000u64));
	}
}
