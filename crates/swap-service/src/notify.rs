//! Human-readable lines for swap events and order records.

use swap_types::{
	EscrowEvent, IntentEvent, Order, SettlementEvent, SettlementOutcome, SwapEvent, TokenRegistry,
};

pub fn render(event: &SwapEvent, tokens: &TokenRegistry) -> String {
	match event {
		SwapEvent::Escrow(EscrowEvent::ToppedUp {
			token,
			amount,
			tx_hash,
			..
		}) => {
			let symbol = tokens.symbol_for(token);
			let human = tokens.to_human(token, (*amount).into());
			format!("Deposited {} {} into escrow ({})", human, symbol, tx_hash)
		}
		SwapEvent::Intent(IntentEvent::Submitted { hash, nonce, .. }) => {
			format!("Intent {} submitted with nonce {}", hash.to_prefixed_hex(), nonce)
		}
		SwapEvent::Settlement(SettlementEvent::Resolved { hash, outcome, .. }) => match outcome {
			SettlementOutcome::Filled { reference } => {
				format!("Swap filled: {} (settlement {})", hash.to_prefixed_hex(), reference)
			}
			SettlementOutcome::Failed { message } => {
				format!("Swap failed: {} ({})", hash.to_prefixed_hex(), message)
			}
			SettlementOutcome::Expired => {
				format!("Swap unresolved: {}", hash.to_prefixed_hex())
			}
		},
	}
}

pub fn order_line(order: &Order) -> String {
	let mut line = format!(
		"{:<9} {} {} -> {} {}  nonce {}  {}",
		order.status.to_string(),
		order.sell_amount,
		order.sell_symbol,
		order.buy_amount,
		order.buy_symbol,
		order.nonce,
		order.timestamp.format("%Y-%m-%d %H:%M:%S"),
	);
	if let Some(reference) = &order.settlement_reference {
		line.push_str(&format!("  tx {}", reference));
	}
	if let Some(rate) = &order.execution_rate {
		line.push_str(&format!("  @ {}", rate));
	}
	line
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal::Decimal;
	use swap_types::{IntentHash, OrderStatus, TokenInfo, TransactionHash};

	fn tokens() -> TokenRegistry {
		TokenRegistry::new(vec![TokenInfo {
			symbol: "APT".into(),
			type_tag: "0x1::aptos_coin::AptosCoin".into(),
			decimals: 8,
		}])
	}

	#[test]
	fn test_deposit_is_shown_in_whole_tokens() {
		let event = SwapEvent::Escrow(EscrowEvent::ToppedUp {
			maker: "0x1".into(),
			token: "0x1::aptos_coin::AptosCoin".into(),
			amount: 150_000_000,
			tx_hash: TransactionHash("0xabc".into()),
		});

		assert_eq!(
			render(&event, &tokens()),
			"Deposited 1.5 APT into escrow (0xabc)"
		);
	}

	#[test]
	fn test_failure_carries_relayer_message() {
		let event = SwapEvent::Settlement(SettlementEvent::Resolved {
			hash: IntentHash([0u8; 32]),
			maker: "0x1".into(),
			outcome: SettlementOutcome::Failed {
				message: "no solver".into(),
			},
		});

		let line = render(&event, &tokens());
		assert!(line.starts_with("Swap failed: 0x0000"));
		assert!(line.ends_with("(no solver)"));
	}

	#[test]
	fn test_order_line() {
		let order = Order {
			id: "0xfill".into(),
			maker: "0x1".into(),
			sell_symbol: "APT".into(),
			buy_symbol: "USDC".into(),
			sell_amount: Decimal::ONE,
			buy_amount: Decimal::from(5),
			status: OrderStatus::Filled,
			timestamp: chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
			settlement_reference: Some("0xfill".into()),
			nonce: 3,
			execution_rate: None,
		};

		assert_eq!(
			order_line(&order),
			"FILLED    1 APT -> 5 USDC  nonce 3  2023-11-14 22:13:20  tx 0xfill"
		);
	}
}
