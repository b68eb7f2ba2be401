//! Normalized order records.
//!
//! Orders are snapshots built from relayer feeds for display and tracking.
//! They are never mutated; each query produces fresh records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an order as seen by the maker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
	Pending,
	Filled,
	Cancelled,
	Expired,
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			OrderStatus::Pending => "PENDING",
			OrderStatus::Filled => "FILLED",
			OrderStatus::Cancelled => "CANCELLED",
			OrderStatus::Expired => "EXPIRED",
		};
		f.write_str(label)
	}
}

/// One intent's lifecycle, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	/// Relayer order id or settlement hash.
	pub id: String,
	pub maker: String,
	pub sell_symbol: String,
	pub buy_symbol: String,
	/// Sell amount in whole tokens.
	pub sell_amount: Decimal,
	/// Buy amount in whole tokens.
	pub buy_amount: Decimal,
	pub status: OrderStatus,
	pub timestamp: DateTime<Utc>,
	/// Settlement transaction, once there is one.
	pub settlement_reference: Option<String>,
	pub nonce: u64,
	/// Relayer-provided label for the realized rate.
	pub execution_rate: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_serializes_upper_case() {
		assert_eq!(
			serde_json::to_string(&OrderStatus::Cancelled).unwrap(),
			"\"CANCELLED\""
		);
		assert_eq!(OrderStatus::Filled.to_string(), "FILLED");
	}
}
