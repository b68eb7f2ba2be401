//! Swap quotes and their conversion into intents.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Intent, TokenInfo};

/// Basis points in one whole.
pub const BPS_DENOMINATOR: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
	#[error("sell amount must be positive")]
	NonPositiveAmount,
	#[error("exchange rate must be positive")]
	NonPositiveRate,
	#[error("cannot swap {0} for itself")]
	SameToken(String),
	#[error("slippage of {0} bps is out of range")]
	InvalidSlippage(u32),
	#[error("{0} is too large")]
	AmountOverflow(&'static str),
	#[error("validity window of {0}s ends past the representable time range")]
	WindowOverflow(u64),
}

/// Price snapshot for one user interaction.
///
/// Amounts are in whole tokens. Quotes are never persisted and carry no
/// expiry of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
	pub sell_token: TokenInfo,
	pub buy_token: TokenInfo,
	pub sell_amount: Decimal,
	pub expected_buy_amount: Decimal,
	/// Units of buy token received per unit of sell token.
	pub rate: Decimal,
}

impl SwapQuote {
	pub fn new(
		sell_token: TokenInfo,
		buy_token: TokenInfo,
		sell_amount: Decimal,
		rate: Decimal,
	) -> Result<Self, QuoteError> {
		if sell_amount <= Decimal::ZERO {
			return Err(QuoteError::NonPositiveAmount);
		}
		if rate <= Decimal::ZERO {
			return Err(QuoteError::NonPositiveRate);
		}
		if sell_token.type_tag == buy_token.type_tag {
			return Err(QuoteError::SameToken(sell_token.symbol));
		}

		let expected_buy_amount = sell_amount
			.checked_mul(rate)
			.ok_or(QuoteError::AmountOverflow("expected buy amount"))?;

		Ok(Self {
			expected_buy_amount,
			sell_token,
			buy_token,
			sell_amount,
			rate,
		})
	}

	/// Builds the intent a maker signs for this quote.
	///
	/// The expected amount opens the buy range and the slippage tolerance
	/// closes it. The validity window starts at `now` and lasts `ttl_secs`.
	pub fn to_intent(
		&self,
		maker: &str,
		nonce: u64,
		slippage_bps: u32,
		ttl_secs: u64,
		now: u64,
	) -> Result<Intent, QuoteError> {
		if slippage_bps >= BPS_DENOMINATOR {
			return Err(QuoteError::InvalidSlippage(slippage_bps));
		}

		let sell_amount = self
			.sell_token
			.to_smallest_unit(self.sell_amount)
			.ok_or(QuoteError::AmountOverflow("sell amount"))?;
		let start_buy_amount = self
			.buy_token
			.to_smallest_unit(self.expected_buy_amount)
			.ok_or(QuoteError::AmountOverflow("buy amount"))?;
		let end_buy_amount = start_buy_amount
			.checked_mul(Decimal::from(BPS_DENOMINATOR - slippage_bps))
			.ok_or(QuoteError::AmountOverflow("buy amount"))?
			/ Decimal::from(BPS_DENOMINATOR);
		let end_time = now
			.checked_add(ttl_secs)
			.ok_or(QuoteError::WindowOverflow(ttl_secs))?;

		Ok(Intent {
			maker: maker.to_string(),
			nonce,
			sell_token: self.sell_token.type_tag.clone(),
			buy_token: self.buy_token.type_tag.clone(),
			sell_amount,
			start_buy_amount,
			end_buy_amount,
			start_time: now,
			end_time,
		})
	}
}
