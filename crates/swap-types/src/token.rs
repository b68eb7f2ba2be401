//! Token metadata and unit conversion.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest supported `decimals`: 10^19 is the biggest power of ten a u64 holds.
pub const MAX_DECIMALS: u32 = 19;

/// A token the pipeline knows how to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
	/// Display symbol, e.g. `APT`.
	pub symbol: String,
	/// On-chain type tag, e.g. `0x1::aptos_coin::AptosCoin`.
	pub type_tag: String,
	/// Number of decimals between the smallest unit and one whole token.
	pub decimals: u32,
}

impl TokenInfo {
	/// Multiplier between one whole token and its smallest unit.
	///
	/// `None` when `decimals` exceeds [`MAX_DECIMALS`].
	pub fn unit(&self) -> Option<Decimal> {
		if self.decimals > MAX_DECIMALS {
			return None;
		}
		10u64.checked_pow(self.decimals).map(Decimal::from)
	}

	/// Converts a human amount into smallest units. Fractions are kept.
	///
	/// `None` when the result does not fit in a `Decimal` or the token's
	/// decimals are unsupported.
	pub fn to_smallest_unit(&self, human: Decimal) -> Option<Decimal> {
		human.checked_mul(self.unit()?)
	}

	/// Converts an amount in smallest units into whole tokens.
	///
	/// Amounts of a token with unsupported decimals are returned unchanged.
	pub fn to_human(&self, raw: Decimal) -> Decimal {
		match self.unit() {
			Some(unit) => (raw / unit).normalize(),
			None => raw,
		}
	}
}

/// Lookup table of known tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRegistry {
	tokens: Vec<TokenInfo>,
}

impl TokenRegistry {
	pub fn new(tokens: Vec<TokenInfo>) -> Self {
		Self { tokens }
	}

	pub fn tokens(&self) -> &[TokenInfo] {
		&self.tokens
	}

	/// Finds a token by symbol, case-insensitively.
	pub fn by_symbol(&self, symbol: &str) -> Option<&TokenInfo> {
		self.tokens
			.iter()
			.find(|t| t.symbol.eq_ignore_ascii_case(symbol))
	}

	/// Finds a token by its exact type tag (case-insensitive hex).
	pub fn by_type_tag(&self, type_tag: &str) -> Option<&TokenInfo> {
		self.tokens
			.iter()
			.find(|t| t.type_tag.eq_ignore_ascii_case(type_tag))
	}

	/// Resolves a symbol or a type tag.
	pub fn resolve(&self, symbol_or_tag: &str) -> Option<&TokenInfo> {
		self.by_symbol(symbol_or_tag)
			.or_else(|| self.by_type_tag(symbol_or_tag))
	}

	/// Display symbol for a type tag.
	///
	/// Unknown tags fall back to their last `::` segment.
	pub fn symbol_for(&self, type_tag: &str) -> String {
		match self.by_type_tag(type_tag) {
			Some(token) => token.symbol.clone(),
			None => type_tag
				.rsplit("::")
				.next()
				.unwrap_or(type_tag)
				.to_string(),
		}
	}

	/// Converts a raw amount of `type_tag` into whole tokens.
	///
	/// Unknown tags are returned unchanged.
	pub fn to_human(&self, type_tag: &str, raw: Decimal) -> Decimal {
		match self.by_type_tag(type_tag) {
			Some(token) => token.to_human(raw),
			None => raw,
		}
	}
}
