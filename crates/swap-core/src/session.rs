//! Per-user swap state.

use swap_types::{SwapQuote, WalletHandle};

/// Explicit state for one user, passed into every engine call.
///
/// Holds the user's wallet and the quote they were last shown. Nothing here
/// is shared between users.
#[derive(Debug, Clone)]
pub struct SwapSession {
	user_id: String,
	wallet: WalletHandle,
	last_quote: Option<SwapQuote>,
}

impl SwapSession {
	pub fn new(user_id: impl Into<String>, wallet: WalletHandle) -> Self {
		Self {
			user_id: user_id.into(),
			wallet,
			last_quote: None,
		}
	}

	pub fn user_id(&self) -> &str {
		&self.user_id
	}

	pub fn wallet(&self) -> &WalletHandle {
		&self.wallet
	}

	/// Replaces any earlier quote.
	pub fn remember_quote(&mut self, quote: SwapQuote) {
		self.last_quote = Some(quote);
	}

	pub fn last_quote(&self) -> Option<&SwapQuote> {
		self.last_quote.as_ref()
	}

	/// Removes and returns the quote so it is acted on at most once.
	pub fn take_quote(&mut self) -> Option<SwapQuote> {
		self.last_quote.take()
	}
}
