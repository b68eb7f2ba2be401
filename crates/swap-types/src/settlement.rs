//! Settlement outcomes.

use serde::{Deserialize, Serialize};

/// Terminal resolution of a submitted intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementOutcome {
	/// The relayer reported a successful fill.
	Filled { reference: String },
	/// The relayer reported the intent as unsuccessful.
	Failed { message: String },
	/// No resolution before the local deadline. The intent may still settle.
	Expired,
}

impl SettlementOutcome {
	/// Whether the maker should be told about this outcome.
	///
	/// Expiry stays silent: the order can still fill after the local deadline.
	pub fn is_notifiable(&self) -> bool {
		!matches!(self, SettlementOutcome::Expired)
	}
}
