use serde::{Deserialize, Serialize};

use crate::{IntentHash, SettlementOutcome, TransactionHash};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SwapEvent {
	Escrow(EscrowEvent),
	Intent(IntentEvent),
	Settlement(SettlementEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EscrowEvent {
	ToppedUp {
		maker: String,
		token: String,
		amount: u64,
		tx_hash: TransactionHash,
	},
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IntentEvent {
	Submitted {
		hash: IntentHash,
		maker: String,
		nonce: u64,
	},
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SettlementEvent {
	Resolved {
		hash: IntentHash,
		maker: String,
		outcome: SettlementOutcome,
	},
}
