//! Swap engine.

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use swap_account::AccountService;
use swap_config::Config;
use swap_delivery::{first_u64, DeliveryService};
use swap_escrow::{EscrowReconciler, Funding};
use swap_settlement::{SettlementTracker, TrackingSession};
use swap_types::{
	EntryFunction, EscrowEvent, IntentEvent, IntentHash, Order, SettlementEvent,
	SettlementOutcome, SwapEvent, SwapQuote, WalletHandle,
};
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::{EventBus, SwapError, SwapSession};

/// What the caller gets back once an intent is accepted by the relayer.
#[derive(Debug)]
pub struct SwapReceipt {
	pub intent_hash: IntentHash,
	pub nonce: u64,
	pub funding: Funding,
	/// Background tracking task. Dropping the handle does not stop it.
	pub settlement: JoinHandle<SettlementOutcome>,
}

pub struct SwapEngine {
	config: Config,
	account: Arc<AccountService>,
	delivery: Arc<DeliveryService>,
	escrow: EscrowReconciler,
	tracker: Arc<SettlementTracker>,
	event_bus: EventBus,
}

impl SwapEngine {
	pub fn new(
		config: Config,
		account: Arc<AccountService>,
		delivery: Arc<DeliveryService>,
		escrow: EscrowReconciler,
		tracker: Arc<SettlementTracker>,
		event_bus: EventBus,
	) -> Self {
		Self {
			config,
			account,
			delivery,
			escrow,
			tracker,
			event_bus,
		}
	}

	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Executes the quote remembered in the session. The quote is consumed.
	pub async fn execute(&self, session: &mut SwapSession) -> Result<SwapReceipt, SwapError> {
		let quote = session
			.take_quote()
			.ok_or_else(|| SwapError::InvalidQuote("no quote to execute".into()))?;
		self.swap(session.wallet(), &quote).await
	}

	/// Runs one swap attempt up to relayer acceptance and starts tracking it.
	///
	/// Any failure aborts the attempt. A retry re-reads the nonce and builds
	/// a new intent.
	#[instrument(skip_all, fields(maker = %wallet.address, sell = %quote.sell_token.symbol, buy = %quote.buy_token.symbol))]
	pub async fn swap(
		&self,
		wallet: &WalletHandle,
		quote: &SwapQuote,
	) -> Result<SwapReceipt, SwapError> {
		let required = quote
			.sell_token
			.to_smallest_unit(quote.sell_amount)
			.and_then(|amount| amount.trunc().to_u64())
			.ok_or_else(|| SwapError::InvalidQuote("sell amount does not fit in 64 bits".into()))?;

		let funding = self
			.escrow
			.ensure_funded(wallet, &quote.sell_token.type_tag, required)
			.await?;
		if let Funding::ToppedUp {
			deposited, receipt, ..
		} = &funding
		{
			self.event_bus
				.publish(SwapEvent::Escrow(EscrowEvent::ToppedUp {
					maker: wallet.address.clone(),
					token: quote.sell_token.type_tag.clone(),
					amount: *deposited,
					tx_hash: receipt.hash.clone(),
				}))
				.ok();
		}

		let nonce = self.current_nonce(&wallet.address).await?;
		let now = Utc::now().timestamp().max(0) as u64;
		let intent = quote.to_intent(
			&wallet.address,
			nonce,
			self.config.swap.slippage_bps,
			self.config.swap.intent_ttl_secs,
			now,
		)?;

		let signed = self.account.sign_intent(wallet, intent).await?;
		let session = self.tracker.open_session(&signed).await;
		self.tracker.submit(&signed).await?;
		info!(intent_hash = %signed.hash, nonce, "Intent submitted");

		self.event_bus
			.publish(SwapEvent::Intent(IntentEvent::Submitted {
				hash: signed.hash,
				maker: wallet.address.clone(),
				nonce,
			}))
			.ok();

		Ok(SwapReceipt {
			intent_hash: signed.hash,
			nonce,
			funding,
			settlement: self.spawn_tracking(session),
		})
	}

	/// Reads the maker's intent counter from the contract.
	pub async fn current_nonce(&self, maker: &str) -> Result<u64, SwapError> {
		let call = EntryFunction::new(
			self.config.chain.intent_function("get_nonce"),
			vec![],
			vec![serde_json::Value::String(maker.to_string())],
		);
		let values = self
			.delivery
			.view(&call)
			.await
			.map_err(|e| SwapError::Chain(e.to_string()))?;
		first_u64(&values).map_err(|e| SwapError::Chain(e.to_string()))
	}

	/// Order history for a maker, newest first.
	pub async fn orders(&self, maker: &str) -> Result<Vec<Order>, SwapError> {
		Ok(self.tracker.list_orders(maker).await?)
	}

	fn spawn_tracking(&self, session: TrackingSession) -> JoinHandle<SettlementOutcome> {
		let tracker = self.tracker.clone();
		let event_bus = self.event_bus.clone();
		let hash = *session.hash();
		let maker = session.maker().to_string();

		tokio::spawn(async move {
			let outcome = tracker.track(session).await;
			if outcome.is_notifiable() {
				event_bus
					.publish(SwapEvent::Settlement(SettlementEvent::Resolved {
						hash,
						maker,
						outcome: outcome.clone(),
					}))
					.ok();
			}
			outcome
		})
	}
}
