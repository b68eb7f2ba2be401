//! Settlement tracking.
//!
//! After submission an intent is `SUBMITTED` until one of:
//!
//! - the activity feed reports it successful: [`SettlementOutcome::Filled`]
//! - the activity feed reports it unsuccessful: [`SettlementOutcome::Failed`]
//! - it was seen pending and then vanished from both feeds on two consecutive
//!   polls: [`SettlementOutcome::Failed`]
//! - the local deadline passes: [`SettlementOutcome::Expired`]
//!
//! Expiry is a local decision, not a relayer state. The intent may still fill
//! afterwards.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use swap_types::{IntentHash, Order, SettlementOutcome, SignedIntent, TokenRegistry};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::orders::aggregate_orders;
use crate::{ActivityEntry, IntentSubmission, PendingOrder, RelayerInterface, SettlementError};

/// Consecutive polls an intent may be missing from both feeds, after having
/// been seen pending, before it is considered dropped.
const DROPPED_AFTER_MISSING_POLLS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
	pub poll_interval: Duration,
	/// Wall-clock budget of one tracking session.
	pub timeout: Duration,
	/// How long before submission a maker-matched settlement may still be
	/// attributed to the intent.
	pub recency_window: Duration,
}

impl Default for TrackerSettings {
	fn default() -> Self {
		Self {
			poll_interval: Duration::from_secs(5),
			timeout: Duration::from_secs(300),
			recency_window: Duration::from_secs(120),
		}
	}
}

/// State of one tracking session.
///
/// Holds the settlements already on the feed when tracking began so the
/// maker/recency fallback never claims one of them for this intent.
#[derive(Debug, Clone)]
pub struct TrackingSession {
	hash: IntentHash,
	maker: String,
	nonce: u64,
	submitted_at: DateTime<Utc>,
	known_settlements: HashSet<String>,
	seen_pending: bool,
	missing_polls: u32,
}

impl TrackingSession {
	pub fn new(
		hash: IntentHash,
		maker: impl Into<String>,
		nonce: u64,
		submitted_at: DateTime<Utc>,
		known_settlements: HashSet<String>,
	) -> Self {
		Self {
			hash,
			maker: maker.into(),
			nonce,
			submitted_at,
			known_settlements,
			seen_pending: false,
			missing_polls: 0,
		}
	}

	pub fn hash(&self) -> &IntentHash {
		&self.hash
	}

	pub fn maker(&self) -> &str {
		&self.maker
	}

	fn find_settlement<'a>(
		&self,
		activity: &'a [ActivityEntry],
		recency_window: Duration,
	) -> Option<&'a ActivityEntry> {
		if let Some(exact) = activity.iter().find(|entry| entry.refers_to(&self.hash)) {
			return Some(exact);
		}

		let window_ms = i64::try_from(recency_window.as_millis()).unwrap_or(i64::MAX);
		let earliest = self.submitted_at.timestamp_millis().saturating_sub(window_ms);

		activity.iter().find(|entry| {
			entry.intent.is_from(&self.maker)
				&& !self.known_settlements.contains(&entry.hash)
				&& i64::try_from(entry.timestamp).is_ok_and(|ts| ts >= earliest)
		})
	}

	fn is_pending(&self, order: &PendingOrder) -> bool {
		self.hash.matches(&order.id)
			|| (order.intent.is_from(&self.maker) && order.intent.nonce == self.nonce)
	}
}

/// Submits intents and follows them to a terminal outcome.
pub struct SettlementTracker {
	relayer: Arc<dyn RelayerInterface>,
	settings: TrackerSettings,
	tokens: TokenRegistry,
	history_limit: usize,
}

impl SettlementTracker {
	pub fn new(
		relayer: Arc<dyn RelayerInterface>,
		settings: TrackerSettings,
		tokens: TokenRegistry,
		history_limit: usize,
	) -> Self {
		Self {
			relayer,
			settings,
			tokens,
			history_limit,
		}
	}

	pub fn settings(&self) -> &TrackerSettings {
		&self.settings
	}

	/// Starts a session for an intent about to be submitted.
	///
	/// Must run before [`submit`](Self::submit) so that settlements already on
	/// the feed are excluded from the fallback match. An unreachable feed
	/// yields an empty snapshot.
	pub async fn open_session(&self, signed: &SignedIntent) -> TrackingSession {
		let known = match self.relayer.activity().await {
			Ok(entries) => entries
				.into_iter()
				.filter(|entry| entry.intent.is_from(&signed.intent.maker))
				.map(|entry| entry.hash)
				.collect(),
			Err(e) => {
				warn!(error = %e, "Could not snapshot activity before submission");
				HashSet::new()
			}
		};

		TrackingSession::new(
			signed.hash,
			signed.intent.maker.clone(),
			signed.intent.nonce,
			Utc::now(),
			known,
		)
	}

	/// Posts the signed intent. A rejection carries the relayer's reason.
	#[instrument(skip_all, fields(intent_hash = %signed.hash))]
	pub async fn submit(&self, signed: &SignedIntent) -> Result<(), SettlementError> {
		self.relayer
			.submit_intent(&IntentSubmission::from(signed))
			.await?;
		info!("Intent accepted by relayer");
		Ok(())
	}

	/// Polls until the intent resolves or the deadline passes.
	///
	/// The deadline is a hard bound: a poll still waiting on the relayer when
	/// it passes is dropped. Never fails: network errors during a poll are
	/// logged and the loop continues.
	#[instrument(skip_all, fields(intent_hash = %session.hash, maker = %session.maker))]
	pub async fn track(&self, mut session: TrackingSession) -> SettlementOutcome {
		let deadline = Instant::now() + self.settings.timeout;

		loop {
			match tokio::time::timeout_at(deadline, self.poll_once(&mut session)).await {
				Ok(Some(outcome)) => {
					info!(?outcome, "Settlement resolved");
					return outcome;
				}
				Ok(None) => {}
				Err(_) => {
					info!("No settlement before deadline, poll abandoned");
					return SettlementOutcome::Expired;
				}
			}

			if Instant::now() + self.settings.poll_interval > deadline {
				tokio::time::sleep_until(deadline).await;
				info!("No settlement before deadline");
				return SettlementOutcome::Expired;
			}
			tokio::time::sleep(self.settings.poll_interval).await;
		}
	}

	async fn poll_once(&self, session: &mut TrackingSession) -> Option<SettlementOutcome> {
		let activity = match self.relayer.activity().await {
			Ok(activity) => activity,
			Err(e) => {
				warn!(error = %e, "Activity poll failed");
				return None;
			}
		};

		if let Some(entry) = session.find_settlement(&activity, self.settings.recency_window) {
			return Some(if entry.success {
				SettlementOutcome::Filled {
					reference: entry.hash.clone(),
				}
			} else {
				SettlementOutcome::Failed {
					message: format!("Relayer reported settlement {} as unsuccessful", entry.hash),
				}
			});
		}

		let pending = match self.relayer.pending_orders().await {
			Ok(pending) => pending,
			Err(e) => {
				warn!(error = %e, "Pending orders poll failed");
				return None;
			}
		};

		if pending.iter().any(|order| session.is_pending(order)) {
			session.seen_pending = true;
			session.missing_polls = 0;
			debug!("Intent still pending");
			return None;
		}

		if session.seen_pending {
			session.missing_polls += 1;
			if session.missing_polls >= DROPPED_AFTER_MISSING_POLLS {
				return Some(SettlementOutcome::Failed {
					message: "intent dropped by relayer".to_string(),
				});
			}
		}
		debug!(missing_polls = session.missing_polls, "Intent not visible yet");
		None
	}

	/// Merged order history for a maker, newest first.
	pub async fn list_orders(&self, maker: &str) -> Result<Vec<Order>, SettlementError> {
		let (pending, activity) =
			tokio::try_join!(self.relayer.pending_orders(), self.relayer.activity())?;

		Ok(aggregate_orders(
			maker,
			&pending,
			&activity,
			&self.tokens,
			Utc::now(),
			self.history_limit,
		))
	}
}
