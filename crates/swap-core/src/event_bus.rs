//! Event bus for swap notifications.
//!
//! Publishing never blocks and never fails the pipeline. With no subscriber
//! attached an event is simply lost.

use swap_types::SwapEvent;
use tokio::sync::broadcast;

/// Broadcast channel of [`SwapEvent`]s.
pub struct EventBus {
	sender: broadcast::Sender<SwapEvent>,
}

impl EventBus {
	/// Creates a bus buffering up to `capacity` events per slow subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Receives every event published after this call.
	pub fn subscribe(&self) -> broadcast::Receiver<SwapEvent> {
		self.sender.subscribe()
	}

	/// Returns an error only when nobody is listening.
	pub fn publish(&self, event: SwapEvent) -> Result<(), broadcast::error::SendError<SwapEvent>> {
		self.sender.send(event)?;
		Ok(())
	}
}

impl Clone for EventBus {
	fn clone(&self) -> Self {
		Self {
			sender: self.sender.clone(),
		}
	}
}
