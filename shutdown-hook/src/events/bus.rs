//! # Broadcast bus for shutdown events.
//!
//! [`EventBus`] is a thin wrapper around [`tokio::sync::broadcast`].
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never waits for receivers.
//! - **Bounded capacity**: one ring buffer shared by all receivers; a receiver
//!   that falls more than `capacity` events behind sees `RecvError::Lagged(n)`.
//! - **No history**: events sent while nobody is subscribed are dropped.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for [`Event`]s.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    /// Creates a bus with the given capacity (clamped to at least 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to every current receiver.
    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Creates a receiver observing events sent after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_without_receivers_are_dropped() {
        let bus = EventBus::new(0);
        bus.publish(Event::ShutdownStarted);

        let mut rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);
        assert!(rx.try_recv().is_err());

        bus.publish(Event::ShutdownStarted);
        assert!(matches!(rx.try_recv(), Ok(Event::ShutdownStarted)));
    }
}
