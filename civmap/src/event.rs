//! Upward notifications from the map to the rest of the application.

use crate::coords::Coordinate;
use async_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The user finished panning or zooming; carries the surface's center.
    CenterChanged(Coordinate),
    /// An address suggestion was picked; the map is re-centering on it.
    SuggestionSelected { name: String, coords: Coordinate },
}

/// Fan-out of [`MapEvent`]s to any number of subscribers.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Sender<MapEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<MapEvent> {
        let (tx, rx) = async_channel::unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Deliver `event` to every live subscriber, forgetting closed ones.
    pub fn publish(&self, event: MapEvent) {
        self.subscribers
            .lock()
            .retain(|tx| tx.try_send(event.clone()).is_ok());
    }
}
