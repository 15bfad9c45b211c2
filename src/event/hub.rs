// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast hub for fanning out state changes.

use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, watch};

use crate::snapshot::Snapshot;

use super::{ControlNotice, SyncEvent};

/// Default channel capacity for the hub.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Fans every state change out to all connected subscribers.
///
/// The hub uses tokio's broadcast channel so each subscriber gets its own
/// copy of each message, and a watch channel that always holds the latest
/// snapshot.
///
/// # Sync on join
///
/// A new [`Subscription`] first yields the latest snapshot, then every
/// message published after it was created.
///
/// # Capacity
///
/// If a subscriber falls more than `capacity` messages behind, the messages
/// it missed are skipped and it is resynchronized with the latest snapshot.
/// Narrow events skipped this way are not replayed.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    sender: broadcast::Sender<SyncEvent>,
    latest: Arc<watch::Sender<Arc<Snapshot>>>,
}

impl BroadcastHub {
    /// Creates a hub with default capacity whose latest snapshot is `initial`.
    #[must_use]
    pub fn new(initial: Arc<Snapshot>) -> Self {
        Self::with_capacity(initial, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a hub with the specified capacity.
    ///
    /// # Arguments
    ///
    /// * `initial` - Snapshot delivered to subscribers that join before the
    ///   first publish
    /// * `capacity` - Maximum number of messages buffered per subscriber
    #[must_use]
    pub fn with_capacity(initial: Arc<Snapshot>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        let (latest, _) = watch::channel(initial);
        Self {
            sender,
            latest: Arc::new(latest),
        }
    }

    /// Subscribes to state changes.
    ///
    /// The returned subscription yields the current snapshot first.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        // Subscribe before reading the latest snapshot so nothing published
        // in between is missed.
        let events = self.sender.subscribe();
        let latest = self.latest.subscribe();
        let pending = Some(Arc::clone(&*latest.borrow()));
        Subscription {
            pending,
            events,
            latest,
        }
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Returns the latest published snapshot.
    #[must_use]
    pub fn latest(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.latest.borrow())
    }

    /// Delivers the full snapshot to every subscriber.
    ///
    /// Returns the number of subscribers that received it.
    pub fn publish_sync(&self, snapshot: Arc<Snapshot>) -> usize {
        self.latest.send_replace(Arc::clone(&snapshot));
        self.sender.send(SyncEvent::Sync(snapshot)).unwrap_or(0)
    }

    /// Delivers a narrow control notice to every subscriber.
    ///
    /// Returns the number of subscribers that received it.
    pub fn publish_event(&self, notice: ControlNotice) -> usize {
        self.sender.send(SyncEvent::Control(notice)).unwrap_or(0)
    }
}

/// A subscriber's view of the hub.
///
/// Dropping the subscription removes it from the fan-out.
#[derive(Debug)]
pub struct Subscription {
    pending: Option<Arc<Snapshot>>,
    events: broadcast::Receiver<SyncEvent>,
    latest: watch::Receiver<Arc<Snapshot>>,
}

impl Subscription {
    /// Waits for the next message.
    ///
    /// Returns `None` once the hub has been dropped.
    pub async fn recv(&mut self) -> Option<SyncEvent> {
        if let Some(snapshot) = self.pending.take() {
            return Some(SyncEvent::Sync(snapshot));
        }

        match self.events.recv().await {
            Ok(event) => Some(event),
            Err(RecvError::Lagged(skipped)) => Some(self.resync(skipped)),
            Err(RecvError::Closed) => None,
        }
    }

    /// Returns the next message if one is ready, without waiting.
    pub fn try_recv(&mut self) -> Option<SyncEvent> {
        if let Some(snapshot) = self.pending.take() {
            return Some(SyncEvent::Sync(snapshot));
        }

        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Lagged(skipped)) => Some(self.resync(skipped)),
            Err(TryRecvError::Empty | TryRecvError::Closed) => None,
        }
    }

    /// Drops everything still buffered and returns the latest snapshot.
    fn resync(&mut self, skipped: u64) -> SyncEvent {
        tracing::warn!(skipped, "Subscriber lagged behind, resynchronizing");
        while let Ok(_) | Err(TryRecvError::Lagged(_)) = self.events.try_recv() {}
        SyncEvent::Sync(Arc::clone(&*self.latest.borrow_and_update()))
    }
}
