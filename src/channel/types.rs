//! Channel types for topic subscriptions.

use serde::{Deserialize, Serialize};
use std::sync::Weak;
use std::time::Duration;

use super::manager::ChannelInner;

/// Configuration for a subscription.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionConfig {
    /// Max buffered events before the subscriber is evicted.
    /// Default: None (unbounded, nothing is ever dropped)
    pub buffer_size: Option<usize>,
}

impl SubscriptionConfig {
    /// A subscription with a bounded buffer.
    pub fn bounded(buffer_size: usize) -> Self {
        Self {
            buffer_size: Some(buffer_size),
        }
    }
}

/// Events delivered to a subscription.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelEvent<T> {
    /// A payload published on the topic.
    Message { payload: T },

    /// Subscription was dropped. Always the last event on a stream.
    Dropped { reason: DropReason },
}

/// Why a subscription was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Explicitly unsubscribed.
    Unsubscribed,
    /// The channel was shut down.
    Shutdown,
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to one subscription.
///
/// Iterating blocks until the next payload arrives. The iterator ends
/// only when the subscription is cancelled, evicted or the channel shuts
/// down. Dropping the handle unregisters it.
pub struct SubscriptionHandle<T> {
    pub id: SubscriptionId,
    topic: String,
    receiver: crossbeam_channel::Receiver<ChannelEvent<T>>,
    channel: Weak<ChannelInner<T>>,
    finished: bool,
}

impl<T> SubscriptionHandle<T> {
    pub(crate) fn new(
        id: SubscriptionId,
        topic: String,
        receiver: crossbeam_channel::Receiver<ChannelEvent<T>>,
        channel: Weak<ChannelInner<T>>,
    ) -> Self {
        Self {
            id,
            topic,
            receiver,
            channel,
            finished: false,
        }
    }

    /// Topic this subscription listens on.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<ChannelEvent<T>, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<ChannelEvent<T>, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Result<ChannelEvent<T>, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Receive the next payload with timeout, unwrapping the envelope.
    ///
    /// Returns `None` on timeout or once the subscription has ended.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<T> {
        if self.finished {
            return None;
        }
        match self.receiver.recv_timeout(timeout) {
            Ok(ChannelEvent::Message { payload }) => Some(payload),
            Ok(ChannelEvent::Dropped { .. })
            | Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                self.finished = true;
                None
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => None,
        }
    }

    /// Number of events waiting in this subscription's buffer.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Unsubscribe. Other subscriptions on the topic are unaffected.
    pub fn cancel(self) {
        // Drop does the work.
    }
}

impl<T> Iterator for SubscriptionHandle<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.finished {
            return None;
        }
        match self.receiver.recv() {
            Ok(ChannelEvent::Message { payload }) => Some(payload),
            Ok(ChannelEvent::Dropped { .. }) | Err(_) => {
                self.finished = true;
                None
            }
        }
    }
}

impl<T> Drop for SubscriptionHandle<T> {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.upgrade() {
            channel.remove(&self.topic, self.id, None);
        }
    }
}

impl<T> std::fmt::Debug for SubscriptionHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("pending", &self.receiver.len())
            .finish()
    }
}
