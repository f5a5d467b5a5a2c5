//! Topic registry and broadcast fan-out.

use crossbeam_channel::{bounded, unbounded, Sender, TrySendError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::types::{
    ChannelEvent, DropReason, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
};

/// Internal listener state.
struct Listener<T> {
    sender: Sender<ChannelEvent<T>>,
    /// Payload slots for bounded listeners. The queue holds one more slot,
    /// kept free for the terminal `Dropped` notice.
    capacity: Option<usize>,
}

/// Outcome of a single handoff to a listener.
enum Delivery {
    Sent,
    Overflow,
    Gone,
}

impl<T> Listener<T> {
    /// Hand an event to this listener's queue without blocking.
    fn try_send(&self, event: ChannelEvent<T>) -> Delivery {
        if self.capacity.is_some_and(|capacity| self.sender.len() >= capacity) {
            return Delivery::Overflow;
        }
        match self.sender.try_send(event) {
            Ok(()) => Delivery::Sent,
            Err(TrySendError::Full(_)) => Delivery::Overflow,
            Err(TrySendError::Disconnected(_)) => Delivery::Gone,
        }
    }
}

struct Registry<T> {
    /// Listeners by topic, then by subscription ID.
    topics: HashMap<String, HashMap<SubscriptionId, Listener<T>>>,
    closed: bool,
}

pub(crate) struct ChannelInner<T> {
    registry: RwLock<Registry<T>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
}

impl<T> ChannelInner<T> {
    /// Remove one listener, optionally telling it why.
    pub(crate) fn remove(
        &self,
        topic: &str,
        id: SubscriptionId,
        reason: Option<DropReason>,
    ) -> bool {
        let mut registry = self.registry.write();
        let Some(listeners) = registry.topics.get_mut(topic) else {
            return false;
        };
        let Some(listener) = listeners.remove(&id) else {
            return false;
        };
        if listeners.is_empty() {
            registry.topics.remove(topic);
        }
        drop(registry);

        if let Some(reason) = reason {
            // Bounded queues keep a slot free for this; the receiver may be gone.
            let _ = listener.sender.try_send(ChannelEvent::Dropped { reason });
        }

        tracing::debug!(subscription_id = id.0, topic, ?reason, "subscription removed");
        true
    }
}

/// A named-topic broadcast channel.
///
/// Every listener on a topic gets its own queue and its own copy of each
/// published payload. Publishing never blocks: a full bounded queue
/// evicts its listener instead of stalling the others.
///
/// Cloning is cheap and yields a handle to the same channel.
pub struct EventChannel<T> {
    inner: Arc<ChannelInner<T>>,
}

impl<T: Clone> EventChannel<T> {
    /// Create a new channel with no topics.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                registry: RwLock::new(Registry {
                    topics: HashMap::new(),
                    closed: false,
                }),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register a new listener on `topic`.
    ///
    /// The listener only sees payloads published after this call returns.
    /// On a shut-down channel the returned handle is already terminated.
    pub fn subscribe(&self, topic: &str, config: SubscriptionConfig) -> SubscriptionHandle<T> {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = match config.buffer_size {
            Some(size) => bounded(size + 1),
            None => unbounded(),
        };

        let mut registry = self.inner.registry.write();
        if registry.closed {
            drop(registry);
            let _ = sender.try_send(ChannelEvent::Dropped {
                reason: DropReason::Shutdown,
            });
            tracing::debug!(subscription_id = id.0, topic, "subscribe on closed channel");
        } else {
            registry
                .topics
                .entry(topic.to_string())
                .or_default()
                .insert(
                    id,
                    Listener {
                        sender,
                        capacity: config.buffer_size,
                    },
                );
            drop(registry);
            tracing::debug!(
                subscription_id = id.0,
                topic,
                buffer_size = ?config.buffer_size,
                "subscription created"
            );
        }

        SubscriptionHandle::new(id, topic.to_string(), receiver, Arc::downgrade(&self.inner))
    }

    /// Unsubscribe and clean up. Returns false if the ID was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let topic = {
            let registry = self.inner.registry.read();
            registry
                .topics
                .iter()
                .find(|(_, listeners)| listeners.contains_key(&id))
                .map(|(topic, _)| topic.clone())
        };

        match topic {
            Some(topic) => self
                .inner
                .remove(&topic, id, Some(DropReason::Unsubscribed)),
            None => false,
        }
    }

    /// Deliver `payload` to every listener on `topic`.
    ///
    /// Returns the number of listeners that received it. With no listeners
    /// the payload is discarded. Listeners whose queue is full are evicted;
    /// listeners whose handle is gone are pruned.
    ///
    /// Concurrent publishes on one topic may interleave; callers that need
    /// a total order serialize their publishes.
    pub fn publish(&self, topic: &str, payload: T) -> usize {
        let mut delivered = 0;
        let mut overflowed = Vec::new();
        let mut gone = Vec::new();

        {
            let registry = self.inner.registry.read();
            let Some(listeners) = registry.topics.get(topic) else {
                tracing::trace!(topic, "publish with no listeners");
                return 0;
            };

            for (id, listener) in listeners.iter() {
                let event = ChannelEvent::Message {
                    payload: payload.clone(),
                };
                match listener.try_send(event) {
                    Delivery::Sent => delivered += 1,
                    Delivery::Overflow => overflowed.push(*id),
                    Delivery::Gone => gone.push(*id),
                }
            }
        }

        for id in overflowed {
            tracing::warn!(subscription_id = id.0, topic, "evicting slow subscriber");
            self.inner
                .remove(topic, id, Some(DropReason::BufferOverflow));
        }
        for id in gone {
            self.inner.remove(topic, id, None);
        }

        tracing::trace!(topic, delivered, "published event");
        delivered
    }

    /// Number of listeners on a topic.
    pub fn subscription_count(&self, topic: &str) -> usize {
        self.inner
            .registry
            .read()
            .topics
            .get(topic)
            .map_or(0, HashMap::len)
    }

    /// Number of listeners across all topics.
    pub fn total_subscriptions(&self) -> usize {
        self.inner
            .registry
            .read()
            .topics
            .values()
            .map(HashMap::len)
            .sum()
    }

    /// Topics that currently have at least one listener.
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<_> = self.inner.registry.read().topics.keys().cloned().collect();
        topics.sort();
        topics
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.registry.read().closed
    }

    /// Cancel every subscription and refuse new ones.
    ///
    /// Each open stream receives a final `Dropped { Shutdown }` (best
    /// effort) and then ends. Returns the number of subscriptions released.
    pub fn shutdown(&self) -> usize {
        let topics = {
            let mut registry = self.inner.registry.write();
            registry.closed = true;
            std::mem::take(&mut registry.topics)
        };

        let mut released = 0;
        for listeners in topics.into_values() {
            for listener in listeners.into_values() {
                let _ = listener.sender.try_send(ChannelEvent::Dropped {
                    reason: DropReason::Shutdown,
                });
                released += 1;
            }
        }

        tracing::info!(released, "event channel shut down");
        released
    }
}

impl<T> Clone for EventChannel<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> Default for EventChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}
