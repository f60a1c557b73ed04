//! Topic-based change broadcasting.
//!
//! The registry from topic to subscribed connections is shared mutable
//! state touched by subscribe, unsubscribe, and broadcast calls from
//! different request tasks, so it lives behind one mutex inside this
//! component and is reachable only through its methods.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Process-unique identifier of a subscribed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocate the next connection id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Failure writing to a single peer. Never propagated past the
/// broadcaster.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// The peer's send queue is full.
    #[error("peer send queue full")]
    Full,
    /// The peer is gone.
    #[error("connection closed")]
    Closed,
}

/// A persistent peer connection the broadcaster can push bytes to.
///
/// `write_message` must not block on a slow peer; adapters queue with a
/// drop-on-full policy and report [`SendError`] for dead peers.
pub trait Connection: Send + Sync {
    /// Push one serialized message to the peer.
    fn write_message(&self, payload: Bytes) -> Result<(), SendError>;
}

/// Envelope wrapping every broadcast payload:
/// `{ "body": any, "sub": "<topic>", "type": "sub" }`.
#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    body: &'a T,
    sub: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Fan-out hub mapping topics to subscribed connections.
#[derive(Default)]
pub struct Broadcaster {
    topics: Mutex<HashMap<String, HashMap<ConnectionId, Arc<dyn Connection>>>>,
}

impl Broadcaster {
    /// Create an empty broadcaster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a connection to a topic.
    pub fn subscribe(&self, topic: &str, id: ConnectionId, connection: Arc<dyn Connection>) {
        let mut topics = self.topics.lock();
        let replaced = topics
            .entry(topic.to_string())
            .or_default()
            .insert(id, connection);
        if replaced.is_none() {
            crate::system::metrics::Metrics::global()
                .broadcast
                .subscriptions
                .inc();
        }
    }

    /// Unsubscribe a connection from a topic.
    pub fn unsubscribe(&self, topic: &str, id: ConnectionId) {
        let mut topics = self.topics.lock();
        if let Some(subscribers) = topics.get_mut(topic) {
            if subscribers.remove(&id).is_some() {
                crate::system::metrics::Metrics::global()
                    .broadcast
                    .subscriptions
                    .dec();
            }
            if subscribers.is_empty() {
                topics.remove(topic);
            }
        }
    }

    /// Remove a connection from every topic. Called by the connection's
    /// read loop when the peer disappears.
    pub fn drop_client(&self, id: ConnectionId) {
        let mut topics = self.topics.lock();
        let mut removed = 0i64;
        topics.retain(|_, subscribers| {
            if subscribers.remove(&id).is_some() {
                removed += 1;
            }
            !subscribers.is_empty()
        });
        if removed > 0 {
            crate::system::metrics::Metrics::global()
                .broadcast
                .subscriptions
                .sub(removed);
        }
    }

    /// Number of connections currently subscribed to a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .lock()
            .get(topic)
            .map(|subscribers| subscribers.len())
            .unwrap_or(0)
    }

    /// Send `body` to every subscriber of `topic`, wrapped in the
    /// broadcast envelope. Best-effort and fire-and-forget: a failed
    /// write is logged and skipped, never retried, and cleanup of the
    /// dead peer is left to its read loop. Returns how many subscribers
    /// were delivered to.
    pub fn broadcast<T: Serialize>(&self, topic: &str, body: &T) -> usize {
        let envelope = Envelope {
            body,
            sub: topic,
            kind: "sub",
        };
        let payload = match serde_json::to_vec(&envelope) {
            Ok(payload) => Bytes::from(payload),
            Err(err) => {
                warn!(topic, error = %err, "broadcast payload failed to serialize");
                return 0;
            }
        };

        let metrics = crate::system::metrics::Metrics::global();
        let subscribers: Vec<(ConnectionId, Arc<dyn Connection>)> = {
            let topics = self.topics.lock();
            match topics.get(topic) {
                Some(subscribers) => subscribers
                    .iter()
                    .map(|(id, connection)| (*id, connection.clone()))
                    .collect(),
                None => return 0,
            }
        };

        let mut delivered = 0;
        for (id, connection) in subscribers {
            match connection.write_message(payload.clone()) {
                Ok(()) => {
                    delivered += 1;
                    metrics.broadcast.delivered.inc();
                }
                Err(err) => {
                    metrics.broadcast.dropped.inc();
                    warn!(topic, connection = id.0, error = %err, "broadcast write failed");
                }
            }
        }
        delivered
    }
}
