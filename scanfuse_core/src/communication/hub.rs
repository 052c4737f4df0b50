use super::topic::{PushOutcome, Topic};
use parking_lot::Mutex;
use crate::core::node::{LogSummary, NodeInfo};
use crate::error::ScanfuseResult;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default number of messages a topic holds
pub const DEFAULT_CAPACITY: usize = 64;

/// Lock-free atomic metrics for Hub monitoring
#[derive(Debug, Default)]
pub struct AtomicHubMetrics {
    pub messages_sent: AtomicU64,
    pub messages_received: AtomicU64,
    pub messages_dropped: AtomicU64,
    pub messages_missed: AtomicU64,
    pub recv_empty: AtomicU64,
}

impl AtomicHubMetrics {
    /// Get current metrics snapshot
    pub fn snapshot(&self) -> HubMetrics {
        HubMetrics {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            messages_missed: self.messages_missed.load(Ordering::Relaxed),
            recv_empty: self.recv_empty.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a hub's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubMetrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    /// Messages this handle evicted from a full topic on send
    pub messages_dropped: u64,
    /// Messages evicted before this handle read them
    pub messages_missed: u64,
    pub recv_empty: u64,
}

/// Typed publish/subscribe handle on a named in-process topic
///
/// All hubs opened with the same name share one bounded ring. Each hub
/// reads through its own cursor, starting at the messages published after
/// it was opened, so every subscriber receives every message. `send` never
/// blocks; when the ring is full the oldest message is dropped, so the
/// newest value always wins.
pub struct Hub<T> {
    topic: Arc<Topic<T>>,
    topic_name: String,
    cursor: Mutex<u64>,
    metrics: Arc<AtomicHubMetrics>,
}

/// The clone shares metrics and continues reading from the same position
/// with a cursor of its own.
impl<T> Clone for Hub<T> {
    fn clone(&self) -> Self {
        Self {
            topic: self.topic.clone(),
            topic_name: self.topic_name.clone(),
            cursor: Mutex::new(*self.cursor.lock()),
            metrics: self.metrics.clone(),
        }
    }
}

// Manual Debug implementation to avoid a Debug bound on the payload
impl<T> std::fmt::Debug for Hub<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("topic_name", &self.topic_name)
            .field("metrics", &self.metrics.snapshot())
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Hub<T> {
    /// Create a new Hub with the default capacity
    pub fn new(topic_name: &str) -> ScanfuseResult<Self> {
        Self::new_with_capacity(topic_name, DEFAULT_CAPACITY)
    }

    /// Create a new Hub with custom capacity
    ///
    /// Capacity only applies when this call creates the topic.
    pub fn new_with_capacity(topic_name: &str, capacity: usize) -> ScanfuseResult<Self> {
        let topic = Topic::open(topic_name, capacity)?;
        let cursor = Mutex::new(topic.write_seq());
        Ok(Hub {
            topic,
            topic_name: topic_name.to_string(),
            cursor,
            metrics: Arc::new(AtomicHubMetrics::default()),
        })
    }

    /// Publish a message
    ///
    /// When `ctx` is given the publish is logged and counted against the node.
    pub fn send(&self, msg: T, ctx: Option<&mut NodeInfo>)
    where
        T: LogSummary,
    {
        if let Some(ctx) = ctx {
            // Summary must be taken before the message moves into the ring
            let summary = msg.log_summary();
            self.push(msg);
            ctx.log_pub_summary(&self.topic_name, &summary);
        } else {
            self.push(msg);
        }
    }

    fn push(&self, msg: T) {
        if self.topic.push(msg) == PushOutcome::Replaced {
            self.metrics.messages_dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.metrics.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Receive the oldest message this hub has not seen, if any
    pub fn recv(&self, ctx: Option<&mut NodeInfo>) -> Option<T>
    where
        T: LogSummary + Clone,
    {
        let delivery = {
            let mut cursor = self.cursor.lock();
            let delivery = self.topic.read(*cursor);
            if let Some(d) = &delivery {
                *cursor = d.seq + 1;
            }
            delivery
        };

        match delivery {
            Some(delivery) => {
                if delivery.missed > 0 {
                    self.metrics
                        .messages_missed
                        .fetch_add(delivery.missed, Ordering::Relaxed);
                }
                let msg = delivery.msg;
                if let Some(ctx) = ctx {
                    ctx.log_sub_summary(&self.topic_name, &msg.log_summary());
                }
                self.metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                Some(msg)
            }
            None => {
                self.metrics.recv_empty.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Drain every pending message in arrival order
    pub fn drain(&self, mut ctx: Option<&mut NodeInfo>) -> Vec<T>
    where
        T: LogSummary + Clone,
    {
        let mut out = Vec::new();
        while let Some(msg) = self.recv(ctx.as_deref_mut()) {
            out.push(msg);
        }
        out
    }

    /// Number of messages this hub has not received yet
    pub fn pending(&self) -> usize {
        self.topic.unread(*self.cursor.lock())
    }

    /// Get current metrics snapshot for this handle
    pub fn get_metrics(&self) -> HubMetrics {
        self.metrics.snapshot()
    }

    /// Get the topic name for this Hub
    pub fn get_topic_name(&self) -> &str {
        &self.topic_name
    }

    pub fn capacity(&self) -> usize {
        self.topic.capacity()
    }
}
