//! In-process topic storage
//!
//! A topic is a bounded ring shared by every `Hub` opened with the same name.
//! Messages carry a sequence number and each reader keeps its own cursor, so
//! every subscriber sees every message still in the ring. Publishing never
//! blocks: a full topic evicts its oldest message, so a capacity-1 topic
//! behaves as a latest-value mailbox for each reader.

use crate::error::{ScanfuseError, ScanfuseResult};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

// Safety limits to prevent dangerous configurations
const MAX_CAPACITY: usize = 1_000_000;
const MIN_CAPACITY: usize = 1;

struct RegistryEntry {
    type_id: TypeId,
    type_name: &'static str,
    topic: Arc<dyn Any + Send + Sync>,
}

static REGISTRY: Lazy<Mutex<HashMap<String, RegistryEntry>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Outcome of pushing onto a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    /// Queued after evicting the oldest pending message
    Replaced,
}

/// A message read from a topic
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery<T> {
    pub msg: T,
    /// Sequence number of `msg`; the reader continues at `seq + 1`
    pub seq: u64,
    /// Messages evicted between the reader's cursor and `msg`
    pub missed: u64,
}

struct Ring<T> {
    messages: VecDeque<T>,
    /// Sequence number of `messages[0]`
    head_seq: u64,
}

impl<T> Ring<T> {
    fn write_seq(&self) -> u64 {
        self.head_seq + self.messages.len() as u64
    }
}

/// Bounded broadcast ring behind a named topic
pub struct Topic<T> {
    name: String,
    capacity: usize,
    ring: Mutex<Ring<T>>,
}

impl<T: Send + 'static> Topic<T> {
    fn new(name: &str, capacity: usize) -> Self {
        Self {
            name: name.to_string(),
            capacity,
            ring: Mutex::new(Ring {
                messages: VecDeque::with_capacity(capacity),
                head_seq: 0,
            }),
        }
    }

    /// Open (or create) the process-wide topic `name`
    ///
    /// The first opener fixes the capacity; later openers share the existing
    /// ring. Reopening a name with a different message type fails.
    pub fn open(name: &str, capacity: usize) -> ScanfuseResult<Arc<Self>> {
        if name.is_empty() {
            return Err(ScanfuseError::InvalidInput(
                "topic name must not be empty".to_string(),
            ));
        }
        if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&capacity) {
            return Err(ScanfuseError::InvalidInput(format!(
                "topic '{}' capacity {} outside [{}, {}]",
                name, capacity, MIN_CAPACITY, MAX_CAPACITY
            )));
        }

        let mut registry = REGISTRY.lock();
        if let Some(entry) = registry.get(name) {
            if entry.type_id != TypeId::of::<T>() {
                return Err(ScanfuseError::communication(format!(
                    "topic '{}' already carries {}, not {}",
                    name,
                    entry.type_name,
                    std::any::type_name::<T>()
                )));
            }
            return entry.topic.clone().downcast::<Topic<T>>().map_err(|_| {
                ScanfuseError::Internal(format!("topic '{}' registry entry is corrupt", name))
            });
        }

        let topic = Arc::new(Topic::<T>::new(name, capacity));
        registry.insert(
            name.to_string(),
            RegistryEntry {
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
                topic: topic.clone(),
            },
        );
        Ok(topic)
    }

    /// Append a message, evicting the oldest when full
    pub fn push(&self, msg: T) -> PushOutcome {
        let mut ring = self.ring.lock();
        let outcome = if ring.messages.len() >= self.capacity {
            ring.messages.pop_front();
            ring.head_seq += 1;
            PushOutcome::Replaced
        } else {
            PushOutcome::Queued
        };
        ring.messages.push_back(msg);
        outcome
    }

    /// Sequence number the next published message will get
    ///
    /// A reader starting here only sees messages published from now on.
    pub fn write_seq(&self) -> u64 {
        self.ring.lock().write_seq()
    }

    /// Oldest message at or after `cursor` still held by the ring
    ///
    /// Reading is non-destructive; other readers still get the message.
    pub fn read(&self, cursor: u64) -> Option<Delivery<T>>
    where
        T: Clone,
    {
        let ring = self.ring.lock();
        let seq = cursor.max(ring.head_seq);
        let msg = ring.messages.get((seq - ring.head_seq) as usize)?.clone();
        Some(Delivery {
            msg,
            seq,
            missed: seq - cursor,
        })
    }

    /// Messages a reader at `cursor` has not seen yet
    pub fn unread(&self, cursor: u64) -> usize {
        let ring = self.ring.lock();
        ring.write_seq().saturating_sub(cursor.max(ring.head_seq)) as usize
    }

    /// Messages currently held by the ring
    pub fn len(&self) -> usize {
        self.ring.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.lock().messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_by_name() {
        let a = Topic::<u64>::open("test_topic/shared", 4).unwrap();
        let b = Topic::<u64>::open("test_topic/shared", 99).unwrap();

        a.push(7);
        assert_eq!(b.read(0).map(|d| d.msg), Some(7));
        // First opener wins the capacity
        assert_eq!(b.capacity(), 4);
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let _a = Topic::<u64>::open("test_topic/typed", 1).unwrap();
        let err = Topic::<String>::open("test_topic/typed", 1).err().unwrap();
        assert!(matches!(err, ScanfuseError::Communication(_)));
    }

    #[test]
    fn test_full_topic_evicts_oldest() {
        let topic = Topic::<u64>::open("test_topic/evict", 2).unwrap();
        assert_eq!(topic.push(1), PushOutcome::Queued);
        assert_eq!(topic.push(2), PushOutcome::Queued);
        assert_eq!(topic.push(3), PushOutcome::Replaced);
        assert_eq!(topic.len(), 2);

        let first = topic.read(0).unwrap();
        assert_eq!(first, Delivery { msg: 2, seq: 1, missed: 1 });
        assert_eq!(topic.read(first.seq + 1).map(|d| d.msg), Some(3));
        assert!(topic.read(3).is_none());
    }

    #[test]
    fn test_reads_are_non_destructive() {
        let topic = Topic::<u64>::open("test_topic/shared_read", 4).unwrap();
        let start = topic.write_seq();
        topic.push(5);
        topic.push(6);

        assert_eq!(topic.read(start).map(|d| d.msg), Some(5));
        assert_eq!(topic.read(start).map(|d| d.msg), Some(5));
        assert_eq!(topic.unread(start), 2);
        assert_eq!(topic.unread(start + 1), 1);
        assert_eq!(topic.unread(topic.write_seq()), 0);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(Topic::<u64>::open("", 1).is_err());
        assert!(Topic::<u64>::open("test_topic/zero", 0).is_err());
    }
}
