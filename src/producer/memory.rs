//! In-memory broker
//!
//! This module contains an in-process stand-in for a message broker:
//! - `MemoryBroker` owns the topic logs and can be shared by cloning
//! - `MemoryProducer` mirrors the librdkafka producer model: `produce`
//!   only appends to a bounded local queue, `poll` delivers queued records
//!   into the topic logs
//!
//! Concurrency and usage notes:
//! - The broker state sits behind a single `Mutex`. Producers hold a clone
//!   of the broker handle and lock it only while delivering.
//! - While the broker is marked unavailable, `produce` fails and `poll`
//!   leaves queued records in place, the way a real client keeps retrying
//!   until its message timeout.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::BrokerConfig;
use crate::producer::topic::{Record, Topic};
use crate::producer::{DEFAULT_QUEUE_CAPACITY, Producer, ProducerFactory};
use crate::utils::error::ProducerError;

const QUEUE_CAPACITY_KEY: &str = "queue.buffering.max.messages";

#[derive(Debug)]
struct BrokerState {
    topics: HashMap<String, Topic>,
    available: bool,
}

/// Shared handle to an in-process broker.
#[derive(Debug, Clone)]
pub struct MemoryBroker {
    state: Arc<Mutex<BrokerState>>,
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BrokerState {
                topics: HashMap::new(),
                available: true,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    pub fn is_available(&self) -> bool {
        self.lock().available
    }

    /// Records delivered to `topic` so far, in offset order.
    pub fn records(&self, topic: &str) -> Vec<Record> {
        self.lock()
            .topics
            .get(topic)
            .map(|t| t.records.clone())
            .unwrap_or_default()
    }

    pub fn topic_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().topics.keys().cloned().collect();
        names.sort();
        names
    }

    /// Append a record to its topic, creating the topic on first use.
    fn deliver(&self, pending: &PendingRecord) -> Result<i64, ProducerError> {
        let mut state = self.lock();
        if !state.available {
            return Err(ProducerError::Unavailable);
        }
        let topic = state
            .topics
            .entry(pending.topic.clone())
            .or_insert_with(|| Topic::new(&pending.topic));
        Ok(topic.append(pending.payload.clone(), pending.enqueued_at))
    }
}

impl ProducerFactory for MemoryBroker {
    type Producer = MemoryProducer;

    fn create(&self, config: &BrokerConfig) -> Result<MemoryProducer, ProducerError> {
        let capacity = match config.get(QUEUE_CAPACITY_KEY) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|capacity| *capacity > 0)
                .ok_or_else(|| ProducerError::InvalidSetting {
                    key: QUEUE_CAPACITY_KEY.to_string(),
                    reason: format!("expected a positive integer, found '{raw}'"),
                })?,
            None => DEFAULT_QUEUE_CAPACITY,
        };
        Ok(MemoryProducer::new(self.clone(), capacity))
    }
}

#[derive(Debug, Clone)]
struct PendingRecord {
    topic: String,
    payload: Vec<u8>,
    enqueued_at: i64,
}

/// Producer attached to a [`MemoryBroker`].
#[derive(Debug)]
pub struct MemoryProducer {
    broker: MemoryBroker,
    queue: Mutex<VecDeque<PendingRecord>>,
    capacity: usize,
}

impl MemoryProducer {
    pub fn new(broker: MemoryBroker, capacity: usize) -> Self {
        Self {
            broker,
            queue: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn broker(&self) -> &MemoryBroker {
        &self.broker
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<PendingRecord>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Producer for MemoryProducer {
    fn produce(&self, topic: &str, payload: &[u8]) -> Result<(), ProducerError> {
        if !self.broker.is_available() {
            return Err(ProducerError::Unavailable);
        }
        let mut queue = self.queue();
        if queue.len() >= self.capacity {
            return Err(ProducerError::QueueFull);
        }
        queue.push_back(PendingRecord {
            topic: topic.to_string(),
            payload: payload.to_vec(),
            enqueued_at: chrono::Utc::now().timestamp_millis(),
        });
        Ok(())
    }

    fn poll(&self, _timeout: Duration) {
        let mut queue = self.queue();
        while let Some(pending) = queue.front() {
            match self.broker.deliver(pending) {
                Ok(offset) => {
                    debug!(topic = %pending.topic, offset, "Delivered record");
                    queue.pop_front();
                }
                Err(err) => {
                    warn!(
                        topic = %pending.topic,
                        in_flight = queue.len(),
                        error = %err,
                        "Delivery postponed"
                    );
                    break;
                }
            }
        }
    }

    fn flush(&self, timeout: Duration) -> Result<(), ProducerError> {
        self.poll(timeout);
        match self.in_flight() {
            0 => Ok(()),
            remaining => Err(ProducerError::FlushTimeout { remaining }),
        }
    }

    fn in_flight(&self) -> usize {
        self.queue().len()
    }
}
