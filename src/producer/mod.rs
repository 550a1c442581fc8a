//! The `producer` module is the seam between the publishing stage and the
//! message broker.
//!
//! A [`Producer`] enqueues bytes for asynchronous delivery; it never waits
//! for the broker to acknowledge them. Delivery happens when somebody calls
//! [`Producer::poll`] or [`Producer::flush`], which is the job of the
//! surrounding pipeline, never of the stage. If nothing polls, delivery
//! reports never fire and the local queue fills up until `produce` starts
//! failing with [`ProducerError::QueueFull`].
//!
//! Implementations:
//! - `memory`: in-process broker, used by tests and by builds without Kafka.
//! - `kafka`: librdkafka `BaseProducer` (cargo feature `kafka`).

pub mod memory;
pub mod topic;

#[cfg(feature = "kafka")]
pub mod kafka;

use std::time::Duration;

use crate::config::BrokerConfig;
use crate::utils::error::ProducerError;

pub use memory::{MemoryBroker, MemoryProducer};
pub use topic::{Record, Topic};

#[cfg(feature = "kafka")]
pub use kafka::{KafkaProducer, KafkaProducerFactory};

/// Default capacity of the local send queue, matching librdkafka's
/// `queue.buffering.max.messages`.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100_000;

pub trait Producer {
    /// Enqueue `payload` for delivery to `topic`. Must not block: a full
    /// local queue is reported as an error straight away.
    fn produce(&self, topic: &str, payload: &[u8]) -> Result<(), ProducerError>;

    /// Serve delivery reports, waiting at most `timeout`.
    fn poll(&self, timeout: Duration);

    /// Wait until every enqueued message has been delivered or `timeout`
    /// expires.
    fn flush(&self, timeout: Duration) -> Result<(), ProducerError>;

    /// Number of messages enqueued but not yet delivered.
    fn in_flight(&self) -> usize;
}

/// Opens a long-lived producer handle from broker parameters.
pub trait ProducerFactory {
    type Producer: Producer;

    fn create(&self, config: &BrokerConfig) -> Result<Self::Producer, ProducerError>;
}
