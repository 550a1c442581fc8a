//! Kafka producer backed by librdkafka's `BaseProducer`.
//!
//! `BaseProducer::send` only enqueues into librdkafka's local queue, so it
//! matches the non-blocking `Producer::produce` contract. Delivery reports
//! are served by `poll`/`flush` and logged from `DeliveryLogger`.

use std::time::Duration;

use rdkafka::ClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::message::Message;
use rdkafka::producer::{
    BaseProducer, BaseRecord, DeliveryResult, Producer as _, ProducerContext,
};
use tracing::{debug, error};

use crate::config::BrokerConfig;
use crate::producer::{Producer, ProducerFactory};
use crate::utils::error::ProducerError;

/// Producer context that turns delivery reports into log records.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeliveryLogger;

impl ClientContext for DeliveryLogger {}

impl ProducerContext for DeliveryLogger {
    type DeliveryOpaque = ();

    fn delivery(&self, delivery_result: &DeliveryResult<'_>, _opaque: Self::DeliveryOpaque) {
        match delivery_result {
            Ok(message) => debug!(
                topic = message.topic(),
                partition = message.partition(),
                offset = message.offset(),
                "Message delivered"
            ),
            Err((err, message)) => error!(
                topic = message.topic(),
                partition = message.partition(),
                error = %err,
                "Message delivery failed"
            ),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct KafkaProducerFactory;

impl ProducerFactory for KafkaProducerFactory {
    type Producer = KafkaProducer;

    fn create(&self, config: &BrokerConfig) -> Result<KafkaProducer, ProducerError> {
        let mut client_config = ClientConfig::new();
        for (key, value) in config.iter() {
            client_config.set(key, value);
        }
        let inner = client_config
            .create_with_context(DeliveryLogger)
            .map_err(ProducerError::from)?;
        Ok(KafkaProducer { inner })
    }
}

pub struct KafkaProducer {
    inner: BaseProducer<DeliveryLogger>,
}

impl Producer for KafkaProducer {
    fn produce(&self, topic: &str, payload: &[u8]) -> Result<(), ProducerError> {
        self.inner
            .send(BaseRecord::<(), [u8]>::to(topic).payload(payload))
            .map_err(|(err, _record)| ProducerError::from(err))
    }

    fn poll(&self, timeout: Duration) {
        self.inner.poll(timeout);
    }

    fn flush(&self, timeout: Duration) -> Result<(), ProducerError> {
        self.inner.flush(timeout).map_err(|err| match err {
            KafkaError::Flush(RDKafkaErrorCode::OperationTimedOut) => ProducerError::FlushTimeout {
                remaining: self.in_flight(),
            },
            other => ProducerError::from(other),
        })
    }

    fn in_flight(&self) -> usize {
        usize::try_from(self.inner.in_flight_count()).unwrap_or(0)
    }
}

impl From<KafkaError> for ProducerError {
    fn from(err: KafkaError) -> Self {
        match err.rdkafka_error_code() {
            Some(RDKafkaErrorCode::QueueFull) => ProducerError::QueueFull,
            Some(RDKafkaErrorCode::AllBrokersDown) => ProducerError::Unavailable,
            _ => ProducerError::Kafka(err),
        }
    }
}
