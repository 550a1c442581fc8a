//! Publishing stage
//!
//! `PublishingStage` validates each `(input_msg, response)` pair, builds the
//! versioned output envelope and enqueues it on the configured topic.
//!
//! Usage notes:
//! - The pipeline engine calls `publish`/`error` one message at a time; the
//!   stage keeps no mutable state of its own, so no locking happens here.
//! - The producer handle is opened once, at construction, and reused.
//! - The stage never polls or flushes the producer. The surrounding
//!   pipeline owns that, see [`crate::producer`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::config::{PublisherConfig, PublisherSettings};
use crate::message::envelope::encoding_error;
use crate::message::{InputMessage, OUTPUT_SCHEMA_VERSION, OutputEnvelope};
use crate::producer::{Producer, ProducerFactory};
use crate::publisher::Publisher;
use crate::publisher::telemetry::{ObservabilitySink, StageEvent};
use crate::utils::error::{BoxError, IdentityField, PublishError};

pub struct PublishingStage<P> {
    config: PublisherConfig,
    producer: P,
    sink: Arc<dyn ObservabilitySink>,
    version: u32,
}

impl<P: Producer> PublishingStage<P> {
    /// Resolve `settings` and open a producer through `factory`.
    ///
    /// The factory is only invoked once the topic and broker address have
    /// been validated.
    pub fn connect<F>(
        settings: &PublisherSettings,
        factory: &F,
        sink: Arc<dyn ObservabilitySink>,
    ) -> Result<Self, PublishError>
    where
        F: ProducerFactory<Producer = P>,
    {
        let config = PublisherConfig::resolve(settings)?;
        let producer = factory
            .create(&config.broker)
            .map_err(|source| PublishError::Configuration {
                reason: "the broker producer could not be created".to_string(),
                source: Some(source),
            })?;
        Ok(Self::with_producer(config, producer, sink))
    }

    /// Build a stage around an already opened producer.
    pub fn with_producer(
        config: PublisherConfig,
        producer: P,
        sink: Arc<dyn ObservabilitySink>,
    ) -> Self {
        sink.info(&StageEvent::Connected {
            topic: &config.topic,
            brokers: config.broker.bootstrap_servers().unwrap_or_default(),
        });
        Self {
            config,
            producer,
            sink,
            version: OUTPUT_SCHEMA_VERSION,
        }
    }

    pub fn topic(&self) -> &str {
        &self.config.topic
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// The producer handle, for the pipeline to poll and flush.
    pub fn producer(&self) -> &P {
        &self.producer
    }

    /// Extract, validate and encode without touching the producer.
    pub fn prepare(
        &self,
        input_msg: &InputMessage,
        response: &str,
    ) -> Result<(OutputEnvelope, Vec<u8>), PublishError> {
        let org_id = input_msg
            .org_id()
            .map_err(|source| PublishError::Extraction {
                field: IdentityField::OrgId,
                source,
            })?;
        let account_number =
            input_msg
                .account_number()
                .map_err(|source| PublishError::Extraction {
                    field: IdentityField::AccountNumber,
                    source,
                })?;

        let envelope =
            OutputEnvelope::build(input_msg, org_id, account_number, response, self.version)?;
        let bytes = envelope
            .encode()
            .map_err(|cause| encoding_error(response, cause))?;
        Ok((envelope, bytes))
    }
}

impl<P: Producer> Publisher for PublishingStage<P> {
    fn publish(&self, input_msg: &InputMessage, response: &str) -> Result<(), PublishError> {
        let (envelope, bytes) = self.prepare(input_msg, response)?;

        self.sink.debug(&StageEvent::Sending {
            topic: &self.config.topic,
        });
        self.producer
            .produce(&self.config.topic, &bytes)
            .map_err(|source| PublishError::Delivery {
                topic: self.config.topic.clone(),
                source,
            })?;

        self.sink.debug(&StageEvent::MessageContext {
            envelope: &envelope,
        });
        self.sink.info(&StageEvent::Delivered {
            source_topic: input_msg.display_field(input_msg.topic()),
            partition: input_msg.display_field(input_msg.partition()),
            offset: input_msg.display_field(input_msg.offset()),
            last_checked: input_msg.display_field(Some(&envelope.last_checked)),
        });
        Ok(())
    }

    fn error(&self, input_msg: &InputMessage, ex: BoxError) {
        let error = match ex.downcast::<PublishError>() {
            Ok(own) => *own,
            Err(foreign) => PublishError::Pipeline(foreign),
        };

        // terminal handler: a failing sink must not take the pipeline down
        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            let context = error.format_context(input_msg);
            self.sink.error(&StageEvent::Failed {
                error: &error,
                context: &context,
            });
        }));
    }
}
