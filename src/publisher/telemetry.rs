//! Observability sink
//!
//! The stage reports what it does through an injected [`ObservabilitySink`]
//! rather than a global logger, so tests can capture every record. The
//! default [`TracingSink`] turns each [`StageEvent`] into a `tracing` event
//! with structured fields.

use std::fmt;

use crate::message::OutputEnvelope;
use crate::utils::error::PublishError;

/// Structured records emitted by the publishing stage.
#[derive(Debug)]
pub enum StageEvent<'a> {
    Connected {
        topic: &'a str,
        brokers: &'a str,
    },
    Sending {
        topic: &'a str,
    },
    MessageContext {
        envelope: &'a OutputEnvelope,
    },
    Delivered {
        source_topic: String,
        partition: String,
        offset: String,
        last_checked: String,
    },
    Failed {
        error: &'a PublishError,
        context: &'a str,
    },
}

impl fmt::Display for StageEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageEvent::Connected { topic, brokers } => {
                write!(f, "Producing to topic '{topic}' on brokers {brokers}")
            }
            StageEvent::Sending { topic } => write!(f, "Sending response to the {topic} topic."),
            StageEvent::MessageContext { envelope } => write!(
                f,
                "Message context: OrgId={}, AccountNumber={}, ClusterName=\"{}\", \
                 LastChecked=\"{}\", Version={}",
                envelope.org_id,
                envelope.account_number,
                envelope.cluster_name,
                envelope.last_checked,
                envelope.version
            ),
            StageEvent::Delivered {
                source_topic,
                partition,
                offset,
                last_checked,
            } => write!(
                f,
                "Status: Success; Topic: {source_topic}; Partition: {partition}; \
                 Offset: {offset}; LastChecked: {last_checked}"
            ),
            StageEvent::Failed { context, .. } => f.write_str(context),
        }
    }
}

pub trait ObservabilitySink: Send + Sync {
    fn debug(&self, event: &StageEvent<'_>);
    fn info(&self, event: &StageEvent<'_>);
    fn error(&self, event: &StageEvent<'_>);
}

/// Forwards stage events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

macro_rules! emit {
    ($level:expr, $event:expr) => {
        match $event {
            StageEvent::Connected { topic, brokers } => {
                tracing::event!($level, topic = %topic, brokers = %brokers, "{}", $event)
            }
            StageEvent::Sending { topic } => tracing::event!($level, topic = %topic, "{}", $event),
            StageEvent::MessageContext { envelope } => tracing::event!(
                $level,
                org_id = envelope.org_id,
                account_number = envelope.account_number,
                cluster_name = %envelope.cluster_name,
                last_checked = %envelope.last_checked,
                version = envelope.version,
                "{}",
                $event
            ),
            StageEvent::Delivered {
                source_topic,
                partition,
                offset,
                last_checked,
            } => tracing::event!(
                $level,
                status = "success",
                topic = %source_topic,
                partition = %partition,
                offset = %offset,
                last_checked = %last_checked,
                "{}",
                $event
            ),
            StageEvent::Failed { error, context } => tracing::event!(
                $level,
                status = "error",
                per_message = error.is_per_message(),
                "{}",
                context
            ),
        }
    };
}

impl ObservabilitySink for TracingSink {
    fn debug(&self, event: &StageEvent<'_>) {
        emit!(tracing::Level::DEBUG, event)
    }

    fn info(&self, event: &StageEvent<'_>) {
        emit!(tracing::Level::INFO, event)
    }

    fn error(&self, event: &StageEvent<'_>) {
        emit!(tracing::Level::ERROR, event)
    }
}
