//! The `error` module defines the error taxonomy of the publishing stage.
//!
//! Every failure the stage can observe is reported as a [`PublishError`].
//! Each variant keeps its underlying cause reachable through
//! [`std::error::Error::source`], so the cause chain is never lost between
//! the stage and the pipeline engine that decides what to do with the
//! offending message.

use std::error::Error as StdError;
use std::fmt;
use std::num::ParseIntError;

use thiserror::Error;

use crate::message::InputMessage;

/// Type-erased error handed to `Publisher::error` by the pipeline engine.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Identity fields that get their own named extraction error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    OrgId,
    AccountNumber,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityField::OrgId => f.write_str("OrgID"),
            IdentityField::AccountNumber => f.write_str("Account number"),
        }
    }
}

/// Why an identity field could not be turned into an integer.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("missing key '{0}'")]
    MissingKey(&'static str),

    #[error("expected an integer-like value at '{key}', found {found}")]
    WrongType {
        key: &'static str,
        found: &'static str,
    },

    #[error("invalid literal for an integer: '{value}'")]
    NotNumeric {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("number {0} does not fit into a 64-bit integer")]
    OutOfRange(String),
}

/// Failures while turning the rule result into the bytes put on the wire.
#[derive(Debug, Error)]
pub enum EncodingCause {
    #[error("the rule result is not valid JSON")]
    InvalidReport(#[source] serde_json::Error),

    #[error("field '{field}' must be {expected}, found {found}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("the output envelope could not be serialized")]
    Serialize(#[source] serde_json::Error),
}

/// Errors reported by a broker producer.
#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("the local producer queue is full")]
    QueueFull,

    #[error("the broker is unavailable")]
    Unavailable,

    #[error("flush timed out with {remaining} message(s) still in flight")]
    FlushTimeout { remaining: usize },

    #[error("invalid producer setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    #[cfg(feature = "kafka")]
    #[error("kafka client error")]
    Kafka(#[source] rdkafka::error::KafkaError),
}

/// The single umbrella error of the publishing stage.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Fatal: the stage cannot be constructed.
    #[error("configuration error: {reason}")]
    Configuration {
        reason: String,
        #[source]
        source: Option<ProducerError>,
    },

    #[error("Error extracting the {field}")]
    Extraction {
        field: IdentityField,
        #[source]
        source: FieldError,
    },

    #[error("Missing expected keys in the input message: '{key}'")]
    MissingField { key: &'static str },

    #[error("Error encoding the response to publish: {response}")]
    Encoding {
        response: String,
        #[source]
        source: EncodingCause,
    },

    #[error("Error delivering the message to topic '{topic}'")]
    Delivery {
        topic: String,
        #[source]
        source: ProducerError,
    },

    /// A failure raised outside this stage, normalised by `Publisher::error`.
    #[error(transparent)]
    Pipeline(BoxError),
}

impl PublishError {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        PublishError::Configuration {
            reason: reason.into(),
            source: None,
        }
    }

    /// Whether the failure only concerns the current input message.
    ///
    /// Everything except a configuration error leaves the stage usable for
    /// the next message.
    pub fn is_per_message(&self) -> bool {
        !matches!(self, PublishError::Configuration { .. })
    }

    /// Render the error together with whatever identifies `input_msg`.
    pub fn format_context(&self, input_msg: &InputMessage) -> String {
        format!(
            "Status: Error; Topic: {}; Partition: {}; Offset: {}; LastChecked: {}; \
             OrgID: {}; ClusterName: {}; Cause: {}",
            input_msg.display_field(input_msg.topic()),
            input_msg.display_field(input_msg.partition()),
            input_msg.display_field(input_msg.offset()),
            input_msg.display_field(input_msg.timestamp()),
            input_msg.display_field(input_msg.raw_org_id()),
            input_msg.display_field(input_msg.cluster_name()),
            error_chain(self),
        )
    }
}

/// Join an error and all of its sources into one line.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        current = cause.source();
    }
    rendered
}
