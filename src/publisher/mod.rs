//! The `publisher` module contains the publishing stage: the last step of
//! the rule-processing pipeline, which turns a rule result into an output
//! envelope and hands it to the broker producer.

pub mod stage;
pub mod telemetry;

pub use stage::PublishingStage;
pub use telemetry::{ObservabilitySink, StageEvent, TracingSink};

use crate::message::InputMessage;
use crate::utils::error::{BoxError, PublishError};

/// Contract between the pipeline engine and a publishing stage.
pub trait Publisher {
    /// Deliver one output envelope derived from `input_msg` and `response`.
    ///
    /// Returns once the producer has accepted the bytes into its send
    /// queue; broker-side durability is not awaited.
    fn publish(&self, input_msg: &InputMessage, response: &str) -> Result<(), PublishError>;

    /// Report a failure raised while processing `input_msg`. Never fails.
    fn error(&self, input_msg: &InputMessage, ex: BoxError);
}
