//! # rulepub
//!
//! `rulepub` is the publishing stage of a rule-processing pipeline. It takes
//! the result of a rule-evaluation job, enriches it with the identity of the
//! analysed cluster, and enqueues it as a newline-terminated JSON envelope on
//! an output topic of a message broker.
//!
//! ## Core Modules
//!
//! - `publisher`: the `Publisher` contract and the `PublishingStage` implementing it.
//! - `message`: input message accessors and the versioned output envelope.
//! - `producer`: the broker producer seam, an in-memory broker and a Kafka adapter.
//! - `config`: loading settings and resolving the publisher configuration.
//! - `pipeline`: a line-oriented driver that feeds the stage and polls the producer.
//! - `utils`: the error taxonomy and logging bootstrap.

pub mod config;
pub mod message;
pub mod pipeline;
pub mod producer;
pub mod publisher;
pub mod utils;

pub use message::{InputMessage, OutputEnvelope};
pub use publisher::{Publisher, PublishingStage};
pub use utils::error::PublishError;
