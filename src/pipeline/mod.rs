//! The `pipeline` module is a minimal stand-in for the upstream pipeline
//! engine, used by the `rulepub` binary.
//!
//! It reads newline-delimited records, hands each one to the publishing
//! stage, routes failures to `Publisher::error` and drives the producer's
//! delivery reports by polling between messages and flushing at the end.
//! It never retries: a failed record is reported and skipped.

pub mod driver;
pub mod record;

pub use driver::{LineOutcome, RunSummary, handle_line, run};
pub use record::PipelineRecord;
