//! The `message` module describes the data flowing through the stage.
//!
//! - `input`: read-only access to the record supplied by the pipeline engine,
//!   including the integer coercion of the identity fields.
//! - `envelope`: the versioned output envelope and its wire encoding.

pub mod envelope;
pub mod input;

pub use envelope::{OUTPUT_SCHEMA_VERSION, OutputEnvelope};
pub use input::InputMessage;

#[cfg(test)]
mod tests;
