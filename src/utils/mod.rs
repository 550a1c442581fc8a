//! The `utils` module provides the pieces shared by every other module of
//! `rulepub`: the error taxonomy and the logging bootstrap.

pub mod error;
pub mod logging;

pub use error::{
    BoxError, EncodingCause, FieldError, IdentityField, ProducerError, PublishError,
};
