//! Output envelope
//!
//! The envelope is what lands on the output topic: the identity of the
//! analysed cluster, the rule-evaluation report and the schema version.
//! On the wire it is compact JSON terminated by exactly one `\n`, encoded as
//! UTF-8. Field order is fixed by the declaration order below.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::input::{InputMessage, kind};
use crate::utils::error::{EncodingCause, PublishError};

/// Schema version stamped into every envelope.
pub const OUTPUT_SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputEnvelope {
    #[serde(rename = "OrgID")]
    pub org_id: i64,
    pub account_number: i64,
    pub cluster_name: String,
    pub report: Value,
    pub last_checked: Value,
    pub version: u32,
    pub request_id: Option<Value>,
}

impl OutputEnvelope {
    /// Assemble the envelope for already extracted identity fields.
    ///
    /// Lookups happen in this order: `timestamp`, `cluster_name`, then the
    /// report is parsed. A missing key is a `MissingField` error, a wrong
    /// type or a malformed report an `Encoding` error.
    pub fn build(
        input_msg: &InputMessage,
        org_id: i64,
        account_number: i64,
        response: &str,
        version: u32,
    ) -> Result<Self, PublishError> {
        let last_checked = input_msg
            .timestamp()
            .ok_or(PublishError::MissingField { key: "timestamp" })?
            .clone();

        let cluster_name = match input_msg.cluster_name() {
            None => return Err(PublishError::MissingField { key: "cluster_name" }),
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(encoding_error(
                    response,
                    EncodingCause::TypeMismatch {
                        field: "cluster_name",
                        expected: "a string",
                        found: kind(other),
                    },
                ));
            }
        };

        let report = serde_json::from_str(response)
            .map_err(|e| encoding_error(response, EncodingCause::InvalidReport(e)))?;

        Ok(Self {
            org_id,
            account_number,
            cluster_name,
            report,
            last_checked,
            version,
            request_id: input_msg.request_id().cloned(),
        })
    }

    /// Serialize to UTF-8 JSON followed by a single newline.
    pub fn encode(&self) -> Result<Vec<u8>, EncodingCause> {
        let mut bytes = serde_json::to_vec(self).map_err(EncodingCause::Serialize)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

pub(crate) fn encoding_error(response: &str, cause: EncodingCause) -> PublishError {
    PublishError::Encoding {
        response: response.to_string(),
        source: cause,
    }
}
