use serde::Deserialize;

use crate::message::InputMessage;

/// One line of driver input: the originating message and the rule result.
///
/// ```json
/// {"input": {"cluster_name": "c1", ...}, "response": "{\"reports\": []}"}
/// ```
#[derive(Debug, Deserialize)]
pub struct PipelineRecord {
    pub input: InputMessage,
    pub response: String,
}
