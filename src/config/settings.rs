use serde::Deserialize;
use serde_json::{Map, Value};

/// Top-level configuration settings for the application.
///
/// Includes settings for logging, the publishing stage and the pipeline
/// driver used by the binary.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub publisher: PublisherSettings,
    pub pipeline: PipelineSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

/// Raw publisher settings, as written in the configuration file.
///
/// `outgoing_topic` is kept untyped so a non-string topic can be reported
/// as a configuration error instead of a deserialization failure. Any key
/// other than the two named ones is an inline broker parameter.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PublisherSettings {
    pub outgoing_topic: Option<Value>,
    pub kafka_broker_config: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub inline: Map<String, Value>,
}

/// Settings of the line-oriented pipeline driver.
#[derive(Debug, Deserialize, Clone)]
pub struct PipelineSettings {
    pub flush_timeout_ms: u64,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub logging: Option<PartialLoggingSettings>,
    pub publisher: Option<PublisherSettings>,
    pub pipeline: Option<PartialPipelineSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialPipelineSettings {
    pub flush_timeout_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            logging: LoggingSettings {
                level: "info".to_string(),
            },
            publisher: PublisherSettings::default(),
            pipeline: PipelineSettings {
                flush_timeout_ms: 10_000,
            },
        }
    }
}
