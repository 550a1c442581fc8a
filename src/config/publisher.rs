//! Resolution of the raw publisher settings into a `PublisherConfig`.
//!
//! Broker parameters come from two sources: inline keys next to
//! `outgoing_topic`, and the `kafka_broker_config` block. Both are merged
//! once, at construction. On a key collision the `kafka_broker_config`
//! block wins.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::config::settings::PublisherSettings;
use crate::message::input::kind;
use crate::utils::error::PublishError;

pub const BOOTSTRAP_SERVERS: &str = "bootstrap.servers";

/// Broker connection parameters, in librdkafka property syntax.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrokerConfig {
    params: BTreeMap<String, String>,
}

impl BrokerConfig {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn bootstrap_servers(&self) -> Option<&str> {
        self.get(BOOTSTRAP_SERVERS)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Set a parameter, normalising the key first.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.params.insert(normalize_key(key), value.into());
    }

    fn merge(&mut self, source: &Map<String, Value>) -> Result<(), PublishError> {
        for (key, value) in source {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(PublishError::configuration(format!(
                        "broker parameter '{key}' must be a scalar, found {}",
                        kind(other)
                    )));
                }
            };
            self.set(key, rendered);
        }
        Ok(())
    }
}

/// librdkafka property names never contain underscores, so environment
/// friendly spellings such as `bootstrap_servers` map onto dotted names.
fn normalize_key(key: &str) -> String {
    key.trim().replace('_', ".")
}

/// Immutable configuration of a publishing stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    pub topic: String,
    pub broker: BrokerConfig,
}

impl PublisherConfig {
    pub fn new(topic: impl Into<String>, broker: BrokerConfig) -> Result<Self, PublishError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(PublishError::configuration("outgoing_topic must not be empty"));
        }
        if broker.bootstrap_servers().is_none() {
            return Err(PublishError::configuration(format!(
                "Broker not configured: '{BOOTSTRAP_SERVERS}' is missing"
            )));
        }
        Ok(Self { topic, broker })
    }

    pub fn resolve(settings: &PublisherSettings) -> Result<Self, PublishError> {
        let topic = match &settings.outgoing_topic {
            Some(Value::String(topic)) => topic.clone(),
            Some(other) => {
                return Err(PublishError::configuration(format!(
                    "outgoing_topic should be a string, found {}",
                    kind(other)
                )));
            }
            None => return Err(PublishError::configuration("outgoing_topic is not configured")),
        };

        let mut broker = BrokerConfig::default();
        broker.merge(&settings.inline)?;
        if let Some(block) = &settings.kafka_broker_config {
            broker.merge(block)?;
        }

        Self::new(topic, broker)
    }
}
