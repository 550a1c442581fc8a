use super::settings::{PartialSettings, Settings};
use super::{BrokerConfig, PublisherConfig, PublisherSettings, load_config_from, merge_with_defaults};
use crate::utils::error::PublishError;
use serde_json::{Map, Value, json};
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

fn settings_from(value: Value) -> PublisherSettings {
    serde_json::from_value(value).unwrap()
}

fn map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(fields) => fields,
        other => panic!("Expected an object, got {:?}", other),
    }
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.logging.level, "info");
    assert_eq!(settings.pipeline.flush_timeout_ms, 10_000);
    assert!(settings.publisher.outgoing_topic.is_none());
    assert!(settings.publisher.inline.is_empty());
}

#[test]
fn test_merge_with_defaults_keeps_partial_values() {
    let partial: PartialSettings = serde_json::from_value(json!({
        "logging": { "level": "debug" },
        "pipeline": {}
    }))
    .unwrap();
    let settings = merge_with_defaults(partial);
    assert_eq!(settings.logging.level, "debug");
    assert_eq!(settings.pipeline.flush_timeout_ms, 10_000);
}

#[test]
fn test_inline_keys_are_captured() {
    let settings = settings_from(json!({
        "outgoing_topic": "results",
        "bootstrap.servers": "kafka:9092",
        "linger.ms": 5
    }));
    assert_eq!(settings.outgoing_topic, Some(json!("results")));
    assert_eq!(settings.inline.len(), 2);
    assert!(settings.kafka_broker_config.is_none());
}

#[test]
fn test_resolve_merges_both_sources() {
    let settings = settings_from(json!({
        "outgoing_topic": "results",
        "bootstrap.servers": "inline:9092",
        "acks": "all",
        "kafka_broker_config": {
            "bootstrap.servers": "block:9092",
            "enable.idempotence": true
        }
    }));
    let config = PublisherConfig::resolve(&settings).unwrap();
    assert_eq!(config.topic, "results");
    // block wins on collision
    assert_eq!(config.broker.bootstrap_servers(), Some("block:9092"));
    assert_eq!(config.broker.get("acks"), Some("all"));
    assert_eq!(config.broker.get("enable.idempotence"), Some("true"));
    assert_eq!(config.broker.len(), 3);
}

#[test]
fn test_resolve_normalizes_underscored_keys() {
    let settings = settings_from(json!({
        "outgoing_topic": "results",
        "bootstrap_servers": "kafka:9092",
        "queue_buffering_max_messages": 10
    }));
    let config = PublisherConfig::resolve(&settings).unwrap();
    assert_eq!(config.broker.bootstrap_servers(), Some("kafka:9092"));
    assert_eq!(config.broker.get("queue.buffering.max.messages"), Some("10"));
}

#[test]
fn test_non_string_topic_is_a_configuration_error() {
    let settings = settings_from(json!({
        "outgoing_topic": 123,
        "bootstrap.servers": "kafka:9092"
    }));
    let err = PublisherConfig::resolve(&settings).unwrap_err();
    assert!(matches!(err, PublishError::Configuration { .. }));
    assert!(!err.is_per_message());
    assert!(err.to_string().contains("outgoing_topic should be a string"));
}

#[test]
fn test_missing_topic_is_a_configuration_error() {
    let settings = settings_from(json!({ "bootstrap.servers": "kafka:9092" }));
    assert!(matches!(
        PublisherConfig::resolve(&settings),
        Err(PublishError::Configuration { .. })
    ));
}

#[test]
fn test_missing_broker_address_is_a_configuration_error() {
    let settings = settings_from(json!({
        "outgoing_topic": "results",
        "kafka_broker_config": {}
    }));
    let err = PublisherConfig::resolve(&settings).unwrap_err();
    assert!(err.to_string().contains("Broker not configured"));
}

#[test]
fn test_non_scalar_broker_value_is_rejected() {
    let settings = PublisherSettings {
        outgoing_topic: Some(json!("results")),
        kafka_broker_config: Some(map(json!({
            "bootstrap.servers": ["a:9092", "b:9092"]
        }))),
        inline: Map::new(),
    };
    let err = PublisherConfig::resolve(&settings).unwrap_err();
    assert!(err.to_string().contains("must be a scalar"));
}

#[test]
fn test_empty_topic_is_rejected() {
    let mut broker = BrokerConfig::default();
    broker.set("bootstrap.servers", "kafka:9092");
    assert!(PublisherConfig::new("  ", broker.clone()).is_err());
    assert!(PublisherConfig::new("results", broker).is_ok());
}

const CONFIG_TOML: &str = r#"
    [logging]
    level = "warn"

    [publisher]
    outgoing_topic = "ccx.results"
    "linger.ms" = 10

    [publisher.kafka_broker_config]
    "bootstrap.servers" = "kafka:29092"

    [pipeline]
    flush_timeout_ms = 2500
"#;

#[test]
#[serial]
fn test_load_config_from_file() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("publisher.toml");
    fs::write(&path, CONFIG_TOML).expect("write config file");

    let cfg = temp_env::with_vars_unset(
        [
            "RULEPUB__PUBLISHER__OUTGOING_TOPIC",
            "RULEPUB__LOGGING__LEVEL",
        ],
        || load_config_from(&path).expect("load_config_from failed"),
    );
    assert_eq!(cfg.logging.level, "warn");
    assert_eq!(cfg.pipeline.flush_timeout_ms, 2500);

    let publisher = PublisherConfig::resolve(&cfg.publisher).unwrap();
    assert_eq!(publisher.topic, "ccx.results");
    assert_eq!(publisher.broker.bootstrap_servers(), Some("kafka:29092"));
    assert_eq!(publisher.broker.get("linger.ms"), Some("10"));
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("publisher.toml");
    fs::write(&path, CONFIG_TOML).expect("write config file");

    let cfg = temp_env::with_vars(
        [
            ("RULEPUB__PUBLISHER__OUTGOING_TOPIC", Some("override.results")),
            ("RULEPUB__LOGGING__LEVEL", Some("debug")),
        ],
        || load_config_from(&path).expect("load_config_from failed"),
    );
    assert_eq!(cfg.logging.level, "debug");
    let publisher = PublisherConfig::resolve(&cfg.publisher).unwrap();
    assert_eq!(publisher.topic, "override.results");
}

#[test]
fn test_missing_file_is_an_error() {
    let tmp = TempDir::new().expect("create tempdir");
    assert!(load_config_from(tmp.path().join("absent.toml")).is_err());
}
