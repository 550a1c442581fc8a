mod publisher;
mod settings;

use std::path::Path;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use publisher::{BOOTSTRAP_SERVERS, BrokerConfig, PublisherConfig};
pub use settings::{LoggingSettings, PipelineSettings, PublisherSettings, Settings};

/// Prefix of environment overrides, e.g. `RULEPUB__PUBLISHER__OUTGOING_TOPIC`.
pub const ENV_PREFIX: &str = "RULEPUB";

/// Loads the configuration from `config/default` (any supported format)
/// and environment variables, merged with default values.
pub fn load_config() -> Result<Settings, ConfigError> {
    build(File::with_name("config/default").required(false))
}

/// Same as [`load_config`], reading a specific file instead of the default one.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    build(File::from(path.as_ref()).required(true))
}

fn build<S>(file: S) -> Result<Settings, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let builder = Config::builder().add_source(file).add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__"),
    );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(merge_with_defaults(partial))
}

fn merge_with_defaults(partial: PartialSettings) -> Settings {
    let default = Settings::default();

    Settings {
        logging: LoggingSettings {
            level: partial
                .logging
                .and_then(|l| l.level)
                .unwrap_or(default.logging.level),
        },
        publisher: partial.publisher.unwrap_or(default.publisher),
        pipeline: PipelineSettings {
            flush_timeout_ms: partial
                .pipeline
                .and_then(|p| p.flush_timeout_ms)
                .unwrap_or(default.pipeline.flush_timeout_ms),
        },
    }
}

#[cfg(test)]
mod tests;
