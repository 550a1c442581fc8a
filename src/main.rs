use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use rulepub::config::load_config;
use rulepub::pipeline::run;
use rulepub::publisher::{ObservabilitySink, PublishingStage, TracingSink};
use rulepub::utils::logging;
use tokio::io::BufReader;
use tracing::{error, info};

#[cfg(feature = "kafka")]
use rulepub::producer::KafkaProducerFactory;
#[cfg(not(feature = "kafka"))]
use rulepub::producer::MemoryBroker;

#[tokio::main]
async fn main() -> ExitCode {
    // a missing .env file is fine
    let _ = dotenvy::dotenv();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&settings.logging.level);

    #[cfg(feature = "kafka")]
    let factory = KafkaProducerFactory;
    #[cfg(not(feature = "kafka"))]
    let factory = {
        tracing::warn!("Built without the `kafka` feature, records stay in an in-process broker");
        MemoryBroker::new()
    };

    let sink: Arc<dyn ObservabilitySink> = Arc::new(TracingSink);
    let stage = match PublishingStage::connect(&settings.publisher, &factory, sink) {
        Ok(stage) => stage,
        Err(err) => {
            error!(error = %rulepub::utils::error::error_chain(&err), "Cannot start the publishing stage");
            return ExitCode::FAILURE;
        }
    };

    let stdin = BufReader::new(tokio::io::stdin());
    let flush_timeout = Duration::from_millis(settings.pipeline.flush_timeout_ms);
    match run(stdin, &stage, flush_timeout).await {
        Ok(summary) if summary.undelivered == 0 => {
            info!(published = summary.published, failed = summary.failed, "Done");
            ExitCode::SUCCESS
        }
        Ok(summary) => {
            error!(undelivered = summary.undelivered, "Some messages were never delivered");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!(error = %err, "Reading the input failed");
            ExitCode::FAILURE
        }
    }
}
