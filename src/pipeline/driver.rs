use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::message::InputMessage;
use crate::pipeline::record::PipelineRecord;
use crate::producer::Producer;
use crate::publisher::{Publisher, PublishingStage};

/// What happened to a single input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Published,
    Failed,
    Skipped,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub published: usize,
    pub failed: usize,
    /// Messages still undelivered when the final flush gave up.
    pub undelivered: usize,
}

/// Process one input line. Failures are reported through `error`.
pub fn handle_line<S: Publisher>(stage: &S, line: &str) -> LineOutcome {
    if line.trim().is_empty() {
        return LineOutcome::Skipped;
    }

    let record: PipelineRecord = match serde_json::from_str(line) {
        Ok(record) => record,
        Err(err) => {
            stage.error(&InputMessage::default(), Box::new(err));
            return LineOutcome::Failed;
        }
    };

    match stage.publish(&record.input, &record.response) {
        Ok(()) => LineOutcome::Published,
        Err(err) => {
            stage.error(&record.input, Box::new(err));
            LineOutcome::Failed
        }
    }
}

/// Drive `stage` over every line of `reader`.
///
/// Delivery reports are served between messages; once the input ends the
/// producer is flushed for at most `flush_timeout`.
pub async fn run<R, P>(
    reader: R,
    stage: &PublishingStage<P>,
    flush_timeout: Duration,
) -> io::Result<RunSummary>
where
    R: AsyncBufRead + Unpin,
    P: Producer,
{
    let mut lines = reader.lines();
    let mut summary = RunSummary::default();

    while let Some(line) = lines.next_line().await? {
        match handle_line(stage, &line) {
            LineOutcome::Published => summary.published += 1,
            LineOutcome::Failed => summary.failed += 1,
            LineOutcome::Skipped => {}
        }
        stage.producer().poll(Duration::ZERO);
    }

    if let Err(err) = stage.producer().flush(flush_timeout) {
        summary.undelivered = stage.producer().in_flight();
        warn!(
            error = %err,
            undelivered = summary.undelivered,
            "Producer flush did not complete"
        );
    }

    info!(
        published = summary.published,
        failed = summary.failed,
        undelivered = summary.undelivered,
        "Input exhausted"
    );
    Ok(summary)
}
