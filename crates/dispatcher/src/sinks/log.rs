//! LogSink - logs publication summary via tracing

use contracts::{ContractError, DataSink, MessagePayload, Publication};
use tracing::{info, instrument};

/// Sink that logs publication summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_publication_summary(&self, publication: &Publication) {
        let pose = publication.messages.iter().find_map(|m| match &m.payload {
            MessagePayload::Pose(pose) => Some(pose),
            _ => None,
        });

        match pose {
            Some(pose) => info!(
                sink = %self.name,
                sequence = publication.sequence,
                stamp = publication.stamp.as_secs_f64(),
                messages = publication.messages.len(),
                x = pose.position.x,
                y = pose.position.y,
                z = pose.position.z,
                "Publication received"
            ),
            None => info!(
                sink = %self.name,
                sequence = publication.sequence,
                stamp = publication.stamp.as_secs_f64(),
                messages = publication.messages.len(),
                "Publication received"
            ),
        }
    }
}

impl DataSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, publication),
        fields(sink = %self.name, sequence = publication.sequence)
    )]
    async fn write(&mut self, publication: &Publication) -> Result<(), ContractError> {
        self.log_publication_summary(publication);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
