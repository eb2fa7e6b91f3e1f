//! FileSink - appends every channel message to a per-topic JSON Lines file

use contracts::{ContractError, DataSink, MessagePayload, Publication, Stamp, TopicName};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));

        Self { base_path }
    }
}

/// One line of a topic file
#[derive(Serialize)]
struct Record<'a> {
    sequence: u64,
    stamp: Stamp,
    payload: &'a MessagePayload,
}

/// Sink that writes publications to `<base_path>/<topic>.jsonl`
///
/// Topic slashes become underscores: `/state/theta/x` lands in
/// `state_theta_x.jsonl`. Topics that map to the same file share one writer.
///
/// JSON has no NaN or infinity: `serde_json` writes non-finite values as
/// `null`, so a NaN sample shows up as `{"float64":null}` here.
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    writers: HashMap<PathBuf, BufWriter<File>>,
}

impl FileSink {
    /// Create a new FileSink
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.base_path)?;

        Ok(Self {
            name: name.into(),
            config,
            writers: HashMap::new(),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = FileSinkConfig::from_params(params);
        Self::new(name, config)
    }

    /// Path of the file holding `topic`
    pub fn topic_path(&self, topic: &TopicName) -> PathBuf {
        topic_path(&self.config.base_path, topic)
    }

    fn writer(&mut self, topic: &TopicName) -> std::io::Result<&mut BufWriter<File>> {
        let path = topic_path(&self.config.base_path, topic);
        match self.writers.entry(path) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(entry.key())?;
                Ok(entry.insert(BufWriter::new(file)))
            }
        }
    }

    fn append_publication(&mut self, publication: &Publication) -> std::io::Result<()> {
        for message in &publication.messages {
            let record = Record {
                sequence: publication.sequence,
                stamp: publication.stamp,
                payload: &message.payload,
            };
            let writer = self.writer(&message.topic)?;
            serde_json::to_writer(&mut *writer, &record)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn persist_publication(&mut self, publication: &Publication) -> Result<(), ContractError> {
        self.append_publication(publication).map_err(|e| {
            error!(sink = %self.name, sequence = publication.sequence, error = %e, "Write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })
    }

    fn flush_writers(&mut self) -> Result<(), ContractError> {
        for writer in self.writers.values_mut() {
            writer
                .flush()
                .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        }
        Ok(())
    }
}

fn topic_path(base: &Path, topic: &TopicName) -> PathBuf {
    base.join(format!("{}.jsonl", topic.file_stem()))
}

impl DataSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, publication),
        fields(sink = %self.name, sequence = publication.sequence)
    )]
    async fn write(&mut self, publication: &Publication) -> Result<(), ContractError> {
        self.persist_publication(publication)
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        self.flush_writers()
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.flush_writers()?;
        self.writers.clear();
        debug!(sink = %self.name, "FileSink closed");
        Ok(())
    }
}
