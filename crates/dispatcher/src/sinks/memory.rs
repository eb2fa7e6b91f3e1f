//! MemorySink - keeps publications in memory

use std::sync::{Arc, Mutex};

use contracts::{ContractError, DataSink, Publication};

/// Sink that records every publication it receives
///
/// Clones share the same buffer, so a clone kept by the caller observes
/// what the worker-owned instance wrote.
#[derive(Clone, Default)]
pub struct MemorySink {
    name: String,
    received: Arc<Mutex<Vec<Publication>>>,
    closed: Arc<Mutex<bool>>,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Publications written so far, in arrival order
    pub fn publications(&self) -> Vec<Publication> {
        self.received
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.received.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.closed.lock().map(|guard| *guard).unwrap_or(false)
    }
}

impl DataSink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, publication: &Publication) -> Result<(), ContractError> {
        self.received
            .lock()
            .map_err(|_| ContractError::sink_write(&self.name, "buffer poisoned"))?
            .push(publication.clone());
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        if let Ok(mut closed) = self.closed.lock() {
            *closed = true;
        }
        Ok(())
    }
}
