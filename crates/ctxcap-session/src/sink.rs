use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

/// Destination for report text and notices produced by a session.
///
/// Implementations must not fail; a sink that cannot deliver drops the text.
pub trait ReportSink: Send {
    fn emit(&mut self, text: &str);
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn emit(&mut self, text: &str) {
        (**self).emit(text);
    }
}

/// Writes every emission to the `tracing` debug log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn emit(&mut self, text: &str) {
        debug!(target: "ctxcap::report", "{text}");
    }
}

/// Keeps every emission in memory. Clones share the same storage.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of everything emitted so far, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ReportSink for MemorySink {
    fn emit(&mut self, text: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());
    }
}
