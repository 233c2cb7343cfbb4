use serde::Serialize;
use tracing::{debug, trace};

use ctxcap_report::CaptureReport;
use ctxcap_types::{CapturedDocument, Document, SourceId};

use crate::config::StopOptions;
use crate::sink::{ReportSink, TracingSink};

/// Emitted instead of a report when a session stops with nothing buffered.
pub const NO_DOCUMENTS_NOTICE: &str = "No documents to merge.";

/// Lifecycle state of a capture session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CaptureState {
    Idle,
    Capturing,
}

/// What a stop request produced.
#[derive(Clone, Debug, PartialEq)]
pub enum StopOutcome {
    /// The session was not capturing; nothing was emitted.
    NotCapturing,
    /// The session stopped with an empty buffer; only a notice was emitted.
    NoDocuments,
    /// The session stopped and this report was emitted.
    Reported(CaptureReport),
}

/// Single-owner capture session.
///
/// `Idle --start--> Capturing --stop--> Idle`. Documents added while idle
/// are dropped. Starting an active session changes nothing and keeps the
/// buffer. Every stop of an active session clears the buffer.
pub struct CaptureSession {
    state: CaptureState,
    buffer: Vec<CapturedDocument>,
    sink: Box<dyn ReportSink>,
}

impl CaptureSession {
    /// Create an idle session that reports through the `tracing` log.
    pub fn new() -> Self {
        Self::with_sink(TracingSink)
    }

    /// Create an idle session that reports to `sink`.
    pub fn with_sink(sink: impl ReportSink + 'static) -> Self {
        Self {
            state: CaptureState::Idle,
            buffer: Vec::new(),
            sink: Box::new(sink),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_capturing(&self) -> bool {
        self.state == CaptureState::Capturing
    }

    /// Number of documents buffered in the current session.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Buffered documents in arrival order.
    pub fn documents(&self) -> &[CapturedDocument] {
        &self.buffer
    }

    /// Begin capturing. Returns `false` if a session was already active.
    pub fn start(&mut self) -> bool {
        if self.is_capturing() {
            trace!("capture already active; ignoring start request");
            return false;
        }
        self.state = CaptureState::Capturing;
        trace!("capture started");
        true
    }

    /// Buffer a document if capturing. Returns `true` if it was buffered.
    pub fn add_document(&mut self, data: Option<Document>, source_id: SourceId) -> bool {
        if !self.is_capturing() {
            return false;
        }
        self.buffer.push(CapturedDocument::new(source_id, data));
        trace!(source = %source_id, buffered = self.buffer.len(), "document captured");
        true
    }

    /// Stop capturing and emit the report for everything buffered.
    pub fn stop(&mut self, options: StopOptions) -> StopOutcome {
        if !self.is_capturing() {
            trace!("capture already inactive; ignoring stop request");
            return StopOutcome::NotCapturing;
        }
        self.state = CaptureState::Idle;
        trace!("capture stopped");

        if self.buffer.is_empty() {
            debug!("{NO_DOCUMENTS_NOTICE}");
            self.sink.emit(NO_DOCUMENTS_NOTICE);
            return StopOutcome::NoDocuments;
        }

        let documents = std::mem::take(&mut self.buffer);
        let report = CaptureReport::generate(documents, options.merge, options.case_sensitive);
        debug!(
            documents = report.document_count,
            merged = report.merge.is_some(),
            conflicts = report.merge.as_ref().map_or(0, |m| m.conflicts.len()),
            "capture report generated"
        );
        self.sink.emit(&report.render());
        StopOutcome::Reported(report)
    }

    /// Report on what has been captured so far without emitting it, changing
    /// state, or clearing the buffer. `None` when nothing is buffered.
    pub fn snapshot(&self, options: StopOptions) -> Option<CaptureReport> {
        if self.buffer.is_empty() {
            return None;
        }
        Some(CaptureReport::generate(
            self.buffer.clone(),
            options.merge,
            options.case_sensitive,
        ))
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("state", &self.state)
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}
