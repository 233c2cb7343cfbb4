use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ctxcap_report::CaptureReport;
use ctxcap_types::{Document, SourceId};

use crate::config::StopOptions;
use crate::session::{CaptureSession, CaptureState, StopOutcome};
use crate::sink::ReportSink;

/// Shared handle to a [`CaptureSession`].
///
/// Clones refer to the same session. Every operation takes the session lock,
/// so a stop never observes a half-applied add.
#[derive(Clone, Debug, Default)]
pub struct CaptureHandle {
    inner: Arc<Mutex<CaptureSession>>,
}

impl CaptureHandle {
    pub fn new(session: CaptureSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn with_sink(sink: impl ReportSink + 'static) -> Self {
        Self::new(CaptureSession::with_sink(sink))
    }

    // A panic inside a sink leaves the session itself consistent.
    fn lock(&self) -> MutexGuard<'_, CaptureSession> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn start(&self) -> bool {
        self.lock().start()
    }

    pub fn add_document(&self, data: Option<Document>, source_id: SourceId) -> bool {
        self.lock().add_document(data, source_id)
    }

    pub fn stop(&self, options: StopOptions) -> StopOutcome {
        self.lock().stop(options)
    }

    pub fn snapshot(&self, options: StopOptions) -> Option<CaptureReport> {
        self.lock().snapshot(options)
    }

    pub fn state(&self) -> CaptureState {
        self.lock().state()
    }

    pub fn is_capturing(&self) -> bool {
        self.lock().is_capturing()
    }

    pub fn buffered(&self) -> usize {
        self.lock().buffered()
    }
}

impl From<CaptureSession> for CaptureHandle {
    fn from(session: CaptureSession) -> Self {
        Self::new(session)
    }
}
