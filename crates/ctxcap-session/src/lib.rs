//! Capture session controller for ctxcap.
//!
//! Owns the buffer of captured documents and the idle/capturing state.
//! Documents are buffered only while a session is active; stopping the
//! session folds the buffer into a [`CaptureReport`](ctxcap_report::CaptureReport),
//! hands its text to a [`ReportSink`], and clears the buffer.
//!
//! A [`CaptureSession`] is a plain single-owner value. Hosts that deliver
//! documents from several callers wrap it in a [`CaptureHandle`], which
//! serializes every operation behind one lock.

pub mod config;
pub mod error;
pub mod handle;
pub mod session;
pub mod sink;

pub use config::{CaptureConfig, StopOptions};
pub use error::{ConfigError, ConfigResult};
pub use handle::CaptureHandle;
pub use session::{CaptureSession, CaptureState, StopOutcome, NO_DOCUMENTS_NOTICE};
pub use sink::{MemorySink, ReportSink, TracingSink};
