//! Host event bridge for ctxcap.
//!
//! Translates host events into outbound tracking requests. Generic track
//! requests and analytics rules-engine consequences are wrapped into a
//! request document, handed to a [`RequestDispatcher`], and captured into the
//! shared [`CaptureHandle`](ctxcap_session::CaptureHandle) while a capture
//! session is active. Start and stop events drive the session itself.

pub mod bridge;
pub mod dispatcher;
pub mod error;
pub mod event;

pub use bridge::{BridgeOutcome, EdgeBridge, IgnoreReason, EVENT_TYPE, REQUEST_NAME};
pub use dispatcher::{OutboundRequest, RecordingDispatcher, RequestDispatcher};
pub use error::{BridgeError, BridgeResult};
pub use event::{HostEvent, HostEventKind};
