use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, trace};

use ctxcap_session::{CaptureConfig, CaptureHandle, StopOptions, StopOutcome};
use ctxcap_types::{Document, SourceId, Value};

use crate::dispatcher::{OutboundRequest, RequestDispatcher};
use crate::event::{HostEvent, HostEventKind};

/// Name given to every outbound request.
pub const REQUEST_NAME: &str = "Edge Bridge Request";

/// `xdm.eventType` of every outbound request.
pub const EVENT_TYPE: &str = "analytics.track";

const ANALYTICS_CONSEQUENCE: &str = "an";
const CONSEQUENCE_KEY: &str = "triggeredconsequence";
const MERGE_KEY: &str = "merge";
const CASE_SENSITIVE_KEY: &str = "caseSensitiveMerge";

/// Why an event produced no outbound request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyTrackData,
    MissingData,
    MissingConsequence,
    NotAnalyticsConsequence,
    MissingConsequenceId,
    EmptyConsequenceDetail,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::EmptyTrackData => "event data is missing or empty",
            Self::MissingData => "event data is missing",
            Self::MissingConsequence => "consequence data is missing",
            Self::NotAnalyticsConsequence => "consequence is not an analytics consequence",
            Self::MissingConsequenceId => "consequence id is missing",
            Self::EmptyConsequenceDetail => "consequence detail is missing or empty",
        };
        write!(f, "{s}")
    }
}

/// What handling a single host event did.
#[derive(Clone, Debug, PartialEq)]
pub enum BridgeOutcome {
    /// A request was dispatched; `captured` tells whether the active session
    /// buffered it.
    Dispatched { request: SourceId, captured: bool },
    Ignored(IgnoreReason),
    /// `true` when a new session was started.
    CaptureStarted(bool),
    CaptureStopped(StopOutcome),
}

/// Routes host events to the dispatcher and the capture session.
pub struct EdgeBridge<D> {
    capture: CaptureHandle,
    dispatcher: D,
    defaults: StopOptions,
}

impl<D: RequestDispatcher> EdgeBridge<D> {
    /// Build a bridge over `capture`. Starts a session right away when the
    /// configuration asks for it.
    pub fn new(config: &CaptureConfig, capture: CaptureHandle, dispatcher: D) -> Self {
        if config.autostart && capture.start() {
            debug!("capture session started on bridge creation");
        }
        Self {
            capture,
            dispatcher,
            defaults: config.stop,
        }
    }

    pub fn capture(&self) -> &CaptureHandle {
        &self.capture
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Stop options applied when a stop event does not carry its own.
    pub fn defaults(&self) -> StopOptions {
        self.defaults
    }

    pub fn handle(&mut self, event: &HostEvent) -> BridgeOutcome {
        match event.kind {
            HostEventKind::GenericTrack => self.handle_track_request(event),
            HostEventKind::RulesEngine => self.handle_rules_response(event),
            HostEventKind::StartCapture => BridgeOutcome::CaptureStarted(self.capture.start()),
            HostEventKind::StopCapture => {
                let options = self.stop_options(event.data.as_ref());
                BridgeOutcome::CaptureStopped(self.capture.stop(options))
            }
        }
    }

    fn handle_track_request(&mut self, event: &HostEvent) -> BridgeOutcome {
        match event.data.as_ref() {
            Some(data) if !data.is_empty() => self.dispatch_track_request(data, event.timestamp),
            _ => {
                let reason = IgnoreReason::EmptyTrackData;
                debug!(event = %event.id, %reason, "unable to handle track request");
                BridgeOutcome::Ignored(reason)
            }
        }
    }

    fn handle_rules_response(&mut self, event: &HostEvent) -> BridgeOutcome {
        match analytics_detail(event.data.as_ref()) {
            Ok(detail) => self.dispatch_track_request(detail, event.timestamp),
            Err(reason) => {
                trace!(event = %event.id, %reason, "ignoring rules engine response");
                BridgeOutcome::Ignored(reason)
            }
        }
    }

    fn dispatch_track_request(&mut self, payload: &Document, timestamp: DateTime<Utc>) -> BridgeOutcome {
        let request = OutboundRequest {
            id: SourceId::new(),
            name: REQUEST_NAME.to_string(),
            data: track_request_data(payload, timestamp),
        };
        self.dispatcher.dispatch(&request);
        let captured = self
            .capture
            .add_document(Some(request.data), request.id);
        debug!(request = %request.id, captured, "track request dispatched");
        BridgeOutcome::Dispatched {
            request: request.id,
            captured,
        }
    }

    fn stop_options(&self, data: Option<&Document>) -> StopOptions {
        let flag = |key: &str| data.and_then(|d| d.get(key)).and_then(Value::as_bool);
        StopOptions {
            merge: flag(MERGE_KEY).unwrap_or(self.defaults.merge),
            case_sensitive: flag(CASE_SENSITIVE_KEY).unwrap_or(self.defaults.case_sensitive),
        }
    }
}

/// The consequence detail of an analytics rules-engine response.
fn analytics_detail(data: Option<&Document>) -> Result<&Document, IgnoreReason> {
    let data = data.ok_or(IgnoreReason::MissingData)?;
    let consequence = data
        .get(CONSEQUENCE_KEY)
        .and_then(Value::as_document)
        .ok_or(IgnoreReason::MissingConsequence)?;
    if consequence.get("type").and_then(Value::as_str) != Some(ANALYTICS_CONSEQUENCE) {
        return Err(IgnoreReason::NotAnalyticsConsequence);
    }
    if consequence.get("id").and_then(Value::as_str).is_none() {
        return Err(IgnoreReason::MissingConsequenceId);
    }
    consequence
        .get("detail")
        .and_then(Value::as_document)
        .filter(|detail| !detail.is_empty())
        .ok_or(IgnoreReason::EmptyConsequenceDetail)
}

/// `{"data": payload, "xdm": {"timestamp": ..., "eventType": "analytics.track"}}`
fn track_request_data(payload: &Document, timestamp: DateTime<Utc>) -> Document {
    let mut xdm = Document::with_capacity(2);
    xdm.insert(
        "timestamp",
        Value::from(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    xdm.insert("eventType", Value::from(EVENT_TYPE));

    let mut data = Document::with_capacity(2);
    data.insert("data", Value::Document(payload.clone()));
    data.insert("xdm", Value::Document(xdm));
    data
}
