use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ctxcap_types::{Document, SourceId, TypeError, Value};

use crate::error::BridgeResult;

/// Classification of host events the bridge listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostEventKind {
    /// A generic track request carrying context data.
    GenericTrack,
    /// A rules-engine response carrying a triggered consequence.
    RulesEngine,
    /// Begin a capture session.
    StartCapture,
    /// End the capture session and report.
    StopCapture,
}

impl std::fmt::Display for HostEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::GenericTrack => "GenericTrack",
            Self::RulesEngine => "RulesEngine",
            Self::StartCapture => "StartCapture",
            Self::StopCapture => "StopCapture",
        };
        write!(f, "{s}")
    }
}

/// An event delivered by the host.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HostEvent {
    pub id: SourceId,
    pub kind: HostEventKind,
    pub timestamp: DateTime<Utc>,
    pub data: Option<Document>,
}

#[derive(Deserialize)]
struct RawHostEvent {
    #[serde(default)]
    id: Option<SourceId>,
    kind: HostEventKind,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    data: Option<Value>,
}

impl HostEvent {
    /// A new event stamped with a fresh id and the current time.
    pub fn new(kind: HostEventKind, data: Option<Document>) -> Self {
        Self {
            id: SourceId::new(),
            kind,
            timestamp: Utc::now(),
            data,
        }
    }

    pub fn track(data: Document) -> Self {
        Self::new(HostEventKind::GenericTrack, Some(data))
    }

    pub fn rules_response(data: Document) -> Self {
        Self::new(HostEventKind::RulesEngine, Some(data))
    }

    pub fn start_capture() -> Self {
        Self::new(HostEventKind::StartCapture, None)
    }

    pub fn stop_capture(data: Option<Document>) -> Self {
        Self::new(HostEventKind::StopCapture, data)
    }

    /// Override the event timestamp.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Decode one event from JSON, keeping the key order of `data`.
    ///
    /// `kind` is required. A missing `id` or `timestamp` is generated; a
    /// missing or `null` `data` means the event carried no payload.
    pub fn from_json_str(text: &str) -> BridgeResult<Self> {
        let raw: RawHostEvent = serde_json::from_str(text)?;
        let data = match raw.data {
            None => None,
            Some(Value::Document(doc)) => Some(doc),
            Some(other) => {
                let kind = other.kind().map_or_else(|| "null".to_string(), |k| k.to_string());
                return Err(TypeError::NotADocument(kind).into());
            }
        };
        Ok(Self {
            id: raw.id.unwrap_or_default(),
            kind: raw.kind,
            timestamp: raw.timestamp.unwrap_or_else(Utc::now),
            data,
        })
    }
}
