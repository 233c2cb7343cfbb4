use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use ctxcap_types::{Document, SourceId};

/// A tracking request built by the bridge, ready to leave the host.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutboundRequest {
    pub id: SourceId,
    pub name: String,
    pub data: Document,
}

/// Delivers outbound requests to the host's event hub.
pub trait RequestDispatcher: Send {
    fn dispatch(&mut self, request: &OutboundRequest);
}

/// Keeps every dispatched request in memory. Clones share the same storage.
#[derive(Clone, Debug, Default)]
pub struct RecordingDispatcher {
    requests: Arc<Mutex<Vec<OutboundRequest>>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests dispatched so far, oldest first.
    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RequestDispatcher for RecordingDispatcher {
    fn dispatch(&mut self, request: &OutboundRequest) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_dispatcher_shares_storage() {
        let recorder = RecordingDispatcher::new();
        let mut hub = recorder.clone();
        assert!(recorder.is_empty());

        let request = OutboundRequest {
            id: SourceId::new(),
            name: "test".into(),
            data: Document::new(),
        };
        hub.dispatch(&request);
        assert_eq!(recorder.len(), 1);
        assert_eq!(recorder.requests()[0], request);
    }
}
