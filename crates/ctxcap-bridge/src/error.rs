use ctxcap_types::TypeError;

/// Errors produced while decoding host events.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The event text is not valid JSON or does not describe a host event.
    #[error("malformed host event: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    /// The event data is present but is not a document.
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Convenience alias used throughout the bridge crate.
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;
