/// Errors that can stop the relay.
///
/// Malformed frames and undeliverable events are not errors; they only show
/// up in the diagnostic counters.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] mavbridge_transport::TransportError),

    /// Event serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The ingest socket failed and could not be bound again.
    #[error("ingest socket rebind failed after {attempts} attempts: {source}")]
    RebindExhausted {
        attempts: u32,
        source: mavbridge_transport::TransportError,
    },
}

pub type Result<T> = std::result::Result<T, RelayError>;
