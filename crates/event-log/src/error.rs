use thiserror::Error;

/// A required envelope field that was never set on the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("event envelope is missing required field `{0}`")]
pub struct EnvelopeError(pub &'static str);

/// Errors that can occur when publishing to or reading from the event log.
#[derive(Debug, Error)]
pub enum EventLogError {
    /// The backing storage could not be reached or is in an unusable state.
    #[error("Event log unavailable: {0}")]
    Unavailable(String),

    /// An envelope could not be assembled.
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(#[from] EnvelopeError),

    /// A payload could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event log operations.
pub type Result<T> = std::result::Result<T, EventLogError>;
