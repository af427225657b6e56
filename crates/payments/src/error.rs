//! Errors surfaced by the repository and application service.

use event_log::EventLogError;
use thiserror::Error;

use crate::payment::PaymentError;

/// Errors that can occur while loading, mutating or storing aggregates.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the event log.
    #[error("Event log error: {0}")]
    EventLog(#[from] EventLogError),

    /// The payment rejected the operation.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    #[error("Aggregate not found: {aggregate_type} with id {aggregate_id}")]
    AggregateNotFound {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    /// An event that should have carried a snapshot did not.
    #[error("Unexpected event {event_type} while reconstructing {aggregate_type}")]
    UnexpectedEvent {
        aggregate_type: &'static str,
        event_type: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
