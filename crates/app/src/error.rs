//! Application error types.

use payments::DomainError;
use projections::ProjectionError;
use thiserror::Error;

/// Errors that can end a demo run.
#[derive(Debug, Error)]
pub enum AppError {
    /// A payment operation failed.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// The projection follower failed.
    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// The projection follower task panicked or was cancelled.
    #[error("Projection task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Payment {0} missing from the status view")]
    MissingFromView(String),
}
