//! Read models fed from the payment event log.
//!
//! This crate provides the downstream consumer side:
//! - [`Projection`] trait for processing recorded events into read models
//! - [`ReadModel`] trait for query access to denormalized data
//! - [`ProjectionProcessor`] for replaying the log and following live
//!   notifications
//! - [`PaymentStatusView`], the current status of every payment

pub mod error;
pub mod processor;
pub mod projection;
pub mod read_model;
pub mod views;

pub use error::{ProjectionError, Result};
pub use processor::ProjectionProcessor;
pub use projection::{Projection, ProjectionPosition};
pub use read_model::ReadModel;
pub use views::{PaymentStatusView, PaymentSummary};
