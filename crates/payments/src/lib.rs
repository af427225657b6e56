//! Payment domain.
//!
//! This crate provides:
//! - Aggregate and DomainEvent traits for aggregates that publish events
//! - The Payment aggregate with its guarded New → Requested → Successful
//!   lifecycle and validating builder
//! - The PaymentProcessor capability and an in-memory implementation
//! - PaymentRepository and PaymentService, which store payments as
//!   snapshot events and rebuild them from the log

pub mod aggregate;
pub mod error;
pub mod payment;

pub use aggregate::{Aggregate, DomainEvent};
pub use error::DomainError;
pub use payment::{
    Amount, Collaborator, InMemoryPaymentProcessor, OrderRef, Payment, PaymentAddedData,
    PaymentBuilder, PaymentError, PaymentEvent, PaymentProcessor, PaymentRef, PaymentRepository,
    PaymentService, PaymentSnapshot, PaymentState, ProcessorError,
};
