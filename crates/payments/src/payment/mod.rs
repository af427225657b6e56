//! Payment aggregate and related types.

mod aggregate;
mod builder;
mod events;
mod processor;
mod repository;
mod service;
mod state;
mod value_objects;

pub use aggregate::Payment;
pub use builder::PaymentBuilder;
pub use events::{PaymentAddedData, PaymentEvent, PaymentSnapshot};
pub use processor::{InMemoryPaymentProcessor, PaymentProcessor, ProcessorError};
pub use repository::PaymentRepository;
pub use service::PaymentService;
pub use state::PaymentState;
pub use value_objects::{Amount, OrderRef, PaymentRef};

use event_log::EventLogError;
use thiserror::Error;

/// A collaborator every payment must be built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collaborator {
    Amount,
    Processor,
    Id,
    OrderRef,
    EventLog,
}

impl Collaborator {
    /// Every collaborator, in the order the builder checks them.
    pub const ALL: [Collaborator; 5] = [
        Collaborator::Amount,
        Collaborator::Processor,
        Collaborator::Id,
        Collaborator::OrderRef,
        Collaborator::EventLog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collaborator::Amount => "amount",
            Collaborator::Processor => "payment processor",
            Collaborator::Id => "payment ref",
            Collaborator::OrderRef => "order ref",
            Collaborator::EventLog => "event log",
        }
    }
}

impl std::fmt::Display for Collaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during payment operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The builder was asked to build before every collaborator was set.
    #[error("Cannot build payment without {collaborator}")]
    MissingCollaborator { collaborator: Collaborator },

    /// The payment is not in the state the operation starts from.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidStateTransition {
        current_state: PaymentState,
        action: &'static str,
    },

    /// The processor refused or failed the request.
    #[error("Payment processor error: {0}")]
    Processor(#[from] ProcessorError),

    /// The event could not be published.
    #[error("Event log error: {0}")]
    EventLog(#[from] EventLogError),
}
