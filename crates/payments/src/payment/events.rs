//! Payment domain events.

use event_log::EventKind;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{Amount, OrderRef, PaymentRef, PaymentState};

/// Events published about a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PaymentEvent {
    /// The payment was stored by the repository with its full state.
    PaymentAdded(PaymentAddedData),

    /// The payment was handed to the processor.
    PaymentRequested,
}

impl DomainEvent for PaymentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PaymentEvent::PaymentAdded(_) => "PaymentAdded",
            PaymentEvent::PaymentRequested => "PaymentRequested",
        }
    }

    fn kind(&self) -> EventKind {
        match self {
            PaymentEvent::PaymentAdded(_) => EventKind::Added,
            PaymentEvent::PaymentRequested => EventKind::Lifecycle,
        }
    }
}

/// Payment state as recorded in a `PaymentAdded` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSnapshot {
    pub amount: Amount,
    pub order_ref: OrderRef,
    pub state: PaymentState,
}

/// Data for PaymentAdded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAddedData {
    pub payment_ref: PaymentRef,
    pub snapshot: PaymentSnapshot,
}

impl PaymentEvent {
    pub fn payment_added(payment_ref: PaymentRef, snapshot: PaymentSnapshot) -> Self {
        PaymentEvent::PaymentAdded(PaymentAddedData {
            payment_ref,
            snapshot,
        })
    }
}
