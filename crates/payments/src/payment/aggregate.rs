//! Payment aggregate implementation.

use std::sync::Arc;

use common::AggregateId;
use event_log::EventPublisher;

use crate::aggregate::Aggregate;

use super::{
    Amount, OrderRef, PaymentBuilder, PaymentError, PaymentEvent, PaymentProcessor, PaymentRef,
    PaymentSnapshot, PaymentState,
};

/// Payment aggregate root.
///
/// A payment can only be obtained from a [`PaymentBuilder`], so it always
/// has every collaborator it needs. Its state is mutated exclusively by
/// [`Payment::request`] and [`Payment::mark_successful`].
///
/// Operations take `&mut self`: one writer at a time. Callers sharing a
/// payment across threads hold the lock themselves (see
/// [`crate::PaymentService`]); the aggregate does no locking of its own.
pub struct Payment {
    id: PaymentRef,
    amount: Amount,
    order_ref: OrderRef,
    processor: Arc<dyn PaymentProcessor>,
    event_log: Arc<dyn EventPublisher>,
    state: PaymentState,
}

impl Payment {
    /// Starts building a payment.
    pub fn builder() -> PaymentBuilder {
        PaymentBuilder::new()
    }

    pub(super) fn assemble(
        id: PaymentRef,
        amount: Amount,
        order_ref: OrderRef,
        processor: Arc<dyn PaymentProcessor>,
        event_log: Arc<dyn EventPublisher>,
        state: PaymentState,
    ) -> Self {
        Self {
            id,
            amount,
            order_ref,
            processor,
            event_log,
            state,
        }
    }
}

impl Aggregate for Payment {
    type Event = PaymentEvent;
    type Snapshot = PaymentSnapshot;

    fn aggregate_type() -> &'static str {
        "Payment"
    }

    fn aggregate_id(&self) -> AggregateId {
        self.id.into()
    }

    fn snapshot(&self) -> PaymentSnapshot {
        PaymentSnapshot {
            amount: self.amount,
            order_ref: self.order_ref,
            state: self.state,
        }
    }
}

// Query methods
impl Payment {
    pub fn id(&self) -> PaymentRef {
        self.id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn order_ref(&self) -> OrderRef {
        self.order_ref
    }

    pub fn state(&self) -> PaymentState {
        self.state
    }

    pub fn is_new(&self) -> bool {
        self.state == PaymentState::New
    }

    pub fn is_requested(&self) -> bool {
        self.state == PaymentState::Requested
    }

    pub fn is_successful(&self) -> bool {
        self.state == PaymentState::Successful
    }
}

// Lifecycle operations
impl Payment {
    /// Sends the payment to the processor and publishes `PaymentRequested`.
    ///
    /// Only valid from `New`. The processor is called exactly once, before
    /// the event is published. If the processor or the log fails, the error
    /// is returned and the payment stays `New`.
    #[tracing::instrument(skip(self), fields(payment_id = %self.id, amount = %self.amount))]
    pub fn request(&mut self) -> Result<(), PaymentError> {
        if !self.state.can_request() {
            return Err(self.reject("request"));
        }

        let envelope = self.envelope_for(&PaymentEvent::PaymentRequested)?;

        if let Err(e) = self.processor.request(self) {
            tracing::warn!(error = %e, "payment processor rejected request");
            return Err(e.into());
        }

        let sequence = self.event_log.publish(envelope)?;
        self.state = PaymentState::Requested;

        metrics::counter!("payments_requested_total").increment(1);
        tracing::debug!(%sequence, "payment requested");
        Ok(())
    }

    /// Records that the processor confirmed the payment.
    ///
    /// Only valid from `Requested`. Publishes nothing.
    #[tracing::instrument(skip(self), fields(payment_id = %self.id))]
    pub fn mark_successful(&mut self) -> Result<(), PaymentError> {
        if !self.state.can_mark_successful() {
            return Err(self.reject("mark successful"));
        }

        self.state = PaymentState::Successful;

        metrics::counter!("payments_succeeded_total").increment(1);
        tracing::debug!("payment marked successful");
        Ok(())
    }

    fn reject(&self, action: &'static str) -> PaymentError {
        metrics::counter!("payment_transitions_rejected_total").increment(1);
        tracing::warn!(current_state = %self.state, action, "invalid payment transition");
        PaymentError::InvalidStateTransition {
            current_state: self.state,
            action,
        }
    }
}

impl std::fmt::Debug for Payment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Payment")
            .field("id", &self.id)
            .field("amount", &self.amount)
            .field("order_ref", &self.order_ref)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
