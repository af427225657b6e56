//! Event-log backed payment repository.

use std::sync::Arc;

use event_log::{EventLog, EventLogExt, EventPublisher, EventQuery, RecordedEvent, Sequence};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

use super::{
    OrderRef, Payment, PaymentBuilder, PaymentEvent, PaymentProcessor, PaymentRef, PaymentState,
};

/// Stores payments by publishing `PaymentAdded` events and rebuilds them
/// from the most recent one.
///
/// A `PaymentRequested` marker recorded after the latest snapshot still
/// counts: the payment is rebuilt as `Requested` even if the snapshot that
/// should have followed the marker was never stored.
pub struct PaymentRepository<L: EventLog> {
    log: Arc<L>,
    processor: Arc<dyn PaymentProcessor>,
}

impl<L> PaymentRepository<L>
where
    L: EventLog + 'static,
{
    /// Creates a repository over `log`. Payments it rebuilds are wired to
    /// `processor` and to the same log.
    pub fn new(log: L, processor: Arc<dyn PaymentProcessor>) -> Self {
        Self {
            log: Arc::new(log),
            processor,
        }
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    /// Returns a fresh payment reference.
    pub fn next_identity(&self) -> PaymentRef {
        PaymentRef::new()
    }

    /// A builder already holding this repository's processor and log.
    pub fn builder(&self) -> PaymentBuilder {
        let log: Arc<dyn EventPublisher> = self.log.clone();
        Payment::builder()
            .processor(Arc::clone(&self.processor))
            .event_log(log)
    }

    /// Records the payment's current state.
    #[tracing::instrument(skip(self, payment), fields(payment_id = %payment.id(), state = %payment.state()))]
    pub fn add(&self, payment: &Payment) -> Result<Sequence, DomainError> {
        let event = PaymentEvent::payment_added(payment.id(), payment.snapshot());
        let envelope = payment.envelope_for(&event)?;
        let sequence = self.log.publish(envelope)?;

        tracing::debug!(%sequence, "payment added");
        Ok(sequence)
    }

    /// Rebuilds a payment from its latest recorded state.
    ///
    /// Returns None if the payment was never added.
    pub fn find_by_ref(&self, id: PaymentRef) -> Result<Option<Payment>, DomainError> {
        match self.log.latest_added_for(id.into())? {
            Some(recorded) => self.rehydrate(&recorded).map(Some),
            None => Ok(None),
        }
    }

    /// Finds the most recently added payment for an order.
    pub fn find_by_order_ref(&self, order_ref: OrderRef) -> Result<Option<Payment>, DomainError> {
        let latest = self
            .log
            .latest_added_per_aggregate(Payment::aggregate_type())?;

        for recorded in latest.iter().rev() {
            let payment = self.rehydrate(recorded)?;
            if payment.order_ref() == order_ref {
                return Ok(Some(payment));
            }
        }
        Ok(None)
    }

    fn rehydrate(&self, recorded: &RecordedEvent) -> Result<Payment, DomainError> {
        let PaymentEvent::PaymentAdded(data) = recorded.envelope.decode::<PaymentEvent>()? else {
            return Err(DomainError::UnexpectedEvent {
                aggregate_type: Payment::aggregate_type(),
                event_type: recorded.event_type().to_string(),
            });
        };

        let state = self.state_after(recorded, data.snapshot.state)?;

        let payment = self
            .builder()
            .id(data.payment_ref)
            .amount(data.snapshot.amount)
            .order_ref(data.snapshot.order_ref)
            .rehydrate(state)?;
        Ok(payment)
    }

    /// Applies request markers published after `snapshot`.
    fn state_after(
        &self,
        snapshot: &RecordedEvent,
        state: PaymentState,
    ) -> Result<PaymentState, DomainError> {
        if !state.can_request() {
            return Ok(state);
        }

        let query = EventQuery::for_aggregate(snapshot.aggregate_id())
            .from_sequence(snapshot.sequence.next())
            .event_type(PaymentEvent::PaymentRequested.event_type());

        if self.log.query_events(&query)?.is_empty() {
            Ok(state)
        } else {
            tracing::debug!(
                aggregate_id = %snapshot.aggregate_id(),
                "request marker newer than snapshot"
            );
            Ok(PaymentState::Requested)
        }
    }
}
