//! Validating builder for payments.

use std::sync::Arc;

use event_log::EventPublisher;

use super::{
    Amount, Collaborator, OrderRef, Payment, PaymentError, PaymentProcessor, PaymentRef,
    PaymentState,
};

/// Collects a payment's collaborators in any order and refuses to build
/// until all of them are present.
///
/// ```ignore
/// let payment = Payment::builder()
///     .order_ref(order_ref)
///     .amount(Amount::from_dollars(10))
///     .event_log(log)
///     .id(PaymentRef::new())
///     .processor(processor)
///     .build()?;
/// ```
#[derive(Default)]
pub struct PaymentBuilder {
    amount: Option<Amount>,
    processor: Option<Arc<dyn PaymentProcessor>>,
    id: Option<PaymentRef>,
    order_ref: Option<OrderRef>,
    event_log: Option<Arc<dyn EventPublisher>>,
}

impl PaymentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn processor(mut self, processor: Arc<dyn PaymentProcessor>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn id(mut self, id: PaymentRef) -> Self {
        self.id = Some(id);
        self
    }

    pub fn order_ref(mut self, order_ref: OrderRef) -> Self {
        self.order_ref = Some(order_ref);
        self
    }

    /// Sets the log the payment publishes to. The payment only ever appends.
    pub fn event_log(mut self, event_log: Arc<dyn EventPublisher>) -> Self {
        self.event_log = Some(event_log);
        self
    }

    /// Builds a `New` payment.
    ///
    /// Collaborators are checked in the order amount, processor, id,
    /// order ref, event log; the first missing one is reported.
    pub fn build(self) -> Result<Payment, PaymentError> {
        self.rehydrate(PaymentState::New)
    }

    /// Builds a payment at a previously recorded state.
    pub(crate) fn rehydrate(self, state: PaymentState) -> Result<Payment, PaymentError> {
        let amount = self.amount.ok_or_else(|| missing(Collaborator::Amount))?;
        let processor = self.processor.ok_or_else(|| missing(Collaborator::Processor))?;
        let id = self.id.ok_or_else(|| missing(Collaborator::Id))?;
        let order_ref = self.order_ref.ok_or_else(|| missing(Collaborator::OrderRef))?;
        let event_log = self.event_log.ok_or_else(|| missing(Collaborator::EventLog))?;

        Ok(Payment::assemble(
            id, amount, order_ref, processor, event_log, state,
        ))
    }
}

fn missing(collaborator: Collaborator) -> PaymentError {
    PaymentError::MissingCollaborator { collaborator }
}

impl std::fmt::Debug for PaymentBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentBuilder")
            .field("amount", &self.amount)
            .field("processor", &self.processor.is_some())
            .field("id", &self.id)
            .field("order_ref", &self.order_ref)
            .field("event_log", &self.event_log.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::InMemoryPaymentProcessor;
    use event_log::InMemoryEventLog;

    fn processor() -> Arc<dyn PaymentProcessor> {
        Arc::new(InMemoryPaymentProcessor::new())
    }

    fn log() -> Arc<dyn EventPublisher> {
        Arc::new(InMemoryEventLog::new())
    }

    /// Applies every setter except the one for `skip`.
    fn all_but(skip: Option<Collaborator>) -> PaymentBuilder {
        let mut builder = PaymentBuilder::new();
        if skip != Some(Collaborator::Amount) {
            builder = builder.amount(Amount::from_cents(1000));
        }
        if skip != Some(Collaborator::Processor) {
            builder = builder.processor(processor());
        }
        if skip != Some(Collaborator::Id) {
            builder = builder.id(PaymentRef::new());
        }
        if skip != Some(Collaborator::OrderRef) {
            builder = builder.order_ref(OrderRef::new());
        }
        if skip != Some(Collaborator::EventLog) {
            builder = builder.event_log(log());
        }
        builder
    }

    /// Every ordering of `items`.
    fn permutations(items: &[Collaborator]) -> Vec<Vec<Collaborator>> {
        if items.is_empty() {
            return vec![Vec::new()];
        }
        let mut all = Vec::new();
        for (i, &first) in items.iter().enumerate() {
            let mut rest = items.to_vec();
            rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, first);
                all.push(tail);
            }
        }
        all
    }

    fn apply(
        builder: PaymentBuilder,
        collaborator: Collaborator,
        id: PaymentRef,
        order_ref: OrderRef,
    ) -> PaymentBuilder {
        match collaborator {
            Collaborator::Amount => builder.amount(Amount::from_cents(1234)),
            Collaborator::Processor => builder.processor(processor()),
            Collaborator::Id => builder.id(id),
            Collaborator::OrderRef => builder.order_ref(order_ref),
            Collaborator::EventLog => builder.event_log(log()),
        }
    }

    fn missing_collaborator(result: Result<Payment, PaymentError>) -> Collaborator {
        match result {
            Err(PaymentError::MissingCollaborator { collaborator }) => collaborator,
            other => panic!("expected MissingCollaborator, got {other:?}"),
        }
    }

    #[test]
    fn builds_new_payment_when_complete() {
        let payment = all_but(None).build().unwrap();
        assert!(payment.is_new());
        assert_eq!(payment.amount().cents(), 1000);
    }

    #[test]
    fn setter_order_does_not_matter() {
        let id = PaymentRef::new();
        let order_ref = OrderRef::new();

        let payment = PaymentBuilder::new()
            .event_log(log())
            .order_ref(order_ref)
            .id(id)
            .processor(processor())
            .amount(Amount::from_dollars(10))
            .build()
            .unwrap();

        assert_eq!(payment.id(), id);
        assert_eq!(payment.order_ref(), order_ref);
    }

    #[test]
    fn every_setter_order_builds_the_same_payment() {
        let orders = permutations(&Collaborator::ALL);
        assert_eq!(orders.len(), 120);

        for order in orders {
            let id = PaymentRef::new();
            let order_ref = OrderRef::new();
            let builder = order
                .iter()
                .fold(PaymentBuilder::new(), |b, &c| apply(b, c, id, order_ref));

            let payment = builder.build().unwrap();
            assert!(payment.is_new(), "order {order:?}");
            assert_eq!(payment.id(), id, "order {order:?}");
            assert_eq!(payment.order_ref(), order_ref, "order {order:?}");
            assert_eq!(payment.amount(), Amount::from_cents(1234), "order {order:?}");
        }
    }

    #[test]
    fn missing_collaborator_is_reported_in_every_setter_order() {
        for skip in Collaborator::ALL {
            let rest: Vec<_> = Collaborator::ALL
                .into_iter()
                .filter(|c| *c != skip)
                .collect();

            for order in permutations(&rest) {
                let builder = order.iter().fold(PaymentBuilder::new(), |b, &c| {
                    apply(b, c, PaymentRef::new(), OrderRef::new())
                });
                assert_eq!(missing_collaborator(builder.build()), skip, "order {order:?}");
            }
        }
    }

    #[test]
    fn each_missing_collaborator_is_reported() {
        for collaborator in Collaborator::ALL {
            let result = all_but(Some(collaborator)).build();
            assert_eq!(missing_collaborator(result), collaborator);
        }
    }

    #[test]
    fn first_missing_collaborator_wins() {
        let result = PaymentBuilder::new().build();
        assert_eq!(missing_collaborator(result), Collaborator::Amount);

        let result = PaymentBuilder::new()
            .amount(Amount::from_cents(1))
            .event_log(log())
            .build();
        assert_eq!(missing_collaborator(result), Collaborator::Processor);

        let result = PaymentBuilder::new()
            .amount(Amount::from_cents(1))
            .processor(processor())
            .id(PaymentRef::new())
            .build();
        assert_eq!(missing_collaborator(result), Collaborator::OrderRef);
    }

    #[test]
    fn last_value_set_wins() {
        let payment = all_but(None)
            .amount(Amount::from_cents(2500))
            .build()
            .unwrap();
        assert_eq!(payment.amount().cents(), 2500);
    }

    #[test]
    fn rehydrate_restores_recorded_state() {
        let payment = all_but(None).rehydrate(PaymentState::Requested).unwrap();
        assert!(payment.is_requested());

        let result = all_but(Some(Collaborator::EventLog)).rehydrate(PaymentState::Successful);
        assert_eq!(missing_collaborator(result), Collaborator::EventLog);
    }

    #[test]
    fn missing_collaborator_message_names_the_field() {
        let err = all_but(Some(Collaborator::OrderRef)).build().unwrap_err();
        assert_eq!(err.to_string(), "Cannot build payment without order ref");
    }
}
