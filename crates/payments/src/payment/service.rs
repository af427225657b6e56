//! Payment service providing a simplified API for payment operations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use event_log::EventLog;

use crate::aggregate::Aggregate;
use crate::error::DomainError;

use super::{
    Amount, OrderRef, Payment, PaymentError, PaymentProcessor, PaymentRef, PaymentRepository,
};

/// Service for managing payments.
///
/// Every operation loads the payment, mutates it and stores its new state
/// while holding a lock dedicated to that payment, so concurrent callers
/// touching the same payment are serialized and no transition is lost.
pub struct PaymentService<L: EventLog> {
    repository: PaymentRepository<L>,
    locks: Mutex<HashMap<PaymentRef, Arc<Mutex<()>>>>,
}

impl<L> PaymentService<L>
where
    L: EventLog + 'static,
{
    /// Creates a new payment service over the given log and processor.
    pub fn new(log: L, processor: Arc<dyn PaymentProcessor>) -> Self {
        Self {
            repository: PaymentRepository::new(log, processor),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &PaymentRepository<L> {
        &self.repository
    }

    /// Creates and stores a new payment for an order.
    #[tracing::instrument(skip(self))]
    pub fn create_payment(
        &self,
        amount: Amount,
        order_ref: OrderRef,
    ) -> Result<Payment, DomainError> {
        let payment = self
            .repository
            .builder()
            .id(self.repository.next_identity())
            .amount(amount)
            .order_ref(order_ref)
            .build()?;

        self.repository.add(&payment)?;

        metrics::counter!("payments_created_total").increment(1);
        tracing::info!(payment_id = %payment.id(), "payment created");
        Ok(payment)
    }

    /// Hands a payment to the processor.
    #[tracing::instrument(skip(self))]
    pub fn request_payment(&self, id: PaymentRef) -> Result<Payment, DomainError> {
        self.transition(id, Payment::request)
    }

    /// Records that the processor confirmed a payment.
    #[tracing::instrument(skip(self))]
    pub fn mark_payment_successful(&self, id: PaymentRef) -> Result<Payment, DomainError> {
        self.transition(id, Payment::mark_successful)
    }

    /// Loads a payment by reference.
    ///
    /// Returns None if the payment doesn't exist.
    #[tracing::instrument(skip(self))]
    pub fn get_payment(&self, id: PaymentRef) -> Result<Option<Payment>, DomainError> {
        self.repository.find_by_ref(id)
    }

    /// Loads the latest payment created for an order.
    #[tracing::instrument(skip(self))]
    pub fn find_by_order(&self, order_ref: OrderRef) -> Result<Option<Payment>, DomainError> {
        self.repository.find_by_order_ref(order_ref)
    }

    fn transition<F>(&self, id: PaymentRef, operation: F) -> Result<Payment, DomainError>
    where
        F: FnOnce(&mut Payment) -> Result<(), PaymentError>,
    {
        let lock = self.lock_for(id);
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.load_and_store(id, operation)
        };
        self.release(id, &lock);
        result
    }

    fn load_and_store<F>(&self, id: PaymentRef, operation: F) -> Result<Payment, DomainError>
    where
        F: FnOnce(&mut Payment) -> Result<(), PaymentError>,
    {
        let mut payment = self
            .repository
            .find_by_ref(id)?
            .ok_or_else(|| DomainError::AggregateNotFound {
                aggregate_type: Payment::aggregate_type(),
                aggregate_id: id.to_string(),
            })?;

        operation(&mut payment)?;
        self.repository.add(&payment)?;
        Ok(payment)
    }

    fn lock_for(&self, id: PaymentRef) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(id).or_default())
    }

    /// Drops the entry for `id` once no other caller holds or waits on it.
    fn release(&self, id: PaymentRef, lock: &Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one held by the caller.
        if Arc::strong_count(lock) == 2 {
            locks.remove(&id);
        }
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
