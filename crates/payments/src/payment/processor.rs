//! Payment processor capability and an in-memory implementation.

use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use super::{Amount, Payment, PaymentRef};

/// Errors a processor may report while accepting a payment request.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The processor refused the payment.
    #[error("Payment declined: {0}")]
    Declined(String),

    /// The processor could not be reached.
    #[error("Payment processor unavailable: {0}")]
    Unavailable(String),
}

/// Whatever actually moves the money.
///
/// Called synchronously from [`Payment::request`]; any I/O an
/// implementation performs is its own to bound.
pub trait PaymentProcessor: Send + Sync {
    fn request(&self, payment: &Payment) -> Result<(), ProcessorError>;
}

#[derive(Debug, Default)]
struct InMemoryProcessorState {
    requests: Vec<(PaymentRef, Amount)>,
    fail_on_request: bool,
}

/// In-memory processor for testing and local wiring.
///
/// Clones share the same recorded requests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentProcessor {
    state: Arc<RwLock<InMemoryProcessorState>>,
}

impl InMemoryPaymentProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the processor to decline every request until reset.
    pub fn set_fail_on_request(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_request = fail;
    }

    /// Returns the number of accepted requests.
    pub fn request_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .requests
            .len()
    }

    /// Returns true if a request was accepted for the payment.
    pub fn has_request(&self, payment_ref: PaymentRef) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .requests
            .iter()
            .any(|(id, _)| *id == payment_ref)
    }

    /// Total of every accepted request.
    pub fn total_requested(&self) -> Amount {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .requests
            .iter()
            .fold(Amount::zero(), |acc, (_, amount)| acc + *amount)
    }
}

impl PaymentProcessor for InMemoryPaymentProcessor {
    fn request(&self, payment: &Payment) -> Result<(), ProcessorError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| ProcessorError::Unavailable("processor state poisoned".to_string()))?;

        if state.fail_on_request {
            return Err(ProcessorError::Declined("Payment declined".to_string()));
        }

        state.requests.push((payment.id(), payment.amount()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::OrderRef;
    use event_log::InMemoryEventLog;

    fn payment_with(processor: &Arc<InMemoryPaymentProcessor>, cents: i64) -> Payment {
        Payment::builder()
            .amount(Amount::from_cents(cents))
            .processor(processor.clone())
            .id(PaymentRef::new())
            .order_ref(OrderRef::new())
            .event_log(Arc::new(InMemoryEventLog::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn records_accepted_requests() {
        let processor = Arc::new(InMemoryPaymentProcessor::new());
        let payment = payment_with(&processor, 1500);

        processor.request(&payment).unwrap();

        assert_eq!(processor.request_count(), 1);
        assert!(processor.has_request(payment.id()));
        assert_eq!(processor.total_requested().cents(), 1500);
    }

    #[test]
    fn declines_when_configured_to_fail() {
        let processor = Arc::new(InMemoryPaymentProcessor::new());
        processor.set_fail_on_request(true);
        let payment = payment_with(&processor, 1000);

        let result = processor.request(&payment);

        assert!(matches!(result, Err(ProcessorError::Declined(_))));
        assert_eq!(processor.request_count(), 0);
    }

    #[test]
    fn clones_share_recorded_requests() {
        let processor = Arc::new(InMemoryPaymentProcessor::new());
        let clone = (*processor).clone();
        let payment = payment_with(&processor, 700);

        clone.request(&payment).unwrap();

        assert!(processor.has_request(payment.id()));
    }
}
