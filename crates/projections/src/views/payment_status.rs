//! Payment status read model: the latest known state of every payment.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use event_log::{RecordedEvent, Sequence};
use payments::{Aggregate, Amount, OrderRef, Payment, PaymentEvent, PaymentRef, PaymentState};
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, ProjectionPosition};
use crate::read_model::ReadModel;

/// Summary of a payment in the status view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSummary {
    pub payment_ref: PaymentRef,
    pub order_ref: OrderRef,
    pub amount: Amount,
    pub state: PaymentState,
    pub requested_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub last_sequence: Sequence,
}

/// Read model view holding the current status of each payment.
///
/// `PaymentAdded` snapshots are authoritative. A `PaymentRequested` marker
/// moves a known payment to `Requested` ahead of the next snapshot; markers
/// for payments never added are ignored.
#[derive(Clone)]
pub struct PaymentStatusView {
    payments: Arc<RwLock<HashMap<PaymentRef, PaymentSummary>>>,
    position: Arc<RwLock<ProjectionPosition>>,
}

impl PaymentStatusView {
    /// Creates a new empty payment status view.
    pub fn new() -> Self {
        Self {
            payments: Arc::new(RwLock::new(HashMap::new())),
            position: Arc::new(RwLock::new(ProjectionPosition::initial())),
        }
    }

    /// Gets the summary of a specific payment.
    pub async fn get_payment(&self, payment_ref: PaymentRef) -> Option<PaymentSummary> {
        self.payments.read().await.get(&payment_ref).cloned()
    }

    /// Gets all payments currently in the given state.
    pub async fn get_by_state(&self, state: PaymentState) -> Vec<PaymentSummary> {
        let mut found: Vec<_> = self
            .payments
            .read()
            .await
            .values()
            .filter(|p| p.state == state)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.last_sequence);
        found
    }

    /// Gets every payment created for an order, oldest first.
    pub async fn get_by_order(&self, order_ref: OrderRef) -> Vec<PaymentSummary> {
        let mut found: Vec<_> = self
            .payments
            .read()
            .await
            .values()
            .filter(|p| p.order_ref == order_ref)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.last_sequence);
        found
    }

    /// Sum of the amounts of payments in the given state.
    pub async fn total_in_state(&self, state: PaymentState) -> Amount {
        self.payments
            .read()
            .await
            .values()
            .filter(|p| p.state == state)
            .fold(Amount::zero(), |acc, p| acc + p.amount)
    }
}

impl Default for PaymentStatusView {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Projection for PaymentStatusView {
    fn name(&self) -> &'static str {
        "PaymentStatusView"
    }

    async fn handle(&self, event: &RecordedEvent) -> Result<()> {
        if event.envelope.aggregate_type == Payment::aggregate_type() {
            let payment_event: PaymentEvent = event.envelope.decode()?;
            let payment_ref = PaymentRef::from_uuid(event.aggregate_id().as_uuid());
            let timestamp = event.envelope.timestamp;

            let mut payments = self.payments.write().await;

            match payment_event {
                PaymentEvent::PaymentAdded(data) => {
                    let requested_at = payments.get(&data.payment_ref).and_then(|p| p.requested_at);
                    payments.insert(
                        data.payment_ref,
                        PaymentSummary {
                            payment_ref: data.payment_ref,
                            order_ref: data.snapshot.order_ref,
                            amount: data.snapshot.amount,
                            state: data.snapshot.state,
                            requested_at,
                            updated_at: timestamp,
                            last_sequence: event.sequence,
                        },
                    );
                }
                PaymentEvent::PaymentRequested => {
                    if let Some(payment) = payments.get_mut(&payment_ref) {
                        if payment.state == PaymentState::New {
                            payment.state = PaymentState::Requested;
                        }
                        payment.requested_at = Some(timestamp);
                        payment.updated_at = timestamp;
                        payment.last_sequence = event.sequence;
                    } else {
                        tracing::debug!(%payment_ref, "request marker for unknown payment");
                    }
                }
            }
        }

        let mut pos = self.position.write().await;
        *pos = pos.advance_to(event.sequence);

        Ok(())
    }

    async fn position(&self) -> ProjectionPosition {
        *self.position.read().await
    }

    async fn reset(&self) -> Result<()> {
        self.payments.write().await.clear();
        *self.position.write().await = ProjectionPosition::initial();
        Ok(())
    }
}

impl ReadModel for PaymentStatusView {
    fn name(&self) -> &'static str {
        "PaymentStatusView"
    }

    fn count(&self) -> usize {
        // Use try_read to avoid blocking; returns 0 if lock is held
        self.payments.try_read().map(|p| p.len()).unwrap_or(0)
    }
}
