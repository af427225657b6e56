//! End-to-end payment run against in-memory infrastructure.

use std::sync::Arc;

use event_log::{EventLog, InMemoryEventLog};
use payments::{
    Amount, DomainError, InMemoryPaymentProcessor, OrderRef, PaymentError, PaymentRef,
    PaymentService, PaymentState,
};
use projections::{PaymentStatusView, ProjectionProcessor};
use tokio::sync::oneshot;

use crate::config::Config;
use crate::error::AppError;

/// What a demo run produced.
#[derive(Debug, Clone)]
pub struct DemoReport {
    pub payment_ref: PaymentRef,
    pub order_ref: OrderRef,
    pub final_state: PaymentState,
    /// State of the payment as seen by the status view once it caught up.
    pub projected_state: PaymentState,
    pub events_published: u64,
    pub rejected_transitions: usize,
}

/// Creates a 10.00 payment for a fresh order, requests it, marks it
/// successful and checks that a live projection observed the outcome.
///
/// A repeated request and a repeated confirmation are attempted along the
/// way; both must be rejected without publishing anything.
#[tracing::instrument(skip_all, fields(event_buffer = config.event_buffer))]
pub async fn run(config: &Config) -> Result<DemoReport, AppError> {
    let log = InMemoryEventLog::with_buffer(config.event_buffer);
    let processor = Arc::new(InMemoryPaymentProcessor::new());
    let service = PaymentService::new(log.clone(), processor.clone());

    let view = PaymentStatusView::new();
    let mut projection_processor = ProjectionProcessor::new(log.clone());
    projection_processor.register(Box::new(view.clone()));
    let projection_processor = Arc::new(projection_processor);

    let receiver = log.subscribe();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let follower = {
        let projection_processor = Arc::clone(&projection_processor);
        tokio::spawn(async move {
            projection_processor
                .follow(receiver, async move {
                    let _ = stop_rx.await;
                })
                .await
        })
    };

    let order_ref = OrderRef::new();
    let payment = service.create_payment(Amount::from_dollars(10), order_ref)?;
    let payment_ref = payment.id();
    tracing::info!(%payment_ref, %order_ref, amount = %payment.amount(), "payment created");

    let mut rejected_transitions = 0;

    service.request_payment(payment_ref)?;
    rejected_transitions += expect_rejected(service.request_payment(payment_ref))?;

    let payment = service.mark_payment_successful(payment_ref)?;
    rejected_transitions += expect_rejected(service.mark_payment_successful(payment_ref))?;

    tracing::info!(
        %payment_ref,
        total_requested = %processor.total_requested(),
        "payment settled"
    );

    let _ = stop_tx.send(());
    follower.await??;
    projection_processor.run_catch_up().await?;

    let projected = view
        .get_payment(payment_ref)
        .await
        .ok_or_else(|| AppError::MissingFromView(payment_ref.to_string()))?;

    let events_published = log
        .last_sequence()
        .map_err(DomainError::from)?
        .map_or(0, |s| s.as_u64());

    Ok(DemoReport {
        payment_ref,
        order_ref,
        final_state: payment.state(),
        projected_state: projected.state,
        events_published,
        rejected_transitions,
    })
}

/// Counts an expected invalid transition; any other outcome is an error.
fn expect_rejected<T>(result: Result<T, DomainError>) -> Result<usize, AppError> {
    match result {
        Err(DomainError::Payment(PaymentError::InvalidStateTransition { .. })) => Ok(1),
        Err(other) => Err(other.into()),
        Ok(_) => {
            tracing::warn!("transition unexpectedly accepted");
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_settles_payment() {
        let report = run(&Config::default()).await.unwrap();

        assert_eq!(report.final_state, PaymentState::Successful);
        assert_eq!(report.projected_state, PaymentState::Successful);
        assert_eq!(report.rejected_transitions, 2);
        // added, requested marker, added after request, added after success
        assert_eq!(report.events_published, 4);
    }

    #[tokio::test]
    async fn test_demo_with_tiny_buffer() {
        let config = Config {
            event_buffer: 1,
            ..Config::default()
        };

        let report = run(&config).await.unwrap();

        assert_eq!(report.projected_state, PaymentState::Successful);
    }
}
