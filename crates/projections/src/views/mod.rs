//! Read model views built from payment events.

pub mod payment_status;

pub use payment_status::{PaymentStatusView, PaymentSummary};
