//! Append-only event log.
//!
//! Aggregates receive an [`EventPublisher`] and may only append to it.
//! Repositories and downstream consumers use the wider [`EventLog`] view to
//! read events back, either by aggregate, by sequence range, or through an
//! [`EventQuery`].

pub mod error;
pub mod event;
pub mod log;
pub mod memory;
pub mod query;

pub use common::AggregateId;
pub use error::{EnvelopeError, EventLogError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId, EventKind, RecordedEvent, Sequence};
pub use log::{EventLog, EventLogExt, EventPublisher, EventStream};
pub use memory::InMemoryEventLog;
pub use query::EventQuery;
