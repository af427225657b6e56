//! Core aggregate and domain event traits.

use common::AggregateId;
use event_log::{EventEnvelope, EventKind, EventLogError};
use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name recorded on the envelope.
    fn event_type(&self) -> &'static str;

    /// Whether the event carries a full snapshot ([`EventKind::Added`]) or
    /// only marks a transition.
    fn kind(&self) -> EventKind {
        EventKind::Lifecycle
    }
}

/// An aggregate whose state changes are published to an event log.
///
/// Aggregates hold an append-only publisher and emit events as a side effect
/// of their own operations. A repository rebuilds them from the most recent
/// [`EventKind::Added`] event carrying their [`Aggregate::Snapshot`].
pub trait Aggregate: Send + Sync + Sized {
    /// The type of events this aggregate publishes.
    type Event: DomainEvent;

    /// Everything needed to restore the aggregate, apart from its injected
    /// collaborators and its identity.
    type Snapshot: Serialize + DeserializeOwned + Clone;

    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str;

    /// Key under which the aggregate's events are recorded.
    fn aggregate_id(&self) -> AggregateId;

    fn snapshot(&self) -> Self::Snapshot;

    /// Wraps one of this aggregate's events in an envelope ready to publish.
    fn envelope_for(&self, event: &Self::Event) -> Result<EventEnvelope, EventLogError> {
        let envelope = EventEnvelope::builder()
            .aggregate_id(self.aggregate_id())
            .aggregate_type(Self::aggregate_type())
            .event_type(event.event_type())
            .kind(event.kind())
            .payload(event)?
            .build()?;
        Ok(envelope)
    }
}
