use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;

use crate::{AggregateId, EventEnvelope, EventKind, EventQuery, RecordedEvent, Result, Sequence};

/// A stream of recorded events, in sequence order.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<RecordedEvent>> + Send>>;

/// Permission to append to an event log.
///
/// This is the only capability an aggregate receives. It cannot read,
/// rewrite or remove anything.
pub trait EventPublisher: Send + Sync {
    /// Appends an event and returns the sequence it was recorded at.
    ///
    /// Once this returns `Ok`, the event is visible to every reader, after
    /// all events published before it.
    fn publish(&self, event: EventEnvelope) -> Result<Sequence>;
}

impl<T: EventPublisher + ?Sized> EventPublisher for Arc<T> {
    fn publish(&self, event: EventEnvelope) -> Result<Sequence> {
        (**self).publish(event)
    }
}

/// Read access on top of publication, for repositories and consumers.
///
/// Implementations must be safe to publish to from several threads at once
/// and must never reorder events published from a single thread.
pub trait EventLog: EventPublisher {
    /// All events of one aggregate, oldest first.
    fn events_for_aggregate(&self, aggregate_id: AggregateId) -> Result<Vec<RecordedEvent>>;

    /// All events at or after `from`, oldest first.
    fn events_from(&self, from: Sequence) -> Result<Vec<RecordedEvent>>;

    fn query_events(&self, query: &EventQuery) -> Result<Vec<RecordedEvent>>;

    /// Sequence of the most recently published event, `None` when empty.
    fn last_sequence(&self) -> Result<Option<Sequence>>;
}

/// Convenience reads derived from [`EventLog`].
pub trait EventLogExt: EventLog {
    /// The most recent `Added` event recorded for an aggregate.
    fn latest_added_for(&self, aggregate_id: AggregateId) -> Result<Option<RecordedEvent>> {
        let query = EventQuery::for_aggregate(aggregate_id).kind(EventKind::Added);
        Ok(self.query_events(&query)?.pop())
    }

    /// The most recent `Added` event of every aggregate of a type, ordered by
    /// sequence.
    fn latest_added_per_aggregate(&self, aggregate_type: &str) -> Result<Vec<RecordedEvent>> {
        let mut latest: HashMap<AggregateId, RecordedEvent> = HashMap::new();
        for event in self.query_events(&EventQuery::added_of_type(aggregate_type))? {
            latest.insert(event.aggregate_id(), event);
        }

        let mut events: Vec<_> = latest.into_values().collect();
        events.sort_by_key(|e| e.sequence);
        Ok(events)
    }

    /// Streams every event at or after `from`.
    fn stream_from(&self, from: Sequence) -> Result<EventStream> {
        use futures_util::stream;

        let events = self.events_from(from)?;
        Ok(Box::pin(stream::iter(events.into_iter().map(Ok))))
    }
}

impl<T: EventLog + ?Sized> EventLogExt for T {}
