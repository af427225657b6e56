use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;

use crate::{
    AggregateId, EventEnvelope, EventLogError, EventQuery, RecordedEvent, Result, Sequence,
    log::{EventLog, EventPublisher},
};

/// In-memory event log.
///
/// Events are kept in a single vector in publication order. Sequences are
/// assigned under the write lock, so concurrent publishers are serialized
/// and a publisher's own events can never be reordered.
///
/// Cloning is cheap and every clone shares the same log.
#[derive(Debug, Clone)]
pub struct InMemoryEventLog {
    events: Arc<RwLock<Vec<RecordedEvent>>>,
    notifier: broadcast::Sender<RecordedEvent>,
}

impl InMemoryEventLog {
    /// Buffer size of the live notification channel used by [`Self::new`].
    pub const DEFAULT_BUFFER: usize = 1024;

    pub fn new() -> Self {
        Self::with_buffer(Self::DEFAULT_BUFFER)
    }

    /// Creates a log whose live subscribers may fall up to `buffer` events
    /// behind before they start lagging.
    pub fn with_buffer(buffer: usize) -> Self {
        let (notifier, _) = broadcast::channel(buffer.max(1));
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            notifier,
        }
    }

    /// Receives every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<RecordedEvent> {
        self.notifier.subscribe()
    }

    /// Returns the total number of events recorded.
    pub fn event_count(&self) -> usize {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<RecordedEvent>>> {
        self.events
            .read()
            .map_err(|_| EventLogError::Unavailable("event log lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<RecordedEvent>>> {
        self.events
            .write()
            .map_err(|_| EventLogError::Unavailable("event log lock poisoned".to_string()))
    }
}

impl Default for InMemoryEventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for InMemoryEventLog {
    fn publish(&self, event: EventEnvelope) -> Result<Sequence> {
        let mut store = self.write()?;

        let sequence = store
            .last()
            .map(|e| e.sequence)
            .unwrap_or_default()
            .next();
        let recorded = RecordedEvent {
            sequence,
            envelope: event,
        };
        store.push(recorded.clone());

        // Notify under the lock so subscribers see publication order.
        if self.notifier.send(recorded).is_err() {
            tracing::trace!(%sequence, "no live subscribers");
        }
        drop(store);

        metrics::counter!("event_log_published_total").increment(1);
        Ok(sequence)
    }
}

impl EventLog for InMemoryEventLog {
    fn events_for_aggregate(&self, aggregate_id: AggregateId) -> Result<Vec<RecordedEvent>> {
        let store = self.read()?;
        Ok(store
            .iter()
            .filter(|e| e.aggregate_id() == aggregate_id)
            .cloned()
            .collect())
    }

    fn events_from(&self, from: Sequence) -> Result<Vec<RecordedEvent>> {
        let store = self.read()?;
        Ok(store
            .iter()
            .filter(|e| e.sequence >= from)
            .cloned()
            .collect())
    }

    fn query_events(&self, query: &EventQuery) -> Result<Vec<RecordedEvent>> {
        let store = self.read()?;
        let matching = store
            .iter()
            .filter(|e| query.matches(e))
            .skip(query.offset.unwrap_or(0));

        let events = match query.limit {
            Some(limit) => matching.take(limit).cloned().collect(),
            None => matching.cloned().collect(),
        };
        Ok(events)
    }

    fn last_sequence(&self) -> Result<Option<Sequence>> {
        Ok(self.read()?.last().map(|e| e.sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventKind, EventLogExt};

    fn create_test_event(aggregate_id: AggregateId, event_type: &str, kind: EventKind) -> EventEnvelope {
        EventEnvelope::builder()
            .aggregate_id(aggregate_id)
            .aggregate_type("Payment")
            .event_type(event_type)
            .kind(kind)
            .payload_raw(serde_json::json!({"test": true}))
            .build()
            .unwrap()
    }

    #[test]
    fn publish_assigns_increasing_sequences() {
        let log = InMemoryEventLog::new();
        let id = AggregateId::new();

        let first = log
            .publish(create_test_event(id, "PaymentAdded", EventKind::Added))
            .unwrap();
        let second = log
            .publish(create_test_event(id, "PaymentRequested", EventKind::Lifecycle))
            .unwrap();

        assert_eq!(first, Sequence::first());
        assert_eq!(second, Sequence::new(2));
        assert_eq!(log.event_count(), 2);
        assert_eq!(log.last_sequence().unwrap(), Some(Sequence::new(2)));
    }

    #[test]
    fn sequences_are_global_across_aggregates() {
        let log = InMemoryEventLog::new();
        log.publish(create_test_event(AggregateId::new(), "A", EventKind::Lifecycle))
            .unwrap();
        let seq = log
            .publish(create_test_event(AggregateId::new(), "B", EventKind::Lifecycle))
            .unwrap();
        assert_eq!(seq, Sequence::new(2));
    }

    #[test]
    fn events_for_aggregate_keeps_publication_order() {
        let log = InMemoryEventLog::new();
        let id = AggregateId::new();
        let other = AggregateId::new();

        log.publish(create_test_event(id, "First", EventKind::Added)).unwrap();
        log.publish(create_test_event(other, "Noise", EventKind::Added)).unwrap();
        log.publish(create_test_event(id, "Second", EventKind::Lifecycle)).unwrap();

        let events = log.events_for_aggregate(id).unwrap();
        let types: Vec<_> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(types, vec!["First", "Second"]);
    }

    #[test]
    fn events_from_is_inclusive() {
        let log = InMemoryEventLog::new();
        let id = AggregateId::new();
        for name in ["One", "Two", "Three"] {
            log.publish(create_test_event(id, name, EventKind::Lifecycle)).unwrap();
        }

        let events = log.events_from(Sequence::new(2)).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, Sequence::new(2));
    }

    #[test]
    fn query_applies_offset_then_limit() {
        let log = InMemoryEventLog::new();
        let id = AggregateId::new();
        for name in ["One", "Two", "Three", "Four"] {
            log.publish(create_test_event(id, name, EventKind::Lifecycle)).unwrap();
        }

        let events = log
            .query_events(&EventQuery::for_aggregate(id).offset(1).limit(2))
            .unwrap();
        let types: Vec<_> = events.iter().map(|e| e.event_type()).collect();
        assert_eq!(types, vec!["Two", "Three"]);
    }

    #[test]
    fn latest_added_ignores_lifecycle_events() {
        let log = InMemoryEventLog::new();
        let id = AggregateId::new();

        log.publish(create_test_event(id, "PaymentAdded", EventKind::Added)).unwrap();
        log.publish(create_test_event(id, "PaymentAdded", EventKind::Added)).unwrap();
        log.publish(create_test_event(id, "PaymentRequested", EventKind::Lifecycle))
            .unwrap();

        let latest = log.latest_added_for(id).unwrap().unwrap();
        assert_eq!(latest.sequence, Sequence::new(2));
        assert!(log.latest_added_for(AggregateId::new()).unwrap().is_none());
    }

    #[test]
    fn latest_added_per_aggregate_keeps_one_per_id() {
        let log = InMemoryEventLog::new();
        let a = AggregateId::new();
        let b = AggregateId::new();

        log.publish(create_test_event(a, "PaymentAdded", EventKind::Added)).unwrap();
        log.publish(create_test_event(b, "PaymentAdded", EventKind::Added)).unwrap();
        log.publish(create_test_event(a, "PaymentAdded", EventKind::Added)).unwrap();

        let latest = log.latest_added_per_aggregate("Payment").unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].aggregate_id(), b);
        assert_eq!(latest[1].aggregate_id(), a);
        assert_eq!(latest[1].sequence, Sequence::new(3));
    }

    #[test]
    fn clones_append_to_one_history() {
        let log = InMemoryEventLog::new();
        let other = log.clone();

        let first = log
            .publish(create_test_event(AggregateId::new(), "A", EventKind::Added))
            .unwrap();
        let second = other
            .publish(create_test_event(AggregateId::new(), "B", EventKind::Added))
            .unwrap();
        let third = log
            .publish(create_test_event(AggregateId::new(), "C", EventKind::Added))
            .unwrap();

        assert_eq!(
            [first, second, third],
            [Sequence::first(), Sequence::new(2), Sequence::new(3)]
        );
        let types: Vec<_> = other
            .events_from(Sequence::first())
            .unwrap()
            .iter()
            .map(|e| e.event_type().to_string())
            .collect();
        assert_eq!(types, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn subscribers_receive_new_events() {
        let log = InMemoryEventLog::new();
        let mut rx = log.subscribe();

        let id = AggregateId::new();
        log.publish(create_test_event(id, "PaymentRequested", EventKind::Lifecycle))
            .unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.sequence, Sequence::first());
        assert_eq!(received.aggregate_id(), id);
    }

    #[tokio::test]
    async fn stream_from_yields_tail() {
        use futures_util::StreamExt;

        let log = InMemoryEventLog::new();
        let id = AggregateId::new();
        for name in ["One", "Two", "Three"] {
            log.publish(create_test_event(id, name, EventKind::Lifecycle)).unwrap();
        }

        let stream = log.stream_from(Sequence::new(3)).unwrap();
        let events: Vec<_> = stream.collect().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().event_type(), "Three");
    }
}
