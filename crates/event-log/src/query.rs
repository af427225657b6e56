use chrono::{DateTime, Utc};

use crate::{AggregateId, EventKind, RecordedEvent, Sequence};

/// Filter over recorded events.
///
/// Every criterion left as `None` matches everything. Results are always
/// returned in sequence order; `offset` and `limit` apply after filtering.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub aggregate_id: Option<AggregateId>,

    pub aggregate_type: Option<String>,

    /// Any of these event types.
    pub event_types: Option<Vec<String>>,

    pub kind: Option<EventKind>,

    /// Inclusive lower bound.
    pub from_sequence: Option<Sequence>,

    /// Inclusive upper bound.
    pub to_sequence: Option<Sequence>,

    /// Inclusive lower bound.
    pub from_timestamp: Option<DateTime<Utc>>,

    /// Inclusive upper bound.
    pub to_timestamp: Option<DateTime<Utc>>,

    pub limit: Option<usize>,

    pub offset: Option<usize>,
}

impl EventQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for a specific aggregate.
    pub fn for_aggregate(aggregate_id: AggregateId) -> Self {
        Self {
            aggregate_id: Some(aggregate_id),
            ..Default::default()
        }
    }

    /// Creates a query for every `Added` event of one aggregate type.
    pub fn added_of_type(aggregate_type: impl Into<String>) -> Self {
        Self {
            aggregate_type: Some(aggregate_type.into()),
            kind: Some(EventKind::Added),
            ..Default::default()
        }
    }

    pub fn aggregate_id(mut self, id: AggregateId) -> Self {
        self.aggregate_id = Some(id);
        self
    }

    pub fn aggregate_type(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_types = Some(vec![event_type.into()]);
        self
    }

    pub fn event_types(mut self, event_types: Vec<String>) -> Self {
        self.event_types = Some(event_types);
        self
    }

    pub fn kind(mut self, kind: EventKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn from_sequence(mut self, sequence: Sequence) -> Self {
        self.from_sequence = Some(sequence);
        self
    }

    pub fn to_sequence(mut self, sequence: Sequence) -> Self {
        self.to_sequence = Some(sequence);
        self
    }

    pub fn from_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.from_timestamp = Some(timestamp);
        self
    }

    pub fn to_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.to_timestamp = Some(timestamp);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if the event satisfies every criterion except paging.
    pub fn matches(&self, event: &RecordedEvent) -> bool {
        let envelope = &event.envelope;

        if let Some(id) = self.aggregate_id
            && envelope.aggregate_id != id
        {
            return false;
        }
        if let Some(ref agg_type) = self.aggregate_type
            && &envelope.aggregate_type != agg_type
        {
            return false;
        }
        if let Some(ref types) = self.event_types
            && !types.contains(&envelope.event_type)
        {
            return false;
        }
        if let Some(kind) = self.kind
            && envelope.kind != kind
        {
            return false;
        }
        if let Some(from) = self.from_sequence
            && event.sequence < from
        {
            return false;
        }
        if let Some(to) = self.to_sequence
            && event.sequence > to
        {
            return false;
        }
        if let Some(from) = self.from_timestamp
            && envelope.timestamp < from
        {
            return false;
        }
        if let Some(to) = self.to_timestamp
            && envelope.timestamp > to
        {
            return false;
        }
        true
    }
}
