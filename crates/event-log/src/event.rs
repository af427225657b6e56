use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AggregateId, EnvelopeError};

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of an event in the log.
///
/// Sequences are assigned at publication, start at 1 and grow by one for
/// every event published to the log, regardless of which aggregate it
/// belongs to. Ordering by sequence is publication order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Sequence(u64);

impl Sequence {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The position before anything has been published.
    pub fn initial() -> Self {
        Self(0)
    }

    /// The position of the first published event.
    pub fn first() -> Self {
        Self(1)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a consumer may do with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EventKind {
    /// Carries a full state snapshot of the aggregate; replaying the most
    /// recent one per aggregate is enough to reconstruct it.
    Added,

    /// Records a transition. Informational and auditable, not needed for
    /// reconstruction.
    #[default]
    Lifecycle,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Added => "Added",
            EventKind::Lifecycle => "Lifecycle",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A domain event wrapped with the metadata the log needs.
///
/// The log never looks inside `payload`; it only routes on the envelope
/// fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,

    /// The type of the event (e.g. "PaymentRequested").
    pub event_type: String,

    pub kind: EventKind,

    /// The aggregate this event belongs to.
    pub aggregate_id: AggregateId,

    /// The type of aggregate (e.g. "Payment").
    pub aggregate_type: String,

    /// When the event was created.
    pub timestamp: DateTime<Utc>,

    pub payload: serde_json::Value,

    pub metadata: HashMap<String, serde_json::Value>,
}

impl EventEnvelope {
    pub fn builder() -> EventEnvelopeBuilder {
        EventEnvelopeBuilder::default()
    }

    /// Deserializes the payload into a concrete event type.
    pub fn decode<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}

/// Builder for constructing event envelopes.
#[derive(Debug, Default)]
pub struct EventEnvelopeBuilder {
    event_id: Option<EventId>,
    event_type: Option<String>,
    kind: EventKind,
    aggregate_id: Option<AggregateId>,
    aggregate_type: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    payload: Option<serde_json::Value>,
    metadata: HashMap<String, serde_json::Value>,
}

impl EventEnvelopeBuilder {
    /// Sets the event ID. If not set, a new ID will be generated.
    pub fn event_id(mut self, id: EventId) -> Self {
        self.event_id = Some(id);
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Sets the event kind. Defaults to [`EventKind::Lifecycle`].
    pub fn kind(mut self, kind: EventKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn aggregate_id(mut self, id: AggregateId) -> Self {
        self.aggregate_id = Some(id);
        self
    }

    pub fn aggregate_type(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    /// Sets the timestamp. If not set, the current time will be used.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the payload from a serializable value.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Builds the envelope, reporting the first missing required field in
    /// the order event_type, aggregate_id, aggregate_type, payload.
    pub fn build(self) -> Result<EventEnvelope, EnvelopeError> {
        Ok(EventEnvelope {
            event_id: self.event_id.unwrap_or_default(),
            event_type: self.event_type.ok_or(EnvelopeError("event_type"))?,
            kind: self.kind,
            aggregate_id: self.aggregate_id.ok_or(EnvelopeError("aggregate_id"))?,
            aggregate_type: self.aggregate_type.ok_or(EnvelopeError("aggregate_type"))?,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            payload: self.payload.ok_or(EnvelopeError("payload"))?,
            metadata: self.metadata,
        })
    }
}

/// An envelope as stored by the log, stamped with its position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub sequence: Sequence,
    pub envelope: EventEnvelope,
}

impl RecordedEvent {
    pub fn aggregate_id(&self) -> AggregateId {
        self.envelope.aggregate_id
    }

    pub fn event_type(&self) -> &str {
        &self.envelope.event_type
    }

    pub fn kind(&self) -> EventKind {
        self.envelope.kind
    }
}
