//! Core projection trait and position tracking.

use async_trait::async_trait;
use event_log::{RecordedEvent, Sequence};

use crate::Result;

/// The last log sequence a projection has handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionPosition {
    pub last_sequence: Sequence,
}

impl ProjectionPosition {
    /// Creates a position before the first event.
    pub fn initial() -> Self {
        Self {
            last_sequence: Sequence::initial(),
        }
    }

    /// Moves the position to `sequence`. Never moves backwards.
    pub fn advance_to(&self, sequence: Sequence) -> Self {
        Self {
            last_sequence: self.last_sequence.max(sequence),
        }
    }

    /// Returns true if the event at `sequence` has already been handled.
    pub fn has_seen(&self, sequence: Sequence) -> bool {
        sequence <= self.last_sequence
    }

    /// The first sequence not yet handled.
    pub fn next(&self) -> Sequence {
        self.last_sequence.next()
    }
}

impl std::fmt::Display for ProjectionPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "position({})", self.last_sequence)
    }
}

/// A projection that processes events and updates a read model.
///
/// Projections receive every recorded event, whatever its aggregate type, in
/// sequence order. They must advance their position even for events they
/// ignore.
#[async_trait]
pub trait Projection: Send + Sync {
    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Handles a single event, updating the projection's read model.
    async fn handle(&self, event: &RecordedEvent) -> Result<()>;

    /// Returns the current position of this projection.
    async fn position(&self) -> ProjectionPosition;

    /// Resets the projection to its initial state.
    async fn reset(&self) -> Result<()>;
}
