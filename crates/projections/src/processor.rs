//! Projection processor for feeding events to projections.

use std::future::Future;

use event_log::{EventLog, EventLogExt, RecordedEvent, Sequence};
use futures_util::StreamExt;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::Result;
use crate::projection::Projection;

/// Processes events from an event log and delivers them to projections.
///
/// The processor supports:
/// - Catch-up: replays the log to bring projections up to date
/// - Single event delivery: delivers a new event to all projections
/// - Rebuild: resets all projections and replays from scratch
/// - Follow: consumes live notifications until shut down
///
/// Every delivery path skips events a projection has already seen, so an
/// event reaching a projection through both catch-up and a live
/// notification is handled once.
pub struct ProjectionProcessor<L: EventLog> {
    log: L,
    projections: Vec<Box<dyn Projection>>,
}

impl<L: EventLog> ProjectionProcessor<L> {
    /// Creates a new processor reading from the given log.
    pub fn new(log: L) -> Self {
        Self {
            log,
            projections: Vec::new(),
        }
    }

    /// Registers a projection with this processor.
    pub fn register(&mut self, projection: Box<dyn Projection>) {
        self.projections.push(projection);
    }

    /// Returns the number of registered projections.
    pub fn projection_count(&self) -> usize {
        self.projections.len()
    }

    /// Runs catch-up processing: streams events from the log, starting at the
    /// least advanced projection, and delivers each to every projection that
    /// hasn't already seen it.
    #[tracing::instrument(skip(self))]
    pub async fn run_catch_up(&self) -> Result<()> {
        let mut from: Option<Sequence> = None;
        for projection in &self.projections {
            let next = projection.position().await.next();
            from = Some(from.map_or(next, |current| current.min(next)));
        }
        let Some(from) = from else {
            return Ok(());
        };

        let mut stream = self.log.stream_from(from)?;
        let mut replayed: u64 = 0;

        while let Some(result) = stream.next().await {
            let event = result?;
            self.deliver(&event).await?;
            replayed += 1;
        }

        tracing::info!(%from, events_replayed = replayed, "catch-up complete");

        Ok(())
    }

    /// Delivers a single event to all registered projections.
    #[tracing::instrument(
        skip(self, event),
        fields(sequence = %event.sequence, event_type = %event.event_type())
    )]
    pub async fn process_event(&self, event: &RecordedEvent) -> Result<()> {
        self.deliver(event).await
    }

    /// Resets all projections and replays all events from the log.
    #[tracing::instrument(skip(self))]
    pub async fn rebuild_all(&self) -> Result<()> {
        for projection in &self.projections {
            projection.reset().await?;
        }
        self.run_catch_up().await
    }

    /// Catches up, then delivers live notifications from `receiver` until
    /// `shutdown` completes or the log is dropped.
    ///
    /// Subscribe before calling this so nothing published in between is
    /// missed. If the receiver falls behind, the skipped events are
    /// recovered from the log.
    #[tracing::instrument(skip_all)]
    pub async fn follow<F>(
        &self,
        mut receiver: broadcast::Receiver<RecordedEvent>,
        shutdown: F,
    ) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        self.run_catch_up().await?;

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::debug!("shutdown requested");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => self.process_event(&event).await?,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "projection follower lagged, catching up");
                        self.run_catch_up().await?;
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        Ok(())
    }

    async fn deliver(&self, event: &RecordedEvent) -> Result<()> {
        for projection in &self.projections {
            if projection.position().await.has_seen(event.sequence) {
                continue;
            }
            projection.handle(event).await?;
            metrics::counter!("projections_events_processed", "projection" => projection.name())
                .increment(1);
        }
        Ok(())
    }
}
