//! Interval-driven poll loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use super::engine::SyncEngine;
use super::notify::CompletionDetector;
use super::session::SessionTotals;
use super::state::{FilterCriteria, InfoHash, SyncSnapshot};
use crate::rpc::RpcTransport;

/// One applied poll cycle, delivered to the consumer.
#[derive(Debug, Clone)]
pub struct SyncEvent {
    pub snapshot: SyncSnapshot,
    /// Hashes that finished downloading since the previous cycle
    pub completed: Vec<InfoHash>,
    pub session: SessionTotals,
}

/// Drives periodic polling of one torrent list query.
///
/// Each tick awaits the poll to completion before the next tick may
/// issue another request for the same query, so requests for one key
/// never overlap. Poll failures are logged and skipped; the engine's
/// last snapshot stays in place.
pub struct PollScheduler<T: RpcTransport> {
    engine: Arc<SyncEngine<T>>,
    filter: FilterCriteria,
    interval: Duration,
    detector: CompletionDetector,
}

impl<T: RpcTransport> PollScheduler<T> {
    pub fn new(engine: Arc<SyncEngine<T>>, filter: FilterCriteria, interval: Duration) -> Self {
        Self {
            engine,
            filter,
            interval,
            detector: CompletionDetector::new(),
        }
    }

    /// Runs until the event receiver is dropped.
    pub async fn run(mut self, events: mpsc::Sender<SyncEvent>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let snapshot = match self.engine.poll(&self.filter).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!("Poll failed, keeping stale snapshot: {}", e);
                    continue;
                }
            };

            let session = self.engine.accumulate_session(&snapshot.stats);
            let completed = self.detector.observe(&snapshot.torrents);

            let event = SyncEvent {
                snapshot,
                completed,
                session,
            };
            if events.send(event).await.is_err() {
                tracing::debug!("Event receiver dropped, stopping poll loop");
                break;
            }
        }
    }
}
