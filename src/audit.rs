//! Fire-and-forget persistence of recommendation audit rows.
//!
//! Request handlers hand records to a bounded queue and move on. A single
//! background worker drains the queue into the [`RecommendationSink`]. When
//! the queue is full or the worker is gone the record is discarded; when the
//! write fails the record is dropped. Either way the outcome is logged and
//! never reaches the caller.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, warn};

use crate::{store::RecommendationSink, RecommendationRecord};

// ---

/// Sending half of the audit queue. Cheap to clone into request state.
#[derive(Debug, Clone)]
pub struct AuditQueue {
    tx: mpsc::Sender<RecommendationRecord>,
}

impl AuditQueue {
    /// Create a queue holding at most `capacity` pending records.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<RecommendationRecord>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Enqueue without waiting. Returns whether the record was accepted.
    pub fn submit(&self, record: RecommendationRecord) -> bool {
        // ---
        match self.tx.try_send(record) {
            Ok(()) => true,
            Err(TrySendError::Full(record)) => {
                warn!(
                    "Audit queue full, discarding recommendation for {}",
                    record.dispositivo_id
                );
                false
            }
            Err(TrySendError::Closed(record)) => {
                warn!(
                    "Audit worker stopped, discarding recommendation for {}",
                    record.dispositivo_id
                );
                false
            }
        }
    }
}

/// Drain the queue into `sink` until every [`AuditQueue`] handle is dropped.
pub async fn run_worker(
    mut rx: mpsc::Receiver<RecommendationRecord>,
    sink: Arc<dyn RecommendationSink>,
) {
    // ---
    info!("Audit worker started");

    while let Some(record) = rx.recv().await {
        match sink.insert_recommendation(&record).await {
            Ok(()) => debug!("Stored recommendation for {}", record.dispositivo_id),
            Err(e) => error!(
                "Failed to store recommendation for {}: {}",
                record.dispositivo_id, e
            ),
        }
    }

    info!("Audit worker stopped");
}
