//! Windowed aggregation of tank readings into an [`AggregateSnapshot`].

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{store::ReadingStore, window::window_range, AdvisorError, AggregateSnapshot};

// ---

/// Average every metric of `device_id` over the trailing `window_days`.
///
/// A single store round-trip; a failure fails the whole aggregation and is
/// not retried. Averages keep full precision here.
pub async fn aggregate(
    store: &dyn ReadingStore,
    device_id: &str,
    window_days: u32,
    now: DateTime<Utc>,
) -> Result<AggregateSnapshot, AdvisorError> {
    // ---
    let (start, end) = window_range(window_days, now);
    let raw = store.windowed_averages(device_id, start, end).await?;

    debug!(
        "Aggregated {} over {}d: temp n={} ox n={} ph n={}",
        device_id, window_days, raw.cnt_temp, raw.cnt_ox, raw.cnt_ph
    );

    Ok(AggregateSnapshot::new(device_id, window_days, raw))
}
