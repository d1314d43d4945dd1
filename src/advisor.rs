//! One recommendation request, end to end.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    aggregator::aggregate, audit::AuditQueue, presenter::present, rules, store::ReadingStore,
    AdvisorError, Advisory,
};

// ---

/// Trim and check a device identifier coming from the outside world.
pub fn validate_device_id(raw: Option<&str>) -> Result<String, AdvisorError> {
    // ---
    match raw.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(AdvisorError::Validation(
            "dispositivo_id inválido".to_string(),
        )),
    }
}

/// Validate `device_id`, aggregate, evaluate and render its advisory, then
/// queue the audit row.
///
/// A blank device id is rejected before the store is touched. Past that, only
/// the aggregation read can fail the request. An empty window skips the
/// rule set and yields the informational no-data advisory.
pub async fn recommend(
    store: &dyn ReadingStore,
    audit: &AuditQueue,
    device_id: &str,
    window_days: u32,
    now: DateTime<Utc>,
) -> Result<Advisory, AdvisorError> {
    // ---
    let device_id = validate_device_id(Some(device_id))?;
    let device_id = device_id.as_str();
    let snapshot = aggregate(store, device_id, window_days, now).await?;

    let evaluation = if snapshot.is_empty() {
        rules::no_data(window_days)
    } else {
        rules::evaluate(&snapshot)
    };

    let advisory = present(&snapshot, evaluation);
    info!(
        "Advisory for {} ({}d): {} recommendation(s)",
        device_id,
        window_days,
        advisory.recomendacoes.len()
    );

    audit.submit(advisory.audit_record(device_id, now));

    Ok(advisory)
}
