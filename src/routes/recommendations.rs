use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::AppState;
use crate::{
    advisor::recommend,
    presenter::OutputFormat,
    window::resolve_window_days,
    AdvisorError,
};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/recomendacoes", get(by_query))
        .route("/recomendacoes/{dispositivo_id}", get(by_path))
}

/// Query parameters accepted by the recommendation routes.
///
/// Kept as raw strings so malformed values fall back to defaults instead of
/// being rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    dispositivo_id: Option<String>,
    days: Option<String>,
    format: Option<String>,
}

async fn by_query(
    params: Result<Query<RecommendationQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Response, AdvisorError> {
    // ---
    let Query(params) = params?;
    let device_id = params.dispositivo_id.clone();
    handle(state, device_id.as_deref(), params).await
}

async fn by_path(
    Path(dispositivo_id): Path<String>,
    params: Result<Query<RecommendationQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Response, AdvisorError> {
    // ---
    let Query(params) = params?;
    handle(state, Some(&dispositivo_id), params).await
}

async fn handle(
    state: AppState,
    device_id: Option<&str>,
    params: RecommendationQuery,
) -> Result<Response, AdvisorError> {
    // ---
    let days = resolve_window_days(params.days.as_deref());
    let format = OutputFormat::parse(params.format.as_deref());

    info!(
        "GET /recomendacoes - device={:?} days={} format={:?}",
        device_id, days, format
    );

    let advisory = recommend(
        state.store.as_ref(),
        &state.audit,
        device_id.unwrap_or_default(),
        days,
        Utc::now(),
    )
    .await?;

    Ok(advisory.into_response_as(format))
}
