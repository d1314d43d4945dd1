use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, info};

use super::AppState;
use crate::{
    advisor::validate_device_id, presenter::OutputFormat, AdvisorError, LenientNumber, NewReading,
    ValidReading,
};

// ---

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 1000;

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/leituras", post(create))
        .route("/leituras/{dispositivo_id}", get(list))
        .route("/leituras/latest/{dispositivo_id}", get(latest))
}

/// Handle `POST /leituras`.
async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewReading>, JsonRejection>,
) -> Result<Response, AdvisorError> {
    // ---
    let Json(body) = body?;
    let reading = validate_reading(body)?;
    info!("POST /leituras - device={}", reading.dispositivo_id);

    let stored = state.store.insert_reading(&reading).await?;
    debug!("Stored reading id={}", stored.id);

    Ok((StatusCode::CREATED, Json(stored)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    limit: Option<String>,
}

/// Handle `GET /leituras/{dispositivo_id}`, newest first.
async fn list(
    Path(dispositivo_id): Path<String>,
    params: Result<Query<ListQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Response, AdvisorError> {
    // ---
    let Query(params) = params?;
    let device_id = validate_device_id(Some(&dispositivo_id))?;
    let limit = resolve_limit(params.limit.as_deref());
    info!("GET /leituras - device={} limit={}", device_id, limit);

    let readings = state.store.recent_readings(&device_id, limit).await?;
    Ok(Json(readings).into_response())
}

#[derive(Debug, Deserialize)]
pub struct LatestQuery {
    format: Option<String>,
}

/// Handle `GET /leituras/latest/{dispositivo_id}`.
async fn latest(
    Path(dispositivo_id): Path<String>,
    params: Result<Query<LatestQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Response, AdvisorError> {
    // ---
    let Query(params) = params?;
    let device_id = validate_device_id(Some(&dispositivo_id))?;
    info!("GET /leituras/latest - device={}", device_id);

    let reading = state
        .store
        .latest_reading(&device_id)
        .await?
        .ok_or_else(|| AdvisorError::NotFound("nenhuma leitura encontrada".to_string()))?;

    Ok(match OutputFormat::parse(params.format.as_deref()) {
        OutputFormat::Plain => reading.to_plain().into_response(),
        OutputFormat::Json => Json(reading).into_response(),
    })
}

/// Check an ingestion payload: a device id, a numeric temperature, and
/// numeric oxygen/pH when present.
fn validate_reading(body: NewReading) -> Result<ValidReading, AdvisorError> {
    // ---
    let dispositivo_id = validate_device_id(body.dispositivo_id.as_deref())?;

    let temperatura = match body.temperatura {
        Some(LenientNumber::Value(t)) => t,
        _ => return Err(AdvisorError::Validation("temperatura inválida".to_string())),
    };

    let optional = |value: Option<LenientNumber>, name: &str| match value {
        None => Ok(None),
        Some(LenientNumber::Value(v)) => Ok(Some(v)),
        Some(LenientNumber::Invalid) => Err(AdvisorError::Validation(format!("{name} inválido"))),
    };

    Ok(ValidReading {
        dispositivo_id,
        temperatura,
        oxigenio: optional(body.oxigenio, "oxigenio")?,
        ph: optional(body.ph, "ph")?,
    })
}

fn resolve_limit(raw: Option<&str>) -> i64 {
    // ---
    match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
        Some(n) if n > 0 => n.min(MAX_LIMIT),
        _ => DEFAULT_LIMIT,
    }
}

#[cfg(test)]
mod tests {
    // ---
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
    };
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{audit::AuditQueue, routes, testing::FakeStore};

    async fn send(store: Arc<FakeStore>, request: Request<Body>) -> (StatusCode, String) {
        // ---
        let (queue, _rx) = AuditQueue::new(4);
        let response = routes::router(store, queue).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn post_json(body: Value) -> Request<Body> {
        // ---
        Request::builder()
            .method("POST")
            .uri("/leituras")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn test_resolve_limit() {
        // ---
        assert_eq!(resolve_limit(None), DEFAULT_LIMIT);
        assert_eq!(resolve_limit(Some("x")), DEFAULT_LIMIT);
        assert_eq!(resolve_limit(Some("0")), DEFAULT_LIMIT);
        assert_eq!(resolve_limit(Some("10")), 10);
        assert_eq!(resolve_limit(Some("5000")), MAX_LIMIT);
    }

    #[tokio::test]
    async fn test_create_reading() {
        // ---
        let store = Arc::new(FakeStore::new());
        let (status, body) = send(
            store.clone(),
            post_json(json!({ "dispositivo_id": "tank-1", "temperatura": "26.5", "oxigenio": 5.5 })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["dispositivo_id"], "tank-1");
        assert_eq!(json["temperatura"], 26.5);
        assert_eq!(json["oxigenio"], 5.5);
        assert!(json["ph"].is_null());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_payloads() {
        // ---
        let cases = [
            json!({ "temperatura": 26.5 }),
            json!({ "dispositivo_id": "", "temperatura": 26.5 }),
            json!({ "dispositivo_id": "tank-1" }),
            json!({ "dispositivo_id": "tank-1", "temperatura": "hot" }),
            json!({ "dispositivo_id": "tank-1", "temperatura": 26.5, "ph": "acid" }),
            json!({ "dispositivo_id": 42, "temperatura": 26.5 }),
        ];

        for case in cases {
            let (status, body) = send(Arc::new(FakeStore::new()), post_json(case.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "payload {case}");
            let json: Value = serde_json::from_str(&body).unwrap();
            assert!(json["error"].is_string(), "payload {case}");
        }
    }

    #[tokio::test]
    async fn test_numeric_device_id_reports_device_error() {
        // ---
        let (status, body) = send(
            Arc::new(FakeStore::new()),
            post_json(json!({ "dispositivo_id": 42, "temperatura": 26.5 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "dispositivo_id inválido");
    }

    #[tokio::test]
    async fn test_unparseable_bodies_get_json_errors() {
        // ---
        let malformed = Request::builder()
            .method("POST")
            .uri("/leituras")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"dispositivo_id\": "))
            .unwrap();
        let no_content_type = Request::builder()
            .method("POST")
            .uri("/leituras")
            .body(Body::from(r#"{"dispositivo_id":"tank-1","temperatura":26.5}"#))
            .unwrap();

        for request in [malformed, no_content_type] {
            let (status, body) = send(Arc::new(FakeStore::new()), request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            let json: Value = serde_json::from_str(&body).unwrap();
            assert!(json["error"].as_str().unwrap().starts_with("corpo JSON inválido"));
        }
    }

    #[tokio::test]
    async fn test_repeated_query_key_gets_json_error() {
        // ---
        let (status, body) =
            send(Arc::new(FakeStore::new()), get_req("/leituras/tank-1?limit=1&limit=2")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert!(json["error"].as_str().unwrap().starts_with("parâmetros inválidos"));
    }

    #[tokio::test]
    async fn test_list_newest_first_with_limit() {
        // ---
        let store = Arc::new(FakeStore::new());
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        for i in 0..5 {
            store.push("tank-1", base + Duration::minutes(i), 20.0 + i as f64, None, None);
        }

        let (status, body) = send(store, get_req("/leituras/tank-1?limit=2")).await;
        assert_eq!(status, StatusCode::OK);

        let json: Value = serde_json::from_str(&body).unwrap();
        let temps: Vec<f64> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["temperatura"].as_f64().unwrap())
            .collect();
        assert_eq!(temps, vec![24.0, 23.0]);
    }

    #[tokio::test]
    async fn test_latest_plain_and_missing() {
        // ---
        let store = Arc::new(FakeStore::new());
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        store.push("tank-1", at, 27.5, Some(6.2), None);

        let (status, body) = send(store.clone(), get_req("/leituras/latest/tank-1?format=plain")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "27.5;6.2;;2025-06-01T12:00:00+00:00");

        let (status, _) = send(store, get_req("/leituras/latest/tank-2")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
