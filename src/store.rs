//! Reading store boundary.
//!
//! Handlers and the advisor only see the [`ReadingStore`] and
//! [`RecommendationSink`] traits, so they can be exercised against in-memory
//! fakes. [`PgStore`] is the PostgreSQL implementation backed by the
//! process-wide sqlx pool created in `main.rs`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{Reading, RecommendationRecord, ValidReading, WindowedAverages};

// ---

/// Reading columns as the Rust models decode them. Tables created by the
/// first telemetry API hold `DECIMAL` metrics and a zone-less `TIMESTAMP`, so
/// every read casts explicitly.
const READING_COLUMNS: &str = r#"
    id,
    dispositivo_id,
    temperatura::DOUBLE PRECISION AS temperatura,
    oxigenio::DOUBLE PRECISION    AS oxigenio,
    ph::DOUBLE PRECISION          AS ph,
    data_hora::TIMESTAMPTZ        AS data_hora
"#;

const WINDOWED_AVERAGES_SQL: &str = r#"
    SELECT
        AVG(temperatura)::DOUBLE PRECISION AS avg_temp,
        AVG(oxigenio)::DOUBLE PRECISION    AS avg_ox,
        AVG(ph)::DOUBLE PRECISION          AS avg_ph,
        COUNT(temperatura) AS cnt_temp,
        COUNT(oxigenio)    AS cnt_ox,
        COUNT(ph)          AS cnt_ph
    FROM leituras
    WHERE dispositivo_id = $1
      AND data_hora::TIMESTAMPTZ >= $2
      AND data_hora::TIMESTAMPTZ <= $3
"#;

fn insert_reading_sql() -> String {
    format!(
        "INSERT INTO leituras (dispositivo_id, temperatura, oxigenio, ph) \
         VALUES ($1, $2, $3, $4) RETURNING {READING_COLUMNS}"
    )
}

fn recent_readings_sql() -> String {
    format!(
        "SELECT {READING_COLUMNS} FROM leituras WHERE dispositivo_id = $1 \
         ORDER BY data_hora DESC LIMIT $2"
    )
}

#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Append one reading; the store stamps `data_hora`.
    async fn insert_reading(&self, reading: &ValidReading) -> Result<Reading, sqlx::Error>;

    /// Per-metric AVG and COUNT over `[start, end]`, each metric with its own
    /// NULL handling.
    async fn windowed_averages(
        &self,
        device_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<WindowedAverages, sqlx::Error>;

    /// Newest-first readings for a device.
    async fn recent_readings(&self, device_id: &str, limit: i64)
        -> Result<Vec<Reading>, sqlx::Error>;

    async fn latest_reading(&self, device_id: &str) -> Result<Option<Reading>, sqlx::Error>;
}

/// Destination of the recommendation audit trail.
#[async_trait]
pub trait RecommendationSink: Send + Sync {
    async fn insert_recommendation(&self, record: &RecommendationRecord) -> Result<(), sqlx::Error>;
}

/// PostgreSQL-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadingStore for PgStore {
    async fn insert_reading(&self, reading: &ValidReading) -> Result<Reading, sqlx::Error> {
        // ---
        sqlx::query_as::<_, Reading>(&insert_reading_sql())
            .bind(&reading.dispositivo_id)
            .bind(reading.temperatura)
            .bind(reading.oxigenio)
            .bind(reading.ph)
            .fetch_one(&self.pool)
            .await
    }

    async fn windowed_averages(
        &self,
        device_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<WindowedAverages, sqlx::Error> {
        // ---
        sqlx::query_as::<_, WindowedAverages>(WINDOWED_AVERAGES_SQL)
            .bind(device_id)
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool)
            .await
    }

    async fn recent_readings(
        &self,
        device_id: &str,
        limit: i64,
    ) -> Result<Vec<Reading>, sqlx::Error> {
        // ---
        sqlx::query_as::<_, Reading>(&recent_readings_sql())
            .bind(device_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
    }

    async fn latest_reading(&self, device_id: &str) -> Result<Option<Reading>, sqlx::Error> {
        // ---
        sqlx::query_as::<_, Reading>(&recent_readings_sql())
            .bind(device_id)
            .bind(1_i64)
            .fetch_optional(&self.pool)
            .await
    }
}

#[async_trait]
impl RecommendationSink for PgStore {
    async fn insert_recommendation(&self, record: &RecommendationRecord) -> Result<(), sqlx::Error> {
        // ---
        sqlx::query(
            r#"
            INSERT INTO recomendacoes (dispositivo_id, recomendacao, motivo, data_hora)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&record.dispositivo_id)
        .bind(&record.recomendacao)
        .bind(&record.motivo)
        .bind(record.data_hora)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
