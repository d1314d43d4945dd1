//! Database schema management for `aquaflow-advisor`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs`.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create the database schema (idempotent).
///
/// Creates the append-only `leituras` table for tank readings and the
/// `recomendacoes` audit table. Safe to call on every startup; no-op if the
/// objects already exist. Older deployments created `leituras` without the
/// oxygen and pH columns, so those are added separately. Their `DECIMAL`
/// metrics and `TIMESTAMP` column are left as they are; `store` casts on read.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS leituras (
            id             SERIAL PRIMARY KEY,
            dispositivo_id VARCHAR(100)     NOT NULL,
            temperatura    DOUBLE PRECISION NOT NULL,
            data_hora      TIMESTAMPTZ      NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        ALTER TABLE leituras
            ADD COLUMN IF NOT EXISTS oxigenio DOUBLE PRECISION,
            ADD COLUMN IF NOT EXISTS ph       DOUBLE PRECISION;
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Windowed aggregation and latest-reading lookups both scan by device, newest first
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_leituras_dispositivo_datahora
            ON leituras (dispositivo_id, data_hora DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recomendacoes (
            id             SERIAL PRIMARY KEY,
            dispositivo_id VARCHAR(100) NOT NULL,
            recomendacao   JSONB        NOT NULL,
            motivo         TEXT,
            data_hora      TIMESTAMPTZ  NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_recomendacoes_dispositivo
            ON recomendacoes (dispositivo_id, data_hora DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
