//! Data models for tank readings, aggregate snapshots and recommendations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---

/// Stored sensor reading, as returned by the `leituras` table.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Reading {
    // ---
    pub id: i32,
    pub dispositivo_id: String,
    pub temperatura: f64,
    pub oxigenio: Option<f64>,
    pub ph: Option<f64>,
    pub data_hora: DateTime<Utc>,
}

impl Reading {
    /// Render as `temperatura;oxigenio;ph;data_hora`, leaving absent metrics empty.
    pub fn to_plain(&self) -> String {
        // ---
        let opt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
        format!(
            "{};{};{};{}",
            self.temperatura,
            opt(self.oxigenio),
            opt(self.ph),
            self.data_hora.to_rfc3339()
        )
    }
}

/// Ingestion payload for `POST /leituras`.
///
/// Sensors in the field post numbers either as JSON numbers or as numeric
/// strings, so the metric fields accept both. A device id that is not a JSON
/// string reads as absent and is rejected by validation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReading {
    // ---
    #[serde(default, deserialize_with = "string_only")]
    pub dispositivo_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub temperatura: Option<LenientNumber>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub oxigenio: Option<LenientNumber>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub ph: Option<LenientNumber>,
}

/// A metric value that may or may not have parsed as a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LenientNumber {
    Value(f64),
    Invalid,
}

fn string_only<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    // ---
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<LenientNumber>, D::Error>
where
    D: Deserializer<'de>,
{
    // ---
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Number(n)) => Some(
            n.as_f64()
                .map(LenientNumber::Value)
                .unwrap_or(LenientNumber::Invalid),
        ),
        Some(serde_json::Value::String(s)) => Some(
            s.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(LenientNumber::Value)
                .unwrap_or(LenientNumber::Invalid),
        ),
        Some(_) => Some(LenientNumber::Invalid),
    })
}

/// A validated reading ready to be written to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidReading {
    // ---
    pub dispositivo_id: String,
    pub temperatura: f64,
    pub oxigenio: Option<f64>,
    pub ph: Option<f64>,
}

/// Raw per-metric averages and counts for one device over one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, sqlx::FromRow)]
pub struct WindowedAverages {
    // ---
    pub avg_temp: Option<f64>,
    pub avg_ox: Option<f64>,
    pub avg_ph: Option<f64>,
    pub cnt_temp: i64,
    pub cnt_ox: i64,
    pub cnt_ph: i64,
}

/// Per-metric averages for one device over the requested window.
///
/// An average is present if and only if its count is positive. Build through
/// [`AggregateSnapshot::new`] to keep that true.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSnapshot {
    // ---
    pub device_id: String,
    pub window_days: u32,
    pub temperature: Option<f64>,
    pub oxygen: Option<f64>,
    pub ph: Option<f64>,
    pub temperature_count: i64,
    pub oxygen_count: i64,
    pub ph_count: i64,
}

impl AggregateSnapshot {
    pub fn new(device_id: impl Into<String>, window_days: u32, raw: WindowedAverages) -> Self {
        // ---
        let keep = |avg: Option<f64>, cnt: i64| if cnt > 0 { avg } else { None };
        let count = |avg: Option<f64>, cnt: i64| if avg.is_some() { cnt.max(0) } else { 0 };

        let temperature = keep(raw.avg_temp, raw.cnt_temp);
        let oxygen = keep(raw.avg_ox, raw.cnt_ox);
        let ph = keep(raw.avg_ph, raw.cnt_ph);

        Self {
            device_id: device_id.into(),
            window_days,
            temperature_count: count(temperature, raw.cnt_temp),
            oxygen_count: count(oxygen, raw.cnt_ox),
            ph_count: count(ph, raw.cnt_ph),
            temperature,
            oxygen,
            ph,
        }
    }

    /// No temperature readings fell inside the window.
    pub fn is_empty(&self) -> bool {
        self.temperature_count == 0
    }
}

/// Recommendation category, serialized with the names the dashboards expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "racao")]
    Feeding,
    #[serde(rename = "aeracao")]
    Aeration,
    #[serde(rename = "qualidade_agua")]
    WaterQuality,
    #[serde(rename = "informativo")]
    Informational,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    // ---
    pub tipo: Category,
    pub texto: String,
}

impl Recommendation {
    pub fn new(tipo: Category, texto: impl Into<String>) -> Self {
        Self {
            tipo,
            texto: texto.into(),
        }
    }
}

/// Output of one rule evaluation: recommendations and the motives behind the
/// out-of-range ones, both in evaluation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    // ---
    pub recommendations: Vec<Recommendation>,
    pub motives: Vec<String>,
}

/// One row of the `recomendacoes` audit table.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRecord {
    // ---
    pub dispositivo_id: String,
    pub recomendacao: serde_json::Value,
    pub motivo: String,
    pub data_hora: DateTime<Utc>,
}
