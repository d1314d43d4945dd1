//! Rendering of one evaluation into the structured record and the plain-text
//! advisory.
//!
//! Both forms come out of a single [`present`] call so that they always agree
//! on rounding and ordering.

use axum::{
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{rules::round2, AggregateSnapshot, Evaluation, Recommendation, RecommendationRecord};

// ---

pub const TEXT_NOTHING_TO_DO: &str = "Nenhuma recomendação específica.";

/// Response body format selected by the `format` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Plain,
}

impl OutputFormat {
    /// `"plain"` selects the text advisory; anything else is JSON.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("plain") => OutputFormat::Plain,
            _ => OutputFormat::Json,
        }
    }
}

/// A rendered recommendation set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    // ---
    pub temp_media: Option<f64>,
    pub ox_media: Option<f64>,
    pub ph_media: Option<f64>,
    pub recomendacoes: Vec<Recommendation>,
    pub motivos: Vec<String>,
    pub texto: String,
}

/// Render `evaluation` for `snapshot`.
pub fn present(snapshot: &AggregateSnapshot, evaluation: Evaluation) -> Advisory {
    // ---
    let temp_media = snapshot.temperature.map(round2);
    let ox_media = snapshot.oxygen.map(round2);
    let ph_media = snapshot.ph.map(round2);

    let mut lines = Vec::new();
    if let Some(t) = temp_media {
        lines.push(format!("Temperatura média: {t:.2} °C"));
    }
    if let Some(o) = ox_media {
        lines.push(format!("Oxigênio médio: {o:.2} mg/L"));
    }
    if let Some(p) = ph_media {
        lines.push(format!("pH médio: {p:.2}"));
    }
    lines.push(String::new());

    if evaluation.recommendations.is_empty() {
        lines.push(TEXT_NOTHING_TO_DO.to_string());
    } else {
        lines.extend(
            evaluation
                .recommendations
                .iter()
                .map(|r| format!("• {}", r.texto)),
        );
    }

    Advisory {
        temp_media,
        ox_media,
        ph_media,
        recomendacoes: evaluation.recommendations,
        motivos: evaluation.motives,
        texto: lines.join("\n"),
    }
}

impl Advisory {
    /// Audit row for this advisory.
    pub fn audit_record(&self, device_id: &str, at: DateTime<Utc>) -> RecommendationRecord {
        // ---
        RecommendationRecord {
            dispositivo_id: device_id.to_string(),
            recomendacao: serde_json::to_value(&self.recomendacoes)
                .unwrap_or_else(|_| serde_json::Value::Array(Vec::new())),
            motivo: self.motivos.join("; "),
            data_hora: at,
        }
    }

    /// HTTP body in the requested format.
    pub fn into_response_as(self, format: OutputFormat) -> Response {
        // ---
        match format {
            OutputFormat::Plain => (
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                self.texto,
            )
                .into_response(),
            OutputFormat::Json => Json(self).into_response(),
        }
    }
}
