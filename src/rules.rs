//! Fixed husbandry rules evaluated against an aggregate snapshot.
//!
//! Rules run in a fixed order (temperature, oxygen, pH) and that order is the
//! order of both the recommendation list and the motive list. Each rule is
//! independent, so several can fire in one evaluation. Metrics without an
//! average are skipped. Motives are recorded only for out-of-range conditions.

use crate::{AggregateSnapshot, Category, Evaluation, Recommendation};

// ---

/// Below this average temperature (°C) fish eat less.
pub const TEMP_LOW_C: f64 = 24.0;

/// Above this average temperature (°C) oxygen demand outpaces supply.
pub const TEMP_HIGH_C: f64 = 30.0;

/// Dissolved oxygen floor, mg/L.
pub const OXYGEN_MIN_MG_L: f64 = 5.0;

pub const PH_MIN: f64 = 6.5;
pub const PH_MAX: f64 = 9.0;

pub const TEXT_REDUCE_FEED: &str = "Temperatura baixa: reduzir a oferta de ração.";
pub const TEXT_KEEP_ROUTINE: &str = "Temperatura ideal: manter a rotina de alimentação.";
pub const TEXT_HOT_AERATE: &str = "Temperatura alta: aumentar a aeração e evitar excesso de ração.";
pub const TEXT_LOW_OXYGEN: &str = "Oxigênio baixo: acionar aeradores.";
pub const TEXT_PH_OUT_OF_RANGE: &str =
    "pH fora da faixa ideal (6.5 a 9.0): corrigir o pH ou realizar troca parcial de água.";

/// Round to the two decimal places shown to operators.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Evaluate every rule against `snapshot`.
pub fn evaluate(snapshot: &AggregateSnapshot) -> Evaluation {
    // ---
    let mut eval = Evaluation::default();

    if let Some(temp) = snapshot.temperature {
        if temp < TEMP_LOW_C {
            eval.recommendations
                .push(Recommendation::new(Category::Feeding, TEXT_REDUCE_FEED));
            eval.motives.push(temperature_motive(temp));
        } else if temp > TEMP_HIGH_C {
            eval.recommendations
                .push(Recommendation::new(Category::Aeration, TEXT_HOT_AERATE));
            eval.motives.push(temperature_motive(temp));
        } else {
            eval.recommendations
                .push(Recommendation::new(Category::Feeding, TEXT_KEEP_ROUTINE));
        }
    }

    if let Some(ox) = snapshot.oxygen {
        if ox < OXYGEN_MIN_MG_L {
            eval.recommendations
                .push(Recommendation::new(Category::Aeration, TEXT_LOW_OXYGEN));
            eval.motives.push(format!("O2 médio {:.2} mg/L", round2(ox)));
        }
    }

    if let Some(ph) = snapshot.ph {
        if !(PH_MIN..=PH_MAX).contains(&ph) {
            eval.recommendations
                .push(Recommendation::new(Category::WaterQuality, TEXT_PH_OUT_OF_RANGE));
            eval.motives.push(format!("pH médio {:.2}", round2(ph)));
        }
    }

    eval
}

/// Evaluation reported when the window holds no readings at all.
pub fn no_data(window_days: u32) -> Evaluation {
    // ---
    Evaluation {
        recommendations: vec![Recommendation::new(
            Category::Informational,
            format!("Sem leituras nos últimos {window_days} dia(s) para gerar recomendações."),
        )],
        motives: Vec::new(),
    }
}

fn temperature_motive(temp: f64) -> String {
    format!("Temp média {:.2}°C", round2(temp))
}
