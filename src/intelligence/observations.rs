use serde::Serialize;

use crate::models::Consultation;

use super::types::AlertError;

/// Typed clinical values of one consultation, ready for evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Observations {
    pub creatinine: Option<f64>,
    pub egfr: Option<i64>,
    /// (systolic, diastolic); only set when both were recorded.
    pub blood_pressure: Option<(i64, i64)>,
    pub weight: Option<f64>,
}

impl Observations {
    /// Parse the stored consultation. A decimal field that is present but
    /// not a finite number fails the whole parse rather than being skipped.
    pub fn from_consultation(c: &Consultation) -> Result<Self, AlertError> {
        Ok(Self {
            creatinine: parse_decimal("creatinine", c.creatinine.as_deref())?,
            egfr: c.egfr,
            blood_pressure: match (c.systolic, c.diastolic) {
                (Some(sys), Some(dia)) => Some((sys, dia)),
                _ => None,
            },
            weight: parse_decimal("weight", c.weight.as_deref())?,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Parse an optional decimal field.
pub fn parse_decimal(field: &'static str, raw: Option<&str>) -> Result<Option<f64>, AlertError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(AlertError::InvalidObservation {
            field,
            value: raw.to_string(),
        }),
    }
}

/// Weight recorded at the most recent consultation in `history` that has
/// one. `history` is most recent first and excludes the current visit.
pub fn previous_weight(history: &[Consultation]) -> Result<Option<f64>, AlertError> {
    match history.iter().find_map(|c| c.weight.as_deref()) {
        Some(raw) => parse_decimal("weight", Some(raw)),
        None => Ok(None),
    }
}
