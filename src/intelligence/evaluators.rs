//! Parameter evaluators. Each one maps an observation (plus history for
//! the weight rule) and thresholds to at most one finding. Threshold
//! comparisons are inclusive; the fixed eGFR bands are strict.

use crate::models::enums::{AlertParameter, AlertSeverity};
use crate::models::Consultation;

use super::messages::MessageTemplates;
use super::observations::{previous_weight, Observations};
use super::reference::{AlertThresholds, EGFR_STAGE_4_BELOW, EGFR_STAGE_5_BELOW};
use super::types::{AlertError, Finding};

/// Absorbs binary floating point error in a weight difference, far below
/// any recorded precision.
const WEIGHT_TOLERANCE_KG: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Creatinine
// ---------------------------------------------------------------------------

/// `raw` is the stored text, reported verbatim as the finding value.
pub fn evaluate_creatinine(
    value: Option<f64>,
    raw: Option<&str>,
    thresholds: &AlertThresholds,
) -> Option<Finding> {
    let value = value?;

    let (severity, threshold, message) = if value >= thresholds.creatinine_critical {
        (
            AlertSeverity::Critical,
            thresholds.creatinine_critical,
            MessageTemplates::creatinine_critical(value),
        )
    } else if value >= thresholds.creatinine_warning {
        (
            AlertSeverity::Warning,
            thresholds.creatinine_warning,
            MessageTemplates::creatinine_elevated(value),
        )
    } else {
        return None;
    };

    Some(Finding {
        severity,
        parameter: AlertParameter::Creatinine,
        value: raw.map(str::to_string).unwrap_or_else(|| value.to_string()),
        threshold: threshold.to_string(),
        message,
    })
}

// ---------------------------------------------------------------------------
// Blood pressure
// ---------------------------------------------------------------------------

/// Either reading alone can raise the alert; both are always reported.
pub fn evaluate_blood_pressure(
    reading: Option<(i64, i64)>,
    thresholds: &AlertThresholds,
) -> Option<Finding> {
    let (systolic, diastolic) = reading?;

    let (severity, threshold, message) = if systolic >= thresholds.systolic_critical
        || diastolic >= thresholds.diastolic_critical
    {
        (
            AlertSeverity::Critical,
            format!("{}/{}", thresholds.systolic_critical, thresholds.diastolic_critical),
            MessageTemplates::blood_pressure_critical(systolic, diastolic),
        )
    } else if systolic >= thresholds.systolic_warning
        || diastolic >= thresholds.diastolic_warning
    {
        (
            AlertSeverity::Warning,
            format!("{}/{}", thresholds.systolic_warning, thresholds.diastolic_warning),
            MessageTemplates::blood_pressure_elevated(systolic, diastolic),
        )
    } else {
        return None;
    };

    Some(Finding {
        severity,
        parameter: AlertParameter::BloodPressure,
        value: format!("{}/{}", systolic, diastolic),
        threshold,
        message,
    })
}

// ---------------------------------------------------------------------------
// eGFR
// ---------------------------------------------------------------------------

/// Fixed CKD staging bands; not configurable per patient.
pub fn evaluate_egfr(egfr: Option<i64>) -> Option<Finding> {
    let egfr = egfr?;

    let (severity, threshold, message) = if egfr < EGFR_STAGE_5_BELOW {
        (
            AlertSeverity::Critical,
            EGFR_STAGE_5_BELOW,
            MessageTemplates::egfr_stage_5(egfr),
        )
    } else if egfr < EGFR_STAGE_4_BELOW {
        (
            AlertSeverity::Warning,
            EGFR_STAGE_4_BELOW,
            MessageTemplates::egfr_stage_4(egfr),
        )
    } else {
        return None;
    };

    Some(Finding {
        severity,
        parameter: AlertParameter::Egfr,
        value: egfr.to_string(),
        threshold: threshold.to_string(),
        message,
    })
}

// ---------------------------------------------------------------------------
// Weight trend
// ---------------------------------------------------------------------------

/// Compare against the most recent prior consultation that recorded a
/// weight, however long ago it was. Only a loss can fire; warning only.
pub fn evaluate_weight_trend(
    current: Option<f64>,
    raw: Option<&str>,
    history: &[Consultation],
    thresholds: &AlertThresholds,
) -> Result<Option<Finding>, AlertError> {
    let Some(current) = current else {
        return Ok(None);
    };
    let Some(previous) = previous_weight(history)? else {
        return Ok(None);
    };

    let loss = previous - current;
    if loss + WEIGHT_TOLERANCE_KG < thresholds.weight_loss_threshold {
        return Ok(None);
    }

    Ok(Some(Finding {
        severity: AlertSeverity::Warning,
        parameter: AlertParameter::Weight,
        value: raw.map(str::to_string).unwrap_or_else(|| current.to_string()),
        threshold: thresholds.weight_loss_threshold.to_string(),
        message: MessageTemplates::weight_loss(loss, previous),
    }))
}

// ---------------------------------------------------------------------------
// All evaluators
// ---------------------------------------------------------------------------

/// Run every evaluator on one consultation, in a fixed order: creatinine,
/// blood pressure, eGFR, weight.
pub fn run_evaluators(
    consultation: &Consultation,
    observations: &Observations,
    thresholds: &AlertThresholds,
    history: &[Consultation],
) -> Result<Vec<Finding>, AlertError> {
    let creatinine = evaluate_creatinine(
        observations.creatinine,
        consultation.creatinine.as_deref(),
        thresholds,
    );
    let blood_pressure = evaluate_blood_pressure(observations.blood_pressure, thresholds);
    let egfr = evaluate_egfr(observations.egfr);
    let weight = evaluate_weight_trend(
        observations.weight,
        consultation.weight.as_deref(),
        history,
        thresholds,
    )?;

    Ok(creatinine
        .into_iter()
        .chain(blood_pressure)
        .chain(egfr)
        .chain(weight)
        .collect())
}
