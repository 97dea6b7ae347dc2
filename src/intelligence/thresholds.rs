use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository;
use crate::models::ThresholdConfiguration;

use super::reference::AlertThresholds;
use super::types::{AlertError, ClinicalStore};

/// Overlay a patient's stored overrides on the defaults. A present override
/// always wins, even zero.
pub fn merge_thresholds(
    defaults: &AlertThresholds,
    config: Option<&ThresholdConfiguration>,
) -> AlertThresholds {
    let Some(config) = config else {
        return *defaults;
    };

    AlertThresholds {
        creatinine_critical: config.creatinine_critical.unwrap_or(defaults.creatinine_critical),
        creatinine_warning: config.creatinine_warning.unwrap_or(defaults.creatinine_warning),
        systolic_critical: config.systolic_critical.unwrap_or(defaults.systolic_critical),
        systolic_warning: config.systolic_warning.unwrap_or(defaults.systolic_warning),
        diastolic_critical: config.diastolic_critical.unwrap_or(defaults.diastolic_critical),
        diastolic_warning: config.diastolic_warning.unwrap_or(defaults.diastolic_warning),
        weight_loss_threshold: config
            .weight_loss_threshold
            .unwrap_or(defaults.weight_loss_threshold),
    }
}

/// Effective thresholds for a patient. Fails only when the store cannot
/// be read.
pub fn resolve_thresholds<S: ClinicalStore + ?Sized>(
    store: &S,
    defaults: &AlertThresholds,
    patient_id: &Uuid,
) -> Result<AlertThresholds, AlertError> {
    let config = store
        .threshold_configuration(patient_id)
        .map_err(|e| AlertError::ConfigResolution {
            patient_id: *patient_id,
            reason: e.to_string(),
        })?;

    Ok(merge_thresholds(defaults, config.as_ref()))
}

/// Save a patient's overrides. A critical threshold that ends up below its
/// warning threshold, once merged with `defaults`, is stored anyway and
/// logged: the warning tier for that parameter can then never fire.
pub fn configure_thresholds(
    conn: &Connection,
    defaults: &AlertThresholds,
    config: &ThresholdConfiguration,
) -> Result<ThresholdConfiguration, AlertError> {
    for pair in merge_thresholds(defaults, Some(config)).inverted_pairs() {
        tracing::warn!(
            patient_id = %config.patient_id,
            parameter = pair,
            "Critical threshold is below warning threshold"
        );
    }

    let stored = repository::upsert_threshold_configuration(conn, config)?;
    tracing::info!(patient_id = %config.patient_id, "Alert thresholds configured");
    Ok(stored)
}
