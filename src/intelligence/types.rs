use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{AlertParameter, AlertSeverity, AlertStatus};
use crate::models::{Alert, Consultation, ThresholdConfiguration};

use super::reference::AlertThresholds;

// ---------------------------------------------------------------------------
// Finding
// ---------------------------------------------------------------------------

/// One evaluator's verdict on one consultation, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: AlertSeverity,
    pub parameter: AlertParameter,
    /// Observed value as text; blood pressure is `"sys/dia"`.
    pub value: String,
    /// Crossed threshold as text; blood pressure is `"sys/dia"`.
    pub threshold: String,
    pub message: String,
}

impl Finding {
    /// Turn the finding into a fresh `active` alert.
    pub fn into_alert(
        self,
        patient_id: Uuid,
        consultation_id: Option<Uuid>,
        created_at: NaiveDateTime,
    ) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            patient_id,
            consultation_id,
            severity: self.severity,
            status: AlertStatus::Active,
            message: self.message,
            parameter: Some(self.parameter),
            value: Some(self.value),
            threshold: Some(self.threshold),
            created_at,
            resolved_at: None,
        }
    }
}

// ---------------------------------------------------------------------------
// EvaluationResult
// ---------------------------------------------------------------------------

/// Outcome of one aggregation pass over a recorded consultation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub consultation_id: Uuid,
    pub findings: Vec<Finding>,
    /// Alert rows as written: new inserts, or refreshed rows under
    /// `DuplicatePolicy::RefreshActive`.
    pub alerts: Vec<Alert>,
    pub processing_time_ms: u64,
}

// ---------------------------------------------------------------------------
// Engine configuration
// ---------------------------------------------------------------------------

/// What to do when a finding matches an alert that is still `active`
/// for the same patient and parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Always write a new alert row.
    #[default]
    AlwaysInsert,
    /// Update the existing active alert with the new finding.
    RefreshActive,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Used for every threshold a patient does not override.
    pub defaults: AlertThresholds,
    pub duplicate_policy: DuplicatePolicy,
}

// ---------------------------------------------------------------------------
// AlertError
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Threshold configuration unavailable for patient {patient_id}: {reason}")]
    ConfigResolution { patient_id: Uuid, reason: String },

    #[error("Invalid observation for {field}: {value:?}")]
    InvalidObservation { field: &'static str, value: String },

    #[error("Alert {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: Uuid,
        from: AlertStatus,
        to: AlertStatus,
    },

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Reference data load failed ({0}): {1}")]
    ReferenceDataLoad(String, String),

    #[error("Reference data parse failed ({0}): {1}")]
    ReferenceDataParse(String, String),

    #[error("Internal lock failed")]
    LockFailed,
}

impl From<rusqlite::Error> for AlertError {
    fn from(e: rusqlite::Error) -> Self {
        AlertError::Database(DatabaseError::Sqlite(e))
    }
}

// ---------------------------------------------------------------------------
// ClinicalStore: the engine's view of persistence
// ---------------------------------------------------------------------------

/// Reads and writes the engine needs from the patient record store.
pub trait ClinicalStore {
    /// The patient's stored threshold overrides, if any.
    fn threshold_configuration(
        &self,
        patient_id: &Uuid,
    ) -> Result<Option<ThresholdConfiguration>, AlertError>;

    /// All consultations of the patient, most recent first.
    fn consultation_history(&self, patient_id: &Uuid) -> Result<Vec<Consultation>, AlertError>;

    /// Write a finding set atomically: either every alert is stored or none.
    /// Returns the rows as written.
    fn persist_alerts(
        &self,
        alerts: Vec<Alert>,
        policy: DuplicatePolicy,
    ) -> Result<Vec<Alert>, AlertError>;

    fn get_alert(&self, alert_id: &Uuid) -> Result<Option<Alert>, AlertError>;

    /// Move exactly one alert from `from` to `to`. The status check and the
    /// write are one step: an alert no longer in `from` is
    /// `InvalidTransition` and is left untouched. Missing alert is `NotFound`.
    fn update_alert_status(
        &self,
        alert_id: &Uuid,
        from: AlertStatus,
        to: AlertStatus,
        resolved_at: Option<NaiveDateTime>,
    ) -> Result<Alert, AlertError>;
}

// ---------------------------------------------------------------------------
// AlertEngine trait
// ---------------------------------------------------------------------------

/// The clinical alert engine.
pub trait AlertEngine {
    /// Evaluate a consultation that has just been stored and persist the
    /// resulting alerts. Runs synchronously in the intake path.
    fn on_consultation_recorded(
        &self,
        consultation: &Consultation,
    ) -> Result<EvaluationResult, AlertError>;

    /// Evaluate a consultation against explicit history without writing.
    fn evaluate(
        &self,
        consultation: &Consultation,
        history: &[Consultation],
    ) -> Result<Vec<Finding>, AlertError>;

    /// Effective thresholds for a patient.
    fn resolve_thresholds(&self, patient_id: &Uuid) -> Result<AlertThresholds, AlertError>;

    /// Move an `active` alert to `acknowledged`.
    fn acknowledge(&self, alert_id: &Uuid) -> Result<Alert, AlertError>;

    /// Move an `active` or `acknowledged` alert to `resolved`.
    fn resolve(&self, alert_id: &Uuid) -> Result<Alert, AlertError>;
}
