use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-patient threshold overrides. Every field is optional; an absent
/// field falls back to the system default at resolution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfiguration {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub creatinine_critical: Option<f64>,
    pub creatinine_warning: Option<f64>,
    pub systolic_critical: Option<i64>,
    pub systolic_warning: Option<i64>,
    pub diastolic_critical: Option<i64>,
    pub diastolic_warning: Option<i64>,
    /// kg lost since the previous weighed consultation.
    pub weight_loss_threshold: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ThresholdConfiguration {
    /// An override record with no fields set (all defaults).
    pub fn empty(patient_id: Uuid) -> Self {
        let now = chrono::Local::now().naive_local();
        Self {
            id: Uuid::new_v4(),
            patient_id,
            creatinine_critical: None,
            creatinine_warning: None,
            systolic_critical: None,
            systolic_warning: None,
            diastolic_critical: None,
            diastolic_warning: None,
            weight_loss_threshold: None,
            created_at: now,
            updated_at: now,
        }
    }
}
