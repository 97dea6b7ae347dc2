use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AlertParameter, AlertSeverity, AlertStatus};

/// A persisted clinical alert.
///
/// `value` and `threshold` are text because blood pressure findings are
/// composite (`"138/92"` against `"140/90"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub consultation_id: Option<Uuid>,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    pub message: String,
    pub parameter: Option<AlertParameter>,
    pub value: Option<String>,
    pub threshold: Option<String>,
    pub created_at: NaiveDateTime,
    pub resolved_at: Option<NaiveDateTime>,
}

/// An active alert joined with the patient it concerns (dashboard feed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertWithPatient {
    pub alert: Alert,
    pub patient_name: String,
    pub patient_code: String,
}
