use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Clinical measurements taken at one visit. Immutable once recorded.
///
/// Decimal measurements keep the text they were entered with; they are
/// parsed into typed observations only when the alert engine evaluates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    pub id: Uuid,
    pub patient_id: Uuid,
    /// mg/dL
    pub creatinine: Option<String>,
    /// mL/min/1.73m²
    pub egfr: Option<i64>,
    /// mmHg
    pub systolic: Option<i64>,
    /// mmHg
    pub diastolic: Option<i64>,
    /// kg
    pub weight: Option<String>,
    pub clinical_notes: Option<String>,
    pub consultation_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl Consultation {
    /// A consultation with no measurements, dated now.
    pub fn new(patient_id: Uuid) -> Self {
        let now = chrono::Local::now().naive_local();
        Self {
            id: Uuid::new_v4(),
            patient_id,
            creatinine: None,
            egfr: None,
            systolic: None,
            diastolic: None,
            weight: None,
            clinical_notes: None,
            consultation_date: now,
            created_at: now,
        }
    }
}

/// A consultation joined with its patient (recent-activity feed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationWithPatient {
    pub consultation: Consultation,
    pub patient_name: String,
    pub patient_code: String,
}
