use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::CkdStage;

/// A patient followed for chronic kidney disease.
/// `patient_code` is the human-facing identifier (e.g. `CKD-2026-417`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub full_name: String,
    pub age: i32,
    pub patient_code: String,
    pub ckd_stage: CkdStage,
    pub medical_history: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
