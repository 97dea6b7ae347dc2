//! Read-only data contracts for the dashboard and the per-patient report.
//!
//! Builds the views from the SQLite database; rendering is left to the
//! consumer (the binary prints them as JSON).

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{repository, DatabaseError};
use crate::intelligence::reference::AlertThresholds;
use crate::intelligence::thresholds::merge_thresholds;
use crate::models::{
    Alert, AlertWithPatient, Consultation, ConsultationWithPatient, DashboardStats, Patient,
};

/// How many consultations the dashboard activity feed shows.
pub const RECENT_CONSULTATIONS_LIMIT: usize = 5;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything the clinician dashboard shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub active_alerts: Vec<AlertWithPatient>,
    pub recent_consultations: Vec<ConsultationWithPatient>,
}

/// Input of the consultation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientReport {
    pub patient: Patient,
    pub latest_consultation: Option<Consultation>,
    pub active_alerts: Vec<Alert>,
    /// Thresholds the engine would apply to this patient right now.
    pub thresholds: AlertThresholds,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn build_dashboard(conn: &Connection, today: NaiveDate) -> Result<Dashboard, DatabaseError> {
    Ok(Dashboard {
        stats: repository::get_dashboard_stats(conn, today)?,
        active_alerts: repository::get_active_alerts(conn)?,
        recent_consultations: repository::get_recent_consultations(
            conn,
            RECENT_CONSULTATIONS_LIMIT,
        )?,
    })
}

pub fn build_patient_report(
    conn: &Connection,
    patient_id: &Uuid,
    defaults: &AlertThresholds,
) -> Result<PatientReport, DatabaseError> {
    let patient = repository::get_patient(conn, patient_id)?.ok_or_else(|| {
        DatabaseError::NotFound {
            entity_type: "patient".into(),
            id: patient_id.to_string(),
        }
    })?;
    let config = repository::get_threshold_configuration(conn, patient_id)?;

    Ok(PatientReport {
        latest_consultation: repository::get_latest_consultation(conn, patient_id)?,
        active_alerts: repository::get_active_alerts_for_patient(conn, patient_id)?,
        thresholds: merge_thresholds(defaults, config.as_ref()),
        patient,
    })
}
