use chrono::{Datelike, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_enum, parse_uuid};
use crate::db::DatabaseError;
use crate::models::{Patient, ThresholdConfiguration};

use super::threshold::insert_threshold_configuration;

const PATIENT_COLUMNS: &str =
    "id, full_name, age, patient_code, ckd_stage, medical_history, created_at, updated_at";

/// Build a human-facing patient code such as `CKD-2026-417`.
pub fn generate_patient_code(now: &NaiveDateTime) -> String {
    let millis = now.and_utc().timestamp_millis().rem_euclid(1000);
    format!("CKD-{}-{:03}", now.year(), millis)
}

/// Insert a patient together with an empty threshold configuration,
/// so the patient starts on system defaults.
pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO patients (id, full_name, age, patient_code, ckd_stage, medical_history,
         created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            patient.id.to_string(),
            patient.full_name,
            patient.age,
            patient.patient_code,
            patient.ckd_stage.as_str(),
            patient.medical_history,
            format_datetime(&patient.created_at),
            format_datetime(&patient.updated_at),
        ],
    )?;
    insert_threshold_configuration(&tx, &ThresholdConfiguration::empty(patient.id))?;
    tx.commit()?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?1");
    conn.query_row(&sql, params![id.to_string()], row_to_patient)
        .optional()
        .map_err(DatabaseError::from)
}

/// All patients, most recently updated first.
pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients ORDER BY updated_at DESC, rowid DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_patient)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Overwrite the editable fields of a patient and bump `updated_at`.
pub fn update_patient(conn: &Connection, patient: &Patient) -> Result<Patient, DatabaseError> {
    let now = chrono::Local::now().naive_local();
    let affected = conn.execute(
        "UPDATE patients SET full_name = ?1, age = ?2, patient_code = ?3, ckd_stage = ?4,
         medical_history = ?5, updated_at = ?6
         WHERE id = ?7",
        params![
            patient.full_name,
            patient.age,
            patient.patient_code,
            patient.ckd_stage.as_str(),
            patient.medical_history,
            format_datetime(&now),
            patient.id.to_string(),
        ],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "patient".into(),
            id: patient.id.to_string(),
        });
    }
    get_patient(conn, &patient.id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "patient".into(),
        id: patient.id.to_string(),
    })
}

/// Delete a patient and everything it owns: alerts, consultations and
/// threshold configuration. Alerts go first since they reference consultations.
pub fn delete_patient(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    let id_str = id.to_string();
    tx.execute("DELETE FROM alerts WHERE patient_id = ?1", params![id_str])?;
    tx.execute("DELETE FROM consultations WHERE patient_id = ?1", params![id_str])?;
    tx.execute("DELETE FROM alert_configurations WHERE patient_id = ?1", params![id_str])?;
    let affected = tx.execute("DELETE FROM patients WHERE id = ?1", params![id_str])?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "patient".into(),
            id: id_str,
        });
    }
    tx.commit()?;
    Ok(())
}

fn row_to_patient(row: &rusqlite::Row) -> Result<Patient, rusqlite::Error> {
    let id: String = row.get(0)?;
    let stage: String = row.get(4)?;
    let created: String = row.get(6)?;
    let updated: String = row.get(7)?;

    Ok(Patient {
        id: parse_uuid(0, &id)?,
        full_name: row.get(1)?,
        age: row.get(2)?,
        patient_code: row.get(3)?,
        ckd_stage: parse_enum(4, &stage)?,
        medical_history: row.get(5)?,
        created_at: parse_datetime(6, &created)?,
        updated_at: parse_datetime(7, &updated)?,
    })
}
