use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::ThresholdConfiguration;

const THRESHOLD_COLUMNS: &str = "id, patient_id, creatinine_critical, creatinine_warning, \
     systolic_critical, systolic_warning, diastolic_critical, diastolic_warning, \
     weight_loss_threshold, created_at, updated_at";

pub fn get_threshold_configuration(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Option<ThresholdConfiguration>, DatabaseError> {
    let sql = format!("SELECT {THRESHOLD_COLUMNS} FROM alert_configurations WHERE patient_id = ?1");
    conn.query_row(&sql, params![patient_id.to_string()], row_to_threshold_configuration)
        .optional()
        .map_err(DatabaseError::from)
}

pub(crate) fn insert_threshold_configuration(
    conn: &Connection,
    config: &ThresholdConfiguration,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO alert_configurations (id, patient_id, creatinine_critical, creatinine_warning,
         systolic_critical, systolic_warning, diastolic_critical, diastolic_warning,
         weight_loss_threshold, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            config.id.to_string(),
            config.patient_id.to_string(),
            config.creatinine_critical,
            config.creatinine_warning,
            config.systolic_critical,
            config.systolic_warning,
            config.diastolic_critical,
            config.diastolic_warning,
            config.weight_loss_threshold,
            format_datetime(&config.created_at),
            format_datetime(&config.updated_at),
        ],
    )?;
    Ok(())
}

/// Create the patient's threshold configuration, or overwrite it in place.
/// No history is kept. Values are stored as given.
pub fn upsert_threshold_configuration(
    conn: &Connection,
    config: &ThresholdConfiguration,
) -> Result<ThresholdConfiguration, DatabaseError> {
    let now = chrono::Local::now().naive_local();
    let affected = conn.execute(
        "UPDATE alert_configurations SET creatinine_critical = ?1, creatinine_warning = ?2,
         systolic_critical = ?3, systolic_warning = ?4, diastolic_critical = ?5,
         diastolic_warning = ?6, weight_loss_threshold = ?7, updated_at = ?8
         WHERE patient_id = ?9",
        params![
            config.creatinine_critical,
            config.creatinine_warning,
            config.systolic_critical,
            config.systolic_warning,
            config.diastolic_critical,
            config.diastolic_warning,
            config.weight_loss_threshold,
            format_datetime(&now),
            config.patient_id.to_string(),
        ],
    )?;

    if affected == 0 {
        insert_threshold_configuration(conn, config)?;
    }

    get_threshold_configuration(conn, &config.patient_id)?.ok_or_else(|| {
        DatabaseError::NotFound {
            entity_type: "alert_configuration".into(),
            id: config.patient_id.to_string(),
        }
    })
}

fn row_to_threshold_configuration(
    row: &rusqlite::Row,
) -> Result<ThresholdConfiguration, rusqlite::Error> {
    let id: String = row.get(0)?;
    let patient_id: String = row.get(1)?;
    let created: String = row.get(9)?;
    let updated: String = row.get(10)?;

    Ok(ThresholdConfiguration {
        id: parse_uuid(0, &id)?,
        patient_id: parse_uuid(1, &patient_id)?,
        creatinine_critical: row.get(2)?,
        creatinine_warning: row.get(3)?,
        systolic_critical: row.get(4)?,
        systolic_warning: row.get(5)?,
        diastolic_critical: row.get(6)?,
        diastolic_warning: row.get(7)?,
        weight_loss_threshold: row.get(8)?,
        created_at: parse_datetime(9, &created)?,
        updated_at: parse_datetime(10, &updated)?,
    })
}
