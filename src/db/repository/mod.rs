//! Repository layer: entity-scoped database operations.
//!
//! Every function takes a borrowed `Connection` so callers decide
//! transaction boundaries. All public functions are re-exported here.

mod alert;
mod consultation;
mod dashboard;
mod patient;
mod threshold;

use std::str::FromStr;

use chrono::NaiveDateTime;
use uuid::Uuid;

use super::DatabaseError;

// Re-export all public items from sub-modules
pub use alert::*;
pub use consultation::*;
pub use dashboard::*;
pub use patient::*;
pub use threshold::*;

/// Storage format for every timestamp column.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

fn conversion_failure<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

pub(crate) fn parse_uuid(idx: usize, s: &str) -> Result<Uuid, rusqlite::Error> {
    Uuid::parse_str(s).map_err(|e| conversion_failure(idx, e))
}

pub(crate) fn parse_optional_uuid(
    idx: usize,
    s: Option<String>,
) -> Result<Option<Uuid>, rusqlite::Error> {
    s.map(|s| parse_uuid(idx, &s)).transpose()
}

pub(crate) fn parse_datetime(idx: usize, s: &str) -> Result<NaiveDateTime, rusqlite::Error> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).map_err(|e| conversion_failure(idx, e))
}

pub(crate) fn parse_enum<T>(idx: usize, s: &str) -> Result<T, rusqlite::Error>
where
    T: FromStr<Err = DatabaseError>,
{
    T::from_str(s).map_err(|e| conversion_failure(idx, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::*;
    use crate::models::*;

    fn make_patient(code: &str) -> Patient {
        let now = chrono::Local::now().naive_local();
        Patient {
            id: Uuid::new_v4(),
            full_name: "Awa Diallo".into(),
            age: 58,
            patient_code: code.into(),
            ckd_stage: CkdStage::Stage4,
            medical_history: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn datetime_round_trip_drops_subseconds() {
        let dt = NaiveDateTime::parse_from_str("2026-03-01 08:15:42", DATETIME_FORMAT).unwrap();
        let stored = format_datetime(&dt);
        assert_eq!(stored, "2026-03-01 08:15:42");
        assert_eq!(parse_datetime(0, &stored).unwrap(), dt);
    }

    #[test]
    fn invalid_enum_surfaces_as_conversion_failure() {
        let result: Result<AlertStatus, _> = parse_enum(5, "closed");
        assert!(matches!(
            result,
            Err(rusqlite::Error::FromSqlConversionFailure(5, _, _))
        ));
    }

    /// Deleting a patient removes everything it owns.
    #[test]
    fn delete_patient_cascades_to_owned_rows() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient("CKD-2026-001");
        insert_patient(&conn, &patient).unwrap();

        let mut consultation = Consultation::new(patient.id);
        consultation.creatinine = Some("3.40".into());
        insert_consultation(&conn, &consultation).unwrap();

        insert_alert(
            &conn,
            &Alert {
                id: Uuid::new_v4(),
                patient_id: patient.id,
                consultation_id: Some(consultation.id),
                severity: AlertSeverity::Critical,
                status: AlertStatus::Active,
                message: "Critical creatinine level".into(),
                parameter: Some(AlertParameter::Creatinine),
                value: Some("3.40".into()),
                threshold: Some("3".into()),
                created_at: chrono::Local::now().naive_local(),
                resolved_at: None,
            },
        )
        .unwrap();

        delete_patient(&conn, &patient.id).unwrap();

        assert!(get_patient(&conn, &patient.id).unwrap().is_none());
        assert!(get_consultations_by_patient(&conn, &patient.id).unwrap().is_empty());
        assert!(get_alerts_by_patient(&conn, &patient.id).unwrap().is_empty());
        assert!(get_threshold_configuration(&conn, &patient.id).unwrap().is_none());
    }
}
