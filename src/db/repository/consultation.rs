use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::{Consultation, ConsultationWithPatient};

const CONSULTATION_COLUMNS: &str = "c.id, c.patient_id, c.creatinine, c.egfr, c.systolic, \
     c.diastolic, c.weight, c.clinical_notes, c.consultation_date, c.created_at";

pub fn insert_consultation(conn: &Connection, c: &Consultation) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO consultations (id, patient_id, creatinine, egfr, systolic, diastolic,
         weight, clinical_notes, consultation_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            c.id.to_string(),
            c.patient_id.to_string(),
            c.creatinine,
            c.egfr,
            c.systolic,
            c.diastolic,
            c.weight,
            c.clinical_notes,
            format_datetime(&c.consultation_date),
            format_datetime(&c.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_consultation(conn: &Connection, id: &Uuid) -> Result<Option<Consultation>, DatabaseError> {
    let sql = format!("SELECT {CONSULTATION_COLUMNS} FROM consultations c WHERE c.id = ?1");
    conn.query_row(&sql, params![id.to_string()], row_to_consultation)
        .optional()
        .map_err(DatabaseError::from)
}

/// All consultations of a patient, most recent first.
pub fn get_consultations_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Consultation>, DatabaseError> {
    let sql = format!(
        "SELECT {CONSULTATION_COLUMNS} FROM consultations c
         WHERE c.patient_id = ?1
         ORDER BY c.consultation_date DESC, c.created_at DESC, c.rowid DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![patient_id.to_string()], row_to_consultation)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Most recent consultation of a patient, if any.
pub fn get_latest_consultation(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Option<Consultation>, DatabaseError> {
    let sql = format!(
        "SELECT {CONSULTATION_COLUMNS} FROM consultations c
         WHERE c.patient_id = ?1
         ORDER BY c.consultation_date DESC, c.created_at DESC, c.rowid DESC
         LIMIT 1"
    );
    conn.query_row(&sql, params![patient_id.to_string()], row_to_consultation)
        .optional()
        .map_err(DatabaseError::from)
}

/// Latest consultations across all patients, joined with the patient.
pub fn get_recent_consultations(
    conn: &Connection,
    limit: usize,
) -> Result<Vec<ConsultationWithPatient>, DatabaseError> {
    let sql = format!(
        "SELECT {CONSULTATION_COLUMNS}, p.full_name, p.patient_code
         FROM consultations c
         JOIN patients p ON p.id = c.patient_id
         ORDER BY c.consultation_date DESC, c.created_at DESC, c.rowid DESC
         LIMIT ?1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok(ConsultationWithPatient {
            consultation: row_to_consultation(row)?,
            patient_name: row.get(10)?,
            patient_code: row.get(11)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub(crate) fn row_to_consultation(row: &rusqlite::Row) -> Result<Consultation, rusqlite::Error> {
    let id: String = row.get(0)?;
    let patient_id: String = row.get(1)?;
    let date: String = row.get(8)?;
    let created: String = row.get(9)?;

    Ok(Consultation {
        id: parse_uuid(0, &id)?,
        patient_id: parse_uuid(1, &patient_id)?,
        creatinine: row.get(2)?,
        egfr: row.get(3)?,
        systolic: row.get(4)?,
        diastolic: row.get(5)?,
        weight: row.get(6)?,
        clinical_notes: row.get(7)?,
        consultation_date: parse_datetime(8, &date)?,
        created_at: parse_datetime(9, &created)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDateTime};

    use super::*;
    use crate::db::repository::insert_patient;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::CkdStage;
    use crate::models::Patient;

    fn seed_patient(conn: &Connection, code: &str) -> Uuid {
        let now = chrono::Local::now().naive_local();
        let patient = Patient {
            id: Uuid::new_v4(),
            full_name: format!("Patient {code}"),
            age: 47,
            patient_code: code.into(),
            ckd_stage: CkdStage::Stage3a,
            medical_history: None,
            created_at: now,
            updated_at: now,
        };
        insert_patient(conn, &patient).unwrap();
        patient.id
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn insert_and_retrieve_keeps_decimal_text() {
        let conn = open_memory_database().unwrap();
        let patient_id = seed_patient(&conn, "CKD-2026-201");

        let mut c = Consultation::new(patient_id);
        c.creatinine = Some("2.50".into());
        c.weight = Some("71.30".into());
        c.systolic = Some(142);
        c.diastolic = Some(88);
        insert_consultation(&conn, &c).unwrap();

        let loaded = get_consultation(&conn, &c.id).unwrap().unwrap();
        assert_eq!(loaded.creatinine.as_deref(), Some("2.50"));
        assert_eq!(loaded.weight.as_deref(), Some("71.30"));
        assert_eq!(loaded.systolic, Some(142));
        assert_eq!(loaded.egfr, None);
    }

    #[test]
    fn history_is_most_recent_first() {
        let conn = open_memory_database().unwrap();
        let patient_id = seed_patient(&conn, "CKD-2026-202");
        let base = at("2026-01-10 09:00:00");

        for days in [0, 14, 7] {
            let mut c = Consultation::new(patient_id);
            c.consultation_date = base + Duration::days(days);
            insert_consultation(&conn, &c).unwrap();
        }

        let history = get_consultations_by_patient(&conn, &patient_id).unwrap();
        let dates: Vec<_> = history.iter().map(|c| c.consultation_date).collect();
        assert_eq!(
            dates,
            vec![base + Duration::days(14), base + Duration::days(7), base]
        );

        let latest = get_latest_consultation(&conn, &patient_id).unwrap().unwrap();
        assert_eq!(latest.consultation_date, base + Duration::days(14));
    }

    #[test]
    fn consultation_requires_existing_patient() {
        let conn = open_memory_database().unwrap();
        let c = Consultation::new(Uuid::new_v4());
        assert!(insert_consultation(&conn, &c).is_err());
    }

    #[test]
    fn recent_consultations_join_patient_and_limit() {
        let conn = open_memory_database().unwrap();
        let a = seed_patient(&conn, "CKD-2026-203");
        let b = seed_patient(&conn, "CKD-2026-204");

        for (patient_id, date) in [
            (a, "2026-02-01 08:00:00"),
            (b, "2026-02-03 08:00:00"),
            (a, "2026-02-05 08:00:00"),
        ] {
            let mut c = Consultation::new(patient_id);
            c.consultation_date = at(date);
            insert_consultation(&conn, &c).unwrap();
        }

        let recent = get_recent_consultations(&conn, 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].patient_code, "CKD-2026-203");
        assert_eq!(recent[1].patient_code, "CKD-2026-204");
    }
}
