use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_enum, parse_optional_uuid, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::{AlertParameter, AlertStatus};
use crate::models::{Alert, AlertWithPatient};

const ALERT_COLUMNS: &str = "a.id, a.patient_id, a.consultation_id, a.severity, a.status, \
     a.message, a.parameter, a.value, a.threshold, a.created_at, a.resolved_at";

/// Insert an alert row.
pub fn insert_alert(conn: &Connection, alert: &Alert) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO alerts (id, patient_id, consultation_id, severity, status, message,
         parameter, value, threshold, created_at, resolved_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            alert.id.to_string(),
            alert.patient_id.to_string(),
            alert.consultation_id.map(|id| id.to_string()),
            alert.severity.as_str(),
            alert.status.as_str(),
            alert.message,
            alert.parameter.map(|p| p.as_str()),
            alert.value,
            alert.threshold,
            format_datetime(&alert.created_at),
            alert.resolved_at.as_ref().map(format_datetime),
        ],
    )?;
    Ok(())
}

pub fn get_alert(conn: &Connection, id: &Uuid) -> Result<Option<Alert>, DatabaseError> {
    let sql = format!("SELECT {ALERT_COLUMNS} FROM alerts a WHERE a.id = ?1");
    conn.query_row(&sql, params![id.to_string()], row_to_alert)
        .optional()
        .map_err(DatabaseError::from)
}

/// All active alerts joined with their patient, newest first.
pub fn get_active_alerts(conn: &Connection) -> Result<Vec<AlertWithPatient>, DatabaseError> {
    let sql = format!(
        "SELECT {ALERT_COLUMNS}, p.full_name, p.patient_code
         FROM alerts a
         JOIN patients p ON p.id = a.patient_id
         WHERE a.status = 'active'
         ORDER BY a.created_at DESC, a.rowid DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(AlertWithPatient {
            alert: row_to_alert(row)?,
            patient_name: row.get(11)?,
            patient_code: row.get(12)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Every alert of a patient regardless of status, newest first.
pub fn get_alerts_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Alert>, DatabaseError> {
    let sql = format!(
        "SELECT {ALERT_COLUMNS} FROM alerts a
         WHERE a.patient_id = ?1
         ORDER BY a.created_at DESC, a.rowid DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![patient_id.to_string()], row_to_alert)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Active alerts of a patient, newest first.
pub fn get_active_alerts_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Alert>, DatabaseError> {
    let sql = format!(
        "SELECT {ALERT_COLUMNS} FROM alerts a
         WHERE a.patient_id = ?1 AND a.status = 'active'
         ORDER BY a.created_at DESC, a.rowid DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![patient_id.to_string()], row_to_alert)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Newest active alert for a patient on one parameter.
pub fn find_active_alert(
    conn: &Connection,
    patient_id: &Uuid,
    parameter: AlertParameter,
) -> Result<Option<Alert>, DatabaseError> {
    let sql = format!(
        "SELECT {ALERT_COLUMNS} FROM alerts a
         WHERE a.patient_id = ?1 AND a.parameter = ?2 AND a.status = 'active'
         ORDER BY a.created_at DESC, a.rowid DESC
         LIMIT 1"
    );
    conn.query_row(
        &sql,
        params![patient_id.to_string(), parameter.as_str()],
        row_to_alert,
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// Move exactly one alert from `from` to `to`, setting its resolution time.
/// The row only changes while it is still in `from`; `Ok(None)` means the
/// alert exists but has already left that status.
pub fn update_alert_status(
    conn: &Connection,
    id: &Uuid,
    from: AlertStatus,
    to: AlertStatus,
    resolved_at: Option<NaiveDateTime>,
) -> Result<Option<Alert>, DatabaseError> {
    let affected = conn.execute(
        "UPDATE alerts SET status = ?1, resolved_at = ?2 WHERE id = ?3 AND status = ?4",
        params![
            to.as_str(),
            resolved_at.as_ref().map(format_datetime),
            id.to_string(),
            from.as_str(),
        ],
    )?;
    let alert = get_alert(conn, id)?.ok_or_else(|| alert_not_found(id))?;
    Ok((affected > 0).then_some(alert))
}

/// Replace the finding carried by an existing alert: severity, message,
/// value, threshold and triggering consultation. Status and timestamps
/// are left alone.
pub fn refresh_alert(conn: &Connection, alert: &Alert) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE alerts SET consultation_id = ?1, severity = ?2, message = ?3,
         value = ?4, threshold = ?5
         WHERE id = ?6",
        params![
            alert.consultation_id.map(|id| id.to_string()),
            alert.severity.as_str(),
            alert.message,
            alert.value,
            alert.threshold,
            alert.id.to_string(),
        ],
    )?;
    if affected == 0 {
        return Err(alert_not_found(&alert.id));
    }
    Ok(())
}

fn alert_not_found(id: &Uuid) -> DatabaseError {
    DatabaseError::NotFound {
        entity_type: "alert".into(),
        id: id.to_string(),
    }
}

fn row_to_alert(row: &rusqlite::Row) -> Result<Alert, rusqlite::Error> {
    let id: String = row.get(0)?;
    let patient_id: String = row.get(1)?;
    let severity: String = row.get(3)?;
    let status: String = row.get(4)?;
    let parameter: Option<String> = row.get(6)?;
    let created: String = row.get(9)?;
    let resolved: Option<String> = row.get(10)?;

    Ok(Alert {
        id: parse_uuid(0, &id)?,
        patient_id: parse_uuid(1, &patient_id)?,
        consultation_id: parse_optional_uuid(2, row.get(2)?)?,
        severity: parse_enum(3, &severity)?,
        status: parse_enum(4, &status)?,
        message: row.get(5)?,
        parameter: parameter.map(|p| parse_enum(6, &p)).transpose()?,
        value: row.get(7)?,
        threshold: row.get(8)?,
        created_at: parse_datetime(9, &created)?,
        resolved_at: resolved.map(|r| parse_datetime(10, &r)).transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::insert_patient;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::{AlertSeverity, CkdStage};
    use crate::models::Patient;

    fn seed_patient(conn: &Connection) -> Uuid {
        let now = chrono::Local::now().naive_local();
        let patient = Patient {
            id: Uuid::new_v4(),
            full_name: "Fatou Sow".into(),
            age: 71,
            patient_code: format!("CKD-2026-{}", &Uuid::new_v4().simple().to_string()[..4]),
            ckd_stage: CkdStage::Stage4,
            medical_history: None,
            created_at: now,
            updated_at: now,
        };
        insert_patient(conn, &patient).unwrap();
        patient.id
    }

    fn make_alert(patient_id: Uuid, parameter: AlertParameter) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            patient_id,
            consultation_id: None,
            severity: AlertSeverity::Warning,
            status: AlertStatus::Active,
            message: "Elevated blood pressure: 150/92 mmHg".into(),
            parameter: Some(parameter),
            value: Some("150/92".into()),
            threshold: Some("140/90".into()),
            created_at: chrono::Local::now().naive_local(),
            resolved_at: None,
        }
    }

    #[test]
    fn insert_and_retrieve_alert() {
        let conn = open_memory_database().unwrap();
        let patient_id = seed_patient(&conn);
        let alert = make_alert(patient_id, AlertParameter::BloodPressure);
        insert_alert(&conn, &alert).unwrap();

        let loaded = get_alert(&conn, &alert.id).unwrap().unwrap();
        assert_eq!(loaded.parameter, Some(AlertParameter::BloodPressure));
        assert_eq!(loaded.value.as_deref(), Some("150/92"));
        assert_eq!(loaded.status, AlertStatus::Active);
        assert!(loaded.consultation_id.is_none());
    }

    #[test]
    fn active_alerts_join_patient() {
        let conn = open_memory_database().unwrap();
        let patient_id = seed_patient(&conn);
        insert_alert(&conn, &make_alert(patient_id, AlertParameter::Egfr)).unwrap();

        let active = get_active_alerts(&conn).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].patient_name, "Fatou Sow");
    }

    #[test]
    fn resolve_sets_timestamp_and_leaves_active_list() {
        let conn = open_memory_database().unwrap();
        let patient_id = seed_patient(&conn);
        let alert = make_alert(patient_id, AlertParameter::Weight);
        insert_alert(&conn, &alert).unwrap();

        let now =
            NaiveDateTime::parse_from_str("2026-04-02 11:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let updated = update_alert_status(
            &conn,
            &alert.id,
            AlertStatus::Active,
            AlertStatus::Resolved,
            Some(now),
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.status, AlertStatus::Resolved);
        assert_eq!(updated.resolved_at, Some(now));

        assert!(get_active_alerts(&conn).unwrap().is_empty());
        assert_eq!(get_alerts_by_patient(&conn, &patient_id).unwrap().len(), 1);
    }

    #[test]
    fn update_missing_alert_fails() {
        let conn = open_memory_database().unwrap();
        let result = update_alert_status(
            &conn,
            &Uuid::new_v4(),
            AlertStatus::Active,
            AlertStatus::Acknowledged,
            None,
        );
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn update_from_stale_status_leaves_row_untouched() {
        let conn = open_memory_database().unwrap();
        let patient_id = seed_patient(&conn);
        let alert = make_alert(patient_id, AlertParameter::Egfr);
        insert_alert(&conn, &alert).unwrap();

        let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        let (first, later) = (at("2026-04-02 11:30:00"), at("2026-04-02 14:00:00"));
        let resolved = update_alert_status(
            &conn,
            &alert.id,
            AlertStatus::Active,
            AlertStatus::Resolved,
            Some(first),
        )
        .unwrap();
        assert!(resolved.is_some());

        // A second writer that still believes the alert is active.
        let stale = update_alert_status(
            &conn,
            &alert.id,
            AlertStatus::Active,
            AlertStatus::Resolved,
            Some(later),
        )
        .unwrap();
        assert!(stale.is_none());
        assert_eq!(get_alert(&conn, &alert.id).unwrap().unwrap().resolved_at, Some(first));
    }

    #[test]
    fn find_active_alert_ignores_other_parameters_and_statuses() {
        let conn = open_memory_database().unwrap();
        let patient_id = seed_patient(&conn);

        let acknowledged = make_alert(patient_id, AlertParameter::Creatinine);
        insert_alert(&conn, &acknowledged).unwrap();
        update_alert_status(
            &conn,
            &acknowledged.id,
            AlertStatus::Active,
            AlertStatus::Acknowledged,
            None,
        )
        .unwrap();
        insert_alert(&conn, &make_alert(patient_id, AlertParameter::Egfr)).unwrap();

        assert!(find_active_alert(&conn, &patient_id, AlertParameter::Creatinine)
            .unwrap()
            .is_none());
        assert!(find_active_alert(&conn, &patient_id, AlertParameter::Egfr)
            .unwrap()
            .is_some());
    }

    #[test]
    fn refresh_replaces_finding_fields_only() {
        let conn = open_memory_database().unwrap();
        let patient_id = seed_patient(&conn);
        let mut alert = make_alert(patient_id, AlertParameter::BloodPressure);
        insert_alert(&conn, &alert).unwrap();

        alert.severity = AlertSeverity::Critical;
        alert.value = Some("185/95".into());
        alert.threshold = Some("180/110".into());
        alert.status = AlertStatus::Resolved;
        refresh_alert(&conn, &alert).unwrap();

        let loaded = get_alert(&conn, &alert.id).unwrap().unwrap();
        assert_eq!(loaded.severity, AlertSeverity::Critical);
        assert_eq!(loaded.value.as_deref(), Some("185/95"));
        assert_eq!(loaded.status, AlertStatus::Active);
    }
}
