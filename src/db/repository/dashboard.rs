use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection};

use super::format_datetime;
use crate::db::DatabaseError;
use crate::models::DashboardStats;

/// Dashboard counters. `today` bounds the consultations-today window
/// (midnight to midnight, local time).
pub fn get_dashboard_stats(
    conn: &Connection,
    today: NaiveDate,
) -> Result<DashboardStats, DatabaseError> {
    let start = today.and_hms_opt(0, 0, 0).unwrap_or_default();
    let end = start + Duration::days(1);

    let total_patients: i64 =
        conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    let active_alerts: i64 = conn.query_row(
        "SELECT COUNT(*) FROM alerts WHERE status = 'active'",
        [],
        |row| row.get(0),
    )?;
    let today_consultations: i64 = conn.query_row(
        "SELECT COUNT(*) FROM consultations
         WHERE consultation_date >= ?1 AND consultation_date < ?2",
        params![format_datetime(&start), format_datetime(&end)],
        |row| row.get(0),
    )?;
    let reports_generated: i64 =
        conn.query_row("SELECT COUNT(*) FROM consultations", [], |row| row.get(0))?;

    Ok(DashboardStats {
        total_patients,
        active_alerts,
        today_consultations,
        reports_generated,
    })
}
