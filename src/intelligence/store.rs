use std::collections::HashMap;
use std::sync::RwLock;

use chrono::NaiveDateTime;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{repository, DatabaseError};
use crate::models::enums::AlertStatus;
use crate::models::{Alert, Consultation, ThresholdConfiguration};

use super::types::{AlertError, ClinicalStore, DuplicatePolicy};

/// Copy the finding carried by `incoming` onto an existing alert, keeping
/// its identity, status and timestamps.
fn refreshed(existing: &Alert, incoming: Alert) -> Alert {
    tracing::warn!(
        alert_id = %existing.id,
        patient_id = %existing.patient_id,
        parameter = existing.parameter.map(|p| p.as_str()).unwrap_or("none"),
        "Refreshing active alert instead of inserting a duplicate"
    );
    Alert {
        consultation_id: incoming.consultation_id,
        severity: incoming.severity,
        message: incoming.message,
        value: incoming.value,
        threshold: incoming.threshold,
        ..existing.clone()
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryState {
    thresholds: HashMap<Uuid, ThresholdConfiguration>,
    /// Insertion order; history queries sort on read.
    consultations: Vec<Consultation>,
    alerts: Vec<Alert>,
}

/// In-memory clinical store backed by RwLock. Used by tests and by callers
/// that keep patient records elsewhere.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) a patient's threshold overrides.
    pub fn put_threshold_configuration(
        &self,
        config: ThresholdConfiguration,
    ) -> Result<(), AlertError> {
        let mut state = self.state.write().map_err(|_| AlertError::LockFailed)?;
        state.thresholds.insert(config.patient_id, config);
        Ok(())
    }

    pub fn record_consultation(&self, consultation: Consultation) -> Result<(), AlertError> {
        let mut state = self.state.write().map_err(|_| AlertError::LockFailed)?;
        state.consultations.push(consultation);
        Ok(())
    }

    /// Every stored alert, in insertion order.
    pub fn alerts(&self) -> Result<Vec<Alert>, AlertError> {
        let state = self.state.read().map_err(|_| AlertError::LockFailed)?;
        Ok(state.alerts.clone())
    }
}

impl ClinicalStore for MemoryStore {
    fn threshold_configuration(
        &self,
        patient_id: &Uuid,
    ) -> Result<Option<ThresholdConfiguration>, AlertError> {
        let state = self.state.read().map_err(|_| AlertError::LockFailed)?;
        Ok(state.thresholds.get(patient_id).cloned())
    }

    fn consultation_history(&self, patient_id: &Uuid) -> Result<Vec<Consultation>, AlertError> {
        let state = self.state.read().map_err(|_| AlertError::LockFailed)?;
        let mut history: Vec<(usize, Consultation)> = state
            .consultations
            .iter()
            .enumerate()
            .filter(|(_, c)| c.patient_id == *patient_id)
            .map(|(i, c)| (i, c.clone()))
            .collect();
        history.sort_by(|(ia, a), (ib, b)| {
            b.consultation_date
                .cmp(&a.consultation_date)
                .then(b.created_at.cmp(&a.created_at))
                .then(ib.cmp(ia))
        });
        Ok(history.into_iter().map(|(_, c)| c).collect())
    }

    fn persist_alerts(
        &self,
        alerts: Vec<Alert>,
        policy: DuplicatePolicy,
    ) -> Result<Vec<Alert>, AlertError> {
        let mut state = self.state.write().map_err(|_| AlertError::LockFailed)?;

        // Plan every write before applying any, so a batch lands whole.
        let mut written = Vec::with_capacity(alerts.len());
        let mut refreshes = Vec::new();
        let mut inserts = Vec::new();
        for alert in alerts {
            let existing = match policy {
                DuplicatePolicy::AlwaysInsert => None,
                DuplicatePolicy::RefreshActive => state.alerts.iter().rposition(|a| {
                    a.patient_id == alert.patient_id
                        && a.parameter == alert.parameter
                        && a.status == AlertStatus::Active
                }),
            };
            match existing {
                Some(index) => {
                    let updated = refreshed(&state.alerts[index], alert);
                    written.push(updated.clone());
                    refreshes.push((index, updated));
                }
                None => {
                    written.push(alert.clone());
                    inserts.push(alert);
                }
            }
        }

        for (index, updated) in refreshes {
            state.alerts[index] = updated;
        }
        state.alerts.extend(inserts);
        Ok(written)
    }

    fn get_alert(&self, alert_id: &Uuid) -> Result<Option<Alert>, AlertError> {
        let state = self.state.read().map_err(|_| AlertError::LockFailed)?;
        Ok(state.alerts.iter().find(|a| a.id == *alert_id).cloned())
    }

    fn update_alert_status(
        &self,
        alert_id: &Uuid,
        from: AlertStatus,
        to: AlertStatus,
        resolved_at: Option<NaiveDateTime>,
    ) -> Result<Alert, AlertError> {
        let mut state = self.state.write().map_err(|_| AlertError::LockFailed)?;
        let alert = state
            .alerts
            .iter_mut()
            .find(|a| a.id == *alert_id)
            .ok_or(AlertError::NotFound {
                entity_type: "alert",
                id: *alert_id,
            })?;
        if alert.status != from {
            return Err(AlertError::InvalidTransition {
                id: *alert_id,
                from: alert.status,
                to,
            });
        }
        alert.status = to;
        alert.resolved_at = resolved_at;
        Ok(alert.clone())
    }
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// Clinical store over the application database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl ClinicalStore for SqliteStore {
    fn threshold_configuration(
        &self,
        patient_id: &Uuid,
    ) -> Result<Option<ThresholdConfiguration>, AlertError> {
        Ok(repository::get_threshold_configuration(&self.conn, patient_id)?)
    }

    fn consultation_history(&self, patient_id: &Uuid) -> Result<Vec<Consultation>, AlertError> {
        Ok(repository::get_consultations_by_patient(&self.conn, patient_id)?)
    }

    fn persist_alerts(
        &self,
        alerts: Vec<Alert>,
        policy: DuplicatePolicy,
    ) -> Result<Vec<Alert>, AlertError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut written = Vec::with_capacity(alerts.len());

        for alert in alerts {
            let existing = match (policy, alert.parameter) {
                (DuplicatePolicy::RefreshActive, Some(parameter)) => {
                    repository::find_active_alert(&tx, &alert.patient_id, parameter)?
                }
                _ => None,
            };
            match existing {
                Some(existing) => {
                    let updated = refreshed(&existing, alert);
                    repository::refresh_alert(&tx, &updated)?;
                    written.push(updated);
                }
                None => {
                    repository::insert_alert(&tx, &alert)?;
                    written.push(alert);
                }
            }
        }

        // Dropping `tx` on an early return rolls the whole batch back.
        tx.commit()?;
        Ok(written)
    }

    fn get_alert(&self, alert_id: &Uuid) -> Result<Option<Alert>, AlertError> {
        Ok(repository::get_alert(&self.conn, alert_id)?)
    }

    fn update_alert_status(
        &self,
        alert_id: &Uuid,
        from: AlertStatus,
        to: AlertStatus,
        resolved_at: Option<NaiveDateTime>,
    ) -> Result<Alert, AlertError> {
        let updated = repository::update_alert_status(&self.conn, alert_id, from, to, resolved_at)
            .map_err(|e| match e {
                DatabaseError::NotFound { .. } => AlertError::NotFound {
                    entity_type: "alert",
                    id: *alert_id,
                },
                other => AlertError::Database(other),
            })?;

        match updated {
            Some(alert) => Ok(alert),
            None => {
                let current = repository::get_alert(&self.conn, alert_id)?
                    .map(|a| a.status)
                    .unwrap_or(from);
                Err(AlertError::InvalidTransition {
                    id: *alert_id,
                    from: current,
                    to,
                })
            }
        }
    }
}
