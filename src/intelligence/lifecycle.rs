//! Alert status lifecycle: active -> acknowledged -> resolved, or
//! active -> resolved directly. Resolved is terminal.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::models::enums::AlertStatus;
use crate::models::Alert;

use super::types::{AlertError, ClinicalStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Acknowledge,
    Resolve,
}

impl LifecycleAction {
    fn target(self) -> AlertStatus {
        match self {
            Self::Acknowledge => AlertStatus::Acknowledged,
            Self::Resolve => AlertStatus::Resolved,
        }
    }
}

/// Status reached by applying `action` to an alert in `current`.
pub fn next_status(
    alert_id: &Uuid,
    current: AlertStatus,
    action: LifecycleAction,
) -> Result<AlertStatus, AlertError> {
    match (current, action) {
        (AlertStatus::Active, LifecycleAction::Acknowledge)
        | (AlertStatus::Active, LifecycleAction::Resolve)
        | (AlertStatus::Acknowledged, LifecycleAction::Resolve) => Ok(action.target()),
        (from, action) => Err(AlertError::InvalidTransition {
            id: *alert_id,
            from,
            to: action.target(),
        }),
    }
}

/// Apply one lifecycle action through the store. Resolving stamps
/// `resolved_at` with `now`; acknowledging leaves it unset.
pub fn apply_action<S: ClinicalStore + ?Sized>(
    store: &S,
    alert_id: &Uuid,
    action: LifecycleAction,
    now: NaiveDateTime,
) -> Result<Alert, AlertError> {
    let alert = store.get_alert(alert_id)?.ok_or(AlertError::NotFound {
        entity_type: "alert",
        id: *alert_id,
    })?;

    let status = next_status(alert_id, alert.status, action)?;
    let resolved_at = match status {
        AlertStatus::Resolved => Some(now),
        _ => None,
    };

    let updated = store.update_alert_status(alert_id, alert.status, status, resolved_at)?;
    tracing::info!(
        alert_id = %alert_id,
        from = alert.status.as_str(),
        to = status.as_str(),
        "Alert status changed"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::store::MemoryStore;
    use crate::intelligence::types::DuplicatePolicy;
    use crate::models::enums::{AlertParameter, AlertSeverity};

    fn stored_alert(store: &MemoryStore) -> Uuid {
        let alert = Alert {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            consultation_id: None,
            severity: AlertSeverity::Critical,
            status: AlertStatus::Active,
            message: "Severe CKD progression: eGFR 12".into(),
            parameter: Some(AlertParameter::Egfr),
            value: Some("12".into()),
            threshold: Some("15".into()),
            created_at: chrono::Local::now().naive_local(),
            resolved_at: None,
        };
        let id = alert.id;
        store.persist_alerts(vec![alert], DuplicatePolicy::AlwaysInsert).unwrap();
        id
    }

    fn noon() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-03-14 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn transition_table() {
        use AlertStatus::*;
        use LifecycleAction::*;
        let id = Uuid::new_v4();

        assert_eq!(next_status(&id, Active, Acknowledge).unwrap(), Acknowledged);
        assert_eq!(next_status(&id, Active, Resolve).unwrap(), Resolved);
        assert_eq!(next_status(&id, Acknowledged, Resolve).unwrap(), Resolved);

        for (from, action) in [(Acknowledged, Acknowledge), (Resolved, Acknowledge), (Resolved, Resolve)] {
            assert!(
                matches!(next_status(&id, from, action), Err(AlertError::InvalidTransition { .. })),
                "{from} + {action:?} should be rejected"
            );
        }
    }

    #[test]
    fn acknowledge_then_resolve() {
        let store = MemoryStore::new();
        let id = stored_alert(&store);

        let acked = apply_action(&store, &id, LifecycleAction::Acknowledge, noon()).unwrap();
        assert_eq!(acked.status, AlertStatus::Acknowledged);
        assert!(acked.resolved_at.is_none());

        let resolved = apply_action(&store, &id, LifecycleAction::Resolve, noon()).unwrap();
        assert_eq!(resolved.status, AlertStatus::Resolved);
        assert_eq!(resolved.resolved_at, Some(noon()));
    }

    #[test]
    fn resolving_twice_keeps_first_timestamp() {
        let store = MemoryStore::new();
        let id = stored_alert(&store);
        apply_action(&store, &id, LifecycleAction::Resolve, noon()).unwrap();

        let later = noon() + chrono::Duration::hours(2);
        let result = apply_action(&store, &id, LifecycleAction::Resolve, later);
        assert!(matches!(result, Err(AlertError::InvalidTransition { .. })));
        assert_eq!(store.get_alert(&id).unwrap().unwrap().resolved_at, Some(noon()));
    }

    #[test]
    fn missing_alert_is_not_found() {
        let store = MemoryStore::new();
        let result = apply_action(&store, &Uuid::new_v4(), LifecycleAction::Acknowledge, noon());
        assert!(matches!(result, Err(AlertError::NotFound { .. })));
    }

    #[test]
    fn concurrent_resolves_succeed_once() {
        use std::sync::Barrier;

        let store = MemoryStore::new();
        let id = stored_alert(&store);
        let barrier = Barrier::new(8);

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let (store, barrier) = (&store, &barrier);
                    scope.spawn(move || {
                        barrier.wait();
                        let at = noon() + chrono::Duration::minutes(i);
                        apply_action(store, &id, LifecycleAction::Resolve, at)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1);
        assert!(results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(AlertError::InvalidTransition { .. }))));
        let stored = store.get_alert(&id).unwrap().unwrap();
        assert_eq!(stored.resolved_at, winners[0].resolved_at);
    }
}
