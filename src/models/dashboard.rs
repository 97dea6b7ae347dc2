use serde::{Deserialize, Serialize};

/// Counters shown on the clinician dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_patients: i64,
    pub active_alerts: i64,
    pub today_consultations: i64,
    /// Every consultation can produce a report, so this counts consultations.
    pub reports_generated: i64,
}
