use serde::{Deserialize, Serialize};

use super::types::AlertError;

/// Normal creatinine range quoted in alert messages.
pub const CREATININE_NORMAL_RANGE: &str = "0.6-1.2 mg/dL";
/// Normal blood pressure quoted in alert messages.
pub const BLOOD_PRESSURE_NORMAL_RANGE: &str = "<120/80 mmHg";
/// Normal eGFR quoted in alert messages.
pub const EGFR_NORMAL_RANGE: &str = ">60 mL/min/1.73m²";

/// eGFR strictly below this is kidney failure (CKD stage 5).
pub const EGFR_STAGE_5_BELOW: i64 = 15;
/// eGFR strictly below this is severe loss of function (CKD stage 4).
pub const EGFR_STAGE_4_BELOW: i64 = 30;

/// A complete set of alert thresholds. The `Default` impl holds the
/// system-wide defaults used for any field a patient does not override.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    /// mg/dL
    pub creatinine_critical: f64,
    /// mg/dL
    pub creatinine_warning: f64,
    /// mmHg
    pub systolic_critical: i64,
    /// mmHg
    pub systolic_warning: i64,
    /// mmHg
    pub diastolic_critical: i64,
    /// mmHg
    pub diastolic_warning: i64,
    /// kg lost since the previous weighed consultation.
    pub weight_loss_threshold: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            creatinine_critical: 3.0,
            creatinine_warning: 2.0,
            systolic_critical: 180,
            systolic_warning: 140,
            diastolic_critical: 110,
            diastolic_warning: 90,
            weight_loss_threshold: 2.0,
        }
    }
}

impl AlertThresholds {
    /// Load site-wide defaults from a JSON file. Missing keys keep the
    /// built-in value.
    pub fn load(path: &std::path::Path) -> Result<Self, AlertError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AlertError::ReferenceDataLoad(path.display().to_string(), e.to_string())
        })?;
        serde_json::from_str(&json)
            .map_err(|e| AlertError::ReferenceDataParse(path.display().to_string(), e.to_string()))
    }

    /// Load defaults from `path` if it exists, otherwise use the built-in set.
    pub fn load_or_default(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(thresholds) => {
                tracing::info!(path = %path.display(), "Loaded default alert thresholds");
                thresholds
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load default thresholds, using built-in set");
                Self::default()
            }
        }
    }

    /// Parameters whose critical threshold sits below the warning one.
    /// With such a pair the warning tier can never fire.
    pub fn inverted_pairs(&self) -> Vec<&'static str> {
        let mut inverted = Vec::new();
        if self.creatinine_critical < self.creatinine_warning {
            inverted.push("creatinine");
        }
        if self.systolic_critical < self.systolic_warning {
            inverted.push("systolic");
        }
        if self.diastolic_critical < self.diastolic_warning {
            inverted.push("diastolic");
        }
        inverted
    }
}
