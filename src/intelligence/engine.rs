use std::time::Instant;

use uuid::Uuid;

use crate::models::{Alert, Consultation};

use super::evaluators::run_evaluators;
use super::lifecycle::{apply_action, LifecycleAction};
use super::observations::Observations;
use super::reference::AlertThresholds;
use super::thresholds::resolve_thresholds;
use super::types::{
    AlertEngine, AlertError, ClinicalStore, EngineConfig, EvaluationResult, Finding,
};

/// Default implementation of the alert engine.
/// Resolves thresholds, runs the four parameter evaluators, and persists
/// the resulting alerts through its store.
pub struct DefaultAlertEngine<S: ClinicalStore> {
    store: S,
    config: EngineConfig,
}

impl<S: ClinicalStore> DefaultAlertEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl<S: ClinicalStore> AlertEngine for DefaultAlertEngine<S> {
    fn on_consultation_recorded(
        &self,
        consultation: &Consultation,
    ) -> Result<EvaluationResult, AlertError> {
        let start = Instant::now();

        // The store may already hold the consultation being evaluated.
        let history: Vec<Consultation> = self
            .store
            .consultation_history(&consultation.patient_id)?
            .into_iter()
            .filter(|c| c.id != consultation.id)
            .collect();

        let findings = self.evaluate(consultation, &history)?;
        for finding in &findings {
            tracing::debug!(
                consultation_id = %consultation.id,
                parameter = finding.parameter.as_str(),
                severity = finding.severity.as_str(),
                value = %finding.value,
                "Threshold crossed"
            );
        }

        let alerts = if findings.is_empty() {
            Vec::new()
        } else {
            let now = chrono::Local::now().naive_local();
            let pending: Vec<Alert> = findings
                .iter()
                .cloned()
                .map(|f| f.into_alert(consultation.patient_id, Some(consultation.id), now))
                .collect();
            self.store
                .persist_alerts(pending, self.config.duplicate_policy)?
        };

        let processing_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            patient_id = %consultation.patient_id,
            consultation_id = %consultation.id,
            findings = findings.len(),
            stored = alerts.len(),
            processing_ms = processing_time_ms,
            "Alert evaluation complete for consultation"
        );

        Ok(EvaluationResult {
            consultation_id: consultation.id,
            findings,
            alerts,
            processing_time_ms,
        })
    }

    fn evaluate(
        &self,
        consultation: &Consultation,
        history: &[Consultation],
    ) -> Result<Vec<Finding>, AlertError> {
        let observations = Observations::from_consultation(consultation)?;
        if observations.is_empty() {
            return Ok(Vec::new());
        }

        let thresholds = self.resolve_thresholds(&consultation.patient_id)?;
        run_evaluators(consultation, &observations, &thresholds, history)
    }

    fn resolve_thresholds(&self, patient_id: &Uuid) -> Result<AlertThresholds, AlertError> {
        resolve_thresholds(&self.store, &self.config.defaults, patient_id)
    }

    fn acknowledge(&self, alert_id: &Uuid) -> Result<Alert, AlertError> {
        let now = chrono::Local::now().naive_local();
        apply_action(&self.store, alert_id, LifecycleAction::Acknowledge, now)
    }

    fn resolve(&self, alert_id: &Uuid) -> Result<Alert, AlertError> {
        let now = chrono::Local::now().naive_local();
        apply_action(&self.store, alert_id, LifecycleAction::Resolve, now)
    }
}
