use super::reference::{BLOOD_PRESSURE_NORMAL_RANGE, CREATININE_NORMAL_RANGE, EGFR_NORMAL_RANGE};

/// Message template builder for clinician-facing alert text.
/// Every message carries the observed value and, where one exists, the
/// normal reference range.
pub struct MessageTemplates;

impl MessageTemplates {
    pub fn creatinine_critical(value: f64) -> String {
        format!(
            "Critical creatinine level: {} mg/dL (Normal: {})",
            value, CREATININE_NORMAL_RANGE,
        )
    }

    pub fn creatinine_elevated(value: f64) -> String {
        format!(
            "Elevated creatinine level: {} mg/dL (Normal: {})",
            value, CREATININE_NORMAL_RANGE,
        )
    }

    pub fn blood_pressure_critical(systolic: i64, diastolic: i64) -> String {
        format!(
            "Critical blood pressure: {}/{} mmHg (Severe Hypertension, Normal: {})",
            systolic, diastolic, BLOOD_PRESSURE_NORMAL_RANGE,
        )
    }

    pub fn blood_pressure_elevated(systolic: i64, diastolic: i64) -> String {
        format!(
            "Elevated blood pressure: {}/{} mmHg (Hypertension, Normal: {})",
            systolic, diastolic, BLOOD_PRESSURE_NORMAL_RANGE,
        )
    }

    /// CKD stage 5 range.
    pub fn egfr_stage_5(egfr: i64) -> String {
        format!(
            "Severe CKD progression: eGFR {} mL/min/1.73m² (Stage 5 CKD, Normal: {})",
            egfr, EGFR_NORMAL_RANGE,
        )
    }

    /// CKD stage 4 range.
    pub fn egfr_stage_4(egfr: i64) -> String {
        format!(
            "CKD progression: eGFR {} mL/min/1.73m² (Stage 4 CKD, Normal: {})",
            egfr, EGFR_NORMAL_RANGE,
        )
    }

    pub fn weight_loss(loss_kg: f64, previous_kg: f64) -> String {
        format!(
            "Rapid weight loss detected: {:.1}kg lost since last recorded weight ({}kg)",
            loss_kg, previous_kg,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creatinine_message_uses_shortest_number() {
        assert_eq!(
            MessageTemplates::creatinine_critical(3.5),
            "Critical creatinine level: 3.5 mg/dL (Normal: 0.6-1.2 mg/dL)"
        );
        assert!(MessageTemplates::creatinine_elevated(2.0).contains(" 2 mg/dL"));
    }

    #[test]
    fn blood_pressure_message_has_both_values_and_range() {
        let msg = MessageTemplates::blood_pressure_elevated(138, 92);
        assert!(msg.contains("138/92 mmHg"));
        assert!(msg.contains("<120/80 mmHg"));
    }

    #[test]
    fn egfr_messages_name_the_stage() {
        assert!(MessageTemplates::egfr_stage_5(12).contains("Stage 5 CKD"));
        assert!(MessageTemplates::egfr_stage_4(25).contains("eGFR 25 mL/min/1.73m²"));
    }

    #[test]
    fn weight_loss_rounds_to_one_decimal() {
        let msg = MessageTemplates::weight_loss(2.46, 80.0);
        assert!(msg.contains("2.5kg lost"), "{msg}");
    }
}
