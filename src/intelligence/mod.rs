//! Clinical alert engine.
//!
//! Evaluates each recorded consultation against the patient's effective
//! thresholds and writes one alert per parameter out of range. Runs
//! synchronously in the intake path; callers decide what a failure means
//! for the already-stored consultation.

pub mod engine;
pub mod evaluators;
pub mod lifecycle;
pub mod messages;
pub mod observations;
pub mod reference;
pub mod store;
pub mod thresholds;
pub mod types;

pub use engine::DefaultAlertEngine;
pub use reference::AlertThresholds;
pub use store::{MemoryStore, SqliteStore};
pub use types::{
    AlertEngine, AlertError, ClinicalStore, DuplicatePolicy, EngineConfig, EvaluationResult,
    Finding,
};
