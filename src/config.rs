use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Nephro Alerts";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Overrides the data directory when set (deployments, tests).
pub const HOME_ENV_VAR: &str = "NEPHRO_ALERTS_HOME";

/// Get the application data directory.
/// `$NEPHRO_ALERTS_HOME` if set, else ~/NephroAlerts/. Falls back to the
/// working directory when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("NephroAlerts")
}

/// Get the SQLite database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("nephro-alerts.db")
}

/// Optional JSON file overriding the built-in default thresholds
pub fn thresholds_path() -> PathBuf {
    app_data_dir().join("thresholds.json")
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,nephro_alerts_lib=debug"
}
