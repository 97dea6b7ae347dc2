use std::process::ExitCode;

use thiserror::Error;
use uuid::Uuid;

use nephro_alerts_lib::config;
use nephro_alerts_lib::db::{self, DatabaseError};
use nephro_alerts_lib::intelligence::AlertThresholds;
use nephro_alerts_lib::reporting;

const USAGE: &str = "usage: nephro-alerts [stats|alerts|report <patient-uuid>]";

#[derive(Error, Debug)]
enum CliError {
    #[error("usage: nephro-alerts [stats|alerts|report <patient-uuid>]")]
    Usage,

    #[error("Invalid patient id {0:?}: {1}")]
    InvalidPatientId(String, uuid::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),
}

enum Command {
    Stats,
    Alerts,
    Report(Uuid),
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command, CliError> {
    let command = match args.next().as_deref() {
        None | Some("stats") => Command::Stats,
        Some("alerts") => Command::Alerts,
        Some("report") => {
            let raw = args.next().ok_or(CliError::Usage)?;
            let id = Uuid::parse_str(&raw).map_err(|e| CliError::InvalidPatientId(raw, e))?;
            Command::Report(id)
        }
        Some(_) => return Err(CliError::Usage),
    };
    if args.next().is_some() {
        return Err(CliError::Usage);
    }
    Ok(command)
}

fn run(command: Command) -> Result<String, CliError> {
    let path = config::database_path();
    let conn = db::sqlite::open_database(&path)?;
    tracing::debug!(path = %path.display(), "Database opened");

    let json = match command {
        Command::Stats => {
            let today = chrono::Local::now().date_naive();
            serde_json::to_string_pretty(&reporting::build_dashboard(&conn, today)?.stats)?
        }
        Command::Alerts => {
            serde_json::to_string_pretty(&db::repository::get_active_alerts(&conn)?)?
        }
        Command::Report(patient_id) => {
            let defaults = AlertThresholds::load_or_default(&config::thresholds_path());
            let report = reporting::build_patient_report(&conn, &patient_id, &defaults)?;
            serde_json::to_string_pretty(&report)?
        }
    };
    Ok(json)
}

fn main() -> ExitCode {
    nephro_alerts_lib::init_tracing();
    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);

    match parse_args(std::env::args().skip(1)).and_then(run) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(CliError::Usage) => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn no_arguments_means_stats() {
        assert!(matches!(parse_args(args(&[])), Ok(Command::Stats)));
    }

    #[test]
    fn report_needs_a_valid_uuid() {
        let id = Uuid::new_v4().to_string();
        assert!(matches!(parse_args(args(&["report", &id])), Ok(Command::Report(_))));
        assert!(matches!(parse_args(args(&["report"])), Err(CliError::Usage)));
        assert!(matches!(
            parse_args(args(&["report", "CKD-2026-417"])),
            Err(CliError::InvalidPatientId(..))
        ));
    }

    #[test]
    fn unknown_or_extra_arguments_rejected() {
        assert!(matches!(parse_args(args(&["purge"])), Err(CliError::Usage)));
        assert!(matches!(parse_args(args(&["alerts", "now"])), Err(CliError::Usage)));
    }
}
