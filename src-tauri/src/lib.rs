pub mod types;
pub mod config;
pub mod duel;
pub mod error;
pub mod translate;
pub mod session;
pub mod ports;
#[cfg(feature = "desktop")]
pub mod tournament_commands;

pub use error::BridgeError;
pub use ports::{Inbound, Outbound, PortsHandle};
pub use session::{MatchupsPort, TournamentSession};
pub use translate::ViewOptions;
pub use types::{ScoreSubmission, TournamentSeed, ViewMatch};

use config::BridgeConfig;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "desktop")]
use config::{apply_env_defaults, load_config_inner, load_env_file};
#[cfg(feature = "desktop")]
use tauri::Emitter;
#[cfg(feature = "desktop")]
use tracing::{error, info};

// ── Logging ────────────────────────────────────────────────────────────

/// Routes `tracing` output to a daily rolling file in the configured logs
/// directory. Keep the returned guard alive for as long as logs should flush.
pub fn init_tracing(config: &BridgeConfig) -> Result<WorkerGuard, String> {
    let logs_dir = config.logs_path();
    fs::create_dir_all(&logs_dir).map_err(|e| format!("create logs dir {}: {e}", logs_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "bracket-ports.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .try_init()
        .map_err(|e| e.to_string())?;
    Ok(guard)
}

// ── Entry point ────────────────────────────────────────────────────────

#[cfg(feature = "desktop")]
pub fn run() {
    load_env_file();
    let (config, config_error) = match load_config_inner() {
        Ok(config) => (config, None),
        Err(e) => (apply_env_defaults(BridgeConfig::default()), Some(e)),
    };

    let _guard = match init_tracing(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {e}");
            None
        }
    };
    info!("Bracket ports starting");
    if let Some(e) = config_error {
        error!("Falling back to default config: {e}");
    }

    let (ports, worker, mut outbound) = ports::open(config.command_buffer);
    let session = TournamentSession::new(config.view.clone());
    tauri::Builder::default()
        .manage(ports)
        .setup(move |app| {
            tauri::async_runtime::spawn(worker.run(session));

            let app_handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                while let Some(message) = outbound.recv().await {
                    let event = message.event_name();
                    let result = match message {
                        Outbound::MatchupsUpdated(matchups) => app_handle.emit(event, matchups),
                    };
                    if let Err(e) = result {
                        error!("Failed to emit {event}: {e}");
                    }
                }
            });

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            tournament_commands::create,
            tournament_commands::score,
            tournament_commands::engine_matches
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri app");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_creates_logs_dir() {
        let dir = std::env::temp_dir().join(format!("bracket-ports-logs-{}", uuid::Uuid::new_v4()));
        let config = BridgeConfig {
            logs_dir: dir.to_string_lossy().to_string(),
            ..BridgeConfig::default()
        };
        let guard = init_tracing(&config).unwrap();
        tracing::info!("logging initialized for test");
        drop(guard);
        assert!(dir.is_dir());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_app_config_exposes_global_tauri_to_ui() {
        // ui/index.html talks to the backend through window.__TAURI__
        let conf: serde_json::Value = serde_json::from_str(include_str!("../tauri.conf.json")).unwrap();
        assert_eq!(conf["app"]["withGlobalTauri"], serde_json::json!(true));
        assert_eq!(conf["build"]["frontendDist"], serde_json::json!("../ui"));
    }
}
