use crate::ports::PortsHandle;
use crate::types::{EngineMatch, ScoreSubmission, TournamentSeed};
use tauri::State;
use uuid::Uuid;

// ── Commands ────────────────────────────────────────────────────────────

#[tauri::command]
pub async fn create(seed: TournamentSeed, ports: State<'_, PortsHandle>) -> Result<(), String> {
    ports.create(seed).await.map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn score(
    match_id: Uuid,
    winner_id: u32,
    ports: State<'_, PortsHandle>,
) -> Result<(), String> {
    ports
        .score(ScoreSubmission { match_id, winner_id })
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn engine_matches(ports: State<'_, PortsHandle>) -> Result<Vec<EngineMatch>, String> {
    ports.engine_matches().await.map_err(|e| e.to_string())
}
