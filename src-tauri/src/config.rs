use crate::translate::ViewOptions;
use crate::types::DEFAULT_COMMAND_BUFFER;
use serde::{Deserialize, Serialize};
use std::{
  env,
  fs,
  path::{Path, PathBuf},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeConfig {
  pub view: ViewOptions,
  pub logs_dir: String,
  pub log_filter: String,
  pub command_buffer: usize,
}

impl Default for BridgeConfig {
  fn default() -> Self {
    BridgeConfig {
      view: ViewOptions::default(),
      logs_dir: "logs".to_string(),
      log_filter: "info".to_string(),
      command_buffer: DEFAULT_COMMAND_BUFFER,
    }
  }
}

impl BridgeConfig {
  pub fn logs_path(&self) -> PathBuf {
    resolve_repo_path(&self.logs_dir)
  }
}

pub fn repo_root() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .parent()
    .map(|path| path.to_path_buf())
    .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")))
}

pub fn resolve_repo_path(raw: &str) -> PathBuf {
  let path = PathBuf::from(raw);
  if path.is_absolute() {
    path
  } else {
    repo_root().join(path)
  }
}

pub fn config_path() -> PathBuf {
  repo_root().join("bracket-ports.json")
}

pub fn env_default(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

pub fn parse_flag(value: &str) -> Option<bool> {
  match value.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Some(true),
    "0" | "false" | "no" | "off" => Some(false),
    _ => None,
  }
}

/// Applies overrides from a lookup function so tests can avoid touching the process env.
pub fn apply_overrides<F>(mut config: BridgeConfig, lookup: F) -> BridgeConfig
where
  F: Fn(&str) -> Option<String>,
{
  if let Some(flag) = lookup("BRACKET_SHOW_PENDING").as_deref().and_then(parse_flag) {
    config.view.show_pending_matches = flag;
  }
  if let Some(value) = lookup("BRACKET_LOG_DIR") {
    config.logs_dir = value;
  }
  if let Some(value) = lookup("BRACKET_LOG_FILTER") {
    config.log_filter = value;
  }
  if let Some(value) = lookup("BRACKET_COMMAND_BUFFER").and_then(|raw| raw.parse::<usize>().ok()) {
    config.command_buffer = value.max(1);
  }
  config
}

pub fn apply_env_defaults(config: BridgeConfig) -> BridgeConfig {
  apply_overrides(config, env_default)
}

pub fn load_config_from(path: &Path) -> Result<BridgeConfig, String> {
  if !path.is_file() {
    return Ok(apply_env_defaults(BridgeConfig::default()));
  }
  let data = fs::read_to_string(path).map_err(|e| format!("read config {}: {e}", path.display()))?;
  let config =
    serde_json::from_str::<BridgeConfig>(&data).map_err(|e| format!("parse config {}: {e}", path.display()))?;
  Ok(apply_env_defaults(config))
}

pub fn load_config_inner() -> Result<BridgeConfig, String> {
  load_config_from(&config_path())
}

pub fn load_env_file() {
  let env_path = repo_root().join(".env");
  if !env_path.is_file() {
    return;
  }
  let contents = match fs::read_to_string(&env_path) {
    Ok(data) => data,
    Err(_) => return,
  };
  for line in contents.lines() {
    if let Some((key, value)) = parse_env_line(line) {
      if env::var_os(&key).is_none() {
        env::set_var(key, value);
      }
    }
  }
}

pub fn parse_env_line(line: &str) -> Option<(String, String)> {
  let trimmed = line.trim();
  if trimmed.is_empty() || trimmed.starts_with('#') {
    return None;
  }
  let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
  let (key, raw_value) = trimmed.split_once('=')?;
  let key = key.trim();
  if key.is_empty() {
    return None;
  }
  let mut value = raw_value.trim();
  if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if let Some(idx) = value.find('#') {
    value = value[..idx].trim_end();
  }
  Some((key.to_string(), value.to_string()))
}
