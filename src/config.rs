//! Client configuration: environment variables with an optional TOML file underneath.
//!
//! Env variables (override the file):
//!   ACT_API_URL         : backend base URL, normalized to end in exactly one `/api`
//!   ACT_TOKEN_PATH      : where the bearer token is persisted between runs
//!   ACT_QUESTION_LIMIT  : questions fetched per round (default 20)
//!   ACT_CONFIG_PATH     : path to a TOML file with the same keys (see `FileConfig`)

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_QUESTION_LIMIT: u32 = 20;
const TOKEN_FILE_NAME: &str = ".act-prep-token";

/// Keys accepted in the TOML file. All optional.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct FileConfig {
  #[serde(default)] pub api_url: Option<String>,
  #[serde(default)] pub token_path: Option<PathBuf>,
  #[serde(default)] pub question_limit: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
  /// Always `scheme://host[:port][/prefix]/api`, no trailing slash.
  pub api_base: String,
  pub token_path: PathBuf,
  pub question_limit: u32,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      api_base: DEFAULT_API_URL.to_string(),
      token_path: default_token_path(),
      question_limit: DEFAULT_QUESTION_LIMIT,
    }
  }
}

impl ClientConfig {
  /// Config pointing at `api_url`, other fields defaulted.
  pub fn with_api_url(api_url: &str) -> Self {
    Self { api_base: normalize_api_base(api_url), ..Self::default() }
  }

  /// Load file config (if ACT_CONFIG_PATH is set) and apply env overrides.
  pub fn from_env() -> Result<Self, ConfigError> {
    let file = match std::env::var("ACT_CONFIG_PATH") {
      Ok(path) => load_file_config(&path)?,
      Err(_) => FileConfig::default(),
    };
    let lookup = |key: &str| std::env::var(key).ok();
    Self::resolve(file, lookup)
  }

  /// Merge a file config with env-style overrides from `lookup`.
  pub fn resolve<F>(file: FileConfig, lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let api_url = lookup("ACT_API_URL")
      .or(file.api_url)
      .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let token_path = lookup("ACT_TOKEN_PATH")
      .map(PathBuf::from)
      .or(file.token_path)
      .unwrap_or_else(default_token_path);

    let question_limit = match lookup("ACT_QUESTION_LIMIT") {
      Some(raw) => match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => return Err(ConfigError::Invalid { key: "ACT_QUESTION_LIMIT", value: raw }),
      },
      None => file.question_limit.unwrap_or(DEFAULT_QUESTION_LIMIT),
    };

    let cfg = Self { api_base: normalize_api_base(&api_url), token_path, question_limit };
    info!(target: "act_prep", api_base = %cfg.api_base, question_limit = cfg.question_limit, "Client config resolved");
    Ok(cfg)
  }

  /// Server root without the `/api` suffix (where `/health` lives).
  pub fn origin(&self) -> &str {
    self.api_base.strip_suffix("/api").unwrap_or(&self.api_base)
  }
}

/// Read and parse the TOML file at `path`.
pub fn load_file_config(path: &str) -> Result<FileConfig, ConfigError> {
  let raw = std::fs::read_to_string(path)
    .map_err(|source| ConfigError::Read { path: path.to_string(), source })?;
  let cfg = toml::from_str::<FileConfig>(&raw)
    .map_err(|source| ConfigError::Parse { path: path.to_string(), source })?;
  info!(target: "act_prep", %path, "Loaded client config (TOML)");
  Ok(cfg)
}

/// Deployments disagreed on whether the base URL carries `/api`; settle on exactly one.
pub fn normalize_api_base(raw: &str) -> String {
  let trimmed = raw.trim().trim_end_matches('/');
  if trimmed.is_empty() {
    warn!(target: "act_prep", "Empty API URL; using default");
    return DEFAULT_API_URL.to_string();
  }
  if trimmed.ends_with("/api") {
    trimmed.to_string()
  } else {
    format!("{trimmed}/api")
  }
}

fn default_token_path() -> PathBuf {
  std::env::var_os("HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from("."))
    .join(TOKEN_FILE_NAME)
}
