//! Error types for the gateway, the session store, auth and config loading.

use thiserror::Error;

/// Failures of a single backend call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
  /// Connection refused, DNS, TLS, reset: nothing usable came back.
  #[error("transport error: {0}")]
  Transport(#[source] reqwest::Error),
  /// Backend answered with a non-2xx status.
  #[error("backend returned HTTP {status}: {detail}")]
  Status { status: reqwest::StatusCode, detail: String },
  /// Body did not match the expected shape.
  #[error("unexpected response shape: {0}")]
  Decode(String),
}

impl GatewayError {
  /// True for 401/403 answers, the cue to drop a stored token.
  pub fn is_unauthorized(&self) -> bool {
    matches!(
      self,
      GatewayError::Status { status, .. }
        if *status == reqwest::StatusCode::UNAUTHORIZED || *status == reqwest::StatusCode::FORBIDDEN
    )
  }
}

/// Errors surfaced by the session store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
  #[error("session not started")]
  NotStarted,
  #[error("session already finished")]
  Finished,
  #[error("no answer selected for question {0}")]
  NoSelection(i64),
  #[error("could not start session: {0}")]
  StartFailed(#[source] GatewayError),
  #[error(transparent)]
  Gateway(#[from] GatewayError),
}

/// Errors from login, registration and token persistence.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
  #[error("not logged in")]
  NotLoggedIn,
  #[error("{0}")]
  Rejected(String),
  #[error("token store I/O failed: {0}")]
  Store(#[from] std::io::Error),
  #[error(transparent)]
  Gateway(GatewayError),
}

impl From<GatewayError> for AuthError {
  fn from(e: GatewayError) -> Self {
    match e {
      // FastAPI puts the human-readable reason in `detail`.
      GatewayError::Status { detail, .. } if !detail.is_empty() => AuthError::Rejected(detail),
      other => AuthError::Gateway(other),
    }
  }
}

/// Errors while reading the optional TOML config file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read { path: String, #[source] source: std::io::Error },
  #[error("failed to parse config file {path}: {source}")]
  Parse { path: String, #[source] source: toml::de::Error },
  #[error("invalid value for {key}: {value}")]
  Invalid { key: &'static str, value: String },
}
