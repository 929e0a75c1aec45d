//! Bearer-token context handed to the gateway at construction.
//!
//! The token is the only piece of client state that outlives a run; `TokenStore`
//! keeps it in a small file so a restart stays logged in.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::domain::User;
use crate::error::AuthError;

/// File-backed persistence for the access token.
#[derive(Clone, Debug)]
pub struct TokenStore {
  path: PathBuf,
}

impl TokenStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// `Ok(None)` when nothing was saved yet.
  pub fn load(&self) -> Result<Option<String>, AuthError> {
    match std::fs::read_to_string(&self.path) {
      Ok(s) => {
        let token = s.trim().to_string();
        Ok(if token.is_empty() { None } else { Some(token) })
      }
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => Err(AuthError::Store(e)),
    }
  }

  pub fn save(&self, token: &str) -> Result<(), AuthError> {
    std::fs::write(&self.path, token)?;
    Ok(())
  }

  pub fn clear(&self) -> Result<(), AuthError> {
    match std::fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(AuthError::Store(e)),
    }
  }
}

/// Who is logged in, and with which token.
#[derive(Clone, Debug, Default)]
pub struct AuthContext {
  token: Option<String>,
  user: Option<User>,
  store: Option<TokenStore>,
}

impl AuthContext {
  /// In-memory only; nothing survives the process.
  pub fn new() -> Self {
    Self::default()
  }

  /// Backed by `store`; picks up a previously saved token.
  pub fn with_store(store: TokenStore) -> Self {
    let token = match store.load() {
      Ok(t) => t,
      Err(e) => {
        error!(target: "auth", path = %store.path().display(), error = %e, "Failed to read saved token; starting logged out");
        None
      }
    };
    debug!(target: "auth", has_token = token.is_some(), "Auth context restored");
    Self { token, user: None, store: Some(store) }
  }

  pub fn token(&self) -> Option<&str> {
    self.token.as_deref()
  }

  pub fn user(&self) -> Option<&User> {
    self.user.as_ref()
  }

  pub fn is_logged_in(&self) -> bool {
    self.token.is_some()
  }

  /// Record a freshly issued token and persist it.
  pub fn login(&mut self, token: String) -> Result<(), AuthError> {
    if let Some(store) = &self.store {
      store.save(&token)?;
    }
    self.token = Some(token);
    self.user = None;
    info!(target: "auth", "Access token stored");
    Ok(())
  }

  pub fn set_user(&mut self, user: User) {
    self.user = Some(user);
  }

  /// Drop token and user, in memory and on disk.
  pub fn logout(&mut self) {
    self.token = None;
    self.user = None;
    if let Some(store) = &self.store {
      if let Err(e) = store.clear() {
        warn!(target: "auth", error = %e, "Failed to remove saved token");
      }
    }
    info!(target: "auth", "Logged out");
  }
}
