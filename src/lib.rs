//! ACT practice client.
//!
//! A thin consumer of the ACT-prep backend: questions, session-mode answer
//! submission, analytics, and AI feedback. Scoring, persistence and analytics all
//! live on the server; this crate tracks the user's picks, talks to the API and
//! renders what comes back.
//!
//! - `gateway`  : every HTTP call, base URL and bearer token in one place
//! - `session`  : the `NotStarted -> Started -> Finished` session store
//! - `practice` : per-question input handling (pick, then check)
//! - `view`     : terminal rendering and degraded "no data" states
//! - `auth`     : explicit token context with a file-backed store

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod practice;
pub mod protocol;
pub mod session;
pub mod telemetry;
pub mod time;
pub mod view;

pub use auth::{AuthContext, TokenStore};
pub use config::ClientConfig;
pub use domain::{AnalyticsSnapshot, AnsweredQuestion, Question, SessionResults, Subject, WeakArea};
pub use error::{AuthError, ConfigError, GatewayError, SessionError};
pub use gateway::{Gateway, SessionApi};
pub use session::{CheckOutcome, SessionState, SessionStore};
pub use time::Clock;
