//! Request bodies and response envelopes for the backend HTTP API (serde ready).
//! Domain types live in `domain`; this module only holds wire wrappers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Question, User};

#[derive(Debug, Deserialize)]
pub struct QuestionsOut {
    /// Older revisions occasionally omitted the list entirely.
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub struct TrackAnswerIn<'a> {
    pub user_id: i64,
    pub question_id: i64,
    pub user_answer: &'a str,
    pub time_spent_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct StartSessionIn<'a> {
    pub session_type: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct StartSessionOut {
    pub session_id: i64,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswerIn<'a> {
    pub session_id: i64,
    pub question_id: i64,
    pub user_answer: &'a str,
    pub time_spent_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct FinishSessionIn {
    pub session_id: i64,
}

#[derive(Debug, Serialize)]
pub struct RegisterIn<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: &'a str,
    pub username: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LoginIn<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenOut {
    pub access_token: String,
}

/// `/auth/me` answers either with the bare user or wrapped in `{ "user": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MeOut {
    Wrapped { user: User },
    Bare(User),
}

impl MeOut {
    pub fn into_user(self) -> User {
        match self {
            MeOut::Wrapped { user } => user,
            MeOut::Bare(user) => user,
        }
    }
}

/// Per-subject question counts plus a `total` entry.
pub type SubjectCountsOut = BTreeMap<String, u64>;

#[derive(Debug, Deserialize)]
pub struct HealthOut {
    pub status: String,
}

/// FastAPI error body.
#[derive(Debug, Deserialize)]
pub struct ErrorOut {
    pub detail: serde_json::Value,
}

/// Pull a readable message out of an error body; falls back to the raw text.
pub fn extract_error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorOut>(body) {
        Ok(ErrorOut { detail: serde_json::Value::String(s) }) => s,
        Ok(ErrorOut { detail }) => detail.to_string(),
        Err(_) => body.trim().to_string(),
    }
}
