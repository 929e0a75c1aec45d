//! Remote data gateway: every call to the practice backend goes through here.
//!
//! One `reqwest::Client`, one normalized base URL, one `AuthContext`. Calls are
//! single-attempt (no retry, no backoff, no cache) and return typed results; the
//! caller decides how to degrade. Logs carry paths, statuses and sizes, never
//! tokens or passwords.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::auth::AuthContext;
use crate::config::ClientConfig;
use crate::domain::{
  AiFeedback, AnalyticsSnapshot, Question, SessionResults, SubjectFeedback, SubmitAck, TrackAck, User,
};
use crate::error::{AuthError, GatewayError};
use crate::protocol::*;

const CLIENT_UA: &str = concat!("act-prep-client/", env!("CARGO_PKG_VERSION"));

/// Session lifecycle calls the session store depends on.
#[async_trait]
pub trait SessionApi: Send + Sync {
  async fn start_session(&self, session_type: &str) -> Result<i64, GatewayError>;
  async fn submit_answer(
    &self,
    session_id: i64,
    question_id: i64,
    user_answer: &str,
    time_spent_seconds: u64,
  ) -> Result<SubmitAck, GatewayError>;
  async fn finish_session(&self, session_id: i64) -> Result<SessionResults, GatewayError>;
}

#[async_trait]
impl<T: SessionApi + ?Sized> SessionApi for Arc<T> {
  async fn start_session(&self, session_type: &str) -> Result<i64, GatewayError> {
    (**self).start_session(session_type).await
  }

  async fn submit_answer(
    &self,
    session_id: i64,
    question_id: i64,
    user_answer: &str,
    time_spent_seconds: u64,
  ) -> Result<SubmitAck, GatewayError> {
    (**self).submit_answer(session_id, question_id, user_answer, time_spent_seconds).await
  }

  async fn finish_session(&self, session_id: i64) -> Result<SessionResults, GatewayError> {
    (**self).finish_session(session_id).await
  }
}

pub struct Gateway {
  client: reqwest::Client,
  api_base: String,
  origin: String,
  auth: AuthContext,
}

impl Gateway {
  /// Transport defaults apply; no explicit timeout is configured.
  pub fn new(config: &ClientConfig, auth: AuthContext) -> Self {
    Self {
      client: reqwest::Client::new(),
      api_base: config.api_base.clone(),
      origin: config.origin().to_string(),
      auth,
    }
  }

  pub fn api_base(&self) -> &str {
    &self.api_base
  }

  pub fn auth(&self) -> &AuthContext {
    &self.auth
  }

  pub fn logout(&mut self) {
    self.auth.logout();
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let url = format!("{}{}", self.api_base, path);
    let req = self
      .client
      .request(method, url)
      .header(USER_AGENT, CLIENT_UA)
      .header(ACCEPT, "application/json");
    match self.auth.token() {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  /// Send, check status, decode. Shared by every typed call below.
  async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder, path: &str) -> Result<T, GatewayError> {
    let started = std::time::Instant::now();
    let res = req.send().await.map_err(|e| {
      error!(target: "gateway", %path, error = %e, "Request failed in transport");
      GatewayError::Transport(e)
    })?;

    let status = res.status();
    let body = res.text().await.map_err(GatewayError::Transport)?;
    let elapsed = started.elapsed();

    if !status.is_success() {
      let detail = extract_error_detail(&body);
      warn!(target: "gateway", %path, %status, ?elapsed, %detail, "Backend returned an error status");
      return Err(GatewayError::Status { status, detail });
    }

    debug!(target: "gateway", %path, %status, ?elapsed, body_len = body.len(), "Backend response received");
    serde_json::from_str::<T>(&body).map_err(|e| {
      error!(target: "gateway", %path, error = %e, "Response did not match expected shape");
      GatewayError::Decode(format!("{path}: {e}"))
    })
  }

  async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
    self.send_json(self.request(Method::GET, path), path).await
  }

  async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, GatewayError> {
    self.send_json(self.request(Method::POST, path).json(body), path).await
  }

  // --- Questions ---

  /// `subject_filter` of `None` or `"all"` fetches every subject; anything else is sent verbatim.
  #[instrument(level = "info", skip(self), fields(subject = subject_filter.unwrap_or("all")))]
  pub async fn fetch_questions(&self, subject_filter: Option<&str>, limit: u32) -> Result<Vec<Question>, GatewayError> {
    let path = "/questions";
    let limit = limit.to_string();
    let mut query: Vec<(&str, &str)> = vec![("limit", limit.as_str())];
    if let Some(subject) = subject_filter.filter(|s| *s != "all") {
      query.push(("subject", subject));
    }
    let req = self.request(Method::GET, path).query(&query);
    let out: QuestionsOut = self.send_json(req, path).await?;

    for q in out.questions.iter().filter(|q| !q.correct_answer.is_empty() && !q.answer_key_consistent()) {
      warn!(target: "gateway", id = q.id, "Question answer key is not exactly one of its choices");
    }
    info!(target: "gateway", count = out.questions.len(), "Questions fetched");
    Ok(out.questions)
  }

  #[instrument(level = "info", skip(self))]
  pub async fn fetch_question(&self, question_id: i64) -> Result<Question, GatewayError> {
    self.get_json(&format!("/questions/{question_id}")).await
  }

  /// Question counts per subject, plus a `total` entry.
  #[instrument(level = "info", skip(self))]
  pub async fn fetch_subject_counts(&self) -> Result<SubjectCountsOut, GatewayError> {
    self.get_json("/questions/subjects/counts").await
  }

  // --- Stateless tracking ---

  #[instrument(level = "info", skip(self, user_answer), fields(answer_len = user_answer.len()))]
  pub async fn track_answer(
    &self,
    user_id: i64,
    question_id: i64,
    user_answer: &str,
    time_spent_seconds: u64,
  ) -> Result<TrackAck, GatewayError> {
    let body = TrackAnswerIn { user_id, question_id, user_answer, time_spent_seconds };
    self.post_json("/track-answer", &body).await
  }

  // --- Analytics & feedback ---

  #[instrument(level = "info", skip(self))]
  pub async fn fetch_analytics(&self, user_id: i64) -> Result<AnalyticsSnapshot, GatewayError> {
    let snapshot: AnalyticsSnapshot = self.get_json(&format!("/analytics/{user_id}")).await?;
    info!(target: "gateway", total_answered = snapshot.total_answered, weak_areas = snapshot.weak_areas.len(), "Analytics fetched");
    Ok(snapshot)
  }

  #[instrument(level = "info", skip(self))]
  pub async fn fetch_ai_feedback(&self, user_id: i64) -> Result<AiFeedback, GatewayError> {
    let fb: AiFeedback = self.get_json(&format!("/ai-feedback/{user_id}")).await?;
    info!(target: "gateway", ai_generated = fb.ai_generated, recommendations = fb.recommendations.len(), "AI feedback fetched");
    Ok(fb)
  }

  #[instrument(level = "info", skip(self))]
  pub async fn fetch_subject_feedback(&self, user_id: i64, subject: &str) -> Result<SubjectFeedback, GatewayError> {
    self.get_json(&format!("/ai-feedback/{user_id}/subject/{subject}")).await
  }

  // --- Auth ---

  /// Register, keep the issued token, then load the profile.
  #[instrument(level = "info", skip(self, password))]
  pub async fn register(
    &mut self,
    email: &str,
    password: &str,
    full_name: &str,
    username: &str,
  ) -> Result<User, AuthError> {
    let body = RegisterIn { email, password, full_name, username };
    let out: TokenOut = self.post_json("/auth/register", &body).await?;
    self.auth.login(out.access_token)?;
    self.current_user().await
  }

  /// `username` may also be the account email.
  #[instrument(level = "info", skip(self, password))]
  pub async fn login(&mut self, username: &str, password: &str) -> Result<User, AuthError> {
    let body = LoginIn { username, password };
    let out: TokenOut = self.post_json("/auth/login", &body).await?;
    self.auth.login(out.access_token)?;
    self.current_user().await
  }

  /// Any failure drops the token: there is no refresh, so the user is logged out.
  #[instrument(level = "info", skip(self))]
  pub async fn current_user(&mut self) -> Result<User, AuthError> {
    if !self.auth.is_logged_in() {
      return Err(AuthError::NotLoggedIn);
    }
    match self.get_json::<MeOut>("/auth/me").await {
      Ok(me) => {
        let user = me.into_user();
        info!(target: "auth", user_id = ?user.id, "Current user loaded");
        self.auth.set_user(user.clone());
        Ok(user)
      }
      Err(e) => {
        warn!(target: "auth", error = %e, "Token rejected or profile unavailable; logging out");
        self.auth.logout();
        Err(e.into())
      }
    }
  }

  #[instrument(level = "debug", skip(self))]
  pub async fn health(&self) -> Result<bool, GatewayError> {
    let url = format!("{}/health", self.origin);
    let req = self.client.get(url).header(USER_AGENT, CLIENT_UA);
    let out: HealthOut = self.send_json(req, "/health").await?;
    Ok(out.status == "healthy" || out.status == "ok")
  }
}

#[async_trait]
impl SessionApi for Gateway {
  #[instrument(level = "info", skip(self))]
  async fn start_session(&self, session_type: &str) -> Result<i64, GatewayError> {
    let out: StartSessionOut = self.post_json("/sessions/start", &StartSessionIn { session_type }).await?;
    info!(target: "gateway", session_id = out.session_id, "Session started");
    Ok(out.session_id)
  }

  #[instrument(level = "info", skip(self, user_answer), fields(answer_len = user_answer.len()))]
  async fn submit_answer(
    &self,
    session_id: i64,
    question_id: i64,
    user_answer: &str,
    time_spent_seconds: u64,
  ) -> Result<SubmitAck, GatewayError> {
    let body = SubmitAnswerIn { session_id, question_id, user_answer, time_spent_seconds };
    self.post_json("/sessions/submit", &body).await
  }

  #[instrument(level = "info", skip(self))]
  async fn finish_session(&self, session_id: i64) -> Result<SessionResults, GatewayError> {
    let out: SessionResults = self.post_json("/sessions/finish", &FinishSessionIn { session_id }).await?;
    info!(target: "gateway", session_id, composite = out.composite_score, total = out.total_questions, "Session finished");
    Ok(out)
  }
}
