//! In-process mock of the practice backend, served by axum on an ephemeral port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
  routing::{get, post},
  Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub const TOKEN: &str = "tok-1";
pub const SESSION_ID: i64 = 7;
/// Analytics and feedback for this user id answer 500.
pub const BROKEN_USER: i64 = 500;

#[derive(Clone, Debug)]
pub struct Recorded {
  pub path: String,
  pub query: HashMap<String, String>,
  pub authorization: Option<String>,
  pub body: Value,
}

#[derive(Default)]
pub struct MockBackend {
  pub requests: Mutex<Vec<Recorded>>,
}

impl MockBackend {
  fn record(&self, path: &str, query: HashMap<String, String>, headers: &HeaderMap, body: Value) {
    let authorization = headers
      .get("authorization")
      .and_then(|v| v.to_str().ok())
      .map(str::to_string);
    self.requests.lock().unwrap().push(Recorded { path: path.to_string(), query, authorization, body });
  }

  pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
    self.requests.lock().unwrap().iter().filter(|r| r.path == path).cloned().collect()
  }
}

type Shared = Arc<MockBackend>;

pub fn question_bank() -> Vec<Value> {
  vec![
    json!({"id": 1, "subject": "math", "question_text": "If 3x = 12, what is x?", "choices": ["3", "4", "6", "9"],
           "correct_answer": "4", "explanation": "Divide both sides by 3.", "difficulty": "easy"}),
    json!({"id": 2, "subject": "math", "question_text": "What is 15% of 80?", "choices": ["8", "10", "12", "15"],
           "correct_answer": "12", "explanation": "0.15 x 80 = 12.", "difficulty": "medium"}),
    json!({"id": 3, "subject": "math", "question_text": "Slope of y = -2x + 5?", "choices": ["-2", "2", "5", "-5"],
           "correct_answer": "-2", "explanation": "y = mx + b, m is the slope.", "difficulty": "easy"}),
    json!({"id": 4, "subject": "english", "question_text": "Choose the correct word.", "choices": ["Their", "There"],
           "correct_answer": "Their", "explanation": "Possessive.", "difficulty": "easy"}),
  ]
}

fn find_question(id: i64) -> Option<Value> {
  question_bank().into_iter().find(|q| q["id"] == json!(id))
}

fn bearer_ok(headers: &HeaderMap) -> bool {
  headers
    .get("authorization")
    .and_then(|v| v.to_str().ok())
    .map_or(false, |v| v == format!("Bearer {TOKEN}"))
}

async fn questions(State(s): State<Shared>, Query(q): Query<HashMap<String, String>>, headers: HeaderMap) -> impl IntoResponse {
  s.record("/api/questions", q.clone(), &headers, Value::Null);
  let limit = q.get("limit").and_then(|l| l.parse::<usize>().ok()).unwrap_or(10);
  let list: Vec<Value> = question_bank()
    .into_iter()
    .filter(|item| q.get("subject").map_or(true, |subj| item["subject"] == json!(subj)))
    .take(limit)
    .collect();
  Json(json!({ "questions": list, "count": list.len(), "page": 1 }))
}

async fn question_by_id(Path(id): Path<i64>) -> axum::response::Response {
  match find_question(id) {
    Some(q) => Json(q).into_response(),
    None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Question not found"}))).into_response(),
  }
}

async fn subject_counts() -> impl IntoResponse {
  Json(json!({ "math": 3, "english": 1, "reading": 0, "science": 0, "total": 4 }))
}

async fn start(State(s): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
  s.record("/api/sessions/start", HashMap::new(), &headers, body);
  Json(json!({ "session_id": SESSION_ID, "started_at": "2024-01-01T00:00:00" }))
}

async fn submit(State(s): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> axum::response::Response {
  s.record("/api/sessions/submit", HashMap::new(), &headers, body.clone());
  let Some(q) = body["question_id"].as_i64().and_then(find_question) else {
    return (StatusCode::NOT_FOUND, Json(json!({"detail": "Question not found"}))).into_response();
  };
  let answer = body["user_answer"].as_str().unwrap_or_default();
  let key = q["correct_answer"].as_str().unwrap_or_default();
  Json(json!({
    "question_id": q["id"],
    "user_answer": answer,
    // The real backend folds case and trims.
    "is_correct": answer.trim().to_lowercase() == key.trim().to_lowercase(),
    "correct_answer": key,
    "explanation": q["explanation"],
    "subject": q["subject"],
  }))
  .into_response()
}

async fn finish(State(s): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
  s.record("/api/sessions/finish", HashMap::new(), &headers, body.clone());
  let answered = s.requests_to("/api/sessions/submit");
  let correct = answered
    .iter()
    .filter(|r| {
      r.body["question_id"].as_i64().and_then(find_question).map_or(false, |q| q["correct_answer"] == r.body["user_answer"])
    })
    .count();
  Json(json!({
    "session_id": body["session_id"],
    "total_questions": answered.len(),
    "total_correct": correct,
    "section_scores": {"math": 12},
    "composite_score": 12,
    "completed_at": "2024-01-01T00:05:00",
    "duration_seconds": 300
  }))
}

async fn track(State(s): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
  s.record("/api/track-answer", HashMap::new(), &headers, body);
  Json(json!({ "status": "tracked" }))
}

async fn analytics(State(s): State<Shared>, Path(user_id): Path<i64>, headers: HeaderMap) -> axum::response::Response {
  s.record("/api/analytics", HashMap::new(), &headers, json!(user_id));
  if user_id == BROKEN_USER {
    return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "db offline"}))).into_response();
  }
  if user_id == 0 {
    return Json(json!({"total_answered": 0, "total_correct": 0, "overall_accuracy": 0.0,
                       "by_subject": {}, "by_difficulty": {}, "weak_areas": []})).into_response();
  }
  Json(json!({
    "total_answered": 12, "total_correct": 5, "overall_accuracy": 41.7,
    "by_subject": {"math": {"total": 8, "correct": 3, "accuracy": 37.5}, "english": {"total": 4, "correct": 2, "accuracy": 50.0}},
    "by_difficulty": {"easy": {"total": 12, "correct": 5, "accuracy": 41.7}},
    "weak_areas": [{"subject": "math", "accuracy": 37.5, "total_attempted": 8, "priority": "high"}]
  }))
  .into_response()
}

async fn feedback(State(s): State<Shared>, Path(user_id): Path<i64>, headers: HeaderMap) -> axum::response::Response {
  s.record("/api/ai-feedback", HashMap::new(), &headers, json!(user_id));
  if user_id == BROKEN_USER {
    return (StatusCode::INTERNAL_SERVER_ERROR, "oops").into_response();
  }
  Json(json!({
    "feedback": "Focus on algebra.",
    "recommendations": ["Practice more Math questions (current accuracy: 37.5%)"],
    "analytics_summary": {"overall_accuracy": 41.7, "total_answered": 12, "weak_areas_count": 1},
    "ai_generated": false
  }))
  .into_response()
}

async fn subject_feedback(Path((_user_id, subject)): Path<(i64, String)>) -> impl IntoResponse {
  Json(json!({ "feedback": format!("Keep going with {subject}."), "subject": subject, "ai_generated": false }))
}

async fn login(State(s): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> axum::response::Response {
  s.record("/api/auth/login", HashMap::new(), &headers, body.clone());
  if body["password"] == json!("secret") {
    Json(json!({ "user": {"email": "sam@example.com"}, "access_token": TOKEN })).into_response()
  } else {
    (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Invalid credentials"}))).into_response()
  }
}

async fn register(State(s): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
  s.record("/api/auth/register", HashMap::new(), &headers, body.clone());
  Json(json!({ "user": body, "access_token": TOKEN }))
}

async fn me(State(s): State<Shared>, headers: HeaderMap) -> axum::response::Response {
  s.record("/api/auth/me", HashMap::new(), &headers, Value::Null);
  if !bearer_ok(&headers) {
    return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Invalid token"}))).into_response();
  }
  Json(json!({ "user": {"id": 5, "email": "sam@example.com", "full_name": "Sam", "username": "sam"} })).into_response()
}

async fn health() -> impl IntoResponse {
  Json(json!({ "status": "healthy" }))
}

/// Start the mock and return its root URL (no `/api` suffix) plus shared state.
pub async fn spawn_backend() -> (String, Shared) {
  let state: Shared = Arc::new(MockBackend::default());
  let app = Router::new()
    .route("/health", get(health))
    .route("/api/questions", get(questions))
    .route("/api/questions/subjects/counts", get(subject_counts))
    .route("/api/questions/:id", get(question_by_id))
    .route("/api/sessions/start", post(start))
    .route("/api/sessions/submit", post(submit))
    .route("/api/sessions/finish", post(finish))
    .route("/api/track-answer", post(track))
    .route("/api/analytics/:user_id", get(analytics))
    .route("/api/ai-feedback/:user_id", get(feedback))
    .route("/api/ai-feedback/:user_id/subject/:subject", get(subject_feedback))
    .route("/api/auth/login", post(login))
    .route("/api/auth/register", post(register))
    .route("/api/auth/me", get(me))
    .with_state(state.clone())
    .layer(TraceLayer::new_for_http());

  let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });
  (format!("http://{addr}"), state)
}

/// An address nothing listens on.
pub async fn dead_url() -> String {
  let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await.unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);
  format!("http://{addr}")
}
