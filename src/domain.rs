//! Domain models consumed from the backend: questions, answers, analytics, feedback.
//!
//! All of these are read-only snapshots of server state except `AnsweredQuestion`,
//! which the session store builds locally when the user picks a choice.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// ACT section a question belongs to.
/// Unknown labels are preserved so a new backend subject never breaks decoding.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Subject {
  Math,
  English,
  Reading,
  Science,
  Other(String),
}

impl Subject {
  pub const ALL: [Subject; 4] = [Subject::Math, Subject::English, Subject::Reading, Subject::Science];

  pub fn as_str(&self) -> &str {
    match self {
      Subject::Math => "math",
      Subject::English => "english",
      Subject::Reading => "reading",
      Subject::Science => "science",
      Subject::Other(s) => s,
    }
  }

  /// "math" -> "Math".
  pub fn display_name(&self) -> String {
    let s = self.as_str();
    let mut chars = s.chars();
    match chars.next() {
      Some(first) => first.to_uppercase().chain(chars).collect(),
      None => String::new(),
    }
  }
}

impl From<String> for Subject {
  fn from(s: String) -> Self {
    match s.as_str() {
      "math" => Subject::Math,
      "english" => Subject::English,
      "reading" => Subject::Reading,
      "science" => Subject::Science,
      _ => Subject::Other(s),
    }
  }
}

impl From<&str> for Subject {
  fn from(s: &str) -> Self {
    Subject::from(s.to_string())
  }
}

impl From<Subject> for String {
  fn from(s: Subject) -> Self {
    match s {
      Subject::Other(s) => s,
      known => known.as_str().to_string(),
    }
  }
}

impl fmt::Display for Subject {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A practice question as served by `/questions`.
///
/// The list endpoint of some backend revisions names the text field `question`
/// and strips `correct_answer`/`explanation`; both shapes decode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
  pub id: i64,
  pub subject: Subject,
  #[serde(alias = "question")]
  pub question_text: String,
  #[serde(default)]
  pub choices: Vec<String>,
  #[serde(default)]
  pub correct_answer: String,
  #[serde(default)]
  pub explanation: String,
  #[serde(default)]
  pub difficulty: String,
}

/// Exact byte comparison. No trimming, no case folding. An empty key never matches.
pub fn matches_key(answer: &str, key: &str) -> bool {
  !key.is_empty() && answer == key
}

impl Question {
  pub fn is_correct(&self, answer: &str) -> bool {
    matches_key(answer, &self.correct_answer)
  }

  /// The backend promises `correct_answer` is one of `choices`; we only check it for logging.
  pub fn answer_key_consistent(&self) -> bool {
    self.choices.iter().filter(|c| **c == self.correct_answer).count() == 1
  }
}

/// One answered question, created locally when the user checks a choice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnsweredQuestion {
  pub question_id: i64,
  pub selected_answer: String,
  pub is_correct: bool,
  pub elapsed_seconds: u64,
}

/// Backend acknowledgement for a session-mode submit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmitAck {
  pub question_id: i64,
  pub user_answer: String,
  pub is_correct: bool,
  #[serde(default)]
  pub correct_answer: String,
  #[serde(default)]
  pub explanation: String,
  #[serde(default)]
  pub subject: Option<Subject>,
}

/// Backend acknowledgement for a stateless `/track-answer` call. Shape varies by revision.
pub type TrackAck = serde_json::Value;

/// Summary the backend computes when a session is finished.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionResults {
  pub session_id: i64,
  pub total_questions: u32,
  pub total_correct: u32,
  #[serde(default)]
  pub section_scores: BTreeMap<String, u32>,
  #[serde(default)]
  pub composite_score: u32,
  #[serde(default)]
  pub completed_at: Option<String>,
  #[serde(default)]
  pub duration_seconds: Option<i64>,
}

/// total / correct / accuracy for one subject or difficulty bucket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
  pub total: u32,
  pub correct: u32,
  pub accuracy: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
  High,
  Medium,
  Other(String),
}

impl From<String> for Priority {
  fn from(s: String) -> Self {
    match s.as_str() {
      "high" => Priority::High,
      "medium" => Priority::Medium,
      _ => Priority::Other(s),
    }
  }
}

impl From<Priority> for String {
  fn from(p: Priority) -> Self {
    match p {
      Priority::High => "high".into(),
      Priority::Medium => "medium".into(),
      Priority::Other(s) => s,
    }
  }
}

/// Subject flagged by the backend as under its accuracy threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeakArea {
  pub subject: Subject,
  pub accuracy: f64,
  #[serde(alias = "attempts")]
  pub total_attempted: u32,
  pub priority: Priority,
}

/// Aggregates from `/analytics/{user_id}`.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
  #[serde(default)]
  pub total_answered: u32,
  #[serde(default)]
  pub total_correct: u32,
  #[serde(default)]
  pub overall_accuracy: f64,
  #[serde(default)]
  pub by_subject: BTreeMap<String, CategoryStats>,
  #[serde(default)]
  pub by_difficulty: BTreeMap<String, CategoryStats>,
  #[serde(default)]
  pub weak_areas: Vec<WeakArea>,
}

impl AnalyticsSnapshot {
  pub fn is_empty(&self) -> bool {
    self.total_answered == 0
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
  #[serde(default)]
  pub overall_accuracy: f64,
  #[serde(default)]
  pub total_answered: u32,
  #[serde(default)]
  pub weak_areas_count: u32,
}

/// Feedback text from `/ai-feedback/{user_id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AiFeedback {
  pub feedback: String,
  #[serde(default)]
  pub recommendations: Vec<String>,
  #[serde(default)]
  pub analytics_summary: Option<AnalyticsSummary>,
  /// false when the backend served its rule-based fallback text.
  #[serde(default)]
  pub ai_generated: bool,
}

/// Feedback scoped to one subject, from `/ai-feedback/{user_id}/subject/{subject}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubjectFeedback {
  pub feedback: String,
  pub subject: Subject,
  #[serde(default)]
  pub ai_generated: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  #[serde(default)]
  pub id: Option<i64>,
  pub email: String,
  #[serde(default)]
  pub full_name: Option<String>,
  #[serde(default)]
  pub username: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn subject_round_trips_unknown_labels() {
    let s: Subject = serde_json::from_str("\"physics\"").unwrap();
    assert_eq!(s, Subject::Other("physics".into()));
    assert_eq!(serde_json::to_string(&Subject::Reading).unwrap(), "\"reading\"");
    assert_eq!(Subject::Science.display_name(), "Science");
  }

  #[test]
  fn question_accepts_both_text_field_names() {
    let legacy = r#"{"id":1,"subject":"math","question":"What is 2 + 2?","choices":["2","3","4","5"],"correct_answer":"4"}"#;
    let q: Question = serde_json::from_str(legacy).unwrap();
    assert_eq!(q.question_text, "What is 2 + 2?");
    assert!(q.answer_key_consistent());
    assert!(q.explanation.is_empty());

    let current = r#"{"id":2,"subject":"english","question_text":"Pick one","choices":["a"],"correct_answer":"a","explanation":"e","difficulty":"easy"}"#;
    let q: Question = serde_json::from_str(current).unwrap();
    assert_eq!(q.question_text, "Pick one");
    assert_eq!(q.difficulty, "easy");
  }

  #[test]
  fn correctness_is_exact_string_equality() {
    let q = Question {
      id: 7,
      subject: Subject::English,
      question_text: "Choose".into(),
      choices: vec!["Their".into(), "There".into()],
      correct_answer: "Their".into(),
      explanation: String::new(),
      difficulty: "easy".into(),
    };
    assert!(q.is_correct("Their"));
    assert!(!q.is_correct("their"));
    assert!(!q.is_correct("Their "));
    assert!(!matches_key("", ""));
  }

  #[test]
  fn analytics_decodes_weak_areas() {
    let body = r#"{
      "total_answered": 12, "total_correct": 5, "overall_accuracy": 41.7,
      "by_subject": {"math": {"total": 6, "correct": 2, "accuracy": 33.3}},
      "weak_areas": [{"subject":"math","accuracy":33.3,"total_attempted":6,"priority":"high"}]
    }"#;
    let a: AnalyticsSnapshot = serde_json::from_str(body).unwrap();
    assert!(!a.is_empty());
    assert!(a.by_difficulty.is_empty());
    assert_eq!(a.weak_areas[0].priority, Priority::High);
    assert_eq!(a.weak_areas[0].subject, Subject::Math);
  }
}
