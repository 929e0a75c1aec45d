//! Text rendering for the terminal front end.
//!
//! Views take already-fetched data; `Dashboard::load` is the one place that
//! turns gateway failures into explicit "no data" states.

use std::fmt::Write as _;

use tracing::{error, info, instrument, warn};

use crate::domain::{AiFeedback, AnalyticsSnapshot, AnsweredQuestion, Priority, Question, SessionResults, Subject};
use crate::gateway::Gateway;
use crate::session::CheckOutcome;

const DEFAULT_SUBJECT_COLOR: &str = "#61dafb";

/// Fixed per-subject color; unknown subjects share the math color.
pub fn subject_color(subject: &Subject) -> &'static str {
    match subject {
        Subject::Math => "#61dafb",
        Subject::English => "#f39c12",
        Subject::Reading => "#9b59b6",
        Subject::Science => "#2ecc71",
        Subject::Other(_) => DEFAULT_SUBJECT_COLOR,
    }
}

pub fn accuracy_color(accuracy: f64) -> &'static str {
    if accuracy >= 80.0 {
        "#2ecc71"
    } else if accuracy >= 70.0 {
        "#f39c12"
    } else if accuracy >= 60.0 {
        "#e67e22"
    } else {
        "#e74c3c"
    }
}

fn choice_label(i: usize) -> char {
    (b'A' + (i % 26) as u8) as char
}

/// Map "B" / "b" / "2" back to a choice index.
pub fn parse_choice(input: &str, choices: usize) -> Option<usize> {
    let input = input.trim();
    let idx = if let Ok(n) = input.parse::<usize>() {
        n.checked_sub(1)?
    } else {
        let mut chars = input.chars();
        let c = chars.next()?.to_ascii_uppercase();
        if chars.next().is_some() || !c.is_ascii_uppercase() {
            return None;
        }
        (c as u8 - b'A') as usize
    };
    (idx < choices).then_some(idx)
}

pub fn render_question(number: usize, q: &Question, selected: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Q{number} [{} | {}] ({})",
        q.subject.display_name(),
        q.difficulty,
        subject_color(&q.subject)
    );
    let _ = writeln!(out, "{}", q.question_text);
    for (i, choice) in q.choices.iter().enumerate() {
        let marker = if selected == Some(choice.as_str()) { '>' } else { ' ' };
        let _ = writeln!(out, " {marker} {}) {choice}", choice_label(i));
    }
    out
}

/// Correct/incorrect banner, the answer key verbatim, and the explanation.
pub fn render_reveal(outcome: &CheckOutcome) -> String {
    let mut out = String::new();
    if outcome.answered.is_correct {
        let _ = writeln!(out, "Correct! ({}s)", outcome.answered.elapsed_seconds);
    } else {
        let _ = writeln!(out, "Incorrect. You chose: {}", outcome.answered.selected_answer);
        let _ = writeln!(out, "Correct answer: {}", outcome.correct_answer);
    }
    if !outcome.explanation.is_empty() {
        let _ = writeln!(out, "Explanation: {}", outcome.explanation);
    }
    if outcome.ack.is_err() {
        let _ = writeln!(out, "(answer not saved to your history)");
    }
    out
}

pub fn render_results(r: &SessionResults) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Session {} complete", r.session_id);
    let _ = writeln!(out, "  Correct: {}/{}", r.total_correct, r.total_questions);
    for (section, score) in &r.section_scores {
        let _ = writeln!(out, "  {}: {score}/36", Subject::from(section.as_str()).display_name());
    }
    let _ = writeln!(out, "  Composite: {}/36", r.composite_score);
    if let Some(secs) = r.duration_seconds {
        let _ = writeln!(out, "  Duration: {}m {}s", secs / 60, secs % 60);
    }
    out
}

/// Accuracy over locally answered questions.
///
/// Only shown when the backend could not finalize the session; everywhere else
/// accuracy comes from the server.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocalTally {
    pub total: u32,
    pub correct: u32,
}

impl LocalTally {
    pub fn from_answers(answers: &[AnsweredQuestion]) -> Self {
        let total = answers.len() as u32;
        let correct = answers.iter().filter(|a| a.is_correct).count() as u32;
        Self { total, correct }
    }

    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.total) * 100.0
        }
    }

    pub fn render(&self) -> String {
        format!(
            "Unsaved session: {}/{} correct ({:.1}%, {})\n",
            self.correct,
            self.total,
            self.accuracy(),
            accuracy_color(self.accuracy())
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AnalyticsView {
    NoData,
    Loaded(AnalyticsSnapshot),
}

#[derive(Clone, Debug, PartialEq)]
pub enum FeedbackView {
    Unavailable,
    Loaded(AiFeedback),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dashboard {
    pub analytics: AnalyticsView,
    pub feedback: FeedbackView,
}

impl Dashboard {
    /// Fetch analytics and feedback. Failures degrade to placeholder views; never an error.
    #[instrument(level = "info", skip(gateway))]
    pub async fn load(gateway: &Gateway, user_id: i64) -> Self {
        let analytics = match gateway.fetch_analytics(user_id).await {
            Ok(a) if a.is_empty() => AnalyticsView::NoData,
            Ok(a) => AnalyticsView::Loaded(a),
            Err(e) => {
                if e.is_unauthorized() {
                    warn!(target: "act_prep", user_id, "Analytics require a valid login");
                }
                error!(target: "act_prep", user_id, error = %e, "Analytics unavailable");
                AnalyticsView::NoData
            }
        };
        let feedback = match gateway.fetch_ai_feedback(user_id).await {
            Ok(f) => FeedbackView::Loaded(f),
            Err(e) => {
                error!(target: "act_prep", user_id, error = %e, "AI feedback unavailable");
                FeedbackView::Unavailable
            }
        };
        info!(
            target: "act_prep",
            has_analytics = matches!(analytics, AnalyticsView::Loaded(_)),
            has_feedback = matches!(feedback, FeedbackView::Loaded(_)),
            "Dashboard loaded"
        );
        Self { analytics, feedback }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("== Progress ==\n");
        match &self.analytics {
            AnalyticsView::NoData => out.push_str("Answer some questions to see your progress!\n"),
            AnalyticsView::Loaded(a) => render_analytics(&mut out, a),
        }
        match &self.feedback {
            FeedbackView::Unavailable => out.push_str("Feedback is not available right now.\n"),
            FeedbackView::Loaded(f) => {
                let source = if f.ai_generated { "AI tutor" } else { "Study tips" };
                let _ = writeln!(out, "-- {source} --\n{}", f.feedback);
                for (i, rec) in f.recommendations.iter().enumerate() {
                    let _ = writeln!(out, "  {}. {rec}", i + 1);
                }
            }
        }
        out
    }
}

fn render_analytics(out: &mut String, a: &AnalyticsSnapshot) {
    let _ = writeln!(
        out,
        "Answered: {}  Correct: {}  Accuracy: {:.1}% ({})",
        a.total_answered,
        a.total_correct,
        a.overall_accuracy,
        accuracy_color(a.overall_accuracy)
    );
    for (label, stats) in &a.by_subject {
        let subject = Subject::from(label.as_str());
        let _ = writeln!(
            out,
            "  {:<8} {:>5.1}% ({}/{}) {}",
            subject.display_name(),
            stats.accuracy,
            stats.correct,
            stats.total,
            subject_color(&subject)
        );
    }
    for (label, stats) in &a.by_difficulty {
        let _ = writeln!(out, "  [{label}] {:.1}% ({}/{})", stats.accuracy, stats.correct, stats.total);
    }
    if a.weak_areas.is_empty() {
        out.push_str("No weak areas. Keep it up!\n");
    } else {
        out.push_str("Weak areas:\n");
        for w in &a.weak_areas {
            let priority = match &w.priority {
                Priority::High => "high",
                Priority::Medium => "medium",
                Priority::Other(p) => p.as_str(),
            };
            let _ = writeln!(
                out,
                "  {} {:.1}% over {} attempts, {priority} priority ({})",
                w.subject.display_name(),
                w.accuracy,
                w.total_attempted,
                accuracy_color(w.accuracy)
            );
        }
    }
}
