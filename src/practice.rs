//! One question at a time: turn a line of user input into a store action.
//!
//! Picking a choice only records the selection. Nothing goes to the backend
//! until the user asks to check, so the time between the first pick and the
//! check is what gets submitted.

use tracing::debug;

use crate::domain::Question;
use crate::error::SessionError;
use crate::gateway::SessionApi;
use crate::session::{CheckOutcome, SessionStore};
use crate::view::parse_choice;

pub const INPUT_HINT: &str = "Pick a letter, press Enter to check, [s]kip or [q]uit:";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
  Select(usize),
  Check,
  Skip,
  Quit,
  Invalid,
}

/// An empty line or "check" checks; "s"/"q" win over choice letters.
pub fn parse_input(input: &str, choices: usize) -> Input {
  match input.trim() {
    "" | "check" => Input::Check,
    "s" | "skip" => Input::Skip,
    "q" | "quit" => Input::Quit,
    other => parse_choice(other, choices).map_or(Input::Invalid, Input::Select),
  }
}

#[derive(Debug)]
pub enum Step {
  /// Selection recorded; re-render and keep asking.
  Selected(String),
  /// Answer checked and submitted.
  Checked(CheckOutcome),
  /// Check requested before any pick.
  NeedSelection,
  Skip,
  Quit,
  Invalid,
}

impl Step {
  /// True once the current question is done with.
  pub fn ends_question(&self) -> bool {
    matches!(self, Step::Checked(_) | Step::Skip | Step::Quit)
  }
}

pub async fn handle_input<A: SessionApi>(
  store: &mut SessionStore<A>,
  question: &Question,
  input: &str,
) -> Result<Step, SessionError> {
  match parse_input(input, question.choices.len()) {
    Input::Select(idx) => {
      let answer = question.choices[idx].clone();
      store.select_answer(question.id, &answer);
      Ok(Step::Selected(answer))
    }
    Input::Check => match store.check_answer(question).await {
      Ok(outcome) => Ok(Step::Checked(outcome)),
      Err(SessionError::NoSelection(id)) => {
        debug!(target: "session", question_id = id, "Check requested with nothing selected");
        Ok(Step::NeedSelection)
      }
      Err(e) => Err(e),
    },
    Input::Skip => Ok(Step::Skip),
    Input::Quit => Ok(Step::Quit),
    Input::Invalid => Ok(Step::Invalid),
  }
}
