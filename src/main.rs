//! act-prep · terminal ACT practice client
//!
//! Usage:
//!   act-prep [SUBJECT]   practice (SUBJECT: all | math | english | reading | science)
//!   act-prep dashboard   show analytics and feedback only
//!   act-prep logout      forget the saved token
//!
//! Important env variables:
//!   ACT_API_URL         : backend URL (default "http://localhost:8000/api")
//!   ACT_TOKEN_PATH      : saved token location (default "$HOME/.act-prep-token")
//!   ACT_QUESTION_LIMIT  : questions per round (default 20)
//!   ACT_CONFIG_PATH     : optional TOML file with the same settings
//!   ACT_USER_ID         : user id for analytics when the profile has none
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info, instrument, warn};

use act_prep_client::domain::User;
use act_prep_client::practice::{handle_input, Step, INPUT_HINT};
use act_prep_client::view::{render_question, render_results, render_reveal, Dashboard, LocalTally};
use act_prep_client::{telemetry, AuthContext, AuthError, ClientConfig, Gateway, SessionStore, Subject, TokenStore};

/// Line-oriented stdin prompts.
struct Prompt {
  lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
  fn new() -> Self {
    Self { lines: BufReader::new(tokio::io::stdin()).lines() }
  }

  /// `None` on end of input.
  async fn ask(&mut self, label: &str) -> std::io::Result<Option<String>> {
    println!("{label}");
    Ok(self.lines.next_line().await?.map(|l| l.trim().to_string()))
  }
}

enum Command {
  Practice(Option<String>),
  Dashboard,
  Logout,
}

fn parse_command(arg: Option<String>) -> Command {
  match arg.as_deref() {
    Some("dashboard") => Command::Dashboard,
    Some("logout") => Command::Logout,
    Some(subject) => Command::Practice(Some(subject.to_lowercase())),
    None => Command::Practice(None),
  }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let config = ClientConfig::from_env()?;
  let auth = AuthContext::with_store(TokenStore::new(&config.token_path));
  let mut gateway = Gateway::new(&config, auth);
  let command = parse_command(std::env::args().nth(1));

  if let Command::Logout = command {
    gateway.logout();
    println!("Logged out.");
    return Ok(());
  }

  match gateway.health().await {
    Ok(true) => info!(target: "act_prep", api = %gateway.api_base(), "Backend healthy"),
    Ok(false) => warn!(target: "act_prep", "Backend reports unhealthy status"),
    Err(e) => warn!(target: "act_prep", error = %e, "Health check failed; continuing"),
  }

  let mut prompt = Prompt::new();
  let Some(user) = ensure_logged_in(&mut gateway, &mut prompt).await? else {
    println!("Not logged in. Bye.");
    return Ok(());
  };
  let user_id = user.id.or_else(|| std::env::var("ACT_USER_ID").ok().and_then(|s| s.parse().ok()));
  println!("Hello, {}!", user.full_name.as_deref().filter(|n| !n.is_empty()).unwrap_or(user.email.as_str()));

  let gateway = Arc::new(gateway);
  if let Command::Practice(subject) = command {
    practice(gateway.clone(), &config, subject.as_deref(), &mut prompt).await?;
  }

  match user_id {
    Some(id) => print!("{}", Dashboard::load(&gateway, id).await.render()),
    None => println!("Set ACT_USER_ID to see your progress dashboard."),
  }
  Ok(())
}

/// Reuse a saved token, otherwise ask for login or registration.
async fn ensure_logged_in(gateway: &mut Gateway, prompt: &mut Prompt) -> Result<Option<User>, Box<dyn std::error::Error>> {
  if gateway.auth().is_logged_in() {
    match gateway.current_user().await {
      Ok(user) => return Ok(Some(user)),
      Err(e) => println!("Saved login expired ({e}). Please log in again."),
    }
  }

  loop {
    let Some(choice) = prompt.ask("[l]ogin, [r]egister or [q]uit?").await? else { return Ok(None) };
    let result = match choice.as_str() {
      "l" | "login" => {
        let Some(username) = prompt.ask("Username or email:").await? else { return Ok(None) };
        let Some(password) = prompt.ask("Password:").await? else { return Ok(None) };
        gateway.login(&username, &password).await
      }
      "r" | "register" => {
        let Some(email) = prompt.ask("Email:").await? else { return Ok(None) };
        let Some(password) = prompt.ask("Password:").await? else { return Ok(None) };
        let Some(full_name) = prompt.ask("Full name (optional):").await? else { return Ok(None) };
        let Some(username) = prompt.ask("Username (optional):").await? else { return Ok(None) };
        gateway.register(&email, &password, &full_name, &username).await
      }
      "q" | "quit" => return Ok(None),
      _ => continue,
    };
    match result {
      Ok(user) => return Ok(Some(user)),
      Err(AuthError::Rejected(reason)) => println!("{reason}"),
      Err(e) => {
        error!(target: "act_prep", error = %e, "Authentication failed");
        println!("Login failed: {e}");
      }
    }
  }
}

#[instrument(level = "info", skip(gateway, config, prompt))]
async fn practice(
  gateway: Arc<Gateway>,
  config: &ClientConfig,
  subject: Option<&str>,
  prompt: &mut Prompt,
) -> Result<(), Box<dyn std::error::Error>> {
  if let Some(s) = subject.filter(|s| *s != "all") {
    if !Subject::ALL.iter().any(|known| known.as_str() == s) {
      println!("Unknown subject '{s}'; asking the backend anyway.");
    }
  }

  match gateway.fetch_subject_counts().await {
    Ok(counts) => {
      let summary: Vec<String> = counts.iter().map(|(subject, n)| format!("{subject}: {n}")).collect();
      println!("Question bank: {}", summary.join(", "));
    }
    Err(e) => warn!(target: "act_prep", error = %e, "Subject counts unavailable"),
  }

  let mut store = SessionStore::new(gateway.clone());
  if let Err(e) = store.start().await {
    // Checking an answer retries the start.
    println!("Session not started yet ({e}); answers will start it.");
  }

  let questions = match gateway.fetch_questions(subject, config.question_limit).await {
    Ok(q) => q,
    Err(e) => {
      error!(target: "act_prep", error = %e, "Could not load questions");
      Vec::new()
    }
  };
  if questions.is_empty() {
    println!("No questions available.");
    return Ok(());
  }

  'questions: for (i, q) in questions.iter().enumerate() {
    println!();
    print!("{}", render_question(i + 1, q, None));
    loop {
      let Some(input) = prompt.ask(INPUT_HINT).await? else { break 'questions };
      match handle_input(&mut store, q, &input).await? {
        Step::Selected(answer) => print!("{}", render_question(i + 1, q, Some(answer.as_str()))),
        Step::Checked(outcome) => {
          print!("{}", render_reveal(&outcome));
          break;
        }
        Step::NeedSelection => println!("Pick a choice before checking."),
        Step::Invalid => println!("Pick one of the listed choices."),
        Step::Skip => continue 'questions,
        Step::Quit => break 'questions,
      }
    }
  }

  if store.answers().is_empty() {
    println!("No answers recorded.");
    return Ok(());
  }
  match store.finish().await {
    Ok(results) => print!("{}", render_results(&results)),
    Err(e) => {
      warn!(target: "act_prep", error = %e, "Finish failed; showing local tally");
      println!("Could not save the session ({e}).");
      print!("{}", LocalTally::from_answers(store.answers()).render());
    }
  }
  Ok(())
}
