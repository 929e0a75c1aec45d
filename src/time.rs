//! Wall clock used to stamp answer selections.
//!
//! Tests pin it with `Clock::fixed` and move it with `advance`.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
  #[default]
  System,
  Fixed(DateTime<Utc>),
}

impl Clock {
  pub fn fixed(at: DateTime<Utc>) -> Self {
    Self::Fixed(at)
  }

  pub fn now(&self) -> DateTime<Utc> {
    match self {
      Clock::System => Utc::now(),
      Clock::Fixed(t) => *t,
    }
  }

  /// Move a fixed clock forward. No effect on the system clock.
  pub fn advance(&mut self, delta: Duration) {
    if let Clock::Fixed(t) = self {
      *t += delta;
    }
  }
}

/// Whole seconds between `since` and `now`, floored and never negative.
pub fn elapsed_whole_seconds(since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
  let secs = (now - since).num_seconds();
  if secs < 0 { 0 } else { secs as u64 }
}
