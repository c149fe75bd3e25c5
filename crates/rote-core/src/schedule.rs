//! The review scheduler.
//!
//! A simplified two-outcome variant of ease-factor scheduling: every review
//! is either `easy` or `hard`. An easy review grows the interval by the
//! card's current easiness factor and nudges the factor up; a hard review
//! resets the interval to one day and pulls the factor down. The factor is
//! clamped to [`MIN_EASINESS`]..=[`MAX_EASINESS`].

use chrono::{DateTime, Datelike as _, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

pub const MIN_EASINESS: f64 = 1.3;
pub const MAX_EASINESS: f64 = 3.0;
pub const DEFAULT_EASINESS: f64 = 2.5;

/// Longest interval a review can schedule: a hundred years.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;
/// Highest repetition count a card can carry into a review.
pub const MAX_REPETITIONS: u32 = 1_000_000;

const EASY_STEP: f64 = 0.1;
const HARD_STEP: f64 = 0.2;

/// The user's self-reported recall quality for one review.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Response {
  Easy,
  Hard,
}

impl Response {
  /// Parse an untrusted response string. Only the exact values `easy` and
  /// `hard` are accepted.
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::InvalidResponse(s.to_owned()))
  }

  /// Whether this response counts towards a session's correct answers.
  pub fn is_correct(self) -> bool { matches!(self, Self::Easy) }
}

/// The scheduling state carried by every card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
  pub easiness_factor:  f64,
  pub interval_days:    u32,
  pub repetition_count: u32,
  pub next_review_at:   DateTime<Utc>,
}

impl Schedule {
  /// The state of a freshly created card: due immediately.
  pub fn initial(created_at: DateTime<Utc>) -> Self {
    Self {
      easiness_factor:  DEFAULT_EASINESS,
      interval_days:    1,
      repetition_count: 0,
      next_review_at:   created_at,
    }
  }

  /// Check the state against its domain. Stored state can only leave the
  /// domain through an external write, so this is an error, not a clamp.
  pub fn check(&self) -> Result<()> {
    check_easiness(self.easiness_factor)?;
    check_interval(self.interval_days)?;
    check_repetitions(self.repetition_count)?;
    check_review_at(self.next_review_at)
  }

  pub fn is_due(&self, as_of: DateTime<Utc>) -> bool { self.next_review_at <= as_of }

  /// Apply one review at `now` and return the resulting state.
  pub fn next(&self, response: Response, now: DateTime<Utc>) -> Self {
    let (easiness_factor, interval_days) = match response {
      Response::Easy => {
        let grown = (f64::from(self.interval_days) * self.easiness_factor)
          .round()
          .clamp(1.0, f64::from(MAX_INTERVAL_DAYS));
        (
          (self.easiness_factor + EASY_STEP).min(MAX_EASINESS),
          grown as u32,
        )
      }
      Response::Hard => ((self.easiness_factor - HARD_STEP).max(MIN_EASINESS), 1),
    };

    Self {
      easiness_factor,
      interval_days,
      repetition_count: self.repetition_count.saturating_add(1),
      next_review_at: now + Duration::days(i64::from(interval_days)),
    }
  }
}

pub(crate) fn check_easiness(value: f64) -> Result<()> {
  if !(MIN_EASINESS..=MAX_EASINESS).contains(&value) {
    return Err(Error::validation(
      "easiness_factor",
      format!("must be between {MIN_EASINESS} and {MAX_EASINESS}, got {value}"),
    ));
  }
  Ok(())
}

pub(crate) fn check_interval(value: u32) -> Result<()> {
  if !(1..=MAX_INTERVAL_DAYS).contains(&value) {
    return Err(Error::validation(
      "interval_days",
      format!("must be between 1 and {MAX_INTERVAL_DAYS}, got {value}"),
    ));
  }
  Ok(())
}

/// Stored timestamps are written as four-digit-year RFC 3339 strings.
pub(crate) fn check_review_at(at: DateTime<Utc>) -> Result<()> {
  if !(0..=9999).contains(&at.year()) {
    return Err(Error::validation(
      "next_review_at",
      format!("year must be between 0 and 9999, got {}", at.year()),
    ));
  }
  Ok(())
}

pub(crate) fn check_repetitions(value: u32) -> Result<()> {
  if value > MAX_REPETITIONS {
    return Err(Error::validation(
      "repetition_count",
      format!("must be at most {MAX_REPETITIONS}, got {value}"),
    ));
  }
  Ok(())
}
