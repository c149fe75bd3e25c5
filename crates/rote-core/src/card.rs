//! Cards — a question/answer pair plus its scheduling state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  schedule::{Schedule, check_easiness, check_interval, check_repetitions, check_review_at},
  validate::trimmed,
};

pub const MAX_SIDE_LEN: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
  pub card_id:    Uuid,
  pub deck_id:    Uuid,
  pub front:      String,
  pub back:       String,
  #[serde(flatten)]
  pub schedule:   Schedule,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Card {
  pub fn is_due(&self, as_of: DateTime<Utc>) -> bool { self.schedule.is_due(as_of) }
}

/// The text of a card, as supplied by a caller creating one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardContent {
  pub front: String,
  pub back:  String,
}

impl CardContent {
  pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
    Self { front: front.into(), back: back.into() }
  }

  pub fn validated(self) -> Result<Self> {
    Ok(Self {
      front: trimmed("front", &self.front, 1, MAX_SIDE_LEN)?,
      back:  trimmed("back", &self.back, 1, MAX_SIDE_LEN)?,
    })
  }
}

/// A partial maintenance update. Scheduling fields written here bypass the
/// review flow, so they are range-checked rather than derived.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardUpdate {
  pub front:            Option<String>,
  pub back:             Option<String>,
  pub easiness_factor:  Option<f64>,
  pub interval_days:    Option<u32>,
  pub repetition_count: Option<u32>,
  pub next_review_at:   Option<DateTime<Utc>>,
}

impl CardUpdate {
  pub fn validated(self) -> Result<Self> {
    if let Some(e) = self.easiness_factor {
      check_easiness(e)?;
    }
    if let Some(i) = self.interval_days {
      check_interval(i)?;
    }
    if let Some(r) = self.repetition_count {
      check_repetitions(r)?;
    }
    if let Some(at) = self.next_review_at {
      check_review_at(at)?;
    }
    Ok(Self {
      front: self
        .front
        .map(|f| trimmed("front", &f, 1, MAX_SIDE_LEN))
        .transpose()?,
      back: self
        .back
        .map(|b| trimmed("back", &b, 1, MAX_SIDE_LEN))
        .transpose()?,
      ..self
    })
  }

  /// Apply a validated update to `card`, bumping `updated_at`.
  pub fn apply(self, card: &mut Card, now: DateTime<Utc>) {
    if let Some(front) = self.front {
      card.front = front;
    }
    if let Some(back) = self.back {
      card.back = back;
    }
    if let Some(e) = self.easiness_factor {
      card.schedule.easiness_factor = e;
    }
    if let Some(i) = self.interval_days {
      card.schedule.interval_days = i;
    }
    if let Some(r) = self.repetition_count {
      card.schedule.repetition_count = r;
    }
    if let Some(at) = self.next_review_at {
      card.schedule.next_review_at = at;
    }
    card.updated_at = now;
  }
}

/// Review history of a single card across all sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardPerformance {
  pub card_id:                  Uuid,
  pub total_reviews:            usize,
  pub correct_reviews:          usize,
  pub average_response_time_ms: Option<f64>,
  pub last_reviewed_at:         Option<DateTime<Utc>>,
}
