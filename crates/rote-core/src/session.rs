//! Study sessions and the review events recorded within them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  card::Card,
  schedule::{Response, Schedule},
};

/// The kind of study run; decides which cards are queued and in what order
/// (see [`crate::queue`]).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr, Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionType {
  /// Cards that are due, oldest due date first.
  #[default]
  Review,
  /// Every card in the deck, hardest first.
  Cram,
  /// Cards that have never been reviewed.
  New,
}

impl SessionType {
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownSessionType(s.to_owned()))
  }
}

/// Lifecycle status of a stored session. An abandoned session is deleted,
/// so it has no status of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
  Active,
  Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
  pub session_id:    Uuid,
  pub deck_id:       Uuid,
  pub session_type:  SessionType,
  pub cards_studied: u32,
  pub cards_correct: u32,
  pub started_at:    DateTime<Utc>,
  pub completed_at:  Option<DateTime<Utc>>,
}

impl StudySession {
  pub fn status(&self) -> SessionStatus {
    match self.completed_at {
      Some(_) => SessionStatus::Completed,
      None => SessionStatus::Active,
    }
  }

  pub fn is_active(&self) -> bool { self.completed_at.is_none() }

  /// Fail with [`Error::SessionCompleted`] unless the session is active.
  pub fn ensure_active(&self) -> Result<()> {
    if self.is_active() {
      Ok(())
    } else {
      Err(Error::SessionCompleted(self.session_id))
    }
  }
}

/// One card's review outcome within one session. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCard {
  pub event_id:         Uuid,
  pub session_id:       Uuid,
  pub card_id:          Uuid,
  pub response:         Response,
  pub response_time_ms: Option<u32>,
  pub reviewed_at:      DateTime<Utc>,
}

/// Input to [`crate::store::FlashcardStore::record_review`]: the event to
/// append together with the card's new scheduling state.
#[derive(Debug, Clone)]
pub struct ReviewRecord {
  pub session_id:       Uuid,
  pub card_id:          Uuid,
  pub response:         Response,
  pub response_time_ms: Option<u32>,
  pub reviewed_at:      DateTime<Utc>,
  pub schedule:         Schedule,
}

/// Session counters derived from the session's events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTally {
  pub studied: u32,
  pub correct: u32,
}

impl SessionTally {
  pub fn from_events(events: &[SessionCard]) -> Self {
    events.iter().fold(Self::default(), |mut tally, event| {
      tally.studied += 1;
      if event.response.is_correct() {
        tally.correct += 1;
      }
      tally
    })
  }

  pub fn matches(&self, session: &StudySession) -> bool {
    self.studied == session.cards_studied && self.correct == session.cards_correct
  }
}

/// Mean of the response times that were recorded, if any were.
pub fn average_response_time(events: &[SessionCard]) -> Option<f64> {
  let times: Vec<u32> = events.iter().filter_map(|e| e.response_time_ms).collect();
  if times.is_empty() {
    return None;
  }
  let total: u64 = times.iter().map(|&t| u64::from(t)).sum();
  Some(total as f64 / times.len() as f64)
}

/// Everything a single accepted review changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewOutcome {
  pub event:   SessionCard,
  pub card:    Card,
  pub session: StudySession,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionProgress {
  pub session:                  StudySession,
  pub total_answered:           u32,
  pub correct_answers:          u32,
  pub average_response_time_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
  pub total_cards:   u32,
  pub correct_cards: u32,
  /// Percentage of correct answers, rounded to two decimal places.
  pub accuracy:      f64,
}

impl SessionStats {
  pub fn from_session(session: &StudySession) -> Self {
    let accuracy = if session.cards_studied > 0 {
      f64::from(session.cards_correct) / f64::from(session.cards_studied) * 100.0
    } else {
      0.0
    };
    Self {
      total_cards:   session.cards_studied,
      correct_cards: session.cards_correct,
      accuracy:      (accuracy * 100.0).round() / 100.0,
    }
  }
}
