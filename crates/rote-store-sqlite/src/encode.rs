//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (nanosecond
//! precision, `Z` suffix) so that lexical order equals chronological order.
//! UUIDs are stored as hyphenated lowercase strings; enums as their
//! lowercase names.

use chrono::{DateTime, SecondsFormat, Utc};
use rote_core::{
  card::Card,
  deck::{Deck, DeckStats, DeckSummary},
  schedule::{Response, Schedule},
  session::{SessionCard, SessionType, StudySession},
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Column lists ────────────────────────────────────────────────────────────

pub const DECK_COLUMNS: &str = "deck_id, name, description, created_at, updated_at";

pub const CARD_COLUMNS: &str = "card_id, deck_id, front, back, easiness_factor, interval_days, \
                                repetition_count, next_review_at, created_at, updated_at";

pub const SESSION_COLUMNS: &str = "session_id, deck_id, session_type, cards_studied, \
                                   cards_correct, started_at, completed_at";

pub const EVENT_COLUMNS: &str =
  "event_id, session_id, card_id, response, response_time_ms, reviewed_at";

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Nanos, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_u32(column: &'static str, value: i64) -> Result<u32> {
  u32::try_from(value).map_err(|_| Error::Decode {
    column,
    message: format!("{value} does not fit in u32"),
  })
}

fn decode_count(column: &'static str, value: i64) -> Result<usize> {
  usize::try_from(value).map_err(|_| Error::Decode {
    column,
    message: format!("negative count {value}"),
  })
}

pub fn decode_session_type(s: &str) -> Result<SessionType> {
  s.parse().map_err(|_| Error::Decode {
    column:  "session_type",
    message: format!("unknown session type {s:?}"),
  })
}

pub fn decode_response(s: &str) -> Result<Response> {
  s.parse().map_err(|_| Error::Decode {
    column:  "response",
    message: format!("unknown response {s:?}"),
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `decks` row.
pub struct RawDeck {
  pub deck_id:     String,
  pub name:        String,
  pub description: String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawDeck {
  /// Read [`DECK_COLUMNS`] from the start of `row`.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      deck_id:     row.get(0)?,
      name:        row.get(1)?,
      description: row.get(2)?,
      created_at:  row.get(3)?,
      updated_at:  row.get(4)?,
    })
  }

  pub fn into_deck(self) -> Result<Deck> {
    Ok(Deck {
      deck_id:     decode_uuid(&self.deck_id)?,
      name:        self.name,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// A `decks` row followed by the three statistics columns.
pub struct RawDeckSummary {
  pub deck:         RawDeck,
  pub total_cards:  i64,
  pub due_cards:    i64,
  pub last_studied: Option<String>,
}

impl RawDeckSummary {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      deck:         RawDeck::from_row(row)?,
      total_cards:  row.get(5)?,
      due_cards:    row.get(6)?,
      last_studied: row.get(7)?,
    })
  }

  pub fn into_summary(self) -> Result<DeckSummary> {
    Ok(DeckSummary {
      deck:       self.deck.into_deck()?,
      statistics: DeckStats {
        total_cards:  decode_count("total_cards", self.total_cards)?,
        due_cards:    decode_count("due_cards", self.due_cards)?,
        last_studied: self.last_studied.as_deref().map(decode_dt).transpose()?,
      },
    })
  }
}

/// Raw values read directly from a `cards` row.
pub struct RawCard {
  pub card_id:          String,
  pub deck_id:          String,
  pub front:            String,
  pub back:             String,
  pub easiness_factor:  f64,
  pub interval_days:    i64,
  pub repetition_count: i64,
  pub next_review_at:   String,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawCard {
  /// Read [`CARD_COLUMNS`] from the start of `row`.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      card_id:          row.get(0)?,
      deck_id:          row.get(1)?,
      front:            row.get(2)?,
      back:             row.get(3)?,
      easiness_factor:  row.get(4)?,
      interval_days:    row.get(5)?,
      repetition_count: row.get(6)?,
      next_review_at:   row.get(7)?,
      created_at:       row.get(8)?,
      updated_at:       row.get(9)?,
    })
  }

  pub fn into_card(self) -> Result<Card> {
    Ok(Card {
      card_id:    decode_uuid(&self.card_id)?,
      deck_id:    decode_uuid(&self.deck_id)?,
      front:      self.front,
      back:       self.back,
      schedule:   Schedule {
        easiness_factor:  self.easiness_factor,
        interval_days:    decode_u32("interval_days", self.interval_days)?,
        repetition_count: decode_u32("repetition_count", self.repetition_count)?,
        next_review_at:   decode_dt(&self.next_review_at)?,
      },
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `study_sessions` row.
pub struct RawSession {
  pub session_id:    String,
  pub deck_id:       String,
  pub session_type:  String,
  pub cards_studied: i64,
  pub cards_correct: i64,
  pub started_at:    String,
  pub completed_at:  Option<String>,
}

impl RawSession {
  /// Read [`SESSION_COLUMNS`] from the start of `row`.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      session_id:    row.get(0)?,
      deck_id:       row.get(1)?,
      session_type:  row.get(2)?,
      cards_studied: row.get(3)?,
      cards_correct: row.get(4)?,
      started_at:    row.get(5)?,
      completed_at:  row.get(6)?,
    })
  }

  pub fn into_session(self) -> Result<StudySession> {
    Ok(StudySession {
      session_id:    decode_uuid(&self.session_id)?,
      deck_id:       decode_uuid(&self.deck_id)?,
      session_type:  decode_session_type(&self.session_type)?,
      cards_studied: decode_u32("cards_studied", self.cards_studied)?,
      cards_correct: decode_u32("cards_correct", self.cards_correct)?,
      started_at:    decode_dt(&self.started_at)?,
      completed_at:  self.completed_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw values read directly from a `session_cards` row.
pub struct RawSessionCard {
  pub event_id:         String,
  pub session_id:       String,
  pub card_id:          String,
  pub response:         String,
  pub response_time_ms: Option<i64>,
  pub reviewed_at:      String,
}

impl RawSessionCard {
  /// Read [`EVENT_COLUMNS`] from the start of `row`.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:         row.get(0)?,
      session_id:       row.get(1)?,
      card_id:          row.get(2)?,
      response:         row.get(3)?,
      response_time_ms: row.get(4)?,
      reviewed_at:      row.get(5)?,
    })
  }

  pub fn into_session_card(self) -> Result<SessionCard> {
    Ok(SessionCard {
      event_id:         decode_uuid(&self.event_id)?,
      session_id:       decode_uuid(&self.session_id)?,
      card_id:          decode_uuid(&self.card_id)?,
      response:         decode_response(&self.response)?,
      response_time_ms: self
        .response_time_ms
        .map(|ms| decode_u32("response_time_ms", ms))
        .transpose()?,
      reviewed_at:      decode_dt(&self.reviewed_at)?,
    })
  }
}
