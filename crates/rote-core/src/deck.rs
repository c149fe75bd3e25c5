//! Decks — named collections of cards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Result, card::Card, validate::trimmed};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
  pub deck_id:     Uuid,
  pub name:        String,
  pub description: String,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input to [`crate::store::FlashcardStore::create_deck`].
#[derive(Debug, Clone)]
pub struct NewDeck {
  pub name:        String,
  pub description: String,
}

impl NewDeck {
  pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
    Self {
      name:        name.into(),
      description: description.unwrap_or_default(),
    }
  }

  /// Trim and length-check both fields.
  pub fn validated(self) -> Result<Self> {
    Ok(Self {
      name:        trimmed("name", &self.name, 1, MAX_NAME_LEN)?,
      description: trimmed("description", &self.description, 0, MAX_DESCRIPTION_LEN)?,
    })
  }
}

/// A partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct DeckUpdate {
  pub name:        Option<String>,
  pub description: Option<String>,
}

impl DeckUpdate {
  pub fn is_empty(&self) -> bool { self.name.is_none() && self.description.is_none() }

  pub fn validated(self) -> Result<Self> {
    Ok(Self {
      name:        self
        .name
        .map(|n| trimmed("name", &n, 1, MAX_NAME_LEN))
        .transpose()?,
      description: self
        .description
        .map(|d| trimmed("description", &d, 0, MAX_DESCRIPTION_LEN))
        .transpose()?,
    })
  }

  /// Apply a validated update to `deck`, bumping `updated_at`.
  pub fn apply(self, deck: &mut Deck, now: DateTime<Utc>) {
    if let Some(name) = self.name {
      deck.name = name;
    }
    if let Some(description) = self.description {
      deck.description = description;
    }
    deck.updated_at = now;
  }
}

/// Aggregate figures computed on read; never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckStats {
  pub total_cards:  usize,
  /// Cards whose next review is at or before the evaluation instant.
  pub due_cards:    usize,
  /// Completion time of the most recently completed session.
  pub last_studied: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckSummary {
  #[serde(flatten)]
  pub deck:       Deck,
  pub statistics: DeckStats,
}

/// A deck summary bundled with all of its cards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckDetail {
  #[serde(flatten)]
  pub summary: DeckSummary,
  pub cards:   Vec<Card>,
}

/// What a deck deletion removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckDeletion {
  pub deleted_deck_id:    Uuid,
  pub deleted_card_count: usize,
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  #[test]
  fn new_deck_trims_and_defaults_description() {
    let deck = NewDeck::new("  Capitals ", None).validated().unwrap();
    assert_eq!(deck.name, "Capitals");
    assert_eq!(deck.description, "");
  }

  #[test]
  fn new_deck_rejects_long_name() {
    let err = NewDeck::new("x".repeat(101), None).validated().unwrap_err();
    assert!(matches!(err, Error::Validation { field: "name", .. }));
  }

  #[test]
  fn new_deck_rejects_long_description() {
    let err = NewDeck::new("ok", Some("d".repeat(501)))
      .validated()
      .unwrap_err();
    assert!(matches!(err, Error::Validation { field: "description", .. }));
  }

  #[test]
  fn update_applies_only_present_fields() {
    let created = Utc::now();
    let mut deck = Deck {
      deck_id:     Uuid::new_v4(),
      name:        "Old".into(),
      description: "keep me".into(),
      created_at:  created,
      updated_at:  created,
    };
    let later = created + chrono::Duration::seconds(5);

    DeckUpdate { name: Some(" New ".into()), description: None }
      .validated()
      .unwrap()
      .apply(&mut deck, later);

    assert_eq!(deck.name, "New");
    assert_eq!(deck.description, "keep me");
    assert_eq!(deck.updated_at, later);
  }
}
