//! Error types for `rote-core`.

use thiserror::Error;
use uuid::Uuid;

/// Coarse classification of an [`Error`], used by transport layers to pick a
/// status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  Conflict,
  Validation,
  Storage,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("deck not found: {0}")]
  DeckNotFound(Uuid),

  #[error("card not found: {0}")]
  CardNotFound(Uuid),

  #[error("study session not found: {0}")]
  SessionNotFound(Uuid),

  #[error("a deck named {0:?} already exists")]
  DuplicateDeckName(String),

  #[error("a card with front {front:?} already exists in deck {deck_id}")]
  DuplicateCardFront { deck_id: Uuid, front: String },

  #[error("card {card_id} has already been reviewed in session {session_id}")]
  DuplicateReview { session_id: Uuid, card_id: Uuid },

  #[error("study session {0} is already completed")]
  SessionCompleted(Uuid),

  #[error("deck {0} already has an active study session")]
  ActiveSessionExists(Uuid),

  #[error("invalid review response {0:?}; expected \"easy\" or \"hard\"")]
  InvalidResponse(String),

  #[error("unknown session type {0:?}")]
  UnknownSessionType(String),

  #[error("card {card_id} does not belong to deck {deck_id}")]
  CardNotInDeck { card_id: Uuid, deck_id: Uuid },

  #[error("invalid {field}: {message}")]
  Validation {
    field:   &'static str,
    message: String,
  },

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
    Self::Validation { field, message: message.into() }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::DeckNotFound(_) | Self::CardNotFound(_) | Self::SessionNotFound(_) => {
        ErrorKind::NotFound
      }
      Self::DuplicateDeckName(_)
      | Self::DuplicateCardFront { .. }
      | Self::DuplicateReview { .. }
      | Self::SessionCompleted(_)
      | Self::ActiveSessionExists(_)
      | Self::InvalidResponse(_) => ErrorKind::Conflict,
      Self::UnknownSessionType(_)
      | Self::CardNotInDeck { .. }
      | Self::Validation { .. } => ErrorKind::Validation,
      Self::Storage(_) => ErrorKind::Storage,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
