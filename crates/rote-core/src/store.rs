//! The `FlashcardStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `rote-store-sqlite`).
//! Higher layers ([`crate::study::Study`], `rote-api`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  card::{Card, CardContent, CardUpdate},
  deck::{Deck, DeckDeletion, DeckSummary, DeckUpdate, NewDeck},
  session::{ReviewRecord, SessionCard, SessionTally, SessionType, StudySession},
};

/// Abstraction over a Rote storage backend.
///
/// Domain failures (missing records, duplicates, writes against a completed
/// session) are reported as the matching [`crate::Error`] variant once the
/// backend error is converted with `Into`.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait FlashcardStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Decks ─────────────────────────────────────────────────────────────

  /// Validate and persist a new deck. Deck names are unique.
  fn create_deck(
    &self,
    input: NewDeck,
  ) -> impl Future<Output = Result<Deck, Self::Error>> + Send + '_;

  fn get_deck(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Deck>, Self::Error>> + Send + '_;

  /// A deck with its statistics evaluated at `as_of`.
  fn deck_summary(
    &self,
    id: Uuid,
    as_of: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<DeckSummary>, Self::Error>> + Send + '_;

  /// Every deck with statistics, most recently updated first.
  fn list_decks(
    &self,
    as_of: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<DeckSummary>, Self::Error>> + Send + '_;

  /// Case-insensitive substring match over deck names and descriptions.
  fn search_decks(
    &self,
    text: String,
    as_of: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<DeckSummary>, Self::Error>> + Send + '_;

  fn update_deck(
    &self,
    id: Uuid,
    update: DeckUpdate,
  ) -> impl Future<Output = Result<Deck, Self::Error>> + Send + '_;

  /// Delete a deck with its cards, sessions and events. Refused while the
  /// deck has an active session.
  fn delete_deck(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<DeckDeletion, Self::Error>> + Send + '_;

  // ── Cards ─────────────────────────────────────────────────────────────

  /// Validate and persist a new card with the default schedule, due now.
  fn create_card(
    &self,
    deck_id: Uuid,
    content: CardContent,
  ) -> impl Future<Output = Result<Card, Self::Error>> + Send + '_;

  /// Create several cards in one deck; either all are written or none.
  fn create_cards(
    &self,
    deck_id: Uuid,
    contents: Vec<CardContent>,
  ) -> impl Future<Output = Result<Vec<Card>, Self::Error>> + Send + '_;

  fn get_card(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Card>, Self::Error>> + Send + '_;

  /// Cards of a deck, newest first.
  fn list_cards(
    &self,
    deck_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Card>, Self::Error>> + Send + '_;

  /// Cards of a deck due at `as_of`, earliest due first.
  fn due_cards(
    &self,
    deck_id: Uuid,
    as_of: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<Card>, Self::Error>> + Send + '_;

  /// Apply a validated maintenance update to a card.
  fn update_card(
    &self,
    id: Uuid,
    update: CardUpdate,
  ) -> impl Future<Output = Result<Card, Self::Error>> + Send + '_;

  fn delete_card(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Start a new active session with zeroed counters. Fails with
  /// [`crate::Error::ActiveSessionExists`] if the deck already has one.
  fn create_session(
    &self,
    deck_id: Uuid,
    session_type: SessionType,
  ) -> impl Future<Output = Result<StudySession, Self::Error>> + Send + '_;

  fn get_session(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<StudySession>, Self::Error>> + Send + '_;

  /// The deck's uncompleted session, if any.
  fn find_active_session(
    &self,
    deck_id: Uuid,
  ) -> impl Future<Output = Result<Option<StudySession>, Self::Error>> + Send + '_;

  /// Sessions of a deck, most recently started first.
  fn list_sessions(
    &self,
    deck_id: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<StudySession>, Self::Error>> + Send + '_;

  /// Overwrite an active session's counters.
  fn set_session_counters(
    &self,
    id: Uuid,
    tally: SessionTally,
  ) -> impl Future<Output = Result<StudySession, Self::Error>> + Send + '_;

  /// Mark an active session completed at `at`.
  fn complete_session(
    &self,
    id: Uuid,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<StudySession, Self::Error>> + Send + '_;

  /// Remove a session and its events.
  fn delete_session(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Session events ────────────────────────────────────────────────────

  /// Append a review event and write the card's new schedule atomically.
  ///
  /// Fails if the session is missing or completed, the card is missing, or
  /// the card already has an event in this session; nothing is written in
  /// any of those cases.
  fn record_review(
    &self,
    record: ReviewRecord,
  ) -> impl Future<Output = Result<(SessionCard, Card), Self::Error>> + Send + '_;

  /// Events of a session, newest first.
  fn list_session_cards(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Vec<SessionCard>, Self::Error>> + Send + '_;

  /// Events of a card across sessions, newest first.
  fn card_history(
    &self,
    card_id: Uuid,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<SessionCard>, Self::Error>> + Send + '_;
}
