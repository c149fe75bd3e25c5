//! The study session orchestrator.
//!
//! [`Study`] sequences one deck's review run: it starts (or resumes) a
//! session, builds the card queue, applies the scheduler to each response,
//! and completes or abandons the session. Session counters are always
//! recomputed from the session's events rather than incremented, so a failed
//! counter write is repaired by the next review or by completion.

use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  card::{Card, CardPerformance},
  queue,
  schedule::Response,
  session::{
    ReviewOutcome, ReviewRecord, SessionProgress, SessionStats, SessionTally, SessionType,
    StudySession, average_response_time,
  },
  store::FlashcardStore,
};

fn backend<E: Into<Error>>(e: E) -> Error { e.into() }

/// Drives study sessions against a [`FlashcardStore`].
///
/// Cloning is cheap — the store is reference-counted.
pub struct Study<S> {
  store: Arc<S>,
}

impl<S> Clone for Study<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: FlashcardStore> Study<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  /// Start a session for `deck_id`, or return the deck's active session
  /// unchanged if there is one. The requested type only applies to a newly
  /// created session.
  pub async fn start(&self, deck_id: Uuid, session_type: SessionType) -> Result<StudySession> {
    if let Some(active) = self.active_session(deck_id).await? {
      tracing::debug!(%deck_id, session_id = %active.session_id, "resuming active session");
      return Ok(active);
    }

    match self.store.create_session(deck_id, session_type).await.map_err(backend) {
      Ok(session) => {
        tracing::info!(
          %deck_id,
          session_id = %session.session_id,
          session_type = %session.session_type,
          "study session started",
        );
        Ok(session)
      }
      // Another caller started one between our read and our write.
      Err(Error::ActiveSessionExists(_)) => self
        .active_session(deck_id)
        .await?
        .ok_or(Error::ActiveSessionExists(deck_id)),
      Err(e) => Err(e),
    }
  }

  pub async fn active_session(&self, deck_id: Uuid) -> Result<Option<StudySession>> {
    self.store.find_active_session(deck_id).await.map_err(backend)
  }

  pub async fn session(&self, session_id: Uuid) -> Result<StudySession> {
    self
      .store
      .get_session(session_id)
      .await
      .map_err(backend)?
      .ok_or(Error::SessionNotFound(session_id))
  }

  /// The ordered cards a `session_type` session over `deck_id` would
  /// review right now.
  pub async fn build_queue(&self, deck_id: Uuid, session_type: SessionType) -> Result<Vec<Card>> {
    self
      .store
      .get_deck(deck_id)
      .await
      .map_err(backend)?
      .ok_or(Error::DeckNotFound(deck_id))?;

    let cards = self.store.list_cards(deck_id).await.map_err(backend)?;
    Ok(queue::build(cards, session_type, Utc::now()))
  }

  /// The queue for an active session, minus the cards it has already
  /// reviewed.
  pub async fn remaining_queue(&self, session_id: Uuid) -> Result<Vec<Card>> {
    let session = self.session(session_id).await?;
    session.ensure_active()?;

    let reviewed: HashSet<Uuid> = self
      .store
      .list_session_cards(session_id)
      .await
      .map_err(backend)?
      .into_iter()
      .map(|e| e.card_id)
      .collect();

    let mut cards = self.store.list_cards(session.deck_id).await.map_err(backend)?;
    cards.retain(|c| !reviewed.contains(&c.card_id));
    Ok(queue::build(cards, session.session_type, Utc::now()))
  }

  /// Record one response for `card_id` in `session_id`.
  ///
  /// The event and the card's new schedule are written together; the
  /// session counters are then recomputed from all of the session's events.
  pub async fn review_one(
    &self,
    session_id: Uuid,
    card_id: Uuid,
    response: Response,
    response_time_ms: Option<u32>,
  ) -> Result<ReviewOutcome> {
    let session = self.session(session_id).await?;
    session.ensure_active()?;

    let card = self
      .store
      .get_card(card_id)
      .await
      .map_err(backend)?
      .ok_or(Error::CardNotFound(card_id))?;
    if card.deck_id != session.deck_id {
      return Err(Error::CardNotInDeck { card_id, deck_id: session.deck_id });
    }
    card.schedule.check()?;

    let now = Utc::now();
    let schedule = card.schedule.next(response, now);
    schedule.check()?;
    let record = ReviewRecord {
      session_id,
      card_id,
      response,
      response_time_ms,
      reviewed_at: now,
      schedule,
    };

    let (event, card) = self.store.record_review(record).await.map_err(backend)?;
    tracing::debug!(
      %session_id,
      %card_id,
      %response,
      interval_days = card.schedule.interval_days,
      easiness_factor = card.schedule.easiness_factor,
      "card reviewed",
    );

    let session = self.recount(&session).await?;
    Ok(ReviewOutcome { event, card, session })
  }

  /// Complete an active session. Counters are reconciled first.
  pub async fn complete(&self, session_id: Uuid) -> Result<StudySession> {
    let session = self.session(session_id).await?;
    session.ensure_active()?;

    self.recount(&session).await?;
    let session = self
      .store
      .complete_session(session_id, Utc::now())
      .await
      .map_err(backend)?;

    tracing::info!(
      %session_id,
      cards_studied = session.cards_studied,
      cards_correct = session.cards_correct,
      "study session completed",
    );
    Ok(session)
  }

  /// Discard an active session along with its events.
  pub async fn abandon(&self, session_id: Uuid) -> Result<()> {
    let session = self.session(session_id).await?;
    session.ensure_active()?;

    self.store.delete_session(session_id).await.map_err(backend)?;
    tracing::info!(%session_id, deck_id = %session.deck_id, "study session abandoned");
    Ok(())
  }

  pub async fn progress(&self, session_id: Uuid) -> Result<SessionProgress> {
    let session = self.session(session_id).await?;
    let events = self
      .store
      .list_session_cards(session_id)
      .await
      .map_err(backend)?;
    let tally = SessionTally::from_events(&events);

    Ok(SessionProgress {
      session,
      total_answered: tally.studied,
      correct_answers: tally.correct,
      average_response_time_ms: average_response_time(&events),
    })
  }

  pub async fn stats(&self, session_id: Uuid) -> Result<SessionStats> {
    let session = self.session(session_id).await?;
    Ok(SessionStats::from_session(&session))
  }

  pub async fn card_performance(&self, card_id: Uuid) -> Result<CardPerformance> {
    self
      .store
      .get_card(card_id)
      .await
      .map_err(backend)?
      .ok_or(Error::CardNotFound(card_id))?;

    let history = self
      .store
      .card_history(card_id, usize::MAX)
      .await
      .map_err(backend)?;

    Ok(CardPerformance {
      card_id,
      total_reviews: history.len(),
      correct_reviews: history.iter().filter(|e| e.response.is_correct()).count(),
      average_response_time_ms: average_response_time(&history),
      last_reviewed_at: history.first().map(|e| e.reviewed_at),
    })
  }

  /// Recompute `session`'s counters from its events and persist them if
  /// they differ from what is stored.
  async fn recount(&self, session: &StudySession) -> Result<StudySession> {
    let events = self
      .store
      .list_session_cards(session.session_id)
      .await
      .map_err(backend)?;
    let tally = SessionTally::from_events(&events);

    if tally.matches(session) {
      return Ok(session.clone());
    }

    self
      .store
      .set_session_counters(session.session_id, tally)
      .await
      .map_err(|e| {
        let e = backend(e);
        tracing::warn!(session_id = %session.session_id, error = %e, "failed to store session counters");
        e
      })
  }
}
