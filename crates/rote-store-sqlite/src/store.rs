//! [`SqliteStore`] — the SQLite implementation of [`FlashcardStore`].
//!
//! Every read-check-write sequence runs inside a single
//! [`tokio_rusqlite::Connection::call`] closure. The connection executes
//! closures one at a time on its own thread, so each sequence is atomic with
//! respect to other users of the same store. Closures report domain failures
//! as an inner `Err(rote_core::Error)` and database failures as the outer
//! error.

use std::{collections::HashSet, path::Path};

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use rote_core::{
  Error as CoreError,
  card::{Card, CardContent, CardUpdate},
  deck::{Deck, DeckDeletion, DeckSummary, DeckUpdate, NewDeck},
  schedule::Schedule,
  session::{ReviewRecord, SessionCard, SessionTally, SessionType, StudySession},
  store::FlashcardStore,
};

use crate::{
  Result,
  encode::{
    CARD_COLUMNS, DECK_COLUMNS, EVENT_COLUMNS, RawCard, RawDeck, RawDeckSummary, RawSession,
    RawSessionCard, SESSION_COLUMNS, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rote store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::info!(path = %path.display(), "store opened");
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection, flushing any pending writes. Other
  /// clones of this store fail from then on.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    tracing::info!("store closed");
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn summaries(
    &self,
    filter: &'static str,
    as_of: DateTime<Utc>,
    arg: Option<String>,
  ) -> Result<Vec<DeckSummary>> {
    let as_of_str = encode_dt(as_of);

    let raws: Vec<RawDeckSummary> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {DECK_COLUMNS},
             (SELECT COUNT(*) FROM cards c WHERE c.deck_id = decks.deck_id),
             (SELECT COUNT(*) FROM cards c
               WHERE c.deck_id = decks.deck_id AND c.next_review_at <= ?1),
             (SELECT MAX(s.completed_at) FROM study_sessions s
               WHERE s.deck_id = decks.deck_id)
           FROM decks
           {filter}
           ORDER BY updated_at DESC, rowid DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = match &arg {
          Some(a) => stmt.query_map(rusqlite::params![as_of_str, a], RawDeckSummary::from_row)?,
          None => stmt.query_map(rusqlite::params![as_of_str], RawDeckSummary::from_row)?,
        }
        .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDeckSummary::into_summary).collect()
  }
}

// ─── Synchronous helpers (run inside `call` closures) ────────────────────────

fn deck_exists(conn: &rusqlite::Connection, deck_id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM decks WHERE deck_id = ?1",
        rusqlite::params![deck_id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

/// Whether another card in `deck_id` (other than `except`) has `front`.
fn front_taken(
  conn: &rusqlite::Connection,
  deck_id: &str,
  front: &str,
  except: Option<&str>,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM cards WHERE deck_id = ?1 AND front = ?2 AND card_id IS NOT ?3",
        rusqlite::params![deck_id, front, except],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

fn active_session_exists(conn: &rusqlite::Connection, deck_id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM study_sessions WHERE deck_id = ?1 AND completed_at IS NULL",
        rusqlite::params![deck_id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

fn read_card(conn: &rusqlite::Connection, card_id: &str) -> rusqlite::Result<Option<RawCard>> {
  conn
    .query_row(
      &format!("SELECT {CARD_COLUMNS} FROM cards WHERE card_id = ?1"),
      rusqlite::params![card_id],
      RawCard::from_row,
    )
    .optional()
}

fn read_session(
  conn: &rusqlite::Connection,
  session_id: &str,
) -> rusqlite::Result<Option<RawSession>> {
  conn
    .query_row(
      &format!("SELECT {SESSION_COLUMNS} FROM study_sessions WHERE session_id = ?1"),
      rusqlite::params![session_id],
      RawSession::from_row,
    )
    .optional()
}

fn insert_card(conn: &rusqlite::Connection, card: &Card) -> rusqlite::Result<()> {
  conn.execute(
    &format!("INSERT INTO cards ({CARD_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"),
    rusqlite::params![
      encode_uuid(card.card_id),
      encode_uuid(card.deck_id),
      card.front,
      card.back,
      card.schedule.easiness_factor,
      card.schedule.interval_days,
      card.schedule.repetition_count,
      encode_dt(card.schedule.next_review_at),
      encode_dt(card.created_at),
      encode_dt(card.updated_at),
    ],
  )?;
  Ok(())
}

// ─── FlashcardStore impl ─────────────────────────────────────────────────────

impl FlashcardStore for SqliteStore {
  type Error = crate::Error;

  // ── Decks ─────────────────────────────────────────────────────────────────

  async fn create_deck(&self, input: NewDeck) -> Result<Deck> {
    let input = input.validated()?;
    let now = Utc::now();
    let deck = Deck {
      deck_id:     Uuid::new_v4(),
      name:        input.name,
      description: input.description,
      created_at:  now,
      updated_at:  now,
    };

    let id_str = encode_uuid(deck.deck_id);
    let name = deck.name.clone();
    let description = deck.description.clone();
    let at_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        let taken = conn
          .query_row(
            "SELECT 1 FROM decks WHERE name = ?1",
            rusqlite::params![name],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(Err(CoreError::DuplicateDeckName(name)));
        }

        conn.execute(
          &format!("INSERT INTO decks ({DECK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?4)"),
          rusqlite::params![id_str, name, description, at_str],
        )?;
        Ok(Ok(()))
      })
      .await??;

    Ok(deck)
  }

  async fn get_deck(&self, id: Uuid) -> Result<Option<Deck>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawDeck> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {DECK_COLUMNS} FROM decks WHERE deck_id = ?1"),
              rusqlite::params![id_str],
              RawDeck::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDeck::into_deck).transpose()
  }

  async fn deck_summary(&self, id: Uuid, as_of: DateTime<Utc>) -> Result<Option<DeckSummary>> {
    let mut found = self
      .summaries("WHERE deck_id = ?2", as_of, Some(encode_uuid(id)))
      .await?;
    Ok(found.pop())
  }

  async fn list_decks(&self, as_of: DateTime<Utc>) -> Result<Vec<DeckSummary>> {
    self.summaries("", as_of, None).await
  }

  async fn search_decks(&self, text: String, as_of: DateTime<Utc>) -> Result<Vec<DeckSummary>> {
    let text = text.trim();
    if text.is_empty() {
      return self.list_decks(as_of).await;
    }

    // SQLite's lower() and LIKE only fold ASCII, so matching happens here.
    let needle = text.to_lowercase();
    let mut decks = self.list_decks(as_of).await?;
    decks.retain(|s| {
      s.deck.name.to_lowercase().contains(&needle)
        || s.deck.description.to_lowercase().contains(&needle)
    });
    Ok(decks)
  }

  async fn update_deck(&self, id: Uuid, update: DeckUpdate) -> Result<Deck> {
    let update = update.validated()?;
    let mut deck = self
      .get_deck(id)
      .await?
      .ok_or(CoreError::DeckNotFound(id))?;
    if update.is_empty() {
      return Ok(deck);
    }
    update.apply(&mut deck, Utc::now());

    let id_str = encode_uuid(id);
    let name = deck.name.clone();
    let description = deck.description.clone();
    let at_str = encode_dt(deck.updated_at);

    self
      .conn
      .call(move |conn| {
        let taken = conn
          .query_row(
            "SELECT 1 FROM decks WHERE name = ?1 AND deck_id != ?2",
            rusqlite::params![name, id_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(Err(CoreError::DuplicateDeckName(name)));
        }

        conn.execute(
          "UPDATE decks SET name = ?2, description = ?3, updated_at = ?4 WHERE deck_id = ?1",
          rusqlite::params![id_str, name, description, at_str],
        )?;
        Ok(Ok(()))
      })
      .await??;

    Ok(deck)
  }

  async fn delete_deck(&self, id: Uuid) -> Result<DeckDeletion> {
    let id_str = encode_uuid(id);

    let deleted_cards: i64 = self
      .conn
      .call(move |conn| {
        if !deck_exists(conn, &id_str)? {
          return Ok(Err(CoreError::DeckNotFound(id)));
        }
        if active_session_exists(conn, &id_str)? {
          return Ok(Err(CoreError::ActiveSessionExists(id)));
        }

        let count: i64 = conn.query_row(
          "SELECT COUNT(*) FROM cards WHERE deck_id = ?1",
          rusqlite::params![id_str],
          |r| r.get(0),
        )?;
        conn.execute("DELETE FROM decks WHERE deck_id = ?1", rusqlite::params![id_str])?;
        Ok(Ok(count))
      })
      .await??;

    tracing::info!(deck_id = %id, deleted_cards, "deck deleted");
    Ok(DeckDeletion {
      deleted_deck_id:    id,
      deleted_card_count: usize::try_from(deleted_cards).unwrap_or_default(),
    })
  }

  // ── Cards ─────────────────────────────────────────────────────────────────

  async fn create_card(&self, deck_id: Uuid, content: CardContent) -> Result<Card> {
    let content = content.validated()?;
    let now = Utc::now();
    let card = Card {
      card_id: Uuid::new_v4(),
      deck_id,
      front: content.front,
      back: content.back,
      schedule: Schedule::initial(now),
      created_at: now,
      updated_at: now,
    };

    let card = self
      .conn
      .call(move |conn| {
        let deck_str = encode_uuid(deck_id);
        if !deck_exists(conn, &deck_str)? {
          return Ok(Err(CoreError::DeckNotFound(deck_id)));
        }
        if front_taken(conn, &deck_str, &card.front, None)? {
          return Ok(Err(CoreError::DuplicateCardFront { deck_id, front: card.front }));
        }

        insert_card(conn, &card)?;
        Ok(Ok(card))
      })
      .await??;

    Ok(card)
  }

  async fn create_cards(&self, deck_id: Uuid, contents: Vec<CardContent>) -> Result<Vec<Card>> {
    let contents = contents
      .into_iter()
      .map(CardContent::validated)
      .collect::<rote_core::Result<Vec<_>>>()?;
    if contents.is_empty() {
      return Ok(Vec::new());
    }

    let mut seen = HashSet::new();
    if let Some(dup) = contents.iter().find(|c| !seen.insert(c.front.as_str())) {
      return Err(CoreError::DuplicateCardFront { deck_id, front: dup.front.clone() }.into());
    }

    let now = Utc::now();
    let cards: Vec<Card> = contents
      .into_iter()
      .map(|c| Card {
        card_id: Uuid::new_v4(),
        deck_id,
        front: c.front,
        back: c.back,
        schedule: Schedule::initial(now),
        created_at: now,
        updated_at: now,
      })
      .collect();

    let cards = self
      .conn
      .call(move |conn| {
        let deck_str = encode_uuid(deck_id);
        let tx = conn.transaction()?;
        if !deck_exists(&tx, &deck_str)? {
          return Ok(Err(CoreError::DeckNotFound(deck_id)));
        }
        for card in &cards {
          if front_taken(&tx, &deck_str, &card.front, None)? {
            return Ok(Err(CoreError::DuplicateCardFront {
              deck_id,
              front: card.front.clone(),
            }));
          }
          insert_card(&tx, card)?;
        }
        tx.commit()?;
        Ok(Ok(cards))
      })
      .await??;

    tracing::debug!(%deck_id, count = cards.len(), "cards created");
    Ok(cards)
  }

  async fn get_card(&self, id: Uuid) -> Result<Option<Card>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| Ok(read_card(conn, &id_str)?))
      .await?;

    raw.map(RawCard::into_card).transpose()
  }

  async fn list_cards(&self, deck_id: Uuid) -> Result<Vec<Card>> {
    let deck_str = encode_uuid(deck_id);

    let raws: Vec<RawCard> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CARD_COLUMNS} FROM cards WHERE deck_id = ?1
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![deck_str], RawCard::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCard::into_card).collect()
  }

  async fn due_cards(&self, deck_id: Uuid, as_of: DateTime<Utc>) -> Result<Vec<Card>> {
    let deck_str = encode_uuid(deck_id);
    let as_of_str = encode_dt(as_of);

    let raws: Vec<RawCard> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CARD_COLUMNS} FROM cards
           WHERE deck_id = ?1 AND next_review_at <= ?2
           ORDER BY next_review_at ASC, rowid ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![deck_str, as_of_str], RawCard::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCard::into_card).collect()
  }

  async fn update_card(&self, id: Uuid, update: CardUpdate) -> Result<Card> {
    let update = update.validated()?;
    let mut card = self
      .get_card(id)
      .await?
      .ok_or(CoreError::CardNotFound(id))?;
    let front_changed = update.front.as_ref().is_some_and(|f| *f != card.front);
    update.apply(&mut card, Utc::now());

    let card = self
      .conn
      .call(move |conn| {
        let id_str = encode_uuid(card.card_id);
        let deck_str = encode_uuid(card.deck_id);
        if front_changed && front_taken(conn, &deck_str, &card.front, Some(&id_str))? {
          return Ok(Err(CoreError::DuplicateCardFront {
            deck_id: card.deck_id,
            front:   card.front,
          }));
        }

        let changed = conn.execute(
          "UPDATE cards SET
             front = ?2, back = ?3, easiness_factor = ?4, interval_days = ?5,
             repetition_count = ?6, next_review_at = ?7, updated_at = ?8
           WHERE card_id = ?1",
          rusqlite::params![
            id_str,
            card.front,
            card.back,
            card.schedule.easiness_factor,
            card.schedule.interval_days,
            card.schedule.repetition_count,
            encode_dt(card.schedule.next_review_at),
            encode_dt(card.updated_at),
          ],
        )?;
        if changed == 0 {
          return Ok(Err(CoreError::CardNotFound(card.card_id)));
        }
        Ok(Ok(card))
      })
      .await??;

    Ok(card)
  }

  async fn delete_card(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    self
      .conn
      .call(move |conn| {
        let deleted =
          conn.execute("DELETE FROM cards WHERE card_id = ?1", rusqlite::params![id_str])?;
        if deleted == 0 {
          return Ok(Err(CoreError::CardNotFound(id)));
        }
        Ok(Ok(()))
      })
      .await??;

    Ok(())
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, deck_id: Uuid, session_type: SessionType) -> Result<StudySession> {
    let session = StudySession {
      session_id: Uuid::new_v4(),
      deck_id,
      session_type,
      cards_studied: 0,
      cards_correct: 0,
      started_at: Utc::now(),
      completed_at: None,
    };

    let id_str = encode_uuid(session.session_id);
    let deck_str = encode_uuid(deck_id);
    let type_str = session_type.as_ref().to_owned();
    let at_str = encode_dt(session.started_at);

    self
      .conn
      .call(move |conn| {
        if !deck_exists(conn, &deck_str)? {
          return Ok(Err(CoreError::DeckNotFound(deck_id)));
        }
        if active_session_exists(conn, &deck_str)? {
          return Ok(Err(CoreError::ActiveSessionExists(deck_id)));
        }

        conn.execute(
          &format!("INSERT INTO study_sessions ({SESSION_COLUMNS}) VALUES (?1, ?2, ?3, 0, 0, ?4, NULL)"),
          rusqlite::params![id_str, deck_str, type_str, at_str],
        )?;
        Ok(Ok(()))
      })
      .await??;

    Ok(session)
  }

  async fn get_session(&self, id: Uuid) -> Result<Option<StudySession>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| Ok(read_session(conn, &id_str)?))
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn find_active_session(&self, deck_id: Uuid) -> Result<Option<StudySession>> {
    let deck_str = encode_uuid(deck_id);

    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SESSION_COLUMNS} FROM study_sessions
                 WHERE deck_id = ?1 AND completed_at IS NULL
                 ORDER BY started_at DESC
                 LIMIT 1"
              ),
              rusqlite::params![deck_str],
              RawSession::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn list_sessions(&self, deck_id: Uuid, limit: usize) -> Result<Vec<StudySession>> {
    let deck_str = encode_uuid(deck_id);
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawSession> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SESSION_COLUMNS} FROM study_sessions WHERE deck_id = ?1
           ORDER BY started_at DESC, rowid DESC
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![deck_str, limit_val], RawSession::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSession::into_session).collect()
  }

  async fn set_session_counters(&self, id: Uuid, tally: SessionTally) -> Result<StudySession> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        match read_session(conn, &id_str)? {
          None => return Ok(Err(CoreError::SessionNotFound(id))),
          Some(s) if s.completed_at.is_some() => {
            return Ok(Err(CoreError::SessionCompleted(id)));
          }
          Some(_) => {}
        }

        conn.execute(
          "UPDATE study_sessions SET cards_studied = ?2, cards_correct = ?3
           WHERE session_id = ?1",
          rusqlite::params![id_str, tally.studied, tally.correct],
        )?;
        Ok(read_session(conn, &id_str)?.ok_or(CoreError::SessionNotFound(id)))
      })
      .await??;

    raw.into_session()
  }

  async fn complete_session(&self, id: Uuid, at: DateTime<Utc>) -> Result<StudySession> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(at);

    let raw = self
      .conn
      .call(move |conn| {
        match read_session(conn, &id_str)? {
          None => return Ok(Err(CoreError::SessionNotFound(id))),
          Some(s) if s.completed_at.is_some() => {
            return Ok(Err(CoreError::SessionCompleted(id)));
          }
          Some(_) => {}
        }

        conn.execute(
          "UPDATE study_sessions SET completed_at = ?2 WHERE session_id = ?1",
          rusqlite::params![id_str, at_str],
        )?;
        Ok(read_session(conn, &id_str)?.ok_or(CoreError::SessionNotFound(id)))
      })
      .await??;

    raw.into_session()
  }

  async fn delete_session(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    self
      .conn
      .call(move |conn| {
        // Events go with the session via ON DELETE CASCADE.
        let deleted = conn.execute(
          "DELETE FROM study_sessions WHERE session_id = ?1",
          rusqlite::params![id_str],
        )?;
        if deleted == 0 {
          return Ok(Err(CoreError::SessionNotFound(id)));
        }
        Ok(Ok(()))
      })
      .await??;

    Ok(())
  }

  // ── Session events ────────────────────────────────────────────────────────

  async fn record_review(&self, record: ReviewRecord) -> Result<(SessionCard, Card)> {
    let event = SessionCard {
      event_id:         Uuid::new_v4(),
      session_id:       record.session_id,
      card_id:          record.card_id,
      response:         record.response,
      response_time_ms: record.response_time_ms,
      reviewed_at:      record.reviewed_at,
    };

    let event_str = encode_uuid(event.event_id);
    let session_id = record.session_id;
    let card_id = record.card_id;
    let session_str = encode_uuid(session_id);
    let card_str = encode_uuid(card_id);
    let response_str = record.response.as_ref().to_owned();
    let response_time_ms = record.response_time_ms;
    let at_str = encode_dt(record.reviewed_at);
    let schedule = record.schedule;

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let completed_at: Option<Option<String>> = tx
          .query_row(
            "SELECT completed_at FROM study_sessions WHERE session_id = ?1",
            rusqlite::params![session_str],
            |r| r.get(0),
          )
          .optional()?;
        match completed_at {
          None => return Ok(Err(CoreError::SessionNotFound(session_id))),
          Some(Some(_)) => return Ok(Err(CoreError::SessionCompleted(session_id))),
          Some(None) => {}
        }

        if read_card(&tx, &card_str)?.is_none() {
          return Ok(Err(CoreError::CardNotFound(card_id)));
        }

        let reviewed = tx
          .query_row(
            "SELECT 1 FROM session_cards WHERE session_id = ?1 AND card_id = ?2",
            rusqlite::params![session_str, card_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if reviewed {
          return Ok(Err(CoreError::DuplicateReview { session_id, card_id }));
        }

        tx.execute(
          &format!("INSERT INTO session_cards ({EVENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
          rusqlite::params![
            event_str,
            session_str,
            card_str,
            response_str,
            response_time_ms,
            at_str
          ],
        )?;
        tx.execute(
          "UPDATE cards SET
             easiness_factor = ?2, interval_days = ?3, repetition_count = ?4,
             next_review_at = ?5, updated_at = ?6
           WHERE card_id = ?1",
          rusqlite::params![
            card_str,
            schedule.easiness_factor,
            schedule.interval_days,
            schedule.repetition_count,
            encode_dt(schedule.next_review_at),
            at_str,
          ],
        )?;

        let card = read_card(&tx, &card_str)?;
        tx.commit()?;
        Ok(card.ok_or(CoreError::CardNotFound(card_id)))
      })
      .await??;

    Ok((event, raw.into_card()?))
  }

  async fn list_session_cards(&self, session_id: Uuid) -> Result<Vec<SessionCard>> {
    let session_str = encode_uuid(session_id);

    let raws: Vec<RawSessionCard> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM session_cards WHERE session_id = ?1
           ORDER BY reviewed_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![session_str], RawSessionCard::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSessionCard::into_session_card).collect()
  }

  async fn card_history(&self, card_id: Uuid, limit: usize) -> Result<Vec<SessionCard>> {
    let card_str = encode_uuid(card_id);
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawSessionCard> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM session_cards WHERE card_id = ?1
           ORDER BY reviewed_at DESC, rowid DESC
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![card_str, limit_val], RawSessionCard::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSessionCard::into_session_card).collect()
  }
}
