//! Integration tests for `SqliteStore` against an in-memory database, plus
//! end-to-end study runs through [`Study`].

use std::sync::Arc;

use chrono::{Duration, Utc};
use rote_core::{
  Error as CoreError, ErrorKind,
  card::{CardContent, CardUpdate},
  deck::{DeckUpdate, NewDeck},
  schedule::{MAX_INTERVAL_DAYS, MAX_REPETITIONS, Response},
  session::{SessionTally, SessionType},
  store::FlashcardStore,
  study::Study,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn study() -> Study<SqliteStore> { Study::new(Arc::new(store().await)) }

fn deck(name: &str) -> NewDeck { NewDeck::new(name, None) }

fn content(front: &str) -> CardContent { CardContent::new(front, format!("{front} (answer)")) }

// ─── Decks ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_deck() {
  let s = store().await;

  let created = s
    .create_deck(NewDeck::new("  Spanish  ", Some("verbs".into())))
    .await
    .unwrap();
  assert_eq!(created.name, "Spanish");
  assert_eq!(created.description, "verbs");

  let fetched = s.get_deck(created.deck_id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_deck_missing_returns_none() {
  let s = store().await;
  assert!(s.get_deck(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_deck_name_rejected() {
  let s = store().await;
  s.create_deck(deck("Kanji")).await.unwrap();

  let err = s.create_deck(deck("Kanji")).await.unwrap_err();
  assert!(matches!(err, crate::Error::Core(CoreError::DuplicateDeckName(ref n)) if n == "Kanji"));
}

#[tokio::test]
async fn blank_deck_name_rejected() {
  let s = store().await;
  let err = s.create_deck(deck("   ")).await.unwrap_err();
  assert_eq!(rote_core::Error::from(err).kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn update_deck_renames_and_checks_uniqueness() {
  let s = store().await;
  let a = s.create_deck(deck("A")).await.unwrap();
  s.create_deck(deck("B")).await.unwrap();

  let renamed = s
    .update_deck(a.deck_id, DeckUpdate { name: Some("C".into()), description: None })
    .await
    .unwrap();
  assert_eq!(renamed.name, "C");
  assert!(renamed.updated_at >= a.updated_at);

  let err = s
    .update_deck(a.deck_id, DeckUpdate { name: Some("B".into()), description: None })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(CoreError::DuplicateDeckName(_))));

  // Keeping the current name is not a conflict with itself.
  s.update_deck(a.deck_id, DeckUpdate { name: Some("C".into()), description: None })
    .await
    .unwrap();
}

#[tokio::test]
async fn update_missing_deck_errors() {
  let s = store().await;
  let err = s
    .update_deck(Uuid::new_v4(), DeckUpdate::default())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(CoreError::DeckNotFound(_))));
}

#[tokio::test]
async fn deck_summary_counts_cards_and_due() {
  let s = store().await;
  let d = s.create_deck(deck("Stats")).await.unwrap();
  let cards = s
    .create_cards(d.deck_id, vec![content("a"), content("b"), content("c")])
    .await
    .unwrap();

  let later = Utc::now() + Duration::days(10);
  s.update_card(cards[0].card_id, CardUpdate {
    next_review_at: Some(later),
    ..Default::default()
  })
  .await
  .unwrap();

  let summary = s.deck_summary(d.deck_id, Utc::now()).await.unwrap().unwrap();
  assert_eq!(summary.deck.deck_id, d.deck_id);
  assert_eq!(summary.statistics.total_cards, 3);
  assert_eq!(summary.statistics.due_cards, 2);
  assert!(summary.statistics.last_studied.is_none());

  let summary = s
    .deck_summary(d.deck_id, later + Duration::seconds(1))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(summary.statistics.due_cards, 3);
}

#[tokio::test]
async fn search_decks_matches_name_and_description() {
  let s = store().await;
  s.create_deck(NewDeck::new("French", Some("Irregular verbs".into())))
    .await
    .unwrap();
  s.create_deck(NewDeck::new("Verbs of Latin", None)).await.unwrap();
  s.create_deck(NewDeck::new("Chemistry", None)).await.unwrap();

  let hits = s.search_decks("VERB".into(), Utc::now()).await.unwrap();
  assert_eq!(hits.len(), 2);

  let all = s.search_decks("  ".into(), Utc::now()).await.unwrap();
  assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn search_decks_folds_unicode_and_treats_wildcards_literally() {
  let s = store().await;
  s.create_deck(NewDeck::new("École", Some("vocabulaire".into())))
    .await
    .unwrap();
  s.create_deck(NewDeck::new("100% recall", None)).await.unwrap();
  s.create_deck(NewDeck::new("snake_case", None)).await.unwrap();
  s.create_deck(NewDeck::new("Plain", None)).await.unwrap();

  let hits = s.search_decks("éCOLE".into(), Utc::now()).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].deck.name, "École");

  let hits = s.search_decks("%".into(), Utc::now()).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].deck.name, "100% recall");

  let hits = s.search_decks("_".into(), Utc::now()).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].deck.name, "snake_case");
}

#[tokio::test]
async fn delete_deck_cascades_cards() {
  let s = store().await;
  let d = s.create_deck(deck("Gone")).await.unwrap();
  let cards = s
    .create_cards(d.deck_id, vec![content("x"), content("y")])
    .await
    .unwrap();

  let deletion = s.delete_deck(d.deck_id).await.unwrap();
  assert_eq!(deletion.deleted_deck_id, d.deck_id);
  assert_eq!(deletion.deleted_card_count, 2);

  assert!(s.get_deck(d.deck_id).await.unwrap().is_none());
  assert!(s.get_card(cards[0].card_id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_deck_refused_while_session_active() {
  let st = study().await;
  let d = st.store().create_deck(deck("Busy")).await.unwrap();
  let session = st.start(d.deck_id, SessionType::Review).await.unwrap();

  let err = st.store().delete_deck(d.deck_id).await.unwrap_err();
  assert!(matches!(err, crate::Error::Core(CoreError::ActiveSessionExists(_))));

  st.complete(session.session_id).await.unwrap();
  st.store().delete_deck(d.deck_id).await.unwrap();
}

// ─── Cards ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_card_has_default_schedule() {
  let s = store().await;
  let d = s.create_deck(deck("Cards")).await.unwrap();

  let card = s.create_card(d.deck_id, content("hola")).await.unwrap();
  assert_eq!(card.schedule.easiness_factor, 2.5);
  assert_eq!(card.schedule.interval_days, 1);
  assert_eq!(card.schedule.repetition_count, 0);
  assert_eq!(card.schedule.next_review_at, card.created_at);

  let fetched = s.get_card(card.card_id).await.unwrap().unwrap();
  assert_eq!(fetched, card);
}

#[tokio::test]
async fn create_card_in_missing_deck_errors() {
  let s = store().await;
  let err = s
    .create_card(Uuid::new_v4(), content("orphan"))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(CoreError::DeckNotFound(_))));
}

#[tokio::test]
async fn duplicate_front_rejected_within_deck_only() {
  let s = store().await;
  let a = s.create_deck(deck("A")).await.unwrap();
  let b = s.create_deck(deck("B")).await.unwrap();

  s.create_card(a.deck_id, content("same")).await.unwrap();
  let err = s.create_card(a.deck_id, content("same")).await.unwrap_err();
  assert!(matches!(err, crate::Error::Core(CoreError::DuplicateCardFront { .. })));

  s.create_card(b.deck_id, content("same")).await.unwrap();
}

#[tokio::test]
async fn bulk_create_is_all_or_nothing() {
  let s = store().await;
  let d = s.create_deck(deck("Bulk")).await.unwrap();
  s.create_card(d.deck_id, content("existing")).await.unwrap();

  let err = s
    .create_cards(d.deck_id, vec![content("new one"), content("existing")])
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(CoreError::DuplicateCardFront { .. })));
  assert_eq!(s.list_cards(d.deck_id).await.unwrap().len(), 1);

  let err = s
    .create_cards(d.deck_id, vec![content("twin"), content("twin")])
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(CoreError::DuplicateCardFront { .. })));
  assert_eq!(s.list_cards(d.deck_id).await.unwrap().len(), 1);

  let created = s
    .create_cards(d.deck_id, vec![content("p"), content("q")])
    .await
    .unwrap();
  assert_eq!(created.len(), 2);
  assert_eq!(s.list_cards(d.deck_id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn update_card_rejects_out_of_range_schedule() {
  let s = store().await;
  let d = s.create_deck(deck("Maint")).await.unwrap();
  let card = s.create_card(d.deck_id, content("c")).await.unwrap();

  let err = s
    .update_card(card.card_id, CardUpdate {
      easiness_factor: Some(3.5),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert_eq!(rote_core::Error::from(err).kind(), ErrorKind::Validation);

  let err = s
    .update_card(card.card_id, CardUpdate {
      interval_days: Some(0),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert_eq!(rote_core::Error::from(err).kind(), ErrorKind::Validation);

  let updated = s
    .update_card(card.card_id, CardUpdate {
      back: Some("new back".into()),
      easiness_factor: Some(1.3),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.back, "new back");
  assert_eq!(updated.schedule.easiness_factor, 1.3);
  assert_eq!(s.get_card(card.card_id).await.unwrap().unwrap(), updated);
}

#[tokio::test]
async fn update_card_front_conflict() {
  let s = store().await;
  let d = s.create_deck(deck("Fronts")).await.unwrap();
  let one = s.create_card(d.deck_id, content("one")).await.unwrap();
  s.create_card(d.deck_id, content("two")).await.unwrap();

  let err = s
    .update_card(one.card_id, CardUpdate {
      front: Some("two".into()),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(CoreError::DuplicateCardFront { .. })));
}

#[tokio::test]
async fn due_cards_ordered_by_next_review() {
  let s = store().await;
  let d = s.create_deck(deck("Due")).await.unwrap();
  let cards = s
    .create_cards(d.deck_id, vec![content("a"), content("b"), content("c")])
    .await
    .unwrap();

  let now = Utc::now();
  s.update_card(cards[0].card_id, CardUpdate {
    next_review_at: Some(now - Duration::days(2)),
    ..Default::default()
  })
  .await
  .unwrap();
  s.update_card(cards[1].card_id, CardUpdate {
    next_review_at: Some(now + Duration::days(2)),
    ..Default::default()
  })
  .await
  .unwrap();

  let due = s.due_cards(d.deck_id, Utc::now()).await.unwrap();
  let ids: Vec<_> = due.iter().map(|c| c.card_id).collect();
  assert_eq!(ids, vec![cards[0].card_id, cards[2].card_id]);
}

#[tokio::test]
async fn delete_card_missing_errors() {
  let s = store().await;
  let err = s.delete_card(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, crate::Error::Core(CoreError::CardNotFound(_))));
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn only_one_active_session_per_deck() {
  let s = store().await;
  let d = s.create_deck(deck("Solo")).await.unwrap();

  let first = s.create_session(d.deck_id, SessionType::Cram).await.unwrap();
  assert_eq!(first.cards_studied, 0);
  assert!(first.is_active());

  let err = s
    .create_session(d.deck_id, SessionType::Review)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(CoreError::ActiveSessionExists(_))));

  let active = s.find_active_session(d.deck_id).await.unwrap().unwrap();
  assert_eq!(active.session_id, first.session_id);
  assert_eq!(active.session_type, SessionType::Cram);
}

#[tokio::test]
async fn completed_session_rejects_writes() {
  let s = store().await;
  let d = s.create_deck(deck("Closed")).await.unwrap();
  let session = s.create_session(d.deck_id, SessionType::Review).await.unwrap();

  let done = s.complete_session(session.session_id, Utc::now()).await.unwrap();
  assert!(done.completed_at.is_some());
  assert!(s.find_active_session(d.deck_id).await.unwrap().is_none());

  let err = s
    .complete_session(session.session_id, Utc::now())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(CoreError::SessionCompleted(_))));

  let err = s
    .set_session_counters(session.session_id, SessionTally { studied: 1, correct: 1 })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(CoreError::SessionCompleted(_))));
}

#[tokio::test]
async fn list_sessions_newest_first_with_limit() {
  let s = store().await;
  let d = s.create_deck(deck("History")).await.unwrap();
  let mut ids = Vec::new();
  for _ in 0..3 {
    let session = s.create_session(d.deck_id, SessionType::Review).await.unwrap();
    s.complete_session(session.session_id, Utc::now()).await.unwrap();
    ids.push(session.session_id);
  }

  let listed = s.list_sessions(d.deck_id, 2).await.unwrap();
  assert_eq!(
    listed.iter().map(|s| s.session_id).collect::<Vec<_>>(),
    vec![ids[2], ids[1]]
  );

  let summary = s.deck_summary(d.deck_id, Utc::now()).await.unwrap().unwrap();
  assert_eq!(summary.statistics.last_studied, listed[0].completed_at);
}

// ─── Study runs ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_session_run() {
  let st = study().await;
  let d = st.store().create_deck(deck("Run")).await.unwrap();
  st.store()
    .create_cards(d.deck_id, vec![content("1"), content("2"), content("3")])
    .await
    .unwrap();

  let session = st.start(d.deck_id, SessionType::Review).await.unwrap();
  let queue = st.build_queue(d.deck_id, SessionType::Review).await.unwrap();
  assert_eq!(queue.len(), 3);

  let responses = [Response::Easy, Response::Hard, Response::Easy];
  for (card, response) in queue.iter().zip(responses) {
    st.review_one(session.session_id, card.card_id, response, Some(1_000))
      .await
      .unwrap();
  }

  let done = st.complete(session.session_id).await.unwrap();
  assert_eq!(done.cards_studied, 3);
  assert_eq!(done.cards_correct, 2);
  assert!(done.completed_at.is_some());

  let stats = st.stats(session.session_id).await.unwrap();
  assert_eq!(stats.total_cards, 3);
  assert_eq!(stats.correct_cards, 2);
  assert_eq!(stats.accuracy, 66.67);

  let err = st
    .review_one(session.session_id, queue[0].card_id, Response::Easy, None)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::SessionCompleted(_)));
}

#[tokio::test]
async fn easy_review_persists_schedule() {
  let st = study().await;
  let d = st.store().create_deck(deck("Persist")).await.unwrap();
  let card = st.store().create_card(d.deck_id, content("q")).await.unwrap();
  let session = st.start(d.deck_id, SessionType::Review).await.unwrap();

  let outcome = st
    .review_one(session.session_id, card.card_id, Response::Easy, None)
    .await
    .unwrap();
  assert_eq!(outcome.session.cards_studied, 1);
  assert_eq!(outcome.session.cards_correct, 1);

  let stored = st.store().get_card(card.card_id).await.unwrap().unwrap();
  assert_eq!(stored.schedule.interval_days, 3);
  assert_eq!(stored.schedule.repetition_count, 1);
  assert!((stored.schedule.easiness_factor - 2.6).abs() < 1e-9);
  assert_eq!(
    stored.schedule.next_review_at,
    outcome.event.reviewed_at + Duration::days(3)
  );
  assert_eq!(stored, outcome.card);
}

#[tokio::test]
async fn start_resumes_active_session() {
  let st = study().await;
  let d = st.store().create_deck(deck("Resume")).await.unwrap();

  let first = st.start(d.deck_id, SessionType::Cram).await.unwrap();
  let second = st.start(d.deck_id, SessionType::New).await.unwrap();
  assert_eq!(first.session_id, second.session_id);
  assert_eq!(second.session_type, SessionType::Cram);
}

#[tokio::test]
async fn concurrent_starts_share_one_session() {
  let st = study().await;
  let d = st.store().create_deck(deck("Race")).await.unwrap();

  // Both lookups are queued before either insert, so one start loses the
  // insert and has to pick up the winner's session.
  let (a, b) = tokio::join!(
    st.start(d.deck_id, SessionType::Review),
    st.start(d.deck_id, SessionType::Cram),
  );
  let (a, b) = (a.unwrap(), b.unwrap());
  assert_eq!(a.session_id, b.session_id);
  assert_eq!(a.session_type, b.session_type);

  let sessions = st.store().list_sessions(d.deck_id, 10).await.unwrap();
  assert_eq!(sessions.len(), 1);
}

#[tokio::test]
async fn start_returns_session_created_directly_in_store() {
  let st = study().await;
  let d = st.store().create_deck(deck("Direct")).await.unwrap();
  let existing = st
    .store()
    .create_session(d.deck_id, SessionType::New)
    .await
    .unwrap();

  let started = st.start(d.deck_id, SessionType::Review).await.unwrap();
  assert_eq!(started.session_id, existing.session_id);
  assert_eq!(started.session_type, SessionType::New);
}

#[tokio::test]
async fn start_on_missing_deck_errors() {
  let st = study().await;
  let err = st
    .start(Uuid::new_v4(), SessionType::Review)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::DeckNotFound(_)));
}

#[tokio::test]
async fn duplicate_review_leaves_first_effects() {
  let st = study().await;
  let d = st.store().create_deck(deck("Twice")).await.unwrap();
  let card = st.store().create_card(d.deck_id, content("q")).await.unwrap();
  let session = st.start(d.deck_id, SessionType::Review).await.unwrap();

  st.review_one(session.session_id, card.card_id, Response::Easy, Some(500))
    .await
    .unwrap();
  let after_first = st.store().get_card(card.card_id).await.unwrap().unwrap();

  let err = st
    .review_one(session.session_id, card.card_id, Response::Hard, Some(500))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::DuplicateReview { .. }));
  assert_eq!(err.kind(), ErrorKind::Conflict);

  let after_second = st.store().get_card(card.card_id).await.unwrap().unwrap();
  assert_eq!(after_first, after_second);

  let progress = st.progress(session.session_id).await.unwrap();
  assert_eq!(progress.total_answered, 1);
  assert_eq!(progress.correct_answers, 1);
  assert_eq!(progress.average_response_time_ms, Some(500.0));
}

#[tokio::test]
async fn card_from_other_deck_rejected() {
  let st = study().await;
  let a = st.store().create_deck(deck("A")).await.unwrap();
  let b = st.store().create_deck(deck("B")).await.unwrap();
  let foreign = st.store().create_card(b.deck_id, content("q")).await.unwrap();
  let session = st.start(a.deck_id, SessionType::Review).await.unwrap();

  let err = st
    .review_one(session.session_id, foreign.card_id, Response::Easy, None)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::CardNotInDeck { .. }));

  let untouched = st.store().get_card(foreign.card_id).await.unwrap().unwrap();
  assert_eq!(untouched, foreign);
}

#[tokio::test]
async fn abandon_discards_session_and_events() {
  let st = study().await;
  let d = st.store().create_deck(deck("Quit")).await.unwrap();
  let card = st.store().create_card(d.deck_id, content("q")).await.unwrap();
  let session = st.start(d.deck_id, SessionType::Review).await.unwrap();
  st.review_one(session.session_id, card.card_id, Response::Hard, None)
    .await
    .unwrap();

  st.abandon(session.session_id).await.unwrap();

  let err = st.session(session.session_id).await.unwrap_err();
  assert!(matches!(err, CoreError::SessionNotFound(_)));
  assert!(st.active_session(d.deck_id).await.unwrap().is_none());

  let history = st.store().card_history(card.card_id, 10).await.unwrap();
  assert!(history.is_empty());

  // The schedule write is not rolled back by abandoning.
  let card = st.store().get_card(card.card_id).await.unwrap().unwrap();
  assert_eq!(card.schedule.repetition_count, 1);

  let err = st.abandon(session.session_id).await.unwrap_err();
  assert!(matches!(err, CoreError::SessionNotFound(_)));
}

#[tokio::test]
async fn completed_session_cannot_be_abandoned_or_completed() {
  let st = study().await;
  let d = st.store().create_deck(deck("Final")).await.unwrap();
  let session = st.start(d.deck_id, SessionType::Review).await.unwrap();
  st.complete(session.session_id).await.unwrap();

  let err = st.complete(session.session_id).await.unwrap_err();
  assert!(matches!(err, CoreError::SessionCompleted(_)));
  let err = st.abandon(session.session_id).await.unwrap_err();
  assert!(matches!(err, CoreError::SessionCompleted(_)));

  let next = st.start(d.deck_id, SessionType::Review).await.unwrap();
  assert_ne!(next.session_id, session.session_id);
}

#[tokio::test]
async fn remaining_queue_skips_reviewed_cards() {
  let st = study().await;
  let d = st.store().create_deck(deck("Queue")).await.unwrap();
  let cards = st
    .store()
    .create_cards(d.deck_id, vec![content("a"), content("b")])
    .await
    .unwrap();
  let session = st.start(d.deck_id, SessionType::New).await.unwrap();

  st.review_one(session.session_id, cards[0].card_id, Response::Easy, None)
    .await
    .unwrap();

  let remaining = st.remaining_queue(session.session_id).await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].card_id, cards[1].card_id);
}

#[tokio::test]
async fn review_queue_excludes_future_cards() {
  let st = study().await;
  let d = st.store().create_deck(deck("Later")).await.unwrap();
  let cards = st
    .store()
    .create_cards(d.deck_id, vec![content("now"), content("later")])
    .await
    .unwrap();
  st.store()
    .update_card(cards[1].card_id, CardUpdate {
      next_review_at: Some(Utc::now() + Duration::days(5)),
      ..Default::default()
    })
    .await
    .unwrap();

  let review = st.build_queue(d.deck_id, SessionType::Review).await.unwrap();
  assert_eq!(review.len(), 1);
  assert_eq!(review[0].card_id, cards[0].card_id);

  let cram = st.build_queue(d.deck_id, SessionType::Cram).await.unwrap();
  assert_eq!(cram.len(), 2);
}

#[tokio::test]
async fn card_performance_across_sessions() {
  let st = study().await;
  let d = st.store().create_deck(deck("Perf")).await.unwrap();
  let card = st.store().create_card(d.deck_id, content("q")).await.unwrap();

  for (response, ms) in [(Response::Easy, 200), (Response::Hard, 400)] {
    let session = st.start(d.deck_id, SessionType::Cram).await.unwrap();
    st.review_one(session.session_id, card.card_id, response, Some(ms))
      .await
      .unwrap();
    st.complete(session.session_id).await.unwrap();
  }

  let perf = st.card_performance(card.card_id).await.unwrap();
  assert_eq!(perf.total_reviews, 2);
  assert_eq!(perf.correct_reviews, 1);
  assert_eq!(perf.average_response_time_ms, Some(300.0));
  assert!(perf.last_reviewed_at.is_some());

  let history = st.store().card_history(card.card_id, 1).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].response, Response::Hard);
}

#[tokio::test]
async fn store_survives_reopen() {
  let dir = std::env::temp_dir().join(format!("rote-test-{}", Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("rote.db");

  let s = SqliteStore::open(&path).await.unwrap();
  let d = s.create_deck(deck("Durable")).await.unwrap();
  s.close().await.unwrap();

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.get_deck(d.deck_id).await.unwrap().unwrap().name, "Durable");
  s.close().await.unwrap();

  std::fs::remove_dir_all(&dir).ok();
}

// ─── Schedule bounds ─────────────────────────────────────────────────────────

#[tokio::test]
async fn repeated_easy_cram_reviews_stay_readable() {
  let st = study().await;
  let d = st.store().create_deck(deck("Marathon")).await.unwrap();
  let cards = st
    .store()
    .create_cards(d.deck_id, vec![content("studied"), content("sibling")])
    .await
    .unwrap();
  let card_id = cards[0].card_id;

  for round in 0..25 {
    let session = st.start(d.deck_id, SessionType::Cram).await.unwrap();
    let outcome = st
      .review_one(session.session_id, card_id, Response::Easy, None)
      .await
      .unwrap_or_else(|e| panic!("round {round}: {e}"));
    assert!(outcome.card.schedule.interval_days <= MAX_INTERVAL_DAYS);
    st.complete(session.session_id).await.unwrap();
  }

  let card = st.store().get_card(card_id).await.unwrap().unwrap();
  assert_eq!(card.schedule.interval_days, MAX_INTERVAL_DAYS);
  assert_eq!(card.schedule.repetition_count, 25);
  assert_eq!(st.store().list_cards(d.deck_id).await.unwrap().len(), 2);
  assert_eq!(
    st.build_queue(d.deck_id, SessionType::Cram).await.unwrap().len(),
    2
  );
  assert!(st.store().deck_summary(d.deck_id, Utc::now()).await.unwrap().is_some());
}

#[tokio::test]
async fn oversized_interval_update_rejected() {
  let s = store().await;
  let d = s.create_deck(deck("Patch")).await.unwrap();
  let cards = s
    .create_cards(d.deck_id, vec![content("a"), content("b")])
    .await
    .unwrap();

  let err = s
    .update_card(cards[0].card_id, CardUpdate {
      interval_days: Some(3_000_000),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert_eq!(rote_core::Error::from(err).kind(), ErrorKind::Validation);

  assert_eq!(s.get_card(cards[0].card_id).await.unwrap().unwrap(), cards[0]);
  assert_eq!(s.list_cards(d.deck_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn repetition_count_at_ceiling_is_not_reviewed() {
  let st = study().await;
  let d = st.store().create_deck(deck("Veteran")).await.unwrap();
  let card = st.store().create_card(d.deck_id, content("q")).await.unwrap();

  let err = st
    .store()
    .update_card(card.card_id, CardUpdate {
      repetition_count: Some(u32::MAX),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert_eq!(rote_core::Error::from(err).kind(), ErrorKind::Validation);

  let veteran = st
    .store()
    .update_card(card.card_id, CardUpdate {
      repetition_count: Some(MAX_REPETITIONS),
      ..Default::default()
    })
    .await
    .unwrap();

  let session = st.start(d.deck_id, SessionType::Cram).await.unwrap();
  let err = st
    .review_one(session.session_id, card.card_id, Response::Hard, None)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::Validation { field: "repetition_count", .. }));

  // Nothing was written: no event and the card is as it was.
  assert!(st.store().card_history(card.card_id, 10).await.unwrap().is_empty());
  assert_eq!(
    st.store().get_card(card.card_id).await.unwrap().unwrap(),
    veteran
  );
}
