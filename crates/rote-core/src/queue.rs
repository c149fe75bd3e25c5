//! Study queue construction.
//!
//! Queues are deterministic: the same cards at the same instant always yield
//! the same order. Each [`SessionType`] selects and orders cards differently;
//! ties are broken by `card_id` so the order is total.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::{card::Card, session::SessionType};

/// Select and order `cards` for a session of type `session_type` as of
/// `now`.
pub fn build(mut cards: Vec<Card>, session_type: SessionType, now: DateTime<Utc>) -> Vec<Card> {
  match session_type {
    SessionType::Review => {
      cards.retain(|c| c.is_due(now));
      cards.sort_by(|a, b| {
        a.schedule
          .next_review_at
          .cmp(&b.schedule.next_review_at)
          .then_with(|| by_easiness(a, b))
          .then_with(|| a.card_id.cmp(&b.card_id))
      });
    }
    SessionType::New => {
      cards.retain(|c| c.schedule.repetition_count == 0);
      cards.sort_by(|a, b| {
        a.created_at
          .cmp(&b.created_at)
          .then_with(|| a.card_id.cmp(&b.card_id))
      });
    }
    SessionType::Cram => {
      cards.sort_by(|a, b| {
        by_easiness(a, b)
          .then_with(|| a.schedule.next_review_at.cmp(&b.schedule.next_review_at))
          .then_with(|| a.card_id.cmp(&b.card_id))
      });
    }
  }
  cards
}

fn by_easiness(a: &Card, b: &Card) -> Ordering {
  a.schedule
    .easiness_factor
    .total_cmp(&b.schedule.easiness_factor)
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};
  use uuid::Uuid;

  use super::*;
  use crate::schedule::Schedule;

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap() }

  fn card(front: &str, ease: f64, reps: u32, due_in_days: i64, created_days_ago: i64) -> Card {
    let created = now() - Duration::days(created_days_ago);
    Card {
      card_id:    Uuid::new_v4(),
      deck_id:    Uuid::nil(),
      front:      front.into(),
      back:       "-".into(),
      schedule:   Schedule {
        easiness_factor:  ease,
        interval_days:    1,
        repetition_count: reps,
        next_review_at:   now() + Duration::days(due_in_days),
      },
      created_at: created,
      updated_at: created,
    }
  }

  fn fronts(cards: &[Card]) -> Vec<&str> { cards.iter().map(|c| c.front.as_str()).collect() }

  fn deck() -> Vec<Card> {
    vec![
      card("later", 2.5, 2, 3, 10),
      card("overdue", 2.1, 4, -5, 20),
      card("fresh", 2.5, 0, 0, 1),
      card("due-today-hard", 1.7, 3, 0, 15),
      card("old-new", 2.5, 0, -2, 30),
    ]
  }

  #[test]
  fn review_takes_due_cards_oldest_first() {
    let queue = build(deck(), SessionType::Review, now());
    assert_eq!(
      fronts(&queue),
      ["overdue", "old-new", "due-today-hard", "fresh"]
    );
  }

  #[test]
  fn new_takes_unreviewed_cards_by_creation() {
    let queue = build(deck(), SessionType::New, now());
    assert_eq!(fronts(&queue), ["old-new", "fresh"]);
  }

  #[test]
  fn cram_takes_every_card_hardest_first() {
    let queue = build(deck(), SessionType::Cram, now());
    assert_eq!(
      fronts(&queue),
      ["due-today-hard", "overdue", "old-new", "fresh", "later"]
    );
  }

  #[test]
  fn order_does_not_depend_on_input_order() {
    let cards = deck();
    let mut reversed = cards.clone();
    reversed.reverse();
    for kind in [SessionType::Review, SessionType::New, SessionType::Cram] {
      assert_eq!(
        build(cards.clone(), kind, now()),
        build(reversed.clone(), kind, now()),
      );
    }
  }
}
