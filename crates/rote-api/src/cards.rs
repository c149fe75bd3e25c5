//! Handlers for card endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/decks/{id}/cards` | Newest first |
//! | `POST`   | `/decks/{id}/cards` | Body: `{"front":"…","back":"…"}` |
//! | `POST`   | `/decks/{id}/cards/bulk` | Body: `{"cards":[…]}`; all or nothing |
//! | `GET`    | `/decks/{id}/cards/due` | Earliest due first |
//! | `GET`    | `/cards/{id}` | 404 if not found |
//! | `PATCH`  | `/cards/{id}` | Content and/or scheduling fields |
//! | `DELETE` | `/cards/{id}?confirm=true` | |
//! | `GET`    | `/cards/{id}/performance` | Review history summary |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use rote_core::{
  card::{Card, CardContent, CardPerformance, CardUpdate},
  store::FlashcardStore,
  study::Study,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ConfirmParams,
  error::{ApiError, store_err},
};

// ─── Deck-scoped ──────────────────────────────────────────────────────────────

/// `GET /decks/{id}/cards`
pub async fn list<S>(
  State(study): State<Study<S>>,
  Path(deck_id): Path<Uuid>,
) -> Result<Json<Vec<Card>>, ApiError>
where
  S: FlashcardStore,
{
  ensure_deck(&study, deck_id).await?;
  let cards = study.store().list_cards(deck_id).await.map_err(store_err)?;
  Ok(Json(cards))
}

/// `POST /decks/{id}/cards`
pub async fn create<S>(
  State(study): State<Study<S>>,
  Path(deck_id): Path<Uuid>,
  Json(body): Json<CardContent>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FlashcardStore,
{
  let card = study
    .store()
    .create_card(deck_id, body)
    .await
    .map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(card)))
}

#[derive(Debug, Deserialize)]
pub struct BulkBody {
  pub cards: Vec<CardContent>,
}

/// `POST /decks/{id}/cards/bulk`
pub async fn create_bulk<S>(
  State(study): State<Study<S>>,
  Path(deck_id): Path<Uuid>,
  Json(body): Json<BulkBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FlashcardStore,
{
  let cards = study
    .store()
    .create_cards(deck_id, body.cards)
    .await
    .map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(cards)))
}

/// `GET /decks/{id}/cards/due`
pub async fn due<S>(
  State(study): State<Study<S>>,
  Path(deck_id): Path<Uuid>,
) -> Result<Json<Vec<Card>>, ApiError>
where
  S: FlashcardStore,
{
  ensure_deck(&study, deck_id).await?;
  let cards = study
    .store()
    .due_cards(deck_id, Utc::now())
    .await
    .map_err(store_err)?;
  Ok(Json(cards))
}

async fn ensure_deck<S: FlashcardStore>(study: &Study<S>, deck_id: Uuid) -> Result<(), ApiError> {
  study
    .store()
    .get_deck(deck_id)
    .await
    .map_err(store_err)?
    .map(|_| ())
    .ok_or_else(|| ApiError::NotFound(format!("deck {deck_id} not found")))
}

// ─── Single card ──────────────────────────────────────────────────────────────

/// `GET /cards/{id}`
pub async fn get_one<S>(
  State(study): State<Study<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Card>, ApiError>
where
  S: FlashcardStore,
{
  let card = study
    .store()
    .get_card(id)
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("card {id} not found")))?;
  Ok(Json(card))
}

/// `PATCH /cards/{id}`
pub async fn update<S>(
  State(study): State<Study<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<CardUpdate>,
) -> Result<Json<Card>, ApiError>
where
  S: FlashcardStore,
{
  let card = study
    .store()
    .update_card(id, body)
    .await
    .map_err(store_err)?;
  Ok(Json(card))
}

/// `DELETE /cards/{id}?confirm=true`
pub async fn delete_one<S>(
  State(study): State<Study<S>>,
  Path(id): Path<Uuid>,
  Query(confirm): Query<ConfirmParams>,
) -> Result<StatusCode, ApiError>
where
  S: FlashcardStore,
{
  confirm.require("card")?;
  study.store().delete_card(id).await.map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /cards/{id}/performance`
pub async fn performance<S>(
  State(study): State<Study<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CardPerformance>, ApiError>
where
  S: FlashcardStore,
{
  Ok(Json(study.card_performance(id).await?))
}
