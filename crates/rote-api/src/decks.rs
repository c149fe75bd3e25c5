//! Handlers for `/decks` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/decks` | Optional `?q=<text>` searches name and description |
//! | `POST`   | `/decks` | Body: `{"name":"…","description":"…"}` |
//! | `GET`    | `/decks/{id}` | Statistics plus every card |
//! | `PATCH`  | `/decks/{id}` | Partial body |
//! | `DELETE` | `/decks/{id}?confirm=true` | 409 while a session is active |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use rote_core::{
  deck::{Deck, DeckDeletion, DeckDetail, DeckSummary, DeckUpdate, NewDeck},
  store::FlashcardStore,
  study::Study,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ConfirmParams,
  error::{ApiError, store_err},
};

// ─── List / search ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub q: Option<String>,
}

/// `GET /decks[?q=<text>]`
pub async fn list<S>(
  State(study): State<Study<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<DeckSummary>>, ApiError>
where
  S: FlashcardStore,
{
  let now = Utc::now();
  let decks = match params.q {
    Some(q) => study.store().search_decks(q, now).await,
    None => study.store().list_decks(now).await,
  }
  .map_err(store_err)?;
  Ok(Json(decks))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:        String,
  pub description: Option<String>,
}

/// `POST /decks`
pub async fn create<S>(
  State(study): State<Study<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FlashcardStore,
{
  let deck = study
    .store()
    .create_deck(NewDeck::new(body.name, body.description))
    .await
    .map_err(store_err)?;
  tracing::info!(deck_id = %deck.deck_id, name = %deck.name, "deck created");
  Ok((StatusCode::CREATED, Json(deck)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /decks/{id}`
pub async fn get_one<S>(
  State(study): State<Study<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<DeckDetail>, ApiError>
where
  S: FlashcardStore,
{
  let summary = study
    .store()
    .deck_summary(id, Utc::now())
    .await
    .map_err(store_err)?
    .ok_or_else(|| ApiError::NotFound(format!("deck {id} not found")))?;
  let cards = study.store().list_cards(id).await.map_err(store_err)?;
  Ok(Json(DeckDetail { summary, cards }))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub name:        Option<String>,
  pub description: Option<String>,
}

/// `PATCH /decks/{id}`
pub async fn update<S>(
  State(study): State<Study<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Deck>, ApiError>
where
  S: FlashcardStore,
{
  let update = DeckUpdate { name: body.name, description: body.description };
  let deck = study
    .store()
    .update_deck(id, update)
    .await
    .map_err(store_err)?;
  Ok(Json(deck))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /decks/{id}?confirm=true`
pub async fn delete_one<S>(
  State(study): State<Study<S>>,
  Path(id): Path<Uuid>,
  Query(confirm): Query<ConfirmParams>,
) -> Result<Json<DeckDeletion>, ApiError>
where
  S: FlashcardStore,
{
  confirm.require("deck")?;
  let deletion = study.store().delete_deck(id).await.map_err(store_err)?;
  Ok(Json(deletion))
}
