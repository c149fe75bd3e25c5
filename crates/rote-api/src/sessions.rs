//! Handlers for study-session endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/decks/{id}/queue` | Optional `?session_type=review\|cram\|new` |
//! | `GET`    | `/decks/{id}/sessions` | Optional `?limit=<n>`, newest first |
//! | `GET`    | `/decks/{id}/session` | Active session or `null` |
//! | `POST`   | `/decks/{id}/session` | Start or resume; optional `?session_type=` |
//! | `GET`    | `/sessions/{id}` | |
//! | `DELETE` | `/sessions/{id}` | Abandon |
//! | `POST`   | `/sessions/{id}/reviews` | Body: `{"card_id":"…","response":"easy"}` |
//! | `POST`   | `/sessions/{id}/complete` | |
//! | `GET`    | `/sessions/{id}/queue` | Cards not yet reviewed |
//! | `GET`    | `/sessions/{id}/progress` | |
//! | `GET`    | `/sessions/{id}/stats` | |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use rote_core::{
  card::Card,
  schedule::Response,
  session::{ReviewOutcome, SessionProgress, SessionStats, SessionType, StudySession},
  store::FlashcardStore,
  study::Study,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, store_err};

const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct TypeParams {
  pub session_type: Option<String>,
}

impl TypeParams {
  fn session_type(&self) -> Result<SessionType, ApiError> {
    match self.session_type.as_deref() {
      Some(s) => Ok(SessionType::parse(s)?),
      None => Ok(SessionType::default()),
    }
  }
}

// ─── Deck-scoped ──────────────────────────────────────────────────────────────

/// `GET /decks/{id}/queue[?session_type=<type>]`
pub async fn deck_queue<S>(
  State(study): State<Study<S>>,
  Path(deck_id): Path<Uuid>,
  Query(params): Query<TypeParams>,
) -> Result<Json<Vec<Card>>, ApiError>
where
  S: FlashcardStore,
{
  let session_type = params.session_type()?;
  Ok(Json(study.build_queue(deck_id, session_type).await?))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
  pub limit: Option<usize>,
}

/// `GET /decks/{id}/sessions[?limit=<n>]`
pub async fn history<S>(
  State(study): State<Study<S>>,
  Path(deck_id): Path<Uuid>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<StudySession>>, ApiError>
where
  S: FlashcardStore,
{
  let sessions = study
    .store()
    .list_sessions(deck_id, params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
    .await
    .map_err(store_err)?;
  Ok(Json(sessions))
}

/// `GET /decks/{id}/session`
pub async fn active<S>(
  State(study): State<Study<S>>,
  Path(deck_id): Path<Uuid>,
) -> Result<Json<Option<StudySession>>, ApiError>
where
  S: FlashcardStore,
{
  Ok(Json(study.active_session(deck_id).await?))
}

/// `POST /decks/{id}/session[?session_type=<type>]`
pub async fn start<S>(
  State(study): State<Study<S>>,
  Path(deck_id): Path<Uuid>,
  Query(params): Query<TypeParams>,
) -> Result<Json<StudySession>, ApiError>
where
  S: FlashcardStore,
{
  let session_type = params.session_type()?;
  Ok(Json(study.start(deck_id, session_type).await?))
}

// ─── Session-scoped ───────────────────────────────────────────────────────────

/// `GET /sessions/{id}`
pub async fn get_one<S>(
  State(study): State<Study<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<StudySession>, ApiError>
where
  S: FlashcardStore,
{
  Ok(Json(study.session(id).await?))
}

/// `DELETE /sessions/{id}`
pub async fn abandon<S>(
  State(study): State<Study<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: FlashcardStore,
{
  study.abandon(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
  pub card_id:          Uuid,
  /// Kept as a string so an unknown value is reported as a review error
  /// rather than a body rejection.
  pub response:         String,
  pub response_time_ms: Option<u32>,
}

/// `POST /sessions/{id}/reviews`
pub async fn review<S>(
  State(study): State<Study<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ReviewBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FlashcardStore,
{
  let response = Response::parse(&body.response)?;
  let outcome: ReviewOutcome = study
    .review_one(id, body.card_id, response, body.response_time_ms)
    .await?;
  Ok((StatusCode::CREATED, Json(outcome)))
}

/// `POST /sessions/{id}/complete`
pub async fn complete<S>(
  State(study): State<Study<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<StudySession>, ApiError>
where
  S: FlashcardStore,
{
  Ok(Json(study.complete(id).await?))
}

/// `GET /sessions/{id}/queue`
pub async fn remaining<S>(
  State(study): State<Study<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Card>>, ApiError>
where
  S: FlashcardStore,
{
  Ok(Json(study.remaining_queue(id).await?))
}

/// `GET /sessions/{id}/progress`
pub async fn progress<S>(
  State(study): State<Study<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SessionProgress>, ApiError>
where
  S: FlashcardStore,
{
  Ok(Json(study.progress(id).await?))
}

/// `GET /sessions/{id}/stats`
pub async fn stats<S>(
  State(study): State<Study<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<SessionStats>, ApiError>
where
  S: FlashcardStore,
{
  Ok(Json(study.stats(id).await?))
}
