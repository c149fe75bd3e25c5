//! JSON REST API for Rote.
//!
//! Exposes an axum [`Router`] backed by any [`rote_core::store::FlashcardStore`].
//! Study endpoints go through [`rote_core::study::Study`]; plain record
//! maintenance goes straight to the store. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rote_api::api_router(store.clone()))
//! ```

pub mod cards;
pub mod decks;
pub mod error;
pub mod sessions;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use rote_core::{store::FlashcardStore, study::Study};
use serde::Deserialize;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: FlashcardStore + 'static,
{
  Router::new()
    // Decks
    .route("/decks", get(decks::list::<S>).post(decks::create::<S>))
    .route(
      "/decks/{id}",
      get(decks::get_one::<S>)
        .patch(decks::update::<S>)
        .delete(decks::delete_one::<S>),
    )
    .route(
      "/decks/{id}/cards",
      get(cards::list::<S>).post(cards::create::<S>),
    )
    .route("/decks/{id}/cards/bulk", post(cards::create_bulk::<S>))
    .route("/decks/{id}/cards/due", get(cards::due::<S>))
    .route("/decks/{id}/queue", get(sessions::deck_queue::<S>))
    .route("/decks/{id}/sessions", get(sessions::history::<S>))
    .route(
      "/decks/{id}/session",
      get(sessions::active::<S>).post(sessions::start::<S>),
    )
    // Cards
    .route(
      "/cards/{id}",
      get(cards::get_one::<S>)
        .patch(cards::update::<S>)
        .delete(cards::delete_one::<S>),
    )
    .route("/cards/{id}/performance", get(cards::performance::<S>))
    // Sessions
    .route(
      "/sessions/{id}",
      get(sessions::get_one::<S>).delete(sessions::abandon::<S>),
    )
    .route("/sessions/{id}/reviews", post(sessions::review::<S>))
    .route("/sessions/{id}/complete", post(sessions::complete::<S>))
    .route("/sessions/{id}/queue", get(sessions::remaining::<S>))
    .route("/sessions/{id}/progress", get(sessions::progress::<S>))
    .route("/sessions/{id}/stats", get(sessions::stats::<S>))
    .with_state(Study::new(store))
}

/// `?confirm=true`, required by destructive endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmParams {
  #[serde(default)]
  pub confirm: bool,
}

impl ConfirmParams {
  pub(crate) fn require(&self, what: &str) -> Result<(), ApiError> {
    if self.confirm {
      Ok(())
    } else {
      Err(ApiError::BadRequest(format!(
        "deleting a {what} requires ?confirm=true"
      )))
    }
  }
}
