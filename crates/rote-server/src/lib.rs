//! HTTP server for Rote.
//!
//! Wraps the [`rote_api`] router with a health check and request tracing.
//! The binary in `main.rs` loads [`ServerConfig`] and serves [`router`].

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use rote_core::store::FlashcardStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROTE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl ServerConfig {
  pub const DEFAULT_HOST: &'static str = "127.0.0.1";
  pub const DEFAULT_PORT: u16 = 8080;
  pub const DEFAULT_STORE_PATH: &'static str = "~/.local/share/rote/rote.db";

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router: `/health` plus the JSON API under
/// `/api`.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: FlashcardStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", rote_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }
