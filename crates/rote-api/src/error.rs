//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use rote_core::ErrorKind;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<rote_core::Error> for ApiError {
  fn from(e: rote_core::Error) -> Self {
    match e.kind() {
      ErrorKind::NotFound => ApiError::NotFound(e.to_string()),
      ErrorKind::Conflict => ApiError::Conflict(e.to_string()),
      ErrorKind::Validation => ApiError::BadRequest(e.to_string()),
      ErrorKind::Storage => ApiError::Store(Box::new(e)),
    }
  }
}

/// Map a backend error through [`rote_core::Error`] so it keeps its kind.
pub(crate) fn store_err<E: Into<rote_core::Error>>(e: E) -> ApiError { ApiError::from(e.into()) }

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "request failed in the store");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  #[test]
  fn core_errors_map_by_kind() {
    let id = Uuid::new_v4();
    assert!(matches!(
      ApiError::from(rote_core::Error::DeckNotFound(id)),
      ApiError::NotFound(_)
    ));
    assert!(matches!(
      ApiError::from(rote_core::Error::SessionCompleted(id)),
      ApiError::Conflict(_)
    ));
    assert!(matches!(
      ApiError::from(rote_core::Error::UnknownSessionType("daily".into())),
      ApiError::BadRequest(_)
    ));
  }

  #[test]
  fn status_codes() {
    let cases = [
      (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
      (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
      (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
    ];
    for (err, status) in cases {
      assert_eq!(err.into_response().status(), status);
    }
  }
}
