//! Error type and axum `IntoResponse` implementation.
//!
//! Every error body is `{"error": "<message>"}`.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use factwall_core::validate::Rejection;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  BadRequest(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(what: &str) -> Self { Error::NotFound(format!("{what} not found")) }
}

impl From<Rejection> for Error {
  fn from(r: Rejection) -> Self { Error::BadRequest(r.to_string()) }
}

impl From<factwall_core::Error> for Error {
  fn from(e: factwall_core::Error) -> Self { Error::BadRequest(e.to_string()) }
}

impl From<JsonRejection> for Error {
  fn from(r: JsonRejection) -> Self {
    let msg = match r {
      JsonRejection::JsonDataError(_) => "invalid data types",
      JsonRejection::MissingJsonContentType(_) => "expected a JSON body",
      _ => "invalid request",
    };
    Error::BadRequest(msg.to_string())
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      Error::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
      Error::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      Error::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      Error::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
