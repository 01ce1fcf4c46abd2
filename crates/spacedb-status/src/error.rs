//! Status error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by the status handler.
///
/// Source failures never reach this type; they degrade their field of the
/// document instead.
#[derive(Debug, Error)]
pub enum StatusError {
  #[error("could not encode status document: {0}")]
  Encode(#[from] serde_json::Error),
}

impl IntoResponse for StatusError {
  fn into_response(self) -> Response {
    tracing::error!(error = %self, "status request failed");
    (
      StatusCode::INTERNAL_SERVER_ERROR,
      [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
      Json(json!({ "error": self.to_string() })),
    )
      .into_response()
  }
}
