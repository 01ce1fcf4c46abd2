//! Error types and axum `IntoResponse` implementation.
//!
//! Every failure is rendered as a full admin page with a human-readable
//! message, never as a bare status line.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use spacedb_core::{
  ValidationError,
  person::PersonId,
  workflow::WorkflowError,
};
use thiserror::Error;

use crate::html::{Alert, Nav, PageBuilder};

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  /// The request could not be decoded at all.
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("{0} not found")]
  NotFound(String),

  #[error("{0}")]
  Unchanged(String),

  #[error("{0}")]
  Conflict(String),

  #[error("{0}")]
  PartialFailure(String),

  #[error("database error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("could not render page: {0}")]
  Render(String),

  /// `source`, raised while acting on member `id`. Rendered with a link back
  /// to their profile.
  #[error("{source}")]
  OnProfile { id: PersonId, source: Box<Error> },
}

impl Error {
  pub fn on_profile(self, id: PersonId) -> Self {
    Error::OnProfile { id, source: Box::new(self) }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Error::Validation(_) | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::Unchanged(_) | Error::Conflict(_) => StatusCode::CONFLICT,
      Error::PartialFailure(_) | Error::Store(_) | Error::Render(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
      Error::OnProfile { source, .. } => source.status(),
    }
  }

  /// Render as an error page whose links start at `base`.
  pub fn render(self, base: &str) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    } else {
      tracing::debug!(error = %self, "request rejected");
    }

    let mut page = PageBuilder::new(base, "Error", Nav::Home);
    page.alert(Alert::Danger, &self.to_string());
    if let Error::OnProfile { id, .. } = &self {
      let href = page.url(&format!("/?action=viewmember&id={id}"));
      page.open("p", &[]).link(&href, "Back to profile", None).close("p");
    }
    let home = page.url("/");
    page.open("p", &[]).link(&home, "Main menu", None).close("p");

    match page.finish() {
      Ok(html) => (status, html).into_response(),
      Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
  }
}

impl<E> From<WorkflowError<E>> for Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn from(e: WorkflowError<E>) -> Self {
    match e {
      WorkflowError::Validation(v) => Error::Validation(v),
      WorkflowError::NotFound(target) => Error::NotFound(target.to_string()),
      e @ WorkflowError::Unchanged(_) => Error::Unchanged(e.to_string()),
      e @ (WorkflowError::AlreadyRegistered(_) | WorkflowError::CardInUse(_)) => {
        Error::Conflict(e.to_string())
      }
      e @ WorkflowError::PartialFailure { .. } => Error::PartialFailure(e.to_string()),
      WorkflowError::Unavailable(e) => Error::Store(Box::new(e)),
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response { self.render("") }
}
