//! Public status document for the hackspace.
//!
//! Exposes an axum [`Router`] serving `GET /status.json`, readable by any
//! origin and never cached. The document is rebuilt on every request.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = admin.merge(spacedb_status::status_router(state));
//! ```

pub mod error;

use std::sync::Arc;

use axum::{
  Router,
  extract::State,
  http::header,
  response::{IntoResponse, Response},
  routing::get,
};
use spacedb_core::{
  clock::Clock,
  policy::PublicHours,
  snapshot::{ManualFlagSource, OpenHoursSource, SensorSource, SpaceInfo, build_snapshot},
};

pub use error::StatusError;

/// Everything the status document is built from.
pub struct StatusState<S, C> {
  pub source:       Arc<S>,
  pub clock:        Arc<C>,
  pub info:         Arc<SpaceInfo>,
  pub public_hours: Arc<PublicHours>,
}

impl<S, C> Clone for StatusState<S, C> {
  fn clone(&self) -> Self {
    Self {
      source:       self.source.clone(),
      clock:        self.clock.clone(),
      info:         self.info.clone(),
      public_hours: self.public_hours.clone(),
    }
  }
}

/// Build the status router. The returned `Router<()>` can be merged into any
/// parent router regardless of its own state type.
pub fn status_router<S, C>(state: StatusState<S, C>) -> Router<()>
where
  S: ManualFlagSource + OpenHoursSource + SensorSource + 'static,
  C: Clock + 'static,
{
  Router::new()
    .route("/status.json", get(status_json::<S, C>))
    .with_state(state)
}

/// `GET /status.json`
pub async fn status_json<S, C>(
  State(state): State<StatusState<S, C>>,
) -> Result<Response, StatusError>
where
  S: ManualFlagSource + OpenHoursSource + SensorSource,
  C: Clock,
{
  let source = state.source.as_ref();
  let document = build_snapshot(
    &state.info,
    &state.public_hours,
    state.clock.as_ref(),
    source,
    source,
    source,
  )
  .await;
  let body = serde_json::to_vec(&document)?;

  Ok(
    (
      [
        (header::CONTENT_TYPE, "application/json"),
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::CACHE_CONTROL, "no-cache"),
      ],
      body,
    )
      .into_response(),
  )
}

#[cfg(test)]
mod tests;
