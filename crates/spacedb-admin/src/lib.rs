//! Member administration tool for the hackspace.
//!
//! Exposes an axum [`Router`] serving server-rendered HTML pages, keyed by
//! an `?action=` query parameter and the HTTP method, backed by any
//! [`MemberStore`]. [`app`] adds the public status document and request
//! tracing on top.

pub mod error;
pub mod forms;
pub mod handlers;
pub mod html;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Form, Router,
  extract::{FromRequest, Query, Request, State},
  http::{Method, StatusCode},
  response::{IntoResponse, Response},
  routing::any,
};
use serde::{Deserialize, de::DeserializeOwned};
use spacedb_core::{
  clock::Clock,
  policy::PublicHours,
  snapshot::{ManualFlagSource, OpenHoursSource, SensorSource, SpaceInfo},
  store::MemberStore,
};
use spacedb_status::StatusState;
use tower_http::trace::TraceLayer;

use forms::ActionQuery;
use handlers::{addmember, changepin, devices, doorkeys, home, members};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SPACEDB_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  /// Prefix for every generated link, for deployments behind a proxy that
  /// mounts the tool below `/`. Requests arrive with the prefix stripped.
  pub base_path:    String,
  pub store_path:   PathBuf,
  /// Identity and contact details published in the status document.
  pub space:        SpaceInfo,
  /// Recurring weekly public sessions.
  pub public_hours: PublicHours,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:         "127.0.0.1".to_owned(),
      port:         8080,
      base_path:    String::new(),
      store_path:   PathBuf::from("spacedb.sqlite"),
      space:        SpaceInfo::default(),
      public_hours: PublicHours::default(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: MemberStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build an axum [`Router`] for the admin pages alone.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: MemberStore + Clone + 'static,
{
  Router::new()
    .route("/", any(dispatch::<S>))
    .with_state(state)
}

/// The admin pages plus `GET /status.json`, traced.
pub fn app<S, C>(state: AppState<S>, clock: C) -> Router
where
  S: MemberStore + ManualFlagSource + OpenHoursSource + SensorSource + Clone + 'static,
  C: Clock + 'static,
{
  let status = spacedb_status::status_router(StatusState {
    source:       state.store.clone(),
    clock:        Arc::new(clock),
    info:         Arc::new(state.config.space.clone()),
    public_hours: Arc::new(state.config.public_hours.clone()),
  });

  router(state)
    .merge(status)
    .layer(TraceLayer::new_for_http())
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

async fn dispatch<S>(State(state): State<AppState<S>>, req: Request) -> Response
where
  S: MemberStore + Clone + 'static,
{
  route(&state, req)
    .await
    .into_response_or_err(&state.config.base_path)
}

async fn route<S>(state: &AppState<S>, req: Request) -> Result<Response, Error>
where
  S: MemberStore,
{
  let Query(query) = Query::<ActionQuery>::try_from_uri(req.uri())
    .map_err(|e| Error::BadRequest(e.body_text()))?;

  let Some(action) = query.action.as_deref() else {
    return home::handler(&state.config.base_path);
  };

  let method = req.method().clone();
  match (&method, action) {
    (&Method::GET, "members") => members::list(state).await,
    (&Method::GET, "viewmember") => {
      members::view(state, query.member_id()?, query.succeeded()).await
    }
    (&Method::POST, "keyholder") => members::set_access(state, read_form(req).await?).await,
    (&Method::GET, "addmember") => addmember::form(state),
    (&Method::POST, "addmember") => addmember::save(state, read_form(req).await?).await,
    (&Method::GET, "changepin") => changepin::form(state, &query),
    (&Method::POST, "changepin") => changepin::save(state, read_form(req).await?).await,
    (&Method::POST, "savedevice") => devices::save(state, read_form(req).await?).await,
    (&Method::GET, "doorkeys") => doorkeys::list(state).await,
    _ => Ok(unknown_action()),
  }
}

async fn read_form<T: DeserializeOwned>(req: Request) -> Result<T, Error> {
  let Form(form) = Form::<T>::from_request(req, &())
    .await
    .map_err(|e| Error::BadRequest(e.body_text()))?;
  Ok(form)
}

/// Any action/method pair that has no page.
fn unknown_action() -> Response { (StatusCode::OK, "Unknown action").into_response() }

// ─── Helper trait ────────────────────────────────────────────────────────────

trait IntoResponseOrErr {
  fn into_response_or_err(self, base: &str) -> Response;
}

impl IntoResponseOrErr for Result<Response, Error> {
  fn into_response_or_err(self, base: &str) -> Response {
    match self {
      Ok(r) => r,
      Err(e) => e.render(base),
    }
  }
}

#[cfg(test)]
mod tests;
