//! The door key list: which cards open which door.
//!
//! PINs are never rendered.

use axum::response::{IntoResponse, Response};
use spacedb_core::store::MemberStore;

use crate::{
  AppState,
  error::Error,
  handlers::store_error,
  html::{Nav, PageBuilder},
};

fn tick(b: bool) -> &'static str {
  if b { "yes" } else { "no" }
}

/// `GET ?action=doorkeys`
pub async fn list<S: MemberStore>(state: &AppState<S>) -> Result<Response, Error> {
  let keys = state.store.door_keys().await.map_err(store_error)?;

  let mut page = PageBuilder::new(&state.config.base_path, "Door Keys", Nav::DoorKeys);
  page.h1("Door Keys");
  page.p(&format!("{} card(s) open at least one door.", keys.len()));
  page.open("table", &[("class", "table table-striped table-condensed")]);
  page.open("thead", &[]);
  page.row("th", ["Card ID", "Access", "Upstairs", "Downstairs"]);
  page.close("thead");
  page.open("tbody", &[]);
  for key in &keys {
    page.row("td", [
      key.card_id.as_str(),
      key.access.as_str(),
      tick(key.opens_upstairs()),
      tick(key.opens_downstairs()),
    ]);
  }
  page.close("tbody");
  page.close("table");

  Ok(page.finish()?.into_response())
}
