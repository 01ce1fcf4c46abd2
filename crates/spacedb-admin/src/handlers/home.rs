//! Landing page.

use axum::response::{IntoResponse, Response};

use crate::{
  error::Error,
  html::{Nav, PageBuilder},
};

/// `GET /` with no `action`.
pub fn handler(base: &str) -> Result<Response, Error> {
  let mut page = PageBuilder::new(base, "Home", Nav::Home);
  page.h1("Hackspace DB");
  page.open("ul", &[]);
  for (path, label) in [
    ("/?action=members", "Members"),
    ("/?action=addmember", "Add member"),
    ("/?action=doorkeys", "Door keys"),
  ] {
    let href = page.url(path);
    page.open("li", &[]).link(&href, label, None).close("li");
  }
  page.close("ul");
  Ok(page.finish()?.into_response())
}
