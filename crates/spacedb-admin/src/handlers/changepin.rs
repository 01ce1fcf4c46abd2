//! Changing the PIN of an existing card.

use axum::response::{IntoResponse, Response};
use spacedb_core::{
  credential::{CardId, PIN_MAX},
  error::required,
  person::PersonId,
  store::MemberStore,
  workflow::change_pin,
};

use crate::{
  AppState,
  error::Error,
  forms::{ActionQuery, ChangePinForm},
  handlers::PIN_HELP,
  html::{Alert, Nav, PageBuilder},
};

/// `GET ?action=changepin&card_id=<card>&user_id=<id>`
pub fn form<S: MemberStore>(state: &AppState<S>, query: &ActionQuery) -> Result<Response, Error> {
  let card_id = CardId::parse(&required("card_id", query.card_id.clone())?)?;
  let user_id: PersonId = required("user_id", query.user_id.clone())?.parse()?;

  let mut page = PageBuilder::new(&state.config.base_path, "Change PIN", Nav::Members);
  page.h1("Change PIN");
  page.p(&format!("Card {card_id}"));
  page.p(
    "If the member has provisional membership, they also need 24/7 access for the PIN to \
     open a door.",
  );

  let action = page.url("/?action=changepin");
  let user = user_id.to_string();
  let pin_max = PIN_MAX.to_string();
  page.open("form", &[
    ("action", action.as_str()),
    ("method", "post"),
    ("class", "form-horizontal"),
  ]);
  page.void("input", &[("type", "hidden"), ("name", "card_id"), ("value", card_id.as_str())]);
  page.void("input", &[("type", "hidden"), ("name", "user_id"), ("value", user.as_str())]);
  page.field(
    "New PIN",
    &[
      ("type", "password"),
      ("name", "pin"),
      ("id", "pin"),
      ("maxlength", pin_max.as_str()),
      ("class", "form-control"),
      ("required", "required"),
    ],
    Some(PIN_HELP),
  );
  page.submit("Submit");
  page.close("form");

  Ok(page.finish()?.into_response())
}

/// `POST ?action=changepin` with `pin`, `card_id` and `user_id`.
pub async fn save<S: MemberStore>(
  state: &AppState<S>,
  form: ChangePinForm,
) -> Result<Response, Error> {
  let (change, user_id) = form.into_parts()?;
  change_pin(state.store.as_ref(), &change)
    .await
    .map_err(|e| Error::from(e).on_profile(user_id))?;

  let mut page = PageBuilder::new(&state.config.base_path, "Change PIN", Nav::Members);
  page.alert(Alert::Success, "PIN changed successfully");
  let back = page.url(&format!("/?action=viewmember&id={user_id}"));
  page.open("p", &[]).link(&back, "Back to profile", None).close("p");
  Ok(page.finish()?.into_response())
}
