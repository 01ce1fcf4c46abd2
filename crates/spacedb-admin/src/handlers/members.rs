//! Member list, member profile and the door-access toggle.

use axum::response::{IntoResponse, Response};
use spacedb_core::{
  credential::Credential,
  device::Device,
  person::{AccessLevel, Person, PersonId},
  store::MemberStore,
  workflow::{AccessChange, set_access_level},
};

use crate::{
  AppState,
  error::Error,
  forms::KeyholderForm,
  handlers::store_error,
  html::{Alert, Nav, PageBuilder},
};

fn yes_no(b: bool) -> &'static str {
  if b { "YES" } else { "NO" }
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET ?action=members`
pub async fn list<S: MemberStore>(state: &AppState<S>) -> Result<Response, Error> {
  let people = state.store.list_people().await.map_err(store_error)?;

  let mut page = PageBuilder::new(&state.config.base_path, "Members", Nav::Members);
  page.h1("Members");
  page.open("table", &[("class", "table table-striped table-hover table-condensed")]);
  page.open("thead", &[]);
  page.row("th", [
    "ID",
    "Name",
    "Full Name",
    "Email",
    "Member?",
    "Keyholder?",
    "Door access",
    "Payment ref",
  ]);
  page.close("thead");
  page.open("tbody", &[]);
  for person in &people {
    let href = page.url(&format!("/?action=viewmember&id={}", person.id));
    page.open("tr", &[]);
    let id = person.id.to_string();
    for linked in [id.as_str(), person.name.as_str(), person.fullname.as_str()] {
      page.open("td", &[]).link(&href, linked, None).close("td");
    }
    for cell in [
      person.email.as_str(),
      yes_no(person.member),
      yes_no(person.keyholder),
      person.access.as_str(),
      person.paymentref.as_str(),
    ] {
      page.text_elem("td", &[], cell);
    }
    page.close("tr");
  }
  page.close("tbody");
  page.close("table");

  Ok(page.finish()?.into_response())
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// `GET ?action=viewmember&id=<id>[&success=1]`
pub async fn view<S: MemberStore>(
  state: &AppState<S>,
  id: PersonId,
  success: bool,
) -> Result<Response, Error> {
  let person = state
    .store
    .get_person(id)
    .await
    .map_err(store_error)?
    .ok_or_else(|| Error::NotFound(format!("member {id}")))?;
  let cards = state.store.credentials_for(id).await.map_err(store_error)?;
  let devices = state.store.devices_for(id).await.map_err(store_error)?;

  let mut page = PageBuilder::new(&state.config.base_path, "View Member", Nav::Members);
  if success {
    page.alert(Alert::Success, "Success!");
  }
  page.h1(&person.fullname);
  let id_text = person.id.to_string();
  page.definitions(&[
    ("ID", id_text.as_str()),
    ("Nickname", person.name.as_str()),
    ("Full Name", person.fullname.as_str()),
    ("Email", person.email.as_str()),
    ("Member?", yes_no(person.member)),
    ("Physical keyholder?", yes_no(person.keyholder)),
    ("Door access", person.access.as_str()),
    ("Payment ref", person.paymentref.as_str()),
  ]);

  access_section(&mut page, &person);
  cards_section(&mut page, &person, &cards);
  devices_section(&mut page, &person, &devices);

  Ok(page.finish()?.into_response())
}

/// Full access can be revoked; anything less can be upgraded to full.
fn access_section(page: &mut PageBuilder, person: &Person) {
  let (target, label, class) = match person.access {
    AccessLevel::Full => (AccessLevel::None, "Revoke keyholder status", "btn btn-danger"),
    AccessLevel::DownstairsOnly | AccessLevel::None => {
      (AccessLevel::Full, "Make keyholder", "btn btn-warning")
    }
  };

  page.h2("24/7 access status");
  page.p(person.access.describe());
  let action = page.url("/?action=keyholder");
  let id = person.id.to_string();
  page.open("form", &[("action", action.as_str()), ("method", "post")]);
  page.void("input", &[("type", "hidden"), ("name", "id"), ("value", id.as_str())]);
  page.void("input", &[("type", "hidden"), ("name", "access"), ("value", target.as_str())]);
  page.text_elem("button", &[("type", "submit"), ("class", class)], label);
  page.close("form");
}

fn cards_section(page: &mut PageBuilder, person: &Person, cards: &[Credential]) {
  page.h2("RFID card(s)");
  if cards.is_empty() {
    page.p("None registered");
    return;
  }
  page.open("ul", &[]);
  for card in cards {
    let href = page.url(&format!(
      "/?action=changepin&card_id={}&user_id={}",
      card.card_id, person.id
    ));
    page.open("li", &[]);
    page.p(card.card_id.as_str());
    if !card.pin.is_set() {
      page.p("No PIN set");
    }
    page.link(&href, "Change PIN", Some("btn btn-default"));
    page.close("li");
  }
  page.close("ul");
}

fn devices_section(page: &mut PageBuilder, person: &Person, devices: &[Device]) {
  page.h2("Devices");
  page.open("table", &[("class", "table table-striped")]);
  page.open("thead", &[]);
  page.row("th", ["Address", "Description", "Source", "Hidden"]);
  page.close("thead");
  page.open("tbody", &[]);
  for device in devices {
    page.row("td", [
      device.address.as_str(),
      device.description.as_str(),
      device.source().label(),
      device.visibility.label(),
    ]);
  }
  page.close("tbody");
  page.close("table");

  let action = page.url("/?action=savedevice");
  let owner = person.id.to_string();
  page.h2("Add device");
  page.open("form", &[
    ("action", action.as_str()),
    ("method", "post"),
    ("class", "form-inline"),
  ]);
  page.void("input", &[
    ("type", "text"),
    ("name", "mac"),
    ("placeholder", "AB:CD:AB:CD:AB:CD"),
    ("class", "form-control"),
    ("pattern", "^([A-Fa-f0-9]{2}:){5}[A-Fa-f0-9]{2}$"),
    ("required", "required"),
  ]);
  page.void("input", &[
    ("type", "text"),
    ("name", "description"),
    ("placeholder", "Dave's Nexus 6p"),
    ("maxlength", "256"),
    ("class", "form-control"),
    ("required", "required"),
  ]);
  page.void("input", &[("type", "hidden"), ("name", "owner"), ("value", owner.as_str())]);
  page.text_elem("button", &[("type", "submit"), ("class", "btn btn-success")], "Add device");
  page.close("form");
}

// ─── Door access ─────────────────────────────────────────────────────────────

/// `POST ?action=keyholder` with `id` and `access`.
pub async fn set_access<S: MemberStore>(
  state: &AppState<S>,
  form: KeyholderForm,
) -> Result<Response, Error> {
  let change = AccessChange::try_from(form)?;
  // The id is only known to be valid once parsed; without it there is no
  // profile to link back to.
  let profile = change.id.parse::<PersonId>().ok();
  let with_back = |e: Error| match profile {
    Some(id) => e.on_profile(id),
    None => e,
  };

  let (id, access) = set_access_level(state.store.as_ref(), &change)
    .await
    .map_err(|e| with_back(Error::from(e)))?;

  let mut page = PageBuilder::new(&state.config.base_path, "Make/Remove Keyholder", Nav::Members);
  page.alert(
    Alert::Success,
    &format!("Success: the member's door access is now {access}"),
  );
  let back = page.url(&format!("/?action=viewmember&id={id}"));
  page.open("p", &[]).link(&back, "Back to profile", None).close("p");
  Ok(page.finish()?.into_response())
}
