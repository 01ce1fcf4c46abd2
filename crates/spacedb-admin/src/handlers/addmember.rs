//! Onboarding: the add-member form and its submission.

use axum::response::{IntoResponse, Response};
use spacedb_core::{
  credential::{CARD_ID_MAX, PIN_MAX},
  person::{EMAIL_MAX, FULLNAME_MAX, NAME_MAX, PAYMENTREF_MAX},
  store::MemberStore,
  workflow::{MemberApplication, onboard_member},
};

use crate::{
  AppState,
  error::Error,
  forms::AddMemberForm,
  handlers::PIN_HELP,
  html::{Alert, Nav, PageBuilder},
};

/// `GET ?action=addmember`
pub fn form<S: MemberStore>(state: &AppState<S>) -> Result<Response, Error> {
  let mut page = PageBuilder::new(&state.config.base_path, "Add Member", Nav::AddMember);
  page.h1("Add Member");
  page.alert(
    Alert::Warning,
    "Ensure the information is correct before submitting, because form fields won't be \
     preserved if there are errors!",
  );

  let action = page.url("/?action=addmember");
  page.open("form", &[
    ("action", action.as_str()),
    ("method", "post"),
    ("class", "form-horizontal"),
  ]);

  let name_max = NAME_MAX.to_string();
  let fullname_max = FULLNAME_MAX.to_string();
  let email_max = EMAIL_MAX.to_string();
  let paymentref_max = PAYMENTREF_MAX.to_string();
  let card_max = CARD_ID_MAX.to_string();
  let pin_max = PIN_MAX.to_string();

  page.h2("Personal details");
  page.field(
    "Nickname",
    &text_input("name", "text", &name_max),
    Some("Primarily used for IRC and your alias for \"who's here\""),
  );
  page.field("Full name", &text_input("fullname", "text", &fullname_max), None);
  page.field("Email", &text_input("email", "email", &email_max), None);
  page.field(
    "Payment ref",
    &text_input("paymentref", "text", &paymentref_max),
    Some("Standing order reference"),
  );

  page.h2("RFID card details");
  page.field(
    "Card ID",
    &text_input("card_id", "text", &card_max),
    Some("e.g. A1B2C3D4"),
  );
  let pin_help = format!(
    "Leave empty for a provisional member, who can only use the space when a keyholder is \
     there. Members given a PIN get 24/7 access. {PIN_HELP}"
  );
  page.field(
    "PIN",
    &[
      ("type", "password"),
      ("name", "pin"),
      ("id", "pin"),
      ("maxlength", pin_max.as_str()),
      ("class", "form-control"),
    ],
    Some(pin_help.as_str()),
  );
  page.submit("Submit");
  page.close("form");

  Ok(page.finish()?.into_response())
}

fn text_input<'a>(name: &'a str, kind: &'a str, max: &'a str) -> [(&'a str, &'a str); 6] {
  [
    ("type", kind),
    ("name", name),
    ("id", name),
    ("maxlength", max),
    ("class", "form-control"),
    ("required", "required"),
  ]
}

/// `POST ?action=addmember`
pub async fn save<S: MemberStore>(
  state: &AppState<S>,
  form: AddMemberForm,
) -> Result<Response, Error> {
  let application = MemberApplication::try_from(form)?;
  let onboarded = onboard_member(state.store.as_ref(), &application).await?;

  let mut page = PageBuilder::new(&state.config.base_path, "Add Member", Nav::AddMember);
  page.alert(Alert::Success, &format!(
    "Member added with {} door access.",
    onboarded.person.access
  ));
  let profile = page.url(&format!("/?action=viewmember&id={}", onboarded.person.id));
  page.open("p", &[]).link(&profile, "View profile", None).close("p");
  let home = page.url("/");
  page.open("p", &[]).link(&home, "Main menu", None).close("p");
  Ok(page.finish()?.into_response())
}
