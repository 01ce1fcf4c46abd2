//! Manual device registration.

use axum::{
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use spacedb_core::{
  person::PersonId,
  store::MemberStore,
  workflow::{DeviceRegistration, register_device},
};

use crate::{AppState, error::Error, forms::DeviceForm};

/// `POST ?action=savedevice` with `mac`, `description` and `owner`.
///
/// Redirects back to the owner's profile with a success banner.
pub async fn save<S: MemberStore>(
  state: &AppState<S>,
  form: DeviceForm,
) -> Result<Response, Error> {
  let registration = DeviceRegistration::try_from(form)?;
  let owner = registration.owner.parse::<PersonId>().ok();

  let device = register_device(state.store.as_ref(), &registration)
    .await
    .map_err(|e| match owner {
      Some(id) => Error::from(e).on_profile(id),
      None => Error::from(e),
    })?;

  let location = format!(
    "{}/?action=viewmember&id={}&success=1",
    state.config.base_path.trim_end_matches('/'),
    device.owner
  );
  Ok((StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response())
}
