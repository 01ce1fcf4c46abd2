//! Typed request schemas for every admin route.
//!
//! Fields are optional at the decoding layer so a missing field surfaces as
//! a [`ValidationError::Missing`] naming it, rather than an opaque decoder
//! rejection.

use serde::Deserialize;
use spacedb_core::{
  ValidationError,
  error::required,
  person::PersonId,
  workflow::{AccessChange, DeviceRegistration, MemberApplication, PinChange},
};

/// The query string shared by all routes.
#[derive(Debug, Default, Deserialize)]
pub struct ActionQuery {
  pub action:  Option<String>,
  pub id:      Option<String>,
  pub card_id: Option<String>,
  pub user_id: Option<String>,
  pub success: Option<String>,
}

impl ActionQuery {
  pub fn member_id(&self) -> Result<PersonId, ValidationError> {
    required("id", self.id.clone())?.parse()
  }

  pub fn succeeded(&self) -> bool { self.success.as_deref() == Some("1") }
}

/// `POST ?action=addmember`
#[derive(Debug, Default, Deserialize)]
pub struct AddMemberForm {
  pub name:       Option<String>,
  pub fullname:   Option<String>,
  pub email:      Option<String>,
  pub paymentref: Option<String>,
  pub card_id:    Option<String>,
  pub pin:        Option<String>,
}

impl TryFrom<AddMemberForm> for MemberApplication {
  type Error = ValidationError;

  fn try_from(f: AddMemberForm) -> Result<Self, ValidationError> {
    Ok(MemberApplication {
      name:       required("name", f.name)?,
      fullname:   required("fullname", f.fullname)?,
      email:      required("email", f.email)?,
      paymentref: required("paymentref", f.paymentref)?,
      card_id:    required("card_id", f.card_id)?,
      // Browsers omit the field entirely when it is hidden.
      pin:        f.pin.unwrap_or_default(),
    })
  }
}

/// `POST ?action=keyholder`
#[derive(Debug, Default, Deserialize)]
pub struct KeyholderForm {
  pub id:     Option<String>,
  pub access: Option<String>,
}

impl TryFrom<KeyholderForm> for AccessChange {
  type Error = ValidationError;

  fn try_from(f: KeyholderForm) -> Result<Self, ValidationError> {
    Ok(AccessChange {
      id:     required("id", f.id)?,
      access: required("access", f.access)?,
    })
  }
}

/// `POST ?action=changepin`
#[derive(Debug, Default, Deserialize)]
pub struct ChangePinForm {
  pub pin:     Option<String>,
  pub card_id: Option<String>,
  pub user_id: Option<String>,
}

impl ChangePinForm {
  /// Split into the PIN change and the profile to return to.
  pub fn into_parts(self) -> Result<(PinChange, PersonId), ValidationError> {
    let change = PinChange {
      card_id: required("card_id", self.card_id)?,
      pin:     required("pin", self.pin)?,
    };
    let user_id = required("user_id", self.user_id)?.parse()?;
    Ok((change, user_id))
  }
}

/// `POST ?action=savedevice`
#[derive(Debug, Default, Deserialize)]
pub struct DeviceForm {
  pub mac:         Option<String>,
  pub description: Option<String>,
  pub owner:       Option<String>,
}

impl TryFrom<DeviceForm> for DeviceRegistration {
  type Error = ValidationError;

  fn try_from(f: DeviceForm) -> Result<Self, ValidationError> {
    Ok(DeviceRegistration {
      mac:         required("mac", f.mac)?,
      description: required("description", f.description)?,
      owner:       required("owner", f.owner)?,
    })
  }
}
