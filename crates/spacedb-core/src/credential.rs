//! RFID credentials: a card identifier plus an optional keypad PIN.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  error::{Result, ValidationError},
  person::{AccessLevel, PersonId},
};

pub const CARD_ID_MAX: usize = 14;
pub const PIN_MIN:     usize = 4;
pub const PIN_MAX:     usize = 14;

// ─── Card id ─────────────────────────────────────────────────────────────────

/// An RFID card identifier, normalised to upper case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardId(String);

impl CardId {
  /// The length limit applies to the upper-cased form, which can be longer
  /// than `raw` (`ß` becomes `SS`).
  pub fn parse(raw: &str) -> Result<Self> {
    let id = raw.to_uppercase();
    let len = id.chars().count();
    if len == 0 || len > CARD_ID_MAX {
      return Err(ValidationError::InvalidCardId);
    }
    Ok(Self(id))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CardId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for CardId {
  type Error = ValidationError;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<CardId> for String {
  fn from(id: CardId) -> Self { id.0 }
}

// ─── PIN ─────────────────────────────────────────────────────────────────────

/// A keypad PIN: 4–14 ASCII digits, no two adjacent digits equal.
///
/// The keypad on the door controller cannot register the same key twice in
/// a row, so such PINs could never be entered.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
  pub fn parse(raw: &str) -> Result<Self> {
    if is_valid_pin(raw) {
      Ok(Self(raw.to_owned()))
    } else {
      Err(ValidationError::InvalidPin)
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

// PINs never appear in logs.
impl fmt::Debug for Pin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("Pin(****)") }
}

/// `true` iff `pin` is 4–14 ASCII digits with no two adjacent digits equal.
pub fn is_valid_pin(pin: &str) -> bool {
  let bytes = pin.as_bytes();
  (PIN_MIN..=PIN_MAX).contains(&bytes.len())
    && bytes.iter().all(u8::is_ascii_digit)
    && bytes.windows(2).all(|w| w[0] != w[1])
}

/// The PIN state of a credential.
///
/// `Unset` is how provisional members are issued cards. It is stored as a
/// value outside the PIN format, so no keypad entry can ever match it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialPin {
  Set(Pin),
  Unset,
}

impl CredentialPin {
  /// Parse an onboarding form value: the empty string means "no PIN yet".
  pub fn from_form(raw: &str) -> Result<Self> {
    if raw.is_empty() {
      Ok(CredentialPin::Unset)
    } else {
      Pin::parse(raw).map(CredentialPin::Set)
    }
  }

  pub fn is_set(&self) -> bool { matches!(self, CredentialPin::Set(_)) }

  pub fn as_pin(&self) -> Option<&Pin> {
    match self {
      CredentialPin::Set(pin) => Some(pin),
      CredentialPin::Unset => None,
    }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A card issued to a person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
  pub card_id: CardId,
  pub pin:     CredentialPin,
  pub user_id: PersonId,
}

/// A card about to be issued; the owner is supplied by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCredential {
  pub card_id: CardId,
  pub pin:     CredentialPin,
}

/// One entry of the list pushed to the door controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorKey {
  pub card_id: CardId,
  pub pin:     Pin,
  pub access:  AccessLevel,
}

impl DoorKey {
  pub fn opens_upstairs(&self) -> bool { self.access.opens_upstairs() }

  pub fn opens_downstairs(&self) -> bool { self.access.opens_downstairs() }
}
