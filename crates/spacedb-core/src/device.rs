//! Network devices and their owners.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  credential::CardId,
  error::{Result, ValidationError},
  person::PersonId,
};

pub const DESCRIPTION_MAX: usize = 256;

// ─── MAC address ─────────────────────────────────────────────────────────────

/// A MAC address in canonical form: six upper-case hex pairs joined by `:`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
  /// Parse a colon-separated MAC address in either case.
  ///
  /// Canonicalisation is idempotent: parsing the canonical form yields the
  /// same address.
  pub fn parse(raw: &str) -> Result<Self> {
    let groups: Vec<&str> = raw.split(':').collect();
    let well_formed = groups.len() == 6
      && groups
        .iter()
        .all(|g| g.len() == 2 && g.bytes().all(|b| b.is_ascii_hexdigit()));
    if !well_formed {
      return Err(ValidationError::InvalidMac(raw.to_owned()));
    }
    Ok(Self(raw.to_ascii_uppercase()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for MacAddress {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl FromStr for MacAddress {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl TryFrom<String> for MacAddress {
  type Error = ValidationError;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<MacAddress> for String {
  fn from(mac: MacAddress) -> Self { mac.0 }
}

// ─── Description ─────────────────────────────────────────────────────────────

/// Validate a device description (1–256 characters).
pub fn parse_description(raw: &str) -> Result<String> {
  let len = raw.chars().count();
  if len == 0 || len > DESCRIPTION_MAX {
    return Err(ValidationError::InvalidDescription);
  }
  Ok(raw.to_owned())
}

// ─── Source and visibility ───────────────────────────────────────────────────

/// How a device record entered the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceSource {
  /// Created alongside a member's RFID card; seen when the card is tapped
  /// at the door.
  RfidGateway,
  /// Typed in through the admin tool; seen on the network.
  ManualEntry,
}

impl DeviceSource {
  pub fn label(self) -> &'static str {
    match self {
      DeviceSource::RfidGateway => "rfid-gateway",
      DeviceSource::ManualEntry => "manual-entry",
    }
  }
}

/// Whether a device counts toward the "who's here" list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
  #[default]
  Visible,
  Hidden,
  /// Hidden until its presence deadline lapses, then visible again.
  TemporarilyHidden,
}

impl Visibility {
  pub fn label(self) -> &'static str {
    match self {
      Visibility::Visible => "no",
      Visibility::Hidden => "yes",
      Visibility::TemporarilyHidden => "until left",
    }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// What a device is recognised by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceAddress {
  Mac(MacAddress),
  Card(CardId),
}

impl DeviceAddress {
  pub fn as_str(&self) -> &str {
    match self {
      DeviceAddress::Mac(mac) => mac.as_str(),
      DeviceAddress::Card(card) => card.as_str(),
    }
  }

  pub fn source(&self) -> DeviceSource {
    match self {
      DeviceAddress::Mac(_) => DeviceSource::ManualEntry,
      DeviceAddress::Card(_) => DeviceSource::RfidGateway,
    }
  }
}

impl fmt::Display for DeviceAddress {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// A persisted device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
  pub id:          i64,
  pub address:     DeviceAddress,
  pub description: String,
  pub visibility:  Visibility,
  pub owner:       PersonId,
}

impl Device {
  pub fn source(&self) -> DeviceSource { self.address.source() }
}

/// A validated, hand-entered device that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDevice {
  pub mac:         MacAddress,
  pub description: String,
  pub visibility:  Visibility,
  pub owner:       PersonId,
}

impl NewDevice {
  pub fn into_device(self, id: i64) -> Device {
    Device {
      id,
      address: DeviceAddress::Mac(self.mac),
      description: self.description,
      visibility: self.visibility,
      owner: self.owner,
    }
  }
}
