//! Encoding and decoding helpers between domain types and the column
//! representations stored in SQLite.
//!
//! Timestamps are local wall-clock time stored as `%Y-%m-%d %H:%M:%S`, so
//! plain string comparison orders them correctly. Flags use the `'YES'` /
//! `'NO'` strings the door gateway also reads.

use chrono::NaiveDateTime;
use spacedb_core::{
  credential::{CardId, Credential, CredentialPin, DoorKey, Pin},
  device::{Device, DeviceAddress, DeviceSource, MacAddress, Visibility},
  person::{AccessLevel, Person, PersonId},
};

use crate::{Error, Result};

const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn corrupt(column: &'static str, value: impl ToString) -> Error {
  Error::Decode { column, value: value.to_string() }
}

// ─── NaiveDateTime ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: NaiveDateTime) -> String { dt.format(DT_FORMAT).to_string() }

pub fn decode_dt(column: &'static str, s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, DT_FORMAT).map_err(|_| corrupt(column, s))
}

// ─── Flags ───────────────────────────────────────────────────────────────────

pub fn encode_flag(b: bool) -> &'static str {
  if b { "YES" } else { "NO" }
}

pub fn decode_flag(column: &'static str, s: &str) -> Result<bool> {
  match s {
    "YES" => Ok(true),
    "NO" => Ok(false),
    other => Err(corrupt(column, other)),
  }
}

// ─── AccessLevel ─────────────────────────────────────────────────────────────

pub fn decode_access(s: &str) -> Result<AccessLevel> {
  s.parse().map_err(|_| corrupt("access", s))
}

// ─── Devices ─────────────────────────────────────────────────────────────────

pub fn encode_source(s: DeviceSource) -> &'static str {
  match s {
    DeviceSource::RfidGateway => "r",
    DeviceSource::ManualEntry => "e",
  }
}

pub fn decode_source(s: &str) -> Result<DeviceSource> {
  match s {
    "r" => Ok(DeviceSource::RfidGateway),
    "e" => Ok(DeviceSource::ManualEntry),
    other => Err(corrupt("source", other)),
  }
}

pub fn encode_visibility(v: Visibility) -> i64 {
  match v {
    Visibility::Visible => 0,
    Visibility::Hidden => 1,
    Visibility::TemporarilyHidden => 2,
  }
}

pub fn decode_visibility(v: i64) -> Result<Visibility> {
  match v {
    0 => Ok(Visibility::Visible),
    1 => Ok(Visibility::Hidden),
    2 => Ok(Visibility::TemporarilyHidden),
    other => Err(corrupt("hidden", other)),
  }
}

// ─── Space state ─────────────────────────────────────────────────────────────

pub const SPACE_OPEN:   i64 = 0;
pub const SPACE_CLOSED: i64 = 2;

pub fn encode_space_state(open: bool) -> i64 {
  if open { SPACE_OPEN } else { SPACE_CLOSED }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `people` row.
pub struct RawPerson {
  pub id:         i64,
  pub name:       String,
  pub fullname:   String,
  pub email:      String,
  pub member:     String,
  pub keyholder:  String,
  pub access:     String,
  pub paymentref: String,
}

pub const PERSON_COLUMNS: &str =
  "id, name, fullname, email, member, keyholder, access, paymentref";

impl RawPerson {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      fullname:   row.get(2)?,
      email:      row.get(3)?,
      member:     row.get(4)?,
      keyholder:  row.get(5)?,
      access:     row.get(6)?,
      paymentref: row.get(7)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:         PersonId(self.id),
      member:     decode_flag("member", &self.member)?,
      keyholder:  decode_flag("keyholder", &self.keyholder)?,
      access:     decode_access(&self.access)?,
      name:       self.name,
      fullname:   self.fullname,
      email:      self.email,
      paymentref: self.paymentref,
    })
  }
}

/// Raw values read from a `rfid_tags` row.
pub struct RawCredential {
  pub card_id: String,
  pub pin:     Option<String>,
  pub user_id: i64,
}

impl RawCredential {
  pub fn into_credential(self) -> Result<Credential> {
    let pin = match self.pin {
      None => CredentialPin::Unset,
      Some(p) => CredentialPin::Set(Pin::parse(&p).map_err(|_| corrupt("pin", "****"))?),
    };
    Ok(Credential {
      card_id: CardId::parse(&self.card_id).map_err(|_| corrupt("card_id", &self.card_id))?,
      pin,
      user_id: PersonId(self.user_id),
    })
  }
}

/// Raw values for one door-controller entry.
pub struct RawDoorKey {
  pub card_id: String,
  pub pin:     String,
  pub access:  String,
}

impl RawDoorKey {
  pub fn into_door_key(self) -> Result<DoorKey> {
    Ok(DoorKey {
      card_id: CardId::parse(&self.card_id).map_err(|_| corrupt("card_id", &self.card_id))?,
      pin:     Pin::parse(&self.pin).map_err(|_| corrupt("pin", "****"))?,
      access:  decode_access(&self.access)?,
    })
  }
}

/// Raw values read from a `systems` row.
pub struct RawDevice {
  pub id:          i64,
  pub mac:         String,
  pub description: String,
  pub source:      String,
  pub hidden:      i64,
  pub owner:       i64,
}

pub const DEVICE_COLUMNS: &str = "id, mac, description, source, hidden, owner";

impl RawDevice {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      mac:         row.get(1)?,
      description: row.get(2)?,
      source:      row.get(3)?,
      hidden:      row.get(4)?,
      owner:       row.get(5)?,
    })
  }

  /// RFID rows keep the card id in the `mac` column.
  pub fn into_device(self) -> Result<Device> {
    let address = match decode_source(&self.source)? {
      DeviceSource::RfidGateway => {
        DeviceAddress::Card(CardId::parse(&self.mac).map_err(|_| corrupt("mac", &self.mac))?)
      }
      DeviceSource::ManualEntry => {
        DeviceAddress::Mac(MacAddress::parse(&self.mac).map_err(|_| corrupt("mac", &self.mac))?)
      }
    };
    Ok(Device {
      id: self.id,
      address,
      description: self.description,
      visibility: decode_visibility(self.hidden)?,
      owner: PersonId(self.owner),
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  #[test]
  fn datetimes_sort_as_text() {
    let early = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(9, 5, 0).unwrap();
    let late = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(17, 0, 0).unwrap();
    assert_eq!(encode_dt(early), "2024-01-02 09:05:00");
    assert!(encode_dt(early) < encode_dt(late));
    assert_eq!(decode_dt("opens_at", &encode_dt(late)).unwrap(), late);
  }

  #[test]
  fn unknown_codes_are_corrupt() {
    assert!(matches!(decode_flag("member", "maybe"), Err(Error::Decode { column: "member", .. })));
    assert!(decode_source("x").is_err());
    assert!(decode_visibility(3).is_err());
    assert!(decode_access("UPSTAIRS").is_err());
  }

  fn raw_device(mac: &str, source: &str) -> RawDevice {
    RawDevice {
      id:          1,
      mac:         mac.into(),
      description: "RFID".into(),
      source:      source.into(),
      hidden:      0,
      owner:       1,
    }
  }

  #[test]
  fn device_address_follows_source() {
    let card = raw_device("A1B2C3D4", "r").into_device().unwrap();
    assert_eq!(card.address.as_str(), "A1B2C3D4");
    assert_eq!(card.source(), DeviceSource::RfidGateway);

    let mac = raw_device("AB:CD:EF:01:02:03", "e").into_device().unwrap();
    assert_eq!(mac.source(), DeviceSource::ManualEntry);

    assert!(raw_device("A1B2C3D4", "e").into_device().is_err());
  }
}
