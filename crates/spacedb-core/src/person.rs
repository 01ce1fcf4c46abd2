//! People: the root entity every card and device hangs off.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError, check_len};

// ─── Field limits ────────────────────────────────────────────────────────────

pub const NAME_MAX:       usize = 255;
pub const FULLNAME_MAX:   usize = 65_535;
pub const EMAIL_MAX:      usize = 255;
pub const PAYMENTREF_MAX: usize = 10;

// ─── Identity ────────────────────────────────────────────────────────────────

/// Store-assigned identifier. Never reused and never changes once assigned.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PersonId(pub i64);

impl fmt::Display for PersonId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl FromStr for PersonId {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self> {
    s.trim()
      .parse::<i64>()
      .ok()
      .filter(|id| *id > 0)
      .map(PersonId)
      .ok_or_else(|| ValidationError::InvalidPersonId(s.to_owned()))
  }
}

// ─── Door access ─────────────────────────────────────────────────────────────

/// Which doors a member's cards open without supervision.
///
/// The wire names (`NO`, `DOWNSTAIRS`, `BOTH`) are the ones the door
/// controller and the admin forms exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccessLevel {
  #[default]
  #[serde(rename = "NO")]
  None,
  #[serde(rename = "DOWNSTAIRS")]
  DownstairsOnly,
  #[serde(rename = "BOTH")]
  Full,
}

impl AccessLevel {
  pub const ALL: [AccessLevel; 3] =
    [AccessLevel::None, AccessLevel::DownstairsOnly, AccessLevel::Full];

  pub fn as_str(self) -> &'static str {
    match self {
      AccessLevel::None => "NO",
      AccessLevel::DownstairsOnly => "DOWNSTAIRS",
      AccessLevel::Full => "BOTH",
    }
  }

  pub fn opens_upstairs(self) -> bool { self == AccessLevel::Full }

  pub fn opens_downstairs(self) -> bool {
    matches!(self, AccessLevel::Full | AccessLevel::DownstairsOnly)
  }

  /// Short human description shown on the member page.
  pub fn describe(self) -> &'static str {
    match self {
      AccessLevel::None => "No 24/7 access",
      AccessLevel::DownstairsOnly => "Downstairs only",
      AccessLevel::Full => "24/7 member",
    }
  }
}

impl fmt::Display for AccessLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for AccessLevel {
  type Err = ValidationError;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "NO" => Ok(AccessLevel::None),
      "DOWNSTAIRS" => Ok(AccessLevel::DownstairsOnly),
      "BOTH" => Ok(AccessLevel::Full),
      other => Err(ValidationError::InvalidAccessLevel(other.to_owned())),
    }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// A persisted person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:         PersonId,
  /// Nickname; shown in the "who's here" list.
  pub name:       String,
  pub fullname:   String,
  pub email:      String,
  pub member:     bool,
  /// Holds a physical key, independent of card access.
  pub keyholder:  bool,
  pub access:     AccessLevel,
  /// Standing order reference.
  pub paymentref: String,
}

/// A validated person that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
  pub name:       String,
  pub fullname:   String,
  pub email:      String,
  pub member:     bool,
  pub keyholder:  bool,
  pub access:     AccessLevel,
  pub paymentref: String,
}

impl NewPerson {
  /// Validate the free-text fields and build a member record.
  ///
  /// New people always start as members without a physical key; `access`
  /// is decided by the caller.
  pub fn member(
    name: String,
    fullname: String,
    email: String,
    paymentref: String,
    access: AccessLevel,
  ) -> Result<Self> {
    check_len("name", &name, NAME_MAX)?;
    check_len("fullname", &fullname, FULLNAME_MAX)?;
    check_len("email", &email, EMAIL_MAX)?;
    check_len("paymentref", &paymentref, PAYMENTREF_MAX)?;
    Ok(Self {
      name,
      fullname,
      email,
      member: true,
      keyholder: false,
      access,
      paymentref,
    })
  }

  pub fn into_person(self, id: PersonId) -> Person {
    Person {
      id,
      name:       self.name,
      fullname:   self.fullname,
      email:      self.email,
      member:     self.member,
      keyholder:  self.keyholder,
      access:     self.access,
      paymentref: self.paymentref,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn access_level_round_trips_wire_names() {
    for level in AccessLevel::ALL {
      assert_eq!(level.as_str().parse::<AccessLevel>().unwrap(), level);
    }
    assert!("FULL".parse::<AccessLevel>().is_err());
    assert!("both".parse::<AccessLevel>().is_err());
  }

  #[test]
  fn access_level_door_capabilities() {
    assert!(AccessLevel::Full.opens_upstairs());
    assert!(AccessLevel::Full.opens_downstairs());
    assert!(!AccessLevel::DownstairsOnly.opens_upstairs());
    assert!(AccessLevel::DownstairsOnly.opens_downstairs());
    assert!(!AccessLevel::None.opens_upstairs());
    assert!(!AccessLevel::None.opens_downstairs());
  }

  #[test]
  fn access_level_serde_uses_wire_names() {
    let json = serde_json::to_string(&AccessLevel::DownstairsOnly).unwrap();
    assert_eq!(json, "\"DOWNSTAIRS\"");
  }

  #[test]
  fn person_id_parse() {
    assert_eq!("42".parse::<PersonId>().unwrap(), PersonId(42));
    assert!("0".parse::<PersonId>().is_err());
    assert!("abc".parse::<PersonId>().is_err());
    assert!("".parse::<PersonId>().is_err());
  }

  #[test]
  fn new_member_enforces_lengths() {
    let ok = NewPerson::member(
      "alice".into(),
      "Alice Liddell".into(),
      "alice@example.com".into(),
      "REF1".into(),
      AccessLevel::None,
    )
    .unwrap();
    assert!(ok.member);
    assert!(!ok.keyholder);

    let err = NewPerson::member(
      "alice".into(),
      "Alice Liddell".into(),
      "alice@example.com".into(),
      "REF-TOO-LONG".into(),
      AccessLevel::None,
    )
    .unwrap_err();
    assert_eq!(err, ValidationError::TooLong { field: "paymentref", max: 10 });

    let err = NewPerson::member(
      "x".repeat(256),
      "Alice".into(),
      "a@b".into(),
      "R".into(),
      AccessLevel::None,
    )
    .unwrap_err();
    assert_eq!(err, ValidationError::TooLong { field: "name", max: 255 });
  }
}
