//! Error types for `spacedb-core`.

use thiserror::Error;

/// Malformed or missing input, detected before any mutation is attempted.
///
/// Every variant names the offending field so the admin tool can tell the
/// operator exactly what to fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("missing required field `{0}`")]
  Missing(&'static str),

  #[error("field `{field}` is longer than {max} characters")]
  TooLong { field: &'static str, max: usize },

  #[error(
    "PIN is invalid: it must be between 4 and 14 digits, with no two \
     consecutive digits the same"
  )]
  InvalidPin,

  #[error("card id must be between 1 and 14 characters")]
  InvalidCardId,

  #[error("invalid MAC address {0:?}: expected six colon-separated hex pairs")]
  InvalidMac(String),

  #[error("description must be between 1 and 256 characters")]
  InvalidDescription,

  #[error("invalid owner {0:?}: expected a numeric member id")]
  InvalidOwner(String),

  #[error("invalid door access value {0:?}: expected BOTH, DOWNSTAIRS or NO")]
  InvalidAccessLevel(String),

  #[error("invalid member id {0:?}")]
  InvalidPersonId(String),

  #[error("invalid public-hours rule: {0}")]
  InvalidSchedule(String),
}

pub type Result<T, E = ValidationError> = std::result::Result<T, E>;

/// Require that `value` is present.
pub fn required(field: &'static str, value: Option<String>) -> Result<String> {
  value.ok_or(ValidationError::Missing(field))
}

/// Reject `value` if it is longer than `max` characters.
pub fn check_len(field: &'static str, value: &str, max: usize) -> Result<()> {
  if value.chars().count() > max {
    return Err(ValidationError::TooLong { field, max });
  }
  Ok(())
}
