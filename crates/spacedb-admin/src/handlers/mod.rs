pub mod addmember;
pub mod changepin;
pub mod devices;
pub mod doorkeys;
pub mod home;
pub mod members;

use crate::error::Error;

pub(super) fn store_error<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}

/// Help text shared by every PIN input.
pub(super) const PIN_HELP: &str =
  "PIN must be: minimum 4 digits, max 14 digits, no duplicate consecutive digits";
