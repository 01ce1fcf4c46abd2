//! The `MemberStore` trait.
//!
//! Implemented by storage backends (e.g. `spacedb-store-sqlite`). The admin
//! workflows and HTTP layers depend on this abstraction only.

use std::future::Future;

use thiserror::Error;

use crate::{
  credential::{CardId, Credential, DoorKey, NewCredential, Pin},
  device::{Device, MacAddress, NewDevice},
  person::{AccessLevel, NewPerson, Person, PersonId},
};

/// Result of a single-row update, read before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
  Updated,
  /// No row matched the key.
  NotFound,
  /// The row exists and already holds the requested value.
  Unchanged,
}

/// Failure of [`MemberStore::create_member`].
#[derive(Debug, Error)]
pub enum CreateMemberError<E: std::error::Error + 'static> {
  /// Nothing was written.
  #[error(transparent)]
  Failed(E),

  /// Nothing was written: the card is already issued to someone.
  #[error("card {0} is already issued")]
  CardInUse(CardId),

  /// The person row was committed but the card was not. Only backends
  /// without multi-statement atomicity can return this.
  #[error("member {person} was created but the card was not: {source}")]
  Partial { person: PersonId, source: E },
}

/// Abstraction over a member database backend.
///
/// All methods return `Send` futures so the trait can be used behind axum.
pub trait MemberStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── People ────────────────────────────────────────────────────────────

  /// Persist a new person together with their first card, and register the
  /// card as a device of theirs so tapping it in counts as presence.
  ///
  /// Backends should write all rows atomically. A card id that is already
  /// issued yields [`CreateMemberError::CardInUse`].
  fn create_member(
    &self,
    person: NewPerson,
    card: NewCredential,
  ) -> impl Future<Output = Result<(Person, Credential), CreateMemberError<Self::Error>>> + Send + '_;

  fn list_people(&self) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found.
  fn get_person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Change a person's door access, distinguishing a missing person from
  /// one who already has `access`.
  fn set_access(
    &self,
    id: PersonId,
    access: AccessLevel,
  ) -> impl Future<Output = Result<UpdateOutcome, Self::Error>> + Send + '_;

  // ── Cards ─────────────────────────────────────────────────────────────

  fn credentials_for(
    &self,
    owner: PersonId,
  ) -> impl Future<Output = Result<Vec<Credential>, Self::Error>> + Send + '_;

  /// Change the PIN of a card, distinguishing a missing card from one that
  /// already has `pin`.
  fn set_pin(
    &self,
    card_id: CardId,
    pin: Pin,
  ) -> impl Future<Output = Result<UpdateOutcome, Self::Error>> + Send + '_;

  /// Every card that opens at least one door, sorted by card id.
  fn door_keys(&self) -> impl Future<Output = Result<Vec<DoorKey>, Self::Error>> + Send + '_;

  // ── Devices ───────────────────────────────────────────────────────────

  fn devices_for(
    &self,
    owner: PersonId,
  ) -> impl Future<Output = Result<Vec<Device>, Self::Error>> + Send + '_;

  fn mac_registered(
    &self,
    mac: MacAddress,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Insert a hand-entered device. Returns `None`, writing nothing, when
  /// the MAC address is already registered.
  fn insert_device(
    &self,
    device: NewDevice,
  ) -> impl Future<Output = Result<Option<Device>, Self::Error>> + Send + '_;
}
