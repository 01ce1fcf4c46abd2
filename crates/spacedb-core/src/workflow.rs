//! Admin workflows.
//!
//! Each workflow takes the raw request strings, validates all of them before
//! touching the store, then runs its store calls in order. A store error
//! aborts the remaining steps; nothing already committed is rolled back by
//! this layer.

use std::fmt;

use thiserror::Error;

use crate::{
  credential::{CardId, Credential, CredentialPin, NewCredential, Pin},
  device::{Device, MacAddress, NewDevice, Visibility, parse_description},
  error::ValidationError,
  person::{AccessLevel, NewPerson, Person, PersonId},
  store::{CreateMemberError, MemberStore, UpdateOutcome},
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// The record a workflow was aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
  Person(PersonId),
  Card(CardId),
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Target::Person(id) => write!(f, "member {id}"),
      Target::Card(id) => write!(f, "card {id}"),
    }
  }
}

/// One committed-or-attempted write of a multi-step workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
  CreatePerson(PersonId),
  IssueCard(CardId),
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Step::CreatePerson(id) => write!(f, "create member {id}"),
      Step::IssueCard(id) => write!(f, "issue card {id}"),
    }
  }
}

#[derive(Debug, Error)]
pub enum WorkflowError<E: std::error::Error + 'static> {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("no such {0}")]
  NotFound(Target),

  #[error("{0} already has that value")]
  Unchanged(Target),

  #[error("MAC address {0} is already registered")]
  AlreadyRegistered(MacAddress),

  #[error("card {0} is already issued")]
  CardInUse(CardId),

  #[error("partially failed: committed [{}] but could not {failed}: {source}", list(.committed))]
  PartialFailure { committed: Vec<Step>, failed: Step, source: E },

  #[error("database unavailable: {0}")]
  Unavailable(#[source] E),
}

fn list(steps: &[Step]) -> String {
  steps.iter().map(Step::to_string).collect::<Vec<_>>().join(", ")
}

pub type WorkflowResult<T, E> = Result<T, WorkflowError<E>>;

// ─── Onboard member ──────────────────────────────────────────────────────────

/// The add-member form, as submitted.
#[derive(Debug, Clone, Default)]
pub struct MemberApplication {
  pub name:       String,
  pub fullname:   String,
  pub email:      String,
  pub paymentref: String,
  pub card_id:    String,
  /// Empty for provisional members.
  pub pin:        String,
}

impl MemberApplication {
  /// Members who get a PIN get full access straight away; provisional
  /// members get none and a card without a usable PIN.
  pub fn validate(&self) -> Result<(NewPerson, NewCredential), ValidationError> {
    let card_id = CardId::parse(&self.card_id)?;
    let pin = CredentialPin::from_form(&self.pin)?;
    let access = if pin.is_set() { AccessLevel::Full } else { AccessLevel::None };
    let person = NewPerson::member(
      self.name.clone(),
      self.fullname.clone(),
      self.email.clone(),
      self.paymentref.clone(),
      access,
    )?;
    Ok((person, NewCredential { card_id, pin }))
  }
}

#[derive(Debug, Clone)]
pub struct Onboarded {
  pub person:     Person,
  pub credential: Credential,
}

pub async fn onboard_member<S: MemberStore>(
  store: &S,
  application: &MemberApplication,
) -> WorkflowResult<Onboarded, S::Error> {
  let (person, card) = application.validate()?;
  let card_id = card.card_id.clone();

  match store.create_member(person, card).await {
    Ok((person, credential)) => {
      tracing::info!(
        member = %person.id,
        card = %credential.card_id,
        access = %person.access,
        "member onboarded"
      );
      Ok(Onboarded { person, credential })
    }
    Err(CreateMemberError::Failed(e)) => Err(WorkflowError::Unavailable(e)),
    Err(CreateMemberError::CardInUse(card)) => Err(WorkflowError::CardInUse(card)),
    Err(CreateMemberError::Partial { person, source }) => {
      tracing::error!(member = %person, card = %card_id, error = %source, "onboarding partially failed");
      Err(WorkflowError::PartialFailure {
        committed: vec![Step::CreatePerson(person)],
        failed: Step::IssueCard(card_id),
        source,
      })
    }
  }
}

// ─── Change PIN ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct PinChange {
  pub card_id: String,
  pub pin:     String,
}

impl PinChange {
  pub fn validate(&self) -> Result<(CardId, Pin), ValidationError> {
    let pin = Pin::parse(&self.pin)?;
    let card_id = CardId::parse(&self.card_id)?;
    Ok((card_id, pin))
  }
}

pub async fn change_pin<S: MemberStore>(
  store: &S,
  change: &PinChange,
) -> WorkflowResult<CardId, S::Error> {
  let (card_id, pin) = change.validate()?;

  match store.set_pin(card_id.clone(), pin).await.map_err(WorkflowError::Unavailable)? {
    UpdateOutcome::Updated => {
      tracing::info!(card = %card_id, "PIN changed");
      Ok(card_id)
    }
    UpdateOutcome::NotFound => Err(WorkflowError::NotFound(Target::Card(card_id))),
    UpdateOutcome::Unchanged => Err(WorkflowError::Unchanged(Target::Card(card_id))),
  }
}

// ─── Set access level ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct AccessChange {
  pub id:     String,
  pub access: String,
}

impl AccessChange {
  pub fn validate(&self) -> Result<(PersonId, AccessLevel), ValidationError> {
    Ok((self.id.parse()?, self.access.parse()?))
  }
}

pub async fn set_access_level<S: MemberStore>(
  store: &S,
  change: &AccessChange,
) -> WorkflowResult<(PersonId, AccessLevel), S::Error> {
  let (id, access) = change.validate()?;

  match store.set_access(id, access).await.map_err(WorkflowError::Unavailable)? {
    UpdateOutcome::Updated => {
      tracing::info!(member = %id, %access, "door access changed");
      Ok((id, access))
    }
    UpdateOutcome::NotFound => Err(WorkflowError::NotFound(Target::Person(id))),
    UpdateOutcome::Unchanged => Err(WorkflowError::Unchanged(Target::Person(id))),
  }
}

// ─── Register device ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct DeviceRegistration {
  pub mac:         String,
  pub description: String,
  pub owner:       String,
}

impl DeviceRegistration {
  pub fn validate(&self) -> Result<NewDevice, ValidationError> {
    let mac = MacAddress::parse(&self.mac)?;
    let description = parse_description(&self.description)?;
    let owner = self
      .owner
      .parse::<PersonId>()
      .map_err(|_| ValidationError::InvalidOwner(self.owner.clone()))?;
    Ok(NewDevice {
      mac,
      description,
      visibility: Visibility::Visible,
      owner,
    })
  }
}

/// Register a device by hand. On success the caller redirects back to the
/// owner's page, so the returned device carries the owner id.
pub async fn register_device<S: MemberStore>(
  store: &S,
  registration: &DeviceRegistration,
) -> WorkflowResult<Device, S::Error> {
  let device = registration.validate()?;

  if store
    .get_person(device.owner)
    .await
    .map_err(WorkflowError::Unavailable)?
    .is_none()
  {
    return Err(WorkflowError::NotFound(Target::Person(device.owner)));
  }

  if store
    .mac_registered(device.mac.clone())
    .await
    .map_err(WorkflowError::Unavailable)?
  {
    return Err(WorkflowError::AlreadyRegistered(device.mac));
  }

  // A concurrent registration can take the address between the check and
  // the insert.
  let mac = device.mac.clone();
  let device = store
    .insert_device(device)
    .await
    .map_err(WorkflowError::Unavailable)?
    .ok_or(WorkflowError::AlreadyRegistered(mac))?;
  tracing::info!(member = %device.owner, address = %device.address, "device registered");
  Ok(device)
}
