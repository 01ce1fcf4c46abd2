//! [`SqliteStore`], the SQLite implementation of [`MemberStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use spacedb_core::{
  credential::{CardId, Credential, DoorKey, NewCredential, Pin},
  device::{Device, DeviceSource, MacAddress, NewDevice},
  person::{AccessLevel, NewPerson, Person, PersonId},
  store::{CreateMemberError, MemberStore, UpdateOutcome},
};

use crate::{
  encode::{
    encode_flag, encode_source, encode_visibility, RawCredential, RawDevice, RawDoorKey,
    RawPerson, DEVICE_COLUMNS, PERSON_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The member database, backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Compare-then-write of one column, inside a transaction so the read and
/// the write see the same row.
fn update_if_changed(
  conn: &mut rusqlite::Connection,
  select: &str,
  update: &str,
  key: &dyn rusqlite::ToSql,
  value: &str,
) -> rusqlite::Result<UpdateOutcome> {
  let tx = conn.transaction()?;
  let current: Option<Option<String>> = tx
    .query_row(select, rusqlite::params![key], |row| row.get(0))
    .optional()?;
  let outcome = match current {
    None => UpdateOutcome::NotFound,
    Some(Some(ref v)) if v == value => UpdateOutcome::Unchanged,
    Some(_) => {
      tx.execute(update, rusqlite::params![value, key])?;
      UpdateOutcome::Updated
    }
  };
  tx.commit()?;
  Ok(outcome)
}

// ─── MemberStore impl ────────────────────────────────────────────────────────

impl MemberStore for SqliteStore {
  type Error = Error;

  // ── People ────────────────────────────────────────────────────────────────

  async fn create_member(
    &self,
    person: NewPerson,
    card: NewCredential,
  ) -> Result<(Person, Credential), CreateMemberError<Error>> {
    let row = person.clone();
    let card_id = card.card_id.as_str().to_owned();
    let pin = card.pin.as_pin().map(|p| p.as_str().to_owned());

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO people (name, fullname, email, member, keyholder, access, paymentref)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            row.name,
            row.fullname,
            row.email,
            encode_flag(row.member),
            encode_flag(row.keyholder),
            row.access.as_str(),
            row.paymentref,
          ],
        )?;
        let id = tx.last_insert_rowid();
        let issued = tx.execute(
          "INSERT INTO rfid_tags (card_id, pin, user_id) VALUES (?1, ?2, ?3)
           ON CONFLICT (card_id) DO NOTHING",
          rusqlite::params![card_id, pin, id],
        )?;
        if issued == 0 {
          // Dropping the transaction rolls the person back.
          return Ok(None);
        }
        // The card doubles as a presence device, keyed by its id.
        tx.execute(
          "INSERT INTO systems (mac, description, source, hidden, owner)
           VALUES (?1, 'RFID', ?2, 0, ?3)
           ON CONFLICT (mac) DO UPDATE SET owner = excluded.owner",
          rusqlite::params![card_id, encode_source(DeviceSource::RfidGateway), id],
        )?;
        tx.commit()?;
        Ok(Some(id))
      })
      .await
      .map_err(|e| CreateMemberError::Failed(Error::from(e)))?;

    let Some(id) = id else {
      return Err(CreateMemberError::CardInUse(card.card_id));
    };
    let id = PersonId(id);
    let credential = Credential { card_id: card.card_id, pin: card.pin, user_id: id };
    Ok((person.into_person(id), credential))
  }

  async fn list_people(&self) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {PERSON_COLUMNS} FROM people ORDER BY id"))?;
        let rows = stmt
          .query_map([], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PERSON_COLUMNS} FROM people WHERE id = ?1"),
            rusqlite::params![id.0],
            RawPerson::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn set_access(&self, id: PersonId, access: AccessLevel) -> Result<UpdateOutcome> {
    let outcome = self
      .conn
      .call(move |conn| {
        Ok(update_if_changed(
          conn,
          "SELECT access FROM people WHERE id = ?1",
          "UPDATE people SET access = ?1 WHERE id = ?2",
          &id.0,
          access.as_str(),
        )?)
      })
      .await?;
    Ok(outcome)
  }

  // ── Cards ─────────────────────────────────────────────────────────────────

  async fn credentials_for(&self, owner: PersonId) -> Result<Vec<Credential>> {
    let raws: Vec<RawCredential> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT card_id, pin, user_id FROM rfid_tags WHERE user_id = ?1 ORDER BY card_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![owner.0], |row| {
            Ok(RawCredential {
              card_id: row.get(0)?,
              pin:     row.get(1)?,
              user_id: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCredential::into_credential).collect()
  }

  async fn set_pin(&self, card_id: CardId, pin: Pin) -> Result<UpdateOutcome> {
    let key = card_id.as_str().to_owned();
    let pin = pin.as_str().to_owned();
    let outcome = self
      .conn
      .call(move |conn| {
        Ok(update_if_changed(
          conn,
          "SELECT pin FROM rfid_tags WHERE card_id = ?1",
          "UPDATE rfid_tags SET pin = ?1 WHERE card_id = ?2",
          &key,
          &pin,
        )?)
      })
      .await?;
    Ok(outcome)
  }

  async fn door_keys(&self) -> Result<Vec<DoorKey>> {
    let raws: Vec<RawDoorKey> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT t.card_id, t.pin, p.access
             FROM rfid_tags t
             JOIN people p ON p.id = t.user_id
            WHERE p.access != 'NO' AND t.pin IS NOT NULL
            ORDER BY t.card_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawDoorKey {
              card_id: row.get(0)?,
              pin:     row.get(1)?,
              access:  row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDoorKey::into_door_key).collect()
  }

  // ── Devices ───────────────────────────────────────────────────────────────

  async fn devices_for(&self, owner: PersonId) -> Result<Vec<Device>> {
    let raws: Vec<RawDevice> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DEVICE_COLUMNS} FROM systems WHERE owner = ?1 ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner.0], RawDevice::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDevice::into_device).collect()
  }

  async fn mac_registered(&self, mac: MacAddress) -> Result<bool> {
    let mac = String::from(mac);
    let found = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT 1 FROM systems WHERE mac = ?1",
            rusqlite::params![mac],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false))
      })
      .await?;
    Ok(found)
  }

  async fn insert_device(&self, device: NewDevice) -> Result<Option<Device>> {
    let mac = device.mac.as_str().to_owned();
    let description = device.description.clone();
    let source = encode_source(DeviceSource::ManualEntry);
    let hidden = encode_visibility(device.visibility);
    let owner = device.owner.0;

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO systems (mac, description, source, hidden, owner)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (mac) DO NOTHING",
          rusqlite::params![mac, description, source, hidden, owner],
        )?;
        Ok((inserted > 0).then(|| conn.last_insert_rowid()))
      })
      .await?;

    Ok(id.map(|id| device.into_device(id)))
  }
}
