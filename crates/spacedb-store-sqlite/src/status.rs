//! Status sources and the writes that feed them.
//!
//! The door daemon flips the space state, logs temperatures and refreshes
//! presence deadlines; the status document reads them back.

use chrono::NaiveDateTime;
use rusqlite::OptionalExtension as _;

use spacedb_core::{
  credential::CardId,
  device::{DeviceSource, MacAddress},
  policy::OpenHoursWindow,
  snapshot::{ManualFlagSource, OpenHoursSource, SensorSource},
};

use crate::{
  encode::{decode_dt, encode_dt, encode_source, encode_space_state, SPACE_OPEN},
  Error, Result, SqliteStore,
};

// ─── Writes ──────────────────────────────────────────────────────────────────

impl SqliteStore {
  /// Set the manual open/closed flag.
  pub async fn set_space_open(&self, open: bool) -> Result<()> {
    let value = encode_space_state(open);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO prefs (name, value) VALUES ('space-state', ?1)
           ON CONFLICT (name) DO UPDATE SET value = excluded.value",
          rusqlite::params![value],
        )?;
        Ok(())
      })
      .await?;
    tracing::info!(open, "space state set");
    Ok(())
  }

  /// Append a temperature reading in whole degrees Celsius.
  pub async fn record_temperature(&self, celsius: i64, at: NaiveDateTime) -> Result<()> {
    let at = encode_dt(at);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO environmental (recorded_at, temperature) VALUES (?1, ?2)",
          rusqlite::params![at, celsius],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Add a one-off public open window. Returns its row id.
  pub async fn add_open_day(&self, window: OpenHoursWindow) -> Result<i64> {
    let opens_at = encode_dt(window.start);
    let closes_at = encode_dt(window.end);
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO open_days (opens_at, closes_at) VALUES (?1, ?2)",
          rusqlite::params![opens_at, closes_at],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    Ok(id)
  }

  /// Mark the device with `mac`, seen on the network, present until
  /// `until`.
  ///
  /// Returns `false` when no hand-entered device has that address.
  pub async fn mark_present(&self, mac: &MacAddress, until: NaiveDateTime) -> Result<bool> {
    self
      .extend_presence(DeviceSource::ManualEntry, mac.as_str(), until)
      .await
  }

  /// Mark the owner of `card`, tapped in at the door, present until
  /// `until`.
  ///
  /// Returns `false` when no issued card has that id.
  pub async fn mark_card_present(&self, card: &CardId, until: NaiveDateTime) -> Result<bool> {
    self
      .extend_presence(DeviceSource::RfidGateway, card.as_str(), until)
      .await
  }

  async fn extend_presence(
    &self,
    source: DeviceSource,
    address: &str,
    until: NaiveDateTime,
  ) -> Result<bool> {
    let source = encode_source(source);
    let address = address.to_owned();
    let until = encode_dt(until);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO presence_deadline (system, expires)
           SELECT id, ?3 FROM systems WHERE source = ?1 AND mac = ?2
           ON CONFLICT (system) DO UPDATE SET expires = excluded.expires",
          rusqlite::params![source, address, until],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}

// ─── Sources ─────────────────────────────────────────────────────────────────

impl ManualFlagSource for SqliteStore {
  type Error = Error;

  /// A missing `space-state` row reads as closed.
  async fn manual_open_flag(&self) -> Result<bool> {
    let value: Option<i64> = self
      .conn
      .call(|conn| {
        Ok(conn
          .query_row(
            "SELECT value FROM prefs WHERE name = 'space-state'",
            [],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;
    Ok(value == Some(SPACE_OPEN))
  }
}

impl OpenHoursSource for SqliteStore {
  type Error = Error;

  async fn open_hours_at(&self, now: NaiveDateTime) -> Result<Vec<OpenHoursWindow>> {
    let now = encode_dt(now);
    let raws: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT opens_at, closes_at FROM open_days
            WHERE opens_at <= ?1 AND closes_at > ?1
            ORDER BY opens_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![now], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(start, end)| {
        Ok(OpenHoursWindow {
          start: decode_dt("opens_at", &start)?,
          end:   decode_dt("closes_at", &end)?,
        })
      })
      .collect()
  }
}

impl SensorSource for SqliteStore {
  type Error = Error;

  async fn latest_temperature(&self) -> Result<Option<i64>> {
    let value: Option<i64> = self
      .conn
      .call(|conn| {
        Ok(conn
          .query_row(
            "SELECT temperature FROM environmental
              ORDER BY recorded_at DESC, id DESC
              LIMIT 1",
            [],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;
    Ok(value)
  }

  /// Members with at least one visible device whose deadline is after `now`.
  async fn present_members(&self, now: NaiveDateTime) -> Result<Vec<String>> {
    let now = encode_dt(now);
    let names: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT p.name
             FROM presence_deadline d
             JOIN systems s ON s.id = d.system
             JOIN people  p ON p.id = s.owner
            WHERE s.hidden = 0
              AND p.member = 'YES'
              AND d.expires > ?1
            GROUP BY p.id
            ORDER BY p.name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![now], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(names)
  }
}
