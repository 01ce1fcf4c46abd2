//! The public status document.
//!
//! Combines static identity metadata, the [`policy`](crate::policy) result
//! and the latest sensor readings into one serialisable value. Every input
//! other than the static metadata comes from an external source that may
//! fail; a failing source degrades its own field and nothing else.

use std::future::Future;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
  clock::Clock,
  policy::{OpenHoursWindow, PublicHours, StateMessage},
};

pub const TEMPERATURE_UNIT:     &str = "°C";
pub const TEMPERATURE_LOCATION: &str = "Inside";

// ─── Sources ─────────────────────────────────────────────────────────────────

/// Where the manual open/closed flag lives.
pub trait ManualFlagSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// `true` when someone has marked the space open.
  fn manual_open_flag(&self) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

/// The public open-hours calendar.
pub trait OpenHoursSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Calendar windows that contain `now`.
  fn open_hours_at(
    &self,
    now: NaiveDateTime,
  ) -> impl Future<Output = Result<Vec<OpenHoursWindow>, Self::Error>> + Send + '_;
}

/// Environmental and presence sensors.
pub trait SensorSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Most recent temperature in whole degrees Celsius, if any was logged.
  fn latest_temperature(&self) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + '_;

  /// Display names of the members in the space at `now`.
  fn present_members(
    &self,
    now: NaiveDateTime,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;
}

// ─── Static metadata ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
  pub address: String,
  pub lat:     f64,
  pub lon:     f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub twitter:    String,
  pub issue_mail: String,
  pub ml:         String,
  pub irc:        String,
}

/// Identity and contact details of the space; constant for a deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceInfo {
  pub api:                   String,
  pub space:                 String,
  pub logo:                  String,
  pub url:                   String,
  pub location:              Location,
  pub cam:                   Vec<String>,
  pub contact:               Contact,
  pub issue_report_channels: Vec<String>,
}

impl Default for SpaceInfo {
  fn default() -> Self {
    Self {
      api:                   "0.13".into(),
      space:                 "Leeds Hackspace".into(),
      logo:                  "http://wiki.leedshackspace.org.uk/leeds_hackspace_logo.png".into(),
      url:                   "http://www.leedshackspace.org.uk".into(),
      location:              Location {
        address: "37-38 Mabgate Green, Leeds, LS9 7DS, England".into(),
        lat:     53.800747,
        lon:     -1.532853,
      },
      cam:                   (1..=4)
        .map(|n| format!("http://www.leedshackspace.org.uk/cam{n}.jpg"))
        .collect(),
      contact:               Contact {
        twitter:    "@leedshackspace".into(),
        issue_mail: "paul@nowt.org".into(),
        ml:         "leeds-hack-space@googlegroups.com".into(),
        irc:        "irc://freenode.net/#leeds-hack-space".into(),
      },
      issue_report_channels: vec!["twitter".into(), "issue_mail".into()],
    }
  }
}

// ─── Document ────────────────────────────────────────────────────────────────

/// Open state as published. Both fields are `null`/absent when the manual
/// flag could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateField {
  pub open:    Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<StateMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemperatureReading {
  pub value:    i64,
  pub unit:     &'static str,
  pub location: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeopleNowPresent {
  pub value: u64,
  /// Absent, not empty, when nobody is present.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub names: Option<Vec<String>>,
}

impl PeopleNowPresent {
  pub fn from_names(names: Vec<String>) -> Self {
    Self {
      value: names.len() as u64,
      names: (!names.is_empty()).then_some(names),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sensors {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub temperature:        Option<Vec<TemperatureReading>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub people_now_present: Option<PeopleNowPresent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotDocument {
  #[serde(flatten)]
  pub info:    SpaceInfo,
  pub state:   StateField,
  pub sensors: Sensors,
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Assemble the status document. Never fails: each source error is logged
/// and degrades only the field that source feeds.
pub async fn build_snapshot<C, M, O, S>(
  info: &SpaceInfo,
  public_hours: &PublicHours,
  clock: &C,
  manual_flag_source: &M,
  open_hours_source: &O,
  sensor_source: &S,
) -> SnapshotDocument
where
  C: Clock,
  M: ManualFlagSource,
  O: OpenHoursSource,
  S: SensorSource,
{
  let now = clock.now();

  let state = match manual_flag_source.manual_open_flag().await {
    Ok(manual_flag) => {
      let open_hours = if manual_flag {
        open_hours_source.open_hours_at(now).await.unwrap_or_else(|e| {
          tracing::warn!(error = %e, "open-hours lookup failed; assuming no public window");
          Vec::new()
        })
      } else {
        Vec::new()
      };
      let state = public_hours.evaluate(now, manual_flag, &open_hours);
      StateField { open: Some(state.open), message: Some(state.message) }
    }
    Err(e) => {
      tracing::warn!(error = %e, "space-state lookup failed; publishing unknown state");
      StateField { open: None, message: None }
    }
  };

  let temperature = match sensor_source.latest_temperature().await {
    Ok(reading) => reading.map(|value| {
      vec![TemperatureReading {
        value,
        unit: TEMPERATURE_UNIT,
        location: TEMPERATURE_LOCATION,
      }]
    }),
    Err(e) => {
      tracing::warn!(error = %e, "temperature lookup failed; omitting reading");
      None
    }
  };

  let people_now_present = match sensor_source.present_members(now).await {
    Ok(names) => Some(PeopleNowPresent::from_names(names)),
    Err(e) => {
      tracing::warn!(error = %e, "presence lookup failed; omitting headcount");
      None
    }
  };

  SnapshotDocument {
    info: info.clone(),
    state,
    sensors: Sensors { temperature, people_now_present },
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use serde_json::Value;

  use super::*;
  use crate::clock::FixedClock;

  #[derive(Debug, thiserror::Error)]
  #[error("source offline")]
  struct Offline;

  /// One fake that plays all three sources.
  struct Fake {
    flag:        Result<bool, ()>,
    calendar:    Result<Vec<OpenHoursWindow>, ()>,
    temperature: Result<Option<i64>, ()>,
    present:     Result<Vec<String>, ()>,
  }

  impl Default for Fake {
    fn default() -> Self {
      Self {
        flag:        Ok(true),
        calendar:    Ok(Vec::new()),
        temperature: Ok(Some(19)),
        present:     Ok(Vec::new()),
      }
    }
  }

  impl ManualFlagSource for Fake {
    type Error = Offline;

    async fn manual_open_flag(&self) -> Result<bool, Offline> { self.flag.map_err(|_| Offline) }
  }

  impl OpenHoursSource for Fake {
    type Error = Offline;

    async fn open_hours_at(&self, _now: NaiveDateTime) -> Result<Vec<OpenHoursWindow>, Offline> {
      self.calendar.clone().map_err(|_| Offline)
    }
  }

  impl SensorSource for Fake {
    type Error = Offline;

    async fn latest_temperature(&self) -> Result<Option<i64>, Offline> {
      self.temperature.map_err(|_| Offline)
    }

    async fn present_members(&self, _now: NaiveDateTime) -> Result<Vec<String>, Offline> {
      self.present.clone().map_err(|_| Offline)
    }
  }

  // Monday 2024-01-01, 12:00.
  fn monday_noon() -> FixedClock {
    FixedClock(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap())
  }

  async fn snapshot_json(fake: &Fake) -> Value {
    let doc = build_snapshot(
      &SpaceInfo::default(),
      &PublicHours::default(),
      &monday_noon(),
      fake,
      fake,
      fake,
    )
    .await;
    serde_json::to_value(doc).unwrap()
  }

  #[tokio::test]
  async fn document_has_fixed_shape() {
    let json = snapshot_json(&Fake::default()).await;
    for key in [
      "api",
      "space",
      "logo",
      "url",
      "location",
      "cam",
      "state",
      "contact",
      "issue_report_channels",
      "sensors",
    ] {
      assert!(json.get(key).is_some(), "missing {key}: {json}");
    }
    assert_eq!(json["location"]["lat"], 53.800747);
    assert_eq!(json["cam"].as_array().unwrap().len(), 4);
    assert_eq!(json["state"]["open"], true);
    assert_eq!(json["state"]["message"], "Open to Members");
    assert_eq!(
      json["sensors"]["temperature"],
      serde_json::json!([{ "value": 19, "unit": "°C", "location": "Inside" }])
    );
  }

  #[tokio::test]
  async fn names_absent_when_nobody_present() {
    let json = snapshot_json(&Fake::default()).await;
    let present = &json["sensors"]["people_now_present"];
    assert_eq!(present["value"], 0);
    assert!(present.get("names").is_none(), "names must be omitted: {present}");
  }

  #[tokio::test]
  async fn names_listed_when_people_present() {
    let fake = Fake {
      present: Ok(vec!["alice".into(), "bob".into(), "carol".into()]),
      ..Fake::default()
    };
    let json = snapshot_json(&fake).await;
    let present = &json["sensors"]["people_now_present"];
    assert_eq!(present["value"], 3);
    assert_eq!(present["names"].as_array().unwrap().len(), 3);
  }

  #[tokio::test]
  async fn calendar_window_makes_space_open_to_all() {
    let now = monday_noon().0;
    let fake = Fake {
      calendar: Ok(vec![OpenHoursWindow {
        start: now - chrono::Duration::hours(1),
        end:   now + chrono::Duration::hours(1),
      }]),
      ..Fake::default()
    };
    let json = snapshot_json(&fake).await;
    assert_eq!(json["state"]["message"], "Open to All");
  }

  #[tokio::test]
  async fn manually_closed_space() {
    let fake = Fake { flag: Ok(false), ..Fake::default() };
    let json = snapshot_json(&fake).await;
    assert_eq!(json["state"], serde_json::json!({ "open": false, "message": "Closed" }));
  }

  #[tokio::test]
  async fn calendar_failure_fails_closed_to_public_only() {
    let fake = Fake { calendar: Err(()), ..Fake::default() };
    let json = snapshot_json(&fake).await;
    assert_eq!(json["state"]["open"], true);
    assert_eq!(json["state"]["message"], "Open to Members");
  }

  #[tokio::test]
  async fn failing_sensors_degrade_only_their_fields() {
    let fake = Fake {
      temperature: Err(()),
      present: Err(()),
      ..Fake::default()
    };
    let json = snapshot_json(&fake).await;
    assert!(json["sensors"].get("temperature").is_none());
    assert!(json["sensors"].get("people_now_present").is_none());
    assert_eq!(json["state"]["message"], "Open to Members");
    assert_eq!(json["space"], "Leeds Hackspace");
  }

  #[tokio::test]
  async fn failing_flag_publishes_unknown_state() {
    let fake = Fake {
      flag: Err(()),
      present: Ok(vec!["alice".into()]),
      ..Fake::default()
    };
    let json = snapshot_json(&fake).await;
    assert_eq!(json["state"], serde_json::json!({ "open": null }));
    assert_eq!(json["sensors"]["people_now_present"]["value"], 1);
  }

  #[tokio::test]
  async fn missing_temperature_row_omits_reading() {
    let fake = Fake { temperature: Ok(None), ..Fake::default() };
    let json = snapshot_json(&fake).await;
    assert!(json["sensors"].get("temperature").is_none());
  }
}
