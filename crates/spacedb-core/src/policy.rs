//! Access policy: is the space open, and to whom.
//!
//! Two external signals feed the decision: the manual open/closed flag set
//! by whoever is in the space, and the public-hours calendar. The calendar
//! is the union of one-off [`OpenHoursWindow`]s from the database and the
//! recurring [`WeeklyWindow`]s from configuration.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

// ─── Calendar windows ────────────────────────────────────────────────────────

/// A one-off interval during which the space is open to the public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenHoursWindow {
  pub start: NaiveDateTime,
  pub end:   NaiveDateTime,
}

impl OpenHoursWindow {
  /// Half-open: `start` is inside, `end` is not.
  pub fn contains(&self, now: NaiveDateTime) -> bool {
    self.start <= now && now < self.end
  }
}

/// A public session that recurs every week on the same day.
///
/// With no `end` the window runs until midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWeeklyWindow", into = "RawWeeklyWindow")]
pub struct WeeklyWindow {
  pub day:   Weekday,
  pub start: NaiveTime,
  pub end:   Option<NaiveTime>,
}

impl WeeklyWindow {
  pub fn new(day: Weekday, start: NaiveTime, end: Option<NaiveTime>) -> Result<Self> {
    if let Some(end) = end
      && end <= start
    {
      return Err(ValidationError::InvalidSchedule(format!(
        "window on {day} ends at {end} before it starts at {start}"
      )));
    }
    Ok(Self { day, start, end })
  }

  pub fn contains(&self, now: NaiveDateTime) -> bool {
    if now.weekday() != self.day {
      return false;
    }
    let time = now.time();
    time >= self.start && self.end.is_none_or(|end| time < end)
  }
}

/// Configuration shape of a [`WeeklyWindow`]: `{ day = "tue", start = "17:00" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWeeklyWindow {
  pub day:   String,
  pub start: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end:   Option<String>,
}

impl TryFrom<RawWeeklyWindow> for WeeklyWindow {
  type Error = ValidationError;

  fn try_from(raw: RawWeeklyWindow) -> Result<Self> {
    let day = raw
      .day
      .parse::<Weekday>()
      .map_err(|_| ValidationError::InvalidSchedule(format!("unknown day {:?}", raw.day)))?;
    let start = parse_wall_time(&raw.start)?;
    let end = raw.end.as_deref().map(parse_wall_time).transpose()?;
    WeeklyWindow::new(day, start, end)
  }
}

impl From<WeeklyWindow> for RawWeeklyWindow {
  fn from(w: WeeklyWindow) -> Self {
    RawWeeklyWindow {
      day:   w.day.to_string(),
      start: w.start.format("%H:%M").to_string(),
      end:   w.end.map(|e| e.format("%H:%M").to_string()),
    }
  }
}

fn parse_wall_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M")
    .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
    .map_err(|_| ValidationError::InvalidSchedule(format!("invalid time {s:?}, expected HH:MM")))
}

/// The recurring public sessions of the space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicHours {
  pub weekly: Vec<WeeklyWindow>,
}

impl Default for PublicHours {
  /// Tuesday open evening, from 17:00 until midnight.
  fn default() -> Self {
    Self {
      weekly: vec![WeeklyWindow {
        day:   Weekday::Tue,
        start: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
        end:   None,
      }],
    }
  }
}

impl PublicHours {
  pub fn none() -> Self { Self { weekly: Vec::new() } }

  /// Whether the space is open to the general public at `now`.
  ///
  /// A manually closed space is never open to the public. Otherwise `now`
  /// must fall inside one of the calendar `open_hours` or one of the weekly
  /// rules.
  pub fn compute_public_openness(
    &self,
    now: NaiveDateTime,
    manual_flag: bool,
    open_hours: &[OpenHoursWindow],
  ) -> bool {
    if !manual_flag {
      return false;
    }
    open_hours.iter().any(|w| w.contains(now))
      || self.weekly.iter().any(|w| w.contains(now))
  }

  /// Full classification of the space at `now`.
  pub fn evaluate(
    &self,
    now: NaiveDateTime,
    manual_flag: bool,
    open_hours: &[OpenHoursWindow],
  ) -> SpaceState {
    SpaceState::classify(
      manual_flag,
      self.compute_public_openness(now, manual_flag, open_hours),
    )
  }
}

// ─── Derived state ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateMessage {
  #[serde(rename = "Open to All")]
  OpenToAll,
  #[serde(rename = "Open to Members")]
  OpenToMembers,
  #[serde(rename = "Closed")]
  Closed,
}

impl StateMessage {
  pub fn as_str(self) -> &'static str {
    match self {
      StateMessage::OpenToAll => "Open to All",
      StateMessage::OpenToMembers => "Open to Members",
      StateMessage::Closed => "Closed",
    }
  }
}

/// Whether the space is open, recomputed on every request and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceState {
  pub open:    bool,
  pub message: StateMessage,
}

impl SpaceState {
  pub fn classify(manual_flag: bool, public_open: bool) -> Self {
    let message = match (manual_flag, public_open) {
      (false, _) => StateMessage::Closed,
      (true, true) => StateMessage::OpenToAll,
      (true, false) => StateMessage::OpenToMembers,
    };
    Self { open: manual_flag, message }
  }
}
