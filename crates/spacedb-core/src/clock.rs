//! Wall-clock source for time-dependent decisions.
//!
//! The space runs on local time: public sessions are announced as "Tuesday
//! from 5pm", so every comparison happens on naive local timestamps.

use chrono::{Local, NaiveDateTime};

pub trait Clock: Send + Sync {
  fn now(&self) -> NaiveDateTime;
}

/// The host's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> NaiveDateTime { Local::now().naive_local() }
}

/// A clock frozen at one instant. Used by tests and by callers evaluating
/// the policy for a specific moment.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
  fn now(&self) -> NaiveDateTime { self.0 }
}
