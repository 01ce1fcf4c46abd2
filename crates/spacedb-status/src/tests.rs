//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
  body::{Body, to_bytes},
  http::{Request, StatusCode, header},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use spacedb_core::{
  clock::FixedClock,
  policy::{OpenHoursWindow, PublicHours},
  snapshot::{ManualFlagSource, OpenHoursSource, SensorSource, SpaceInfo},
};
use tower::ServiceExt as _;

use crate::{StatusState, status_router};

#[derive(Debug, thiserror::Error)]
#[error("sensor offline")]
struct Offline;

#[derive(Default)]
struct Sources {
  open:         bool,
  temperature:  Option<i64>,
  present:      Vec<String>,
  flag_broken:  bool,
  sensors_down: bool,
}

impl ManualFlagSource for Sources {
  type Error = Offline;

  async fn manual_open_flag(&self) -> Result<bool, Offline> {
    if self.flag_broken { Err(Offline) } else { Ok(self.open) }
  }
}

impl OpenHoursSource for Sources {
  type Error = Offline;

  async fn open_hours_at(&self, _now: NaiveDateTime) -> Result<Vec<OpenHoursWindow>, Offline> {
    Ok(Vec::new())
  }
}

impl SensorSource for Sources {
  type Error = Offline;

  async fn latest_temperature(&self) -> Result<Option<i64>, Offline> {
    if self.sensors_down { Err(Offline) } else { Ok(self.temperature) }
  }

  async fn present_members(&self, _now: NaiveDateTime) -> Result<Vec<String>, Offline> {
    if self.sensors_down { Err(Offline) } else { Ok(self.present.clone()) }
  }
}

// 2024-01-02 was a Tuesday.
fn tuesday_at(hour: u32) -> FixedClock {
  FixedClock(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(hour, 0, 0).unwrap())
}

async fn get_status(sources: Sources, clock: FixedClock) -> (StatusCode, header::HeaderMap, Value) {
  let app = status_router(StatusState {
    source:       Arc::new(sources),
    clock:        Arc::new(clock),
    info:         Arc::new(SpaceInfo::default()),
    public_hours: Arc::new(PublicHours::default()),
  });
  let response = app
    .oneshot(Request::get("/status.json").body(Body::empty()).unwrap())
    .await
    .unwrap();
  let status = response.status();
  let headers = response.headers().clone();
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  (status, headers, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn headers_allow_any_origin_without_caching() {
  let (status, headers, _) = get_status(Sources::default(), tuesday_at(12)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(headers[header::CONTENT_TYPE], "application/json");
  assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
  assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
}

#[tokio::test]
async fn tuesday_evening_is_open_to_all() {
  let sources = Sources {
    open: true,
    temperature: Some(20),
    present: vec!["ada".into(), "bob".into(), "cy".into()],
    ..Default::default()
  };
  let (_, _, doc) = get_status(sources, tuesday_at(19)).await;

  assert_eq!(doc["space"], "Leeds Hackspace");
  assert_eq!(doc["location"]["lat"], 53.800747);
  assert_eq!(doc["state"], serde_json::json!({ "open": true, "message": "Open to All" }));
  assert_eq!(
    doc["sensors"]["temperature"],
    serde_json::json!([{ "value": 20, "unit": "°C", "location": "Inside" }])
  );
  assert_eq!(doc["sensors"]["people_now_present"]["value"], 3);
  assert_eq!(doc["sensors"]["people_now_present"]["names"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn nobody_present_omits_names() {
  let sources = Sources { open: true, ..Default::default() };
  let (_, _, doc) = get_status(sources, tuesday_at(12)).await;

  assert_eq!(doc["state"]["message"], "Open to Members");
  assert_eq!(doc["sensors"]["people_now_present"], serde_json::json!({ "value": 0 }));
  assert!(doc["sensors"].get("temperature").is_none());
}

#[tokio::test]
async fn failing_sources_degrade_only_their_fields() {
  let sources = Sources { flag_broken: true, sensors_down: true, ..Default::default() };
  let (status, _, doc) = get_status(sources, tuesday_at(19)).await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(doc["state"], serde_json::json!({ "open": null }));
  assert_eq!(doc["sensors"], serde_json::json!({}));
  assert_eq!(doc["contact"]["twitter"], "@leedshackspace");
}

#[tokio::test]
async fn post_is_rejected() {
  let app = status_router(StatusState {
    source:       Arc::new(Sources::default()),
    clock:        Arc::new(tuesday_at(12)),
    info:         Arc::new(SpaceInfo::default()),
    public_hours: Arc::new(PublicHours::default()),
  });
  let response = app
    .oneshot(Request::post("/status.json").body(Body::empty()).unwrap())
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
