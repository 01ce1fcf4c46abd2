//! Router tests driven through `tower::ServiceExt::oneshot` against an
//! in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::{Body, to_bytes},
  http::{Request, StatusCode, header},
};
use chrono::NaiveDate;
use spacedb_core::clock::FixedClock;
use spacedb_store_sqlite::SqliteStore;
use tower::ServiceExt as _;

use crate::{AppState, ServerConfig, app, router};

async fn state() -> AppState<SqliteStore> {
  AppState {
    store:  Arc::new(SqliteStore::open_in_memory().await.unwrap()),
    config: Arc::new(ServerConfig { base_path: "/db".into(), ..Default::default() }),
  }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, header::HeaderMap, String) {
  let response = app.oneshot(req).await.unwrap();
  let status = response.status();
  let headers = response.headers().clone();
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
  (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get(state: &AppState<SqliteStore>, uri: &str) -> (StatusCode, String) {
  let (status, _, body) =
    send(router(state.clone()), Request::get(uri).body(Body::empty()).unwrap()).await;
  (status, body)
}

async fn post(
  state: &AppState<SqliteStore>,
  action: &str,
  form: &str,
) -> (StatusCode, header::HeaderMap, String) {
  let req = Request::post(format!("/?action={action}"))
    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
    .body(Body::from(form.to_owned()))
    .unwrap();
  send(router(state.clone()), req).await
}

/// Onboards one member through the form. On a fresh store they get id 1.
async fn add_ada(state: &AppState<SqliteStore>, pin: &str) {
  let form = format!(
    "name=ada&fullname=Ada+Lovelace&email=ada%40example.org&paymentref=SO1&card_id=A1B2C3D4&pin={pin}"
  );
  let (status, _, body) = post(state, "addmember", &form).await;
  assert_eq!(status, StatusCode::OK, "{body}");
}

// ─── Navigation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn home_links_under_base_path() {
  let s = state().await;
  let (status, body) = get(&s, "/").await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains(r#"href="/db/?action=members""#), "{body}");
  assert!(body.contains(r#"href="/db/?action=doorkeys""#));
}

#[tokio::test]
async fn unknown_action_is_plain_ok() {
  let s = state().await;
  let (status, body) = get(&s, "/?action=frobnicate").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, "Unknown action");

  // Known action, wrong method.
  let (status, _, body) = post(&s, "members", "").await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, "Unknown action");
}

// ─── Onboarding ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn onboarded_member_appears_in_list_and_profile() {
  let s = state().await;
  add_ada(&s, "1357").await;

  let (_, list) = get(&s, "/?action=members").await;
  assert!(list.contains("Ada Lovelace"), "{list}");
  assert!(list.contains(r#"href="/db/?action=viewmember&amp;id=1""#));

  let (status, profile) = get(&s, "/?action=viewmember&id=1").await;
  assert_eq!(status, StatusCode::OK);
  assert!(profile.contains("<h1>Ada Lovelace</h1>"));
  assert!(profile.contains("A1B2C3D4"));
  assert!(profile.contains("Revoke keyholder status"));
  assert!(!profile.contains("No PIN set"));
  assert!(!profile.contains("1357"), "PIN leaked into profile");
}

#[tokio::test]
async fn provisional_member_has_no_pin_and_no_access() {
  let s = state().await;
  add_ada(&s, "").await;

  let (_, profile) = get(&s, "/?action=viewmember&id=1").await;
  assert!(profile.contains("No PIN set"), "{profile}");
  assert!(profile.contains("Make keyholder"));
}

#[tokio::test]
async fn missing_field_is_a_bad_request() {
  let s = state().await;
  let (status, _, body) = post(&s, "addmember", "name=ada").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body.contains("missing required field `fullname`"), "{body}");
}

#[tokio::test]
async fn issued_card_is_a_conflict() {
  let s = state().await;
  add_ada(&s, "1357").await;

  let form = "name=eve&fullname=Eve&email=eve%40example.org&paymentref=SO9&card_id=a1b2c3d4&pin=";
  let (status, _, body) = post(&s, "addmember", form).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body.contains("card A1B2C3D4 is already issued"), "{body}");

  let (status, _) = get(&s, "/?action=viewmember&id=2").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_lists_the_card_as_a_device() {
  let s = state().await;
  add_ada(&s, "1357").await;

  let (status, profile) = get(&s, "/?action=viewmember&id=1").await;
  assert_eq!(status, StatusCode::OK);
  assert!(profile.contains("<td>A1B2C3D4</td><td>RFID</td><td>rfid-gateway</td>"), "{profile}");
}

#[tokio::test]
async fn invalid_pin_is_rejected_before_anything_is_written() {
  let s = state().await;
  let form = "name=ada&fullname=Ada&email=a%40b.c&paymentref=X&card_id=A1&pin=1123";
  let (status, _, _) = post(&s, "addmember", form).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = get(&s, "/?action=viewmember&id=1").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Profile and door access ─────────────────────────────────────────────────

#[tokio::test]
async fn unknown_member_is_not_found() {
  let s = state().await;
  let (status, body) = get(&s, "/?action=viewmember&id=42").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body.contains("member 42 not found"), "{body}");

  let (status, _) = get(&s, "/?action=viewmember&id=abc").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn keyholder_toggle_reports_each_outcome() {
  let s = state().await;
  add_ada(&s, "1357").await;

  let (status, _, body) = post(&s, "keyholder", "id=1&access=NO").await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert!(body.contains("door access is now NO"));

  let (status, _, body) = post(&s, "keyholder", "id=1&access=NO").await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body.contains("Back to profile"), "{body}");

  let (status, _, _) = post(&s, "keyholder", "id=9&access=BOTH").await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _, _) = post(&s, "keyholder", "id=1&access=MAYBE").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── PIN changes ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn change_pin_form_carries_card_and_user() {
  let s = state().await;
  let (status, body) = get(&s, "/?action=changepin&card_id=A1B2C3D4&user_id=1").await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains(r#"name="card_id" value="A1B2C3D4""#), "{body}");
  assert!(body.contains(r#"name="user_id" value="1""#));

  let (status, _) = get(&s, "/?action=changepin&user_id=1").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn change_pin_updates_the_card() {
  let s = state().await;
  add_ada(&s, "").await;

  let (status, _, body) = post(&s, "changepin", "pin=2468&card_id=A1B2C3D4&user_id=1").await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert!(body.contains("PIN changed successfully"));

  let (_, profile) = get(&s, "/?action=viewmember&id=1").await;
  assert!(!profile.contains("No PIN set"));

  let (status, _, _) = post(&s, "changepin", "pin=2468&card_id=A1B2C3D4&user_id=1").await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, _, _) = post(&s, "changepin", "pin=2468&card_id=FFFF&user_id=1").await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Devices ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn saving_a_device_redirects_to_the_profile() {
  let s = state().await;
  add_ada(&s, "1357").await;

  let form = "mac=AA%3ABB%3ACC%3ADD%3AEE%3AFF&description=Phone&owner=1";
  let (status, headers, _) = post(&s, "savedevice", form).await;
  assert_eq!(status, StatusCode::SEE_OTHER);
  assert_eq!(
    headers.get(header::LOCATION).unwrap(),
    "/db/?action=viewmember&id=1&success=1"
  );

  let (_, profile) = get(&s, "/?action=viewmember&id=1&success=1").await;
  assert!(profile.contains("Success!"), "{profile}");
  assert!(profile.contains("AA:BB:CC:DD:EE:FF"));
  assert!(profile.contains("Phone"));

  let (status, _, body) = post(&s, "savedevice", form).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body.contains("already registered"), "{body}");
}

#[tokio::test]
async fn device_for_unknown_owner_is_not_found() {
  let s = state().await;
  let form = "mac=AA%3ABB%3ACC%3ADD%3AEE%3AFF&description=Phone&owner=7";
  let (status, _, _) = post(&s, "savedevice", form).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let form = "mac=not-a-mac&description=Phone&owner=7";
  let (status, _, _) = post(&s, "savedevice", form).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Door keys ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn door_keys_list_cards_with_pins_only() {
  let s = state().await;
  add_ada(&s, "1357").await;
  let form = "name=bob&fullname=Bob&email=bob%40example.org&paymentref=SO2&card_id=B0B0&pin=";
  post(&s, "addmember", form).await;

  let (status, body) = get(&s, "/?action=doorkeys").await;
  assert_eq!(status, StatusCode::OK);
  assert!(body.contains("A1B2C3D4"), "{body}");
  assert!(!body.contains("B0B0"));
  assert!(!body.contains("1357"), "PIN leaked into door keys");
}

// ─── Status document ─────────────────────────────────────────────────────────

#[tokio::test]
async fn app_serves_status_alongside_admin_pages() {
  let s = state().await;
  s.store.set_space_open(true).await.unwrap();
  let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap().and_hms_opt(12, 0, 0).unwrap());

  let (status, headers, body) = send(
    app(s.clone(), clock),
    Request::get("/status.json").body(Body::empty()).unwrap(),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
  let doc: serde_json::Value = serde_json::from_str(&body).unwrap();
  assert_eq!(doc["sensors"]["people_now_present"]["value"], 0);

  let (status, _, _) =
    send(app(s, clock), Request::get("/").body(Body::empty()).unwrap()).await;
  assert_eq!(status, StatusCode::OK);
}
