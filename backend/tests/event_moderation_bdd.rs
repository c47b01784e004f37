//! Behaviour tests for event submission and moderation.
//!
//! These scenarios confirm that vendor events only reach the public listing
//! after approval, that vendor edits reset the review, and that deletion is
//! reserved for admins.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

// The shared harness carries helpers other suites use.
#[allow(dead_code)]
#[path = "support/steps.rs"]
mod steps;
#[allow(dead_code)]
#[path = "support/harness.rs"]
mod harness;
#[allow(dead_code)]
#[path = "support/ws.rs"]
mod ws_support;

use actix_web::http::Method;
use rstest::fixture;
use rstest_bdd_macros::{scenario, then, when};
use serde_json::Value;

use crate::harness::{
    FormPart, RequestSpec, SharedWorld, WorldFixture, perform_json_request,
    perform_multipart_request,
};

#[fixture]
fn world() -> WorldFixture {
    harness::world()
}

fn token_of(world: &SharedWorld, alias: &str) -> String {
    world.borrow().account(alias).token
}

fn latest_event(world: &SharedWorld) -> String {
    world
        .borrow()
        .last_event_id
        .clone()
        .expect("an event was submitted")
}

fn list(world: &SharedWorld, alias: &str, path: &str) -> Vec<Value> {
    let (status, body) = perform_json_request(
        world,
        RequestSpec {
            method: Method::GET,
            path: path.to_owned(),
            token: Some(token_of(world, alias)),
            payload: None,
            label: "event listing request",
        },
    );
    assert_eq!(status, 200, "listing {path}");
    body.as_array().cloned().expect("event array")
}

#[when("{alias} submits an event named {name}")]
fn submits_an_event_named(world: &WorldFixture, alias: String, name: String) {
    let world = world.world();
    let token = token_of(&world, &alias);
    let (status, body) = perform_multipart_request(
        &world,
        Method::POST,
        "/api/event/add-new-events",
        &token,
        &[
            FormPart::Text("eventName", &name),
            FormPart::Text("bar", "The Anchor"),
            FormPart::Text("location", "12 Harbour Street"),
            FormPart::Text("coverCharge", "5"),
            FormPart::Text("description", "Teams of up to six"),
            FormPart::Text("mapReference", "https://maps.example/anchor"),
            FormPart::Image("images", b"poster-bytes"),
        ],
    );
    if status == 201 {
        let id = body["id"].as_str().expect("event id").to_owned();
        world.borrow_mut().last_event_id = Some(id);
    }
}

#[when("{alias} sets the latest event to {status}")]
fn sets_the_latest_event_to(world: &WorldFixture, alias: String, status: String) {
    let world = world.world();
    perform_json_request(
        &world,
        RequestSpec {
            method: Method::PATCH,
            path: format!("/api/event/admin/event-status/{}", latest_event(&world)),
            token: Some(token_of(&world, &alias)),
            payload: Some(serde_json::json!({ "status": status })),
            label: "event status request",
        },
    );
}

#[when("{alias} renames the latest event to {name}")]
fn renames_the_latest_event_to(world: &WorldFixture, alias: String, name: String) {
    let world = world.world();
    perform_json_request(
        &world,
        RequestSpec {
            method: Method::PUT,
            path: format!("/api/event/events/{}", latest_event(&world)),
            token: Some(token_of(&world, &alias)),
            payload: Some(serde_json::json!({ "eventName": name })),
            label: "event edit request",
        },
    );
}

#[when("{alias} deletes the latest event")]
fn deletes_the_latest_event(world: &WorldFixture, alias: String) {
    let world = world.world();
    perform_json_request(
        &world,
        RequestSpec {
            method: Method::DELETE,
            path: format!("/api/event/admin/events/{}", latest_event(&world)),
            token: Some(token_of(&world, &alias)),
            payload: None,
            label: "event delete request",
        },
    );
}

#[then("{alias} sees {count} public events")]
fn sees_public_events(world: &WorldFixture, alias: String, count: usize) {
    let events = list(&world.world(), &alias, "/api/event/events");
    assert_eq!(events.len(), count);
}

#[then("{alias} lists the latest event as {status}")]
fn lists_the_latest_event_as(world: &WorldFixture, alias: String, status: String) {
    let world = world.world();
    let id = latest_event(&world);
    let events = list(&world, &alias, "/api/event/vendor/my-events");
    let event = events
        .iter()
        .find(|event| event.get("id").and_then(Value::as_str) == Some(id.as_str()))
        .expect("latest event in own listing");
    assert_eq!(event.get("status").and_then(Value::as_str), Some(status.as_str()));
}

#[then("the latest event is named {name}")]
fn the_latest_event_is_named(world: &WorldFixture, name: String) {
    let ctx = world.world();
    let ctx = ctx.borrow();
    let body = ctx.last_body.as_ref().expect("event body");
    assert_eq!(body.get("eventName").and_then(Value::as_str), Some(name.as_str()));
}

#[then("{alias} has {count} own events")]
fn has_own_events(world: &WorldFixture, alias: String, count: usize) {
    let events = list(&world.world(), &alias, "/api/event/vendor/my-events");
    assert_eq!(events.len(), count);
}

#[scenario(
    path = "tests/features/event_moderation.feature",
    name = "Vendor events stay hidden until approved"
)]
fn vendor_events_stay_hidden_until_approved(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/event_moderation.feature",
    name = "Vendor edits send an event back to review"
)]
fn vendor_edits_send_an_event_back_to_review(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/event_moderation.feature",
    name = "Admin events are published immediately"
)]
fn admin_events_are_published_immediately(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/event_moderation.feature",
    name = "Regular users cannot submit events"
)]
fn regular_users_cannot_submit_events(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/event_moderation.feature",
    name = "Only admins delete events"
)]
fn only_admins_delete_events(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/event_moderation.feature",
    name = "Unknown moderation statuses are rejected"
)]
fn unknown_moderation_statuses_are_rejected(world: WorldFixture) {
    drop(world);
}
