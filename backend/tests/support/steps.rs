//! Step definitions shared by every behaviour suite.

use nightlist::domain::Role;
use rstest_bdd_macros::{given, then};
use serde_json::Value;

use crate::harness::{WorldFixture, bootstrap, sign_up};

#[given("a running nightlist server")]
fn a_running_nightlist_server(world: &WorldFixture) {
    let _ = world;
}

#[given("an admin account named {alias}")]
fn an_admin_account_named(world: &WorldFixture, alias: String) {
    bootstrap(&world.world(), &alias, Role::Admin);
}

#[given("a vendor account named {alias}")]
fn a_vendor_account_named(world: &WorldFixture, alias: String) {
    bootstrap(&world.world(), &alias, Role::Vendor);
}

#[given("a signed-up user named {alias}")]
fn a_signed_up_user_named(world: &WorldFixture, alias: String) {
    sign_up(&world.world(), &alias);
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &WorldFixture, status: u16) {
    assert_eq!(world.world().borrow().last_status, Some(status));
}

#[then("the error message is \"{message}\"")]
fn the_error_message_is(world: &WorldFixture, message: String) {
    let ctx = world.world();
    let ctx = ctx.borrow();
    let body = ctx.last_body.as_ref().expect("error body");
    assert_eq!(body.get("message").and_then(Value::as_str), Some(message.as_str()));
}
