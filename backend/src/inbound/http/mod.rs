//! HTTP inbound adapter exposing REST endpoints.
//!
//! Every route lives under `/api`; [`configure_api`] registers them together
//! with the extractor configs that turn body, query and path failures into
//! the shared error envelope.

use actix_web::web;

pub mod accounts;
pub mod admin;
pub mod caller;
pub mod error;
pub mod events;
pub mod health;
pub mod messages;
mod multipart;
pub mod profile;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod token_config;
pub(crate) mod validation;
pub mod views;

pub use error::ApiResult;

/// Register the `/api` tree.
///
/// Expects [`state::HttpState`] in application data.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::query_config())
        .app_data(error::path_config())
        .service(
            web::scope("/api")
                .service(
                    web::scope("/auth")
                        .service(accounts::signup)
                        .service(accounts::login)
                        .service(accounts::forgot_password)
                        .service(accounts::reset_password)
                        .service(accounts::upload_age_verification)
                        .service(accounts::verification_status),
                )
                .service(
                    web::scope("/admin")
                        .service(admin::pending_verifications)
                        .service(admin::list_users)
                        .service(admin::user_verification)
                        .service(admin::verify_user)
                        .service(admin::edit_profile),
                )
                .service(
                    web::scope("/event")
                        .service(events::add_event)
                        .service(events::list_events)
                        .service(events::list_all_events)
                        .service(events::list_own_events)
                        .service(events::update_event_status)
                        .service(events::edit_event)
                        .service(events::delete_event),
                )
                .service(
                    web::scope("/messages")
                        .service(messages::send_message)
                        .service(messages::get_messages)
                        .service(messages::contacts),
                )
                .service(
                    web::scope("/profile")
                        .service(profile::get_profile)
                        .service(profile::change_password)
                        .service(profile::delete_account)
                        .service(profile::feedback),
                ),
        );
}
