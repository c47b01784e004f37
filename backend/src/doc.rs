//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST path under `/api`, the health probes, the
//! error envelope schemas ([`Error`], [`ErrorCode`]) and the
//! bearer-token security scheme. Swagger UI serves it in debug builds and
//! `cargo run --bin openapi-dump` prints it for external tooling.

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::accounts::{
    ForgotPasswordBody, LoginBody, LoginResponse, ResetPasswordBody, SignupBody, SignupResponse,
};
use crate::inbound::http::admin::{
    AdminProfileBody, AdminProfileResponse, ReviewBody, ReviewResponse,
};
use crate::inbound::http::events::{EventEditBody, EventStatusBody};
use crate::inbound::http::messages::SendMessageBody;
use crate::inbound::http::profile::{
    ChangePasswordBody, DeleteAccountBody, FeedbackBody, FeedbackResponse,
};
use crate::inbound::http::views::{
    AdminEventView, BlobView, ContactView, CreatorView, EventView, IdentitySummaryView,
    MessageResponse, MessageView, ProfileView, PublicEventView, VerificationDetailView,
    VerificationStatusView,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("HS256 token issued by POST /api/auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Nightlist backend API",
        description = "Bar-event listings with age verification, moderation and direct messaging."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::accounts::signup,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::forgot_password,
        crate::inbound::http::accounts::reset_password,
        crate::inbound::http::accounts::upload_age_verification,
        crate::inbound::http::accounts::verification_status,
        crate::inbound::http::admin::pending_verifications,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::admin::user_verification,
        crate::inbound::http::admin::verify_user,
        crate::inbound::http::admin::edit_profile,
        crate::inbound::http::events::add_event,
        crate::inbound::http::events::list_events,
        crate::inbound::http::events::list_all_events,
        crate::inbound::http::events::list_own_events,
        crate::inbound::http::events::update_event_status,
        crate::inbound::http::events::edit_event,
        crate::inbound::http::events::delete_event,
        crate::inbound::http::messages::send_message,
        crate::inbound::http::messages::get_messages,
        crate::inbound::http::messages::contacts,
        crate::inbound::http::profile::get_profile,
        crate::inbound::http::profile::change_password,
        crate::inbound::http::profile::delete_account,
        crate::inbound::http::profile::feedback,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        SignupBody,
        SignupResponse,
        LoginBody,
        LoginResponse,
        ForgotPasswordBody,
        ResetPasswordBody,
        ReviewBody,
        ReviewResponse,
        AdminProfileBody,
        AdminProfileResponse,
        EventEditBody,
        EventStatusBody,
        SendMessageBody,
        ChangePasswordBody,
        DeleteAccountBody,
        FeedbackBody,
        FeedbackResponse,
        BlobView,
        IdentitySummaryView,
        ContactView,
        VerificationStatusView,
        VerificationDetailView,
        ProfileView,
        PublicEventView,
        EventView,
        CreatorView,
        AdminEventView,
        MessageView,
        MessageResponse
    )),
    tags(
        (name = "auth", description = "Signup, login, password reset and verification upload"),
        (name = "admin", description = "Verification review and admin profile"),
        (name = "events", description = "Event submission, listing and moderation"),
        (name = "messages", description = "Direct messages between users"),
        (name = "profile", description = "Own profile, password, deletion and feedback"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
