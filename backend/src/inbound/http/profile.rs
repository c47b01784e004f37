//! Profile handlers under `/api/profile`.
//!
//! ```text
//! GET    /api/profile
//! PUT    /api/profile/change-password {"currentPassword":"…","newPassword":"…","confirmPassword":"…"}
//! DELETE /api/profile/delete-account {"password":"…"}
//! POST   /api/profile/feedback {"email":"…","description":"…"}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Error, PasswordChange};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::{Caller, OptionalSubject};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::credential_error;
use crate::inbound::http::views::{MessageResponse, ProfileView};

/// Body for `PUT /api/profile/change-password`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangePasswordBody {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Body for `DELETE /api/profile/delete-account`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct DeleteAccountBody {
    pub password: String,
}

/// Body for `POST /api/profile/feedback`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct FeedbackBody {
    pub email: String,
    pub description: String,
}

/// Stored feedback acknowledgement.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FeedbackResponse {
    pub message: String,
    pub id: Uuid,
}

/// The caller's profile.
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileView),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["profile"],
    operation_id = "getProfile"
)]
#[get("")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<ProfileView>> {
    let identity = state.accounts.profile(caller.identity().id()).await?;
    Ok(web::Json(ProfileView::from(&identity)))
}

/// Replace the caller's password.
#[utoipa::path(
    put,
    path = "/api/profile/change-password",
    request_body = ChangePasswordBody,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Invalid or incorrect password", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["profile"],
    operation_id = "changePassword"
)]
#[put("/change-password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<ChangePasswordBody>,
) -> ApiResult<web::Json<MessageResponse>> {
    let body = payload.into_inner();
    let change = PasswordChange::try_from_parts(
        &body.current_password,
        &body.new_password,
        &body.confirm_password,
    )
    .map_err(credential_error)?;
    state
        .accounts
        .change_password(caller.identity(), change)
        .await?;
    Ok(web::Json(MessageResponse::new("Password updated successfully")))
}

/// Delete the caller's account after confirming the password.
#[utoipa::path(
    delete,
    path = "/api/profile/delete-account",
    request_body = DeleteAccountBody,
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 400, description = "Missing or incorrect password", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["profile"],
    operation_id = "deleteAccount"
)]
#[delete("/delete-account")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<DeleteAccountBody>,
) -> ApiResult<web::Json<MessageResponse>> {
    state
        .accounts
        .delete_account(caller.identity(), &payload.password)
        .await?;
    Ok(web::Json(MessageResponse::new("Account deleted successfully")))
}

/// Store feedback. A valid token attributes it to the caller.
#[utoipa::path(
    post,
    path = "/api/profile/feedback",
    request_body = FeedbackBody,
    responses(
        (status = 201, description = "Feedback stored", body = FeedbackResponse),
        (status = 400, description = "Invalid email or description", body = Error)
    ),
    tags = ["profile"],
    operation_id = "submitFeedback",
    security([])
)]
#[post("/feedback")]
pub async fn feedback(
    state: web::Data<HttpState>,
    subject: OptionalSubject,
    payload: web::Json<FeedbackBody>,
) -> ApiResult<HttpResponse> {
    let record = state
        .feedback
        .submit(&payload.email, &payload.description, subject.0)
        .await?;
    Ok(HttpResponse::Created().json(FeedbackResponse {
        message: "Feedback submitted successfully".to_owned(),
        id: record.id,
    }))
}
