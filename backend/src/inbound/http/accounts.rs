//! Account API handlers under `/api/auth`.
//!
//! ```text
//! POST /api/auth/signup {"fullName":"Ada","email":"ada@x.com","password":"…","confirmPassword":"…","age":30}
//! POST /api/auth/login {"email":"ada@x.com","password":"…"}
//! POST /api/auth/forgot-password {"email":"ada@x.com"}
//! POST /api/auth/reset-password {"email":"…","code":"123456","newPassword":"…","confirmPassword":"…"}
//! POST /api/auth/upload-age-verification (multipart field `image`)
//! GET  /api/auth/verification-status
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Email, Error, LoginCredentials, PasswordResetRequest, SignupParts, SignupRequest,
    VERIFICATION_DOCUMENT_MAX_BYTES, VerificationService,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::multipart::{UploadLimits, collect_upload};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, credential_error, missing_field_error};
use crate::inbound::http::views::{IdentitySummaryView, MessageResponse, VerificationStatusView};

const DOCUMENT_LIMITS: UploadLimits = UploadLimits {
    file_field: "image",
    max_files: 1,
    max_file_bytes: VERIFICATION_DOCUMENT_MAX_BYTES,
};

/// Signup body for `POST /api/auth/signup`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupBody {
    #[serde(alias = "fullname")]
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub age: i64,
}

/// Identity created by signup.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SignupResponse {
    pub message: String,
    pub user: IdentitySummaryView,
}

/// Login body for `POST /api/auth/login`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// Token issued by login.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// HS256 bearer token.
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: IdentitySummaryView,
}

/// Body for `POST /api/auth/forgot-password`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ForgotPasswordBody {
    pub email: String,
}

/// Body for `POST /api/auth/reset-password`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ResetPasswordBody {
    pub email: String,
    pub code: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Register a `user` account.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupBody,
    responses(
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<SignupBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let request = SignupRequest::try_from_parts(SignupParts {
        full_name: &body.full_name,
        email: &body.email,
        password: &body.password,
        confirm_password: &body.confirm_password,
        age: body.age,
    })
    .map_err(credential_error)?;
    let identity = state.accounts.signup(request).await?;
    Ok(HttpResponse::Created().json(SignupResponse {
        message: "User created successfully".to_owned(),
        user: IdentitySummaryView::from(&identity),
    }))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginBody>,
) -> ApiResult<web::Json<LoginResponse>> {
    let body = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&body.email, &body.password).map_err(credential_error)?;
    let outcome = state.accounts.login(credentials).await?;
    Ok(web::Json(LoginResponse {
        token: outcome.token.token,
        expires_at: outcome.token.expires_at,
        user: IdentitySummaryView::from(&outcome.identity),
    }))
}

/// Email a six-digit reset code.
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordBody,
    responses(
        (status = 200, description = "Code sent", body = MessageResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown email", body = Error),
        (status = 503, description = "Mail transport unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "forgotPassword",
    security([])
)]
#[post("/forgot-password")]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    payload: web::Json<ForgotPasswordBody>,
) -> ApiResult<web::Json<MessageResponse>> {
    let raw = payload.into_inner().email;
    if raw.trim().is_empty() {
        return Err(missing_field_error(FieldName::new("email")));
    }
    let email = Email::new(&raw).map_err(|err| Error::invalid_request(err.to_string()))?;
    state.accounts.forgot_password(&email).await?;
    Ok(web::Json(MessageResponse::new("Reset code sent to email")))
}

/// Redeem a reset code and set a new password.
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordBody,
    responses(
        (status = 200, description = "Password replaced", body = MessageResponse),
        (status = 400, description = "Invalid or expired code", body = Error),
        (status = 404, description = "Unknown email", body = Error)
    ),
    tags = ["auth"],
    operation_id = "resetPassword",
    security([])
)]
#[post("/reset-password")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    payload: web::Json<ResetPasswordBody>,
) -> ApiResult<web::Json<MessageResponse>> {
    let body = payload.into_inner();
    let request = PasswordResetRequest::try_from_parts(
        &body.email,
        &body.code,
        &body.new_password,
        &body.confirm_password,
    )
    .map_err(credential_error)?;
    state.accounts.reset_password(request).await?;
    Ok(web::Json(MessageResponse::new("Password reset successful")))
}

/// Submit an age-verification document.
#[utoipa::path(
    post,
    path = "/api/auth/upload-age-verification",
    request_body(content_type = "multipart/form-data", description = "`image` part, at most 1 MiB"),
    responses(
        (status = 200, description = "Submission recorded", body = VerificationStatusView),
        (status = 400, description = "Missing or invalid image", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a user account", body = Error),
        (status = 409, description = "Already approved", body = Error)
    ),
    tags = ["auth"],
    operation_id = "uploadAgeVerification"
)]
#[post("/upload-age-verification")]
pub async fn upload_age_verification(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: Multipart,
) -> ApiResult<web::Json<VerificationStatusView>> {
    VerificationService::admit_submission(caller.identity())?;
    let mut form = collect_upload(payload, DOCUMENT_LIMITS).await?;
    let document = form
        .images
        .pop()
        .ok_or_else(|| missing_field_error(FieldName::new(DOCUMENT_LIMITS.file_field)))?;
    let view = state
        .verification
        .submit(caller.identity(), document)
        .await?;
    Ok(web::Json(view.into()))
}

/// Caller's own verification status.
#[utoipa::path(
    get,
    path = "/api/auth/verification-status",
    responses(
        (status = 200, description = "Current status", body = VerificationStatusView),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["auth"],
    operation_id = "verificationStatus"
)]
#[get("/verification-status")]
pub async fn verification_status(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<VerificationStatusView>> {
    let view = state.verification.status(caller.identity()).await?;
    Ok(web::Json(view.into()))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
