//! Admin review handlers under `/api/admin`.
//!
//! ```text
//! GET /api/admin/pending-verifications
//! GET /api/admin/users?status=pending&role=user
//! GET /api/admin/user-verification/{id}
//! PUT /api/admin/verify-user/{id} {"status":"approved","comment":"…"}
//! PUT /api/admin/edit-profile {"fullName":"…","email":"…","contactNo":"…","address":"…"}
//! ```

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{AdminProfileEdit, Email, Error, FullName};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_identity_filter, parse_user_id};
use crate::inbound::http::views::{IdentitySummaryView, ProfileView, VerificationDetailView};

/// Query for `GET /api/admin/users`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct UserListQuery {
    /// `pending`, `approved`, `rejected` or `not_applicable`.
    pub status: Option<String>,
    /// `user`, `admin` or `vendor`.
    pub role: Option<String>,
}

/// Review decision for `PUT /api/admin/verify-user/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct ReviewBody {
    /// `approved` or `rejected`.
    pub status: String,
    pub comment: Option<String>,
}

/// Outcome of a verification review.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ReviewResponse {
    pub message: String,
    pub user: IdentitySummaryView,
}

/// Body for `PUT /api/admin/edit-profile`. Absent fields are kept.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminProfileBody {
    #[serde(alias = "userName")]
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub contact_no: Option<String>,
    pub address: Option<String>,
}

/// Updated admin profile.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AdminProfileResponse {
    pub success: bool,
    pub data: ProfileView,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

impl AdminProfileBody {
    fn into_edit(self) -> Result<AdminProfileEdit, Error> {
        let invalid = |err: crate::domain::IdentityValidationError| {
            Error::invalid_request(err.to_string())
        };
        Ok(AdminProfileEdit {
            full_name: non_blank(self.full_name)
                .map(FullName::new)
                .transpose()
                .map_err(invalid)?,
            email: non_blank(self.email)
                .map(Email::new)
                .transpose()
                .map_err(invalid)?,
            contact_no: self.contact_no,
            address: self.address,
        })
    }
}

/// Users with a submitted document awaiting review.
#[utoipa::path(
    get,
    path = "/api/admin/pending-verifications",
    responses(
        (status = 200, description = "Pending submissions", body = [VerificationDetailView]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin only", body = Error)
    ),
    tags = ["admin"],
    operation_id = "pendingVerifications"
)]
#[get("/pending-verifications")]
pub async fn pending_verifications(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<VerificationDetailView>>> {
    let pending = state.verification.list_pending(caller.identity()).await?;
    Ok(web::Json(
        pending.iter().map(VerificationDetailView::from).collect(),
    ))
}

/// Accounts filtered by verification status and role.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Matching accounts", body = [IdentitySummaryView]),
        (status = 400, description = "Unknown status or role", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin only", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<UserListQuery>,
) -> ApiResult<web::Json<Vec<IdentitySummaryView>>> {
    let filter = parse_identity_filter(query.status.as_deref(), query.role.as_deref())?;
    let users = state
        .verification
        .list_identities(caller.identity(), filter)
        .await?;
    Ok(web::Json(users.iter().map(IdentitySummaryView::from).collect()))
}

/// One account with its verification document.
#[utoipa::path(
    get,
    path = "/api/admin/user-verification/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Verification detail", body = VerificationDetailView),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["admin"],
    operation_id = "userVerification"
)]
#[get("/user-verification/{id}")]
pub async fn user_verification(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<VerificationDetailView>> {
    let target = parse_user_id(&path.into_inner(), FieldName::new("id"))?;
    let identity = state.verification.detail(caller.identity(), &target).await?;
    Ok(web::Json(VerificationDetailView::from(&identity)))
}

/// Approve or reject a submission.
#[utoipa::path(
    put,
    path = "/api/admin/verify-user/{id}",
    params(("id" = String, Path, description = "User identifier")),
    request_body = ReviewBody,
    responses(
        (status = 200, description = "Review recorded", body = ReviewResponse),
        (status = 400, description = "Invalid status", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["admin"],
    operation_id = "verifyUser"
)]
#[put("/verify-user/{id}")]
pub async fn verify_user(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<ReviewBody>,
) -> ApiResult<web::Json<ReviewResponse>> {
    let target = parse_user_id(&path.into_inner(), FieldName::new("id"))?;
    let ReviewBody { status, comment } = payload.into_inner();
    let identity = state
        .verification
        .review(caller.identity(), &target, &status, comment)
        .await?;
    Ok(web::Json(ReviewResponse {
        message: format!("User verification {}", identity.verification_status()),
        user: IdentitySummaryView::from(&identity),
    }))
}

/// Update the calling admin's own profile.
#[utoipa::path(
    put,
    path = "/api/admin/edit-profile",
    request_body = AdminProfileBody,
    responses(
        (status = 200, description = "Profile updated", body = AdminProfileResponse),
        (status = 400, description = "Invalid field", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 409, description = "Email already in use", body = Error)
    ),
    tags = ["admin"],
    operation_id = "editAdminProfile"
)]
#[put("/edit-profile")]
pub async fn edit_profile(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<AdminProfileBody>,
) -> ApiResult<web::Json<AdminProfileResponse>> {
    let edit = payload.into_inner().into_edit()?;
    let identity = state
        .accounts
        .edit_admin_profile(caller.identity(), edit)
        .await?;
    Ok(web::Json(AdminProfileResponse {
        success: true,
        data: ProfileView::from(&identity),
    }))
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
