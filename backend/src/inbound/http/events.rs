//! Event listing and moderation handlers under `/api/event`.
//!
//! ```text
//! POST   /api/event/add-new-events (multipart: text fields + up to 3 `images`)
//! GET    /api/event/events
//! GET    /api/event/admin/all-events
//! GET    /api/event/vendor/my-events
//! PATCH  /api/event/admin/event-status/{id} {"status":"approved","comment":"…"}
//! PUT    /api/event/events/{id} {"eventName":"…","coverCharge":5}
//! DELETE /api/event/admin/events/{id}
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::{
    EVENT_IMAGE_MAX_BYTES, EVENT_IMAGES_MAX, Error, EventDetails, EventFields, EventPatch,
    EventValidationError, RoleRequirement, authorize,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::multipart::{UploadForm, UploadLimits, collect_upload};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_event_id};
use crate::inbound::http::views::{AdminEventView, EventView, MessageResponse, PublicEventView};

const EVENT_LIMITS: UploadLimits = UploadLimits {
    file_field: "images",
    max_files: EVENT_IMAGES_MAX,
    max_file_bytes: EVENT_IMAGE_MAX_BYTES,
};

/// JSON body for `PUT /api/event/events/{id}`. Absent fields are kept.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct EventEditBody {
    pub event_name: Option<String>,
    pub bar: Option<String>,
    pub location: Option<String>,
    pub cover_charge: Option<f64>,
    pub description: Option<String>,
    pub map_reference: Option<String>,
}

impl From<EventEditBody> for EventFields {
    fn from(body: EventEditBody) -> Self {
        Self {
            name: body.event_name,
            bar: body.bar,
            location: body.location,
            cover_charge: body.cover_charge,
            description: body.description,
            map_reference: body.map_reference,
        }
    }
}

/// Moderation decision for an event.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct EventStatusBody {
    /// `pending`, `approved` or `rejected`.
    pub status: String,
    pub comment: Option<String>,
}

fn event_error(error: EventValidationError) -> Error {
    match error {
        EventValidationError::MissingField { field } => missing_field_error(FieldName::new(field)),
        EventValidationError::InvalidCoverCharge => Error::invalid_request(error.to_string())
            .with_details(serde_json::json!({ "field": "coverCharge" })),
        other => Error::invalid_request(other.to_string()),
    }
}

fn cover_charge_field(form: &mut UploadForm) -> Result<Option<f64>, Error> {
    form.take_text("coverCharge")
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| event_error(EventValidationError::InvalidCoverCharge))
        })
        .transpose()
}

fn event_fields(form: &mut UploadForm) -> Result<EventFields, Error> {
    Ok(EventFields {
        cover_charge: cover_charge_field(form)?,
        name: form.take_text("eventName"),
        bar: form.take_text("bar"),
        location: form.take_text("location"),
        description: form.take_text("description"),
        map_reference: form.take_text("mapReference"),
    })
}

/// Submit a new event. Vendor submissions wait for review.
#[utoipa::path(
    post,
    path = "/api/event/add-new-events",
    request_body(
        content_type = "multipart/form-data",
        description = "eventName, bar, location, coverCharge, description, mapReference and up to 3 `images` parts of at most 5 MiB"
    ),
    responses(
        (status = 201, description = "Event stored", body = EventView),
        (status = 400, description = "Missing or invalid field", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admins and vendors only", body = Error)
    ),
    tags = ["events"],
    operation_id = "addEvent"
)]
#[post("/add-new-events")]
pub async fn add_event(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    authorize(caller.identity(), RoleRequirement::AdminOrVendor)?;
    let mut form = collect_upload(payload, EVENT_LIMITS).await?;
    let details = EventDetails::try_from_fields(event_fields(&mut form)?).map_err(event_error)?;
    let event = state
        .moderation
        .create(caller.identity(), details, form.images)
        .await?;
    Ok(HttpResponse::Created().json(EventView::from(&event)))
}

/// Approved events.
#[utoipa::path(
    get,
    path = "/api/event/events",
    responses(
        (status = 200, description = "Approved events", body = [PublicEventView]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["events"],
    operation_id = "listEvents"
)]
#[get("/events")]
pub async fn list_events(
    state: web::Data<HttpState>,
    _caller: Caller,
) -> ApiResult<web::Json<Vec<PublicEventView>>> {
    let events = state.moderation.list_public().await?;
    Ok(web::Json(events.iter().map(PublicEventView::from).collect()))
}

/// Every event with its creator.
#[utoipa::path(
    get,
    path = "/api/event/admin/all-events",
    responses(
        (status = 200, description = "All events", body = [AdminEventView]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Admin only", body = Error)
    ),
    tags = ["events"],
    operation_id = "listAllEvents"
)]
#[get("/admin/all-events")]
pub async fn list_all_events(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<AdminEventView>>> {
    let listings = state.moderation.list_all(caller.identity()).await?;
    Ok(web::Json(listings.iter().map(AdminEventView::from).collect()))
}

/// Events created by the calling vendor.
#[utoipa::path(
    get,
    path = "/api/event/vendor/my-events",
    responses(
        (status = 200, description = "Own events", body = [EventView]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Vendors only", body = Error)
    ),
    tags = ["events"],
    operation_id = "listOwnEvents"
)]
#[get("/vendor/my-events")]
pub async fn list_own_events(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<EventView>>> {
    let events = state.moderation.list_own(caller.identity()).await?;
    Ok(web::Json(events.iter().map(EventView::from).collect()))
}

/// Set an event's moderation state.
#[utoipa::path(
    patch,
    path = "/api/event/admin/event-status/{id}",
    params(("id" = String, Path, description = "Event identifier")),
    request_body = EventStatusBody,
    responses(
        (status = 200, description = "Status recorded", body = EventView),
        (status = 400, description = "Invalid status or identifier", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["events"],
    operation_id = "updateEventStatus"
)]
#[patch("/admin/event-status/{id}")]
pub async fn update_event_status(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<EventStatusBody>,
) -> ApiResult<web::Json<EventView>> {
    let id = parse_event_id(&path.into_inner(), FieldName::new("id"))?;
    let EventStatusBody { status, comment } = payload.into_inner();
    let event = state
        .moderation
        .update_status(caller.identity(), &id, &status, comment)
        .await?;
    Ok(web::Json(EventView::from(&event)))
}

/// Edit an event's content. Vendor edits send it back for review.
#[utoipa::path(
    put,
    path = "/api/event/events/{id}",
    params(("id" = String, Path, description = "Event identifier")),
    request_body = EventEditBody,
    responses(
        (status = 200, description = "Event updated", body = EventView),
        (status = 400, description = "Invalid field", body = Error),
        (status = 403, description = "Neither creator nor admin", body = Error),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["events"],
    operation_id = "editEvent"
)]
#[put("/events/{id}")]
pub async fn edit_event(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<EventEditBody>,
) -> ApiResult<web::Json<EventView>> {
    let id = parse_event_id(&path.into_inner(), FieldName::new("id"))?;
    let patch = EventPatch::try_from_fields(payload.into_inner().into()).map_err(event_error)?;
    let event = state.moderation.edit(caller.identity(), &id, patch).await?;
    Ok(web::Json(EventView::from(&event)))
}

/// Remove an event permanently.
#[utoipa::path(
    delete,
    path = "/api/event/admin/events/{id}",
    params(("id" = String, Path, description = "Event identifier")),
    responses(
        (status = 200, description = "Event deleted", body = MessageResponse),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "Unknown event", body = Error)
    ),
    tags = ["events"],
    operation_id = "deleteEvent"
)]
#[delete("/admin/events/{id}")]
pub async fn delete_event(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let id = parse_event_id(&path.into_inner(), FieldName::new("id"))?;
    state.moderation.delete(caller.identity(), &id).await?;
    Ok(web::Json(MessageResponse::new("Event deleted successfully")))
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
