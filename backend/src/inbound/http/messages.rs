//! Direct messaging handlers under `/api/messages`.
//!
//! ```text
//! POST /api/messages/send-message/{userId} {"message":"hello"}
//! GET  /api/messages/get-messages/{userId}
//! GET  /api/messages/contacts
//! ```
//!
//! Delivery to an online receiver happens over `/ws`; these endpoints only
//! store and read history.

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, MessageBody};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::Caller;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_user_id};
use crate::inbound::http::views::{ContactView, MessageView};

/// Body for `POST /api/messages/send-message/{userId}`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct SendMessageBody {
    #[schema(example = "See you at the Anchor?")]
    pub message: String,
}

/// Send a message to another account.
#[utoipa::path(
    post,
    path = "/api/messages/send-message/{userId}",
    params(("userId" = String, Path, description = "Receiver identifier")),
    request_body = SendMessageBody,
    responses(
        (status = 200, description = "Message stored", body = MessageView),
        (status = 400, description = "Empty message or self-addressed", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown receiver", body = Error)
    ),
    tags = ["messages"],
    operation_id = "sendMessage"
)]
#[post("/send-message/{user_id}")]
pub async fn send_message(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<SendMessageBody>,
) -> ApiResult<web::Json<MessageView>> {
    let receiver = parse_user_id(&path.into_inner(), FieldName::new("userId"))?;
    let body = MessageBody::new(payload.into_inner().message)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let message = state
        .messaging
        .send(caller.identity(), &receiver, body)
        .await?;
    Ok(web::Json(MessageView::from(&message)))
}

/// Conversation history with another account, oldest first.
#[utoipa::path(
    get,
    path = "/api/messages/get-messages/{userId}",
    params(("userId" = String, Path, description = "Counterparty identifier")),
    responses(
        (status = 200, description = "Messages in send order", body = [MessageView]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No conversation yet", body = Error)
    ),
    tags = ["messages"],
    operation_id = "getMessages"
)]
#[get("/get-messages/{user_id}")]
pub async fn get_messages(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<MessageView>>> {
    let counterparty = parse_user_id(&path.into_inner(), FieldName::new("userId"))?;
    let messages = state
        .messaging
        .thread(caller.identity(), &counterparty)
        .await?;
    Ok(web::Json(messages.iter().map(MessageView::from).collect()))
}

/// Users the caller can message.
#[utoipa::path(
    get,
    path = "/api/messages/contacts",
    responses(
        (status = 200, description = "Other user accounts", body = [ContactView]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["messages"],
    operation_id = "listContacts"
)]
#[get("/contacts")]
pub async fn contacts(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<ContactView>>> {
    let contacts = state.messaging.contacts(caller.identity()).await?;
    Ok(web::Json(contacts.iter().map(ContactView::from).collect()))
}
