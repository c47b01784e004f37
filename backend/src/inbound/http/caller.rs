//! Bearer-token extractors so handlers receive an authenticated identity.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};

use crate::domain::{Error, Identity, UserId};
use crate::inbound::http::state::HttpState;

const BEARER_SCHEME: &str = "bearer";

/// Token from an `Authorization: Bearer <token>` header, if present.
///
/// # Examples
/// ```
/// use actix_web::test::TestRequest;
/// use nightlist::inbound::http::caller::bearer_token;
///
/// let req = TestRequest::default()
///     .insert_header(("Authorization", "Bearer abc"))
///     .to_http_request();
/// assert_eq!(bearer_token(&req).as_deref(), Some("abc"));
/// ```
#[must_use]
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    Some(token.trim().to_owned()).filter(|token| !token.is_empty())
}

fn state_of(req: &HttpRequest) -> Result<web::Data<HttpState>, Error> {
    req.app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state not configured"))
}

/// Identity resolved from the request's bearer token.
///
/// Missing or invalid tokens reject the request with `401`; a token whose
/// identity was deleted yields `404`.
#[derive(Debug, Clone)]
pub struct Caller(pub Identity);

impl Caller {
    /// The authenticated identity.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

impl FromRequest for Caller {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = state_of(req);
        Box::pin(async move {
            let state = state?;
            state.guard.authenticate(token.as_deref()).await.map(Caller)
        })
    }
}

/// Subject of a valid bearer token, or `None` when absent or invalid.
#[derive(Debug, Clone, Copy)]
pub struct OptionalSubject(pub Option<UserId>);

impl FromRequest for OptionalSubject {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        ready(state_of(req).map(|state| OptionalSubject(state.guard.identify(token.as_deref()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    #[rstest]
    #[case(Some("Bearer abc"), Some("abc"))]
    #[case(Some("bearer   abc  "), Some("abc"))]
    #[case(Some("Basic abc"), None)]
    #[case(Some("Bearer"), None)]
    #[case(Some("Bearer  "), None)]
    #[case(None, None)]
    fn bearer_header_parsing(#[case] header: Option<&str>, #[case] expected: Option<&str>) {
        let mut req = TestRequest::default();
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }
        assert_eq!(bearer_token(&req.to_http_request()).as_deref(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_state_is_an_internal_error() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc"))
            .to_http_request();
        let err = Caller::extract(&req).await.expect_err("no state");
        assert_eq!(err.code(), crate::domain::ErrorCode::InternalError);
    }
}
