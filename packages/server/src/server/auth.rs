//! Identity extraction.
//!
//! Sessions are resolved upstream by the identity adapter (GitHub OAuth
//! behind a gateway), which forwards the stable user id in a header. The
//! core still enforces its own permission checks; this extractor only
//! answers "who is calling".

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;

use crate::common::UserId;

const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, resolved from the forwarded identity header.
#[derive(Debug, Clone, Copy)]
pub struct AuthedUser(pub UserId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthedUser {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing identity header"))?;

        let user_id = UserId::parse(header)
            .map_err(|_| (StatusCode::UNAUTHORIZED, "malformed identity header"))?;

        Ok(AuthedUser(user_id))
    }
}
