//! Caller identity extractor.
//!
//! Sessions are resolved upstream; the gateway forwards the authenticated
//! user id in [`USER_ID_HEADER`].

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use std::future::{Ready, ready};

use super::error::AppError;

/// Header carrying the authenticated user id.
pub static USER_ID_HEADER: &str = "X-User-Id";

/// Authenticated user identity extractor.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user_id = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match user_id {
            Some(user_id) => ready(Ok(Identity {
                user_id: user_id.to_string(),
            })),
            None => ready(Err(AppError::Unauthorized)),
        }
    }
}
