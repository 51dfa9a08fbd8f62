//! Bearer-token extractors.
//!
//! `AuthenticatedUser` guards member endpoints, `AdminUser` the admin ones.
//! Status choices mirror the original API: a missing header is 401, a bad or
//! expired token is 403, and a non-admin hitting an admin route is 403.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};

use super::error::ApiError;
use crate::domain::{AuthConfig, AuthError, Error, Role, auth};
use uuid::Uuid;

/// Identity proven by a valid bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Account identifier from the token subject.
    pub id: Uuid,
    /// Login name from the token claims.
    pub username: String,
    /// Access role from the token claims.
    pub role: Role,
}

/// An [`AuthenticatedUser`] that additionally holds the admin role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser(pub AuthenticatedUser);

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    let config = req
        .app_data::<web::Data<AuthConfig>>()
        .ok_or_else(|| Error::internal("auth configuration missing from app data"))?;

    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::unauthorized("access denied"))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::unauthorized("access denied"))?;

    let claims = auth::decode_token(token, config).map_err(|err| match err {
        AuthError::TokenExpired => Error::forbidden("token expired"),
        _ => Error::forbidden("invalid token"),
    })?;

    Ok(AuthenticatedUser {
        id: claims.user_id().map_err(|_| Error::forbidden("invalid token"))?,
        username: claims.username,
        role: claims.role,
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

impl FromRequest for AdminUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|user| {
            if user.role == Role::Admin {
                Ok(Self(user))
            } else {
                Err(Error::forbidden("admin access required").into())
            }
        }))
    }
}
