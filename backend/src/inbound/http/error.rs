//! HTTP rendering of domain errors.
//!
//! The domain's [`Error`] is transport agnostic; this newtype gives it an
//! actix [`ResponseError`] impl so handlers can bubble it with `?`. Internal
//! errors are redacted on the way out: the detail stays in the logs, the
//! client gets a generic message plus the trace id to quote.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode};
use crate::middleware::trace::TraceId;

/// Handler result alias used across the HTTP layer.
pub type ApiResult<T> = Result<T, ApiError>;

/// Domain error wrapped for actix.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError(Error);

impl ApiError {
    /// The wrapped domain error.
    pub fn inner(&self) -> &Error {
        &self.0
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0.code() {
            // Conflicts ride on 400: the original API reported duplicate
            // usernames and already-paid periods as plain bad requests, and
            // deployed clients key off that. The body's `code` field still
            // says `conflict`.
            ErrorCode::InvalidRequest | ErrorCode::Conflict => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = if self.0.code() == ErrorCode::InternalError {
            error!(detail = %self.0.message(), "internal error served to client");
            let redacted = Error::new(ErrorCode::InternalError, "internal server error");
            match self
                .0
                .trace_id()
                .map(str::to_owned)
                .or_else(|| TraceId::current().map(|id| id.to_string()))
            {
                Some(id) => redacted.with_trace_id(id),
                None => redacted,
            }
        } else {
            self.0.clone()
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Error::invalid_request("bad month"), StatusCode::BAD_REQUEST)]
    #[case(Error::conflict("this month already paid"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("access denied"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("admin access required"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("no such payment"), StatusCode::NOT_FOUND)]
    #[case(Error::service_unavailable("store down"), StatusCode::SERVICE_UNAVAILABLE)]
    fn maps_codes_to_statuses(#[case] error: Error, #[case] status: StatusCode) {
        assert_eq!(ApiError::from(error).status_code(), status);
    }

    #[actix_web::test]
    async fn internal_detail_is_redacted_from_the_response_body() {
        let api = ApiError::from(Error::internal("connection string leaked"));
        let response = api.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = actix_web::body::to_bytes(response.into_body())
            .await
            .expect("body bytes");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(value["code"], "internal_error");
        assert_eq!(value["message"], "internal server error");
        assert!(
            !String::from_utf8_lossy(&bytes).contains("connection string"),
            "detail must not reach the client"
        );
    }

    #[actix_web::test]
    async fn non_internal_messages_pass_through_verbatim() {
        let api = ApiError::from(Error::conflict("this month already paid"));
        let bytes = actix_web::body::to_bytes(api.error_response().into_body())
            .await
            .expect("body bytes");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(value["message"], "this month already paid");
        assert_eq!(value["code"], "conflict");
    }
}
