//! Login and self-registration handlers.

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::ApiResult;
use super::state::HttpState;
use crate::domain::{NewRegistration, Role, User};

/// Credentials submitted to the login endpoint.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// Successful login payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// Role of the authenticated account.
    pub role: Role,
    /// Login name, echoed for display.
    pub username: String,
    /// Display name.
    pub full_name: String,
}

/// Fields for a new account. Shared shape between self-registration and the
/// admin create-user endpoint.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Desired login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
    /// Display name.
    pub full_name: String,
    /// Hostel room assignment.
    pub room_number: String,
    /// Notification address.
    pub email: String,
    /// Optional contact number.
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<RegisterRequest> for NewRegistration {
    fn from(request: RegisterRequest) -> Self {
        Self {
            username: request.username,
            password: request.password,
            full_name: request.full_name,
            room_number: request.room_number,
            email: request.email,
            phone: request.phone,
        }
    }
}

/// Acknowledgment for a created account.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// The created account, without credential material.
    pub user: User,
}

/// Authenticate with username and password.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Unknown username or wrong password"),
    ),
)]
pub async fn login(
    state: web::Data<HttpState>,
    body: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let session = state.accounts.login(&body.username, &body.password).await?;
    Ok(HttpResponse::Ok().json(LoginResponse {
        token: session.token,
        role: session.role,
        username: session.username,
        full_name: session.full_name,
    }))
}

/// Register a new member account.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Missing field or username already taken"),
    ),
)]
pub async fn register(
    state: web::Data<HttpState>,
    body: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let user = state.accounts.register(body.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "registration successful".into(),
        user,
    }))
}
