//! OpenAPI documentation configuration.
//!
//! Registers every HTTP endpoint plus the request and response schemas, and
//! declares the bearer-token security scheme. The generated document backs
//! Swagger UI in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::payment::FeePeriodFields;
use crate::domain::{Error, ErrorCode, Payment, Role, User};
use crate::inbound::http::admin::{DashboardResponse, RemindersResponse};
use crate::inbound::http::payments::{
    AdminPaymentRow, CreatePaymentRequest, CreatePaymentResponse, VerifyPaymentRequest,
    VerifyPaymentResponse,
};
use crate::inbound::http::users::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token issued by POST /api/auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Hostel fee backend API",
        description = "HTTP interface for hostel fee payments, accounts, and reporting."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::register,
        crate::inbound::http::payments::create_payment,
        crate::inbound::http::payments::verify_payment,
        crate::inbound::http::payments::history,
        crate::inbound::http::admin::students,
        crate::inbound::http::admin::dashboard,
        crate::inbound::http::admin::create_user,
        crate::inbound::http::admin::send_reminders,
        crate::inbound::http::admin::report_summary,
        crate::inbound::http::admin::report_details,
        crate::inbound::http::health::live,
        crate::inbound::http::health::ready,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Role,
        Payment,
        FeePeriodFields,
        LoginRequest,
        LoginResponse,
        RegisterRequest,
        RegisterResponse,
        CreatePaymentRequest,
        CreatePaymentResponse,
        VerifyPaymentRequest,
        VerifyPaymentResponse,
        AdminPaymentRow,
        DashboardResponse,
        RemindersResponse,
    )),
    tags(
        (name = "auth", description = "Login and registration"),
        (name = "payments", description = "Fee payments and history"),
        (name = "admin", description = "Roster, dashboard, reminders, reports"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_endpoint_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/auth/register",
            "/api/payments/create",
            "/api/payments/verify",
            "/api/payments/history",
            "/api/admin/students",
            "/api/admin/dashboard",
            "/api/admin/users",
            "/api/admin/reminders",
            "/api/admin/report/summary",
            "/api/admin/report/details",
            "/health/live",
            "/health/ready",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing documented path: {path}"
            );
        }
    }

    #[test]
    fn the_bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
