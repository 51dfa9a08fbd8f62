//! Admin-only handlers: roster, dashboard, account creation, reminders, and
//! report downloads.

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use super::auth::AdminUser;
use super::error::ApiResult;
use super::state::HttpState;
use super::users::{RegisterRequest, RegisterResponse};
use crate::domain::effects::best_effort;
use crate::domain::report::{DETAILS_FILE, SUMMARY_FILE};
use crate::domain::{Error, User};

/// Aggregate figures for the admin dashboard.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Member accounts in the system.
    pub total_students: i64,
    /// Distinct members with a payment this year.
    pub paid_members: i64,
    /// Members without any payment this year.
    pub due_members: i64,
    /// Amount collected this year, major units.
    pub total_collection: i64,
    /// Outstanding amount for a full year of fees.
    pub due_amount: i64,
}

/// Result of a reminder sweep.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemindersResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// Members with the current period outstanding.
    pub total_due: usize,
    /// Reminder emails accepted by the mail API.
    pub sent: usize,
}

/// List all member accounts.
#[utoipa::path(
    get,
    path = "/api/admin/students",
    tag = "admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Member roster", body = [User]),
        (status = 403, description = "Caller is not an admin"),
    ),
)]
pub async fn students(_admin: AdminUser, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let students = state.accounts.list_students().await?;
    Ok(HttpResponse::Ok().json(students))
}

/// Aggregate fee figures for the current year.
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Dashboard figures", body = DashboardResponse),
        (status = 403, description = "Caller is not an admin"),
    ),
)]
pub async fn dashboard(_admin: AdminUser, state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let stats = state.fees.dashboard_stats(Utc::now()).await?;
    Ok(HttpResponse::Ok().json(DashboardResponse {
        total_students: stats.total_students,
        paid_members: stats.paid_members,
        due_members: stats.due_members,
        total_collection: stats.total_collection,
        due_amount: stats.due_amount,
    }))
}

/// Create a member account on a resident's behalf. The issued password is
/// emailed to them.
#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "admin",
    request_body = RegisterRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Missing field or username already taken"),
        (status = 403, description = "Caller is not an admin"),
    ),
)]
pub async fn create_user(
    _admin: AdminUser,
    state: web::Data<HttpState>,
    body: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .accounts
        .create_member(body.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "user created".into(),
        user,
    }))
}

/// Email a payment reminder to every member with the current month unpaid.
#[utoipa::path(
    post,
    path = "/api/admin/reminders",
    tag = "admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Sweep finished", body = RemindersResponse),
        (status = 403, description = "Caller is not an admin"),
    ),
)]
pub async fn send_reminders(
    _admin: AdminUser,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    let outcome = state.fees.send_reminders(Utc::now()).await?;
    Ok(HttpResponse::Ok().json(RemindersResponse {
        message: format!("sent {} of {} reminders", outcome.sent, outcome.total_due),
        total_due: outcome.total_due,
        sent: outcome.sent,
    }))
}

async fn serve_report_file(state: &HttpState, file_name: &str) -> ApiResult<HttpResponse> {
    // Refresh so the download reflects the stores right now; if it fails the
    // previous artefact is still worth serving.
    best_effort("report refresh for download", state.reports.refresh(Utc::now())).await;

    let path = state.report_dir.join(file_name);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| Error::service_unavailable("report not available yet"))?;
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/csv; charset=utf-8"))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        ))
        .body(bytes))
}

/// Download the summary sheet of the fee report.
#[utoipa::path(
    get,
    path = "/api/admin/report/summary",
    tag = "admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "CSV summary sheet", content_type = "text/csv"),
        (status = 403, description = "Caller is not an admin"),
        (status = 503, description = "No report has been generated yet"),
    ),
)]
pub async fn report_summary(
    _admin: AdminUser,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    serve_report_file(&state, SUMMARY_FILE).await
}

/// Download the member-by-month details sheet of the fee report.
#[utoipa::path(
    get,
    path = "/api/admin/report/details",
    tag = "admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "CSV details sheet", content_type = "text/csv"),
        (status = 403, description = "Caller is not an admin"),
        (status = 503, description = "No report has been generated yet"),
    ),
)]
pub async fn report_details(
    _admin: AdminUser,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    serve_report_file(&state, DETAILS_FILE).await
}
