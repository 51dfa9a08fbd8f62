//! Liveness and readiness probes.

use actix_web::{HttpResponse, web};
use serde_json::json;
use tracing::warn;

use crate::outbound::persistence::DbPool;

/// Process is up and serving.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses((status = 200, description = "Process is live")),
)]
pub async fn live() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Process can reach its database.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Database reachable"),
        (status = 503, description = "Database unreachable"),
    ),
)]
pub async fn ready(pool: web::Data<DbPool>) -> HttpResponse {
    match pool.get().await {
        Ok(_) => HttpResponse::Ok().json(json!({ "status": "ready" })),
        Err(error) => {
            warn!(%error, "readiness check failed");
            HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
        }
    }
}
