//! Server construction: adapter wiring, route table, and middleware.

mod config;

pub use config::AppConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use chrono::Utc;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use hostel_backend::Trace;
#[cfg(debug_assertions)]
use hostel_backend::doc::ApiDoc;
use hostel_backend::domain::effects::best_effort;
use hostel_backend::domain::{
    AccountService, AuthConfig, FeeService, FeeServiceDeps, ReportService,
};
use hostel_backend::inbound::http::state::HttpState;
use hostel_backend::inbound::http::{admin, health, payments, users};
use hostel_backend::outbound::gateway::HttpPaymentGateway;
use hostel_backend::outbound::mail::HttpMailer;
use hostel_backend::outbound::persistence::{
    DbPool, DieselIntentRepository, DieselPaymentRepository, DieselUserRepository,
};
use hostel_backend::outbound::report::CsvReportWriter;

/// Assemble the domain services over their production adapters.
fn build_http_state(config: &AppConfig, pool: DbPool) -> std::io::Result<web::Data<HttpState>> {
    let user_repo = Arc::new(DieselUserRepository::new(pool.clone()));
    let payment_repo = Arc::new(DieselPaymentRepository::new(pool.clone()));
    let intent_repo = Arc::new(DieselIntentRepository::new(pool));

    let gateway = Arc::new(
        HttpPaymentGateway::new(config.gateway())
            .map_err(|e| std::io::Error::other(format!("gateway client build failed: {e}")))?,
    );
    let mailer = Arc::new(
        HttpMailer::new(config.mail())
            .map_err(|e| std::io::Error::other(format!("mail client build failed: {e}")))?,
    );
    let writer = Arc::new(CsvReportWriter::new(&config.report_dir));

    let reports = Arc::new(ReportService::new(
        user_repo.clone(),
        payment_repo.clone(),
        writer,
        config.fee(),
    ));
    let accounts = Arc::new(AccountService::new(
        user_repo.clone(),
        mailer.clone(),
        config.auth(),
    ));
    let fees = Arc::new(FeeService::new(
        config.fee(),
        FeeServiceDeps {
            users: user_repo,
            payments: payment_repo,
            intents: intent_repo,
            gateway,
            mailer,
            reports: reports.clone(),
        },
    ));

    Ok(web::Data::new(HttpState {
        accounts,
        fees,
        reports,
        report_dir: config.report_dir.clone(),
    }))
}

fn build_app(
    http_state: web::Data<HttpState>,
    auth_config: web::Data<AuthConfig>,
    pool: web::Data<DbPool>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api")
        .route("/auth/login", web::post().to(users::login))
        .route("/auth/register", web::post().to(users::register))
        .route("/payments/create", web::post().to(payments::create_payment))
        .route("/payments/verify", web::post().to(payments::verify_payment))
        .route("/payments/history", web::get().to(payments::history))
        .route("/admin/students", web::get().to(admin::students))
        .route("/admin/dashboard", web::get().to(admin::dashboard))
        .route("/admin/users", web::post().to(admin::create_user))
        .route("/admin/reminders", web::post().to(admin::send_reminders))
        .route("/admin/report/summary", web::get().to(admin::report_summary))
        .route("/admin/report/details", web::get().to(admin::report_details));

    let app = App::new()
        .app_data(http_state)
        .app_data(auth_config)
        .app_data(pool)
        .wrap(Trace)
        .service(api)
        .route("/health/live", web::get().to(health::live))
        .route("/health/ready", web::get().to(health::ready));

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Build the HTTP server. Also refreshes the report once so a download works
/// before the first payment of the day.
pub async fn create_server(config: AppConfig, pool: DbPool) -> std::io::Result<Server> {
    let http_state = build_http_state(&config, pool.clone())?;
    let auth_config = web::Data::new(config.auth());
    let pool_data = web::Data::new(pool);

    best_effort(
        "startup report refresh",
        http_state.reports.refresh(Utc::now()),
    )
    .await;

    let server = HttpServer::new(move || {
        build_app(
            http_state.clone(),
            auth_config.clone(),
            pool_data.clone(),
        )
    })
    .bind(&config.bind_addr)?
    .run();

    Ok(server)
}
