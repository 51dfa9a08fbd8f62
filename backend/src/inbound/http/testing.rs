//! Shared fixtures for handler tests: an [`HttpState`] assembled from mocks.

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::http::header;
use actix_web::web;
use uuid::Uuid;

use super::state::HttpState;
use crate::domain::ports::{
    MockMailer, MockPaymentGateway, MockPaymentIntentRepository, MockPaymentRepository,
    MockReportWriter, MockUserRepository,
};
use crate::domain::{
    AccountService, AuthConfig, FeeSchedule, FeeService, FeeServiceDeps, ReportService, Role, auth,
};

/// Signing config every handler test shares.
pub(crate) fn auth_config() -> AuthConfig {
    AuthConfig::new("handler-test-secret")
}

/// An `Authorization` header for a freshly issued token.
pub(crate) fn bearer(user_id: Uuid, username: &str, role: Role) -> (header::HeaderName, String) {
    let token = auth::issue_token(user_id, username, role, &auth_config()).expect("issue token");
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

/// Mock collaborators for one handler test. Configure expectations on the
/// fields, then call [`TestDeps::into_state`].
pub(crate) struct TestDeps {
    pub users: MockUserRepository,
    pub payments: MockPaymentRepository,
    pub intents: MockPaymentIntentRepository,
    pub gateway: MockPaymentGateway,
    pub mailer: MockMailer,
    pub fee_mailer: MockMailer,
    pub writer: MockReportWriter,
    pub report_dir: PathBuf,
}

impl Default for TestDeps {
    fn default() -> Self {
        Self {
            users: MockUserRepository::new(),
            payments: MockPaymentRepository::new(),
            intents: MockPaymentIntentRepository::new(),
            gateway: MockPaymentGateway::new(),
            mailer: MockMailer::new(),
            fee_mailer: MockMailer::new(),
            writer: MockReportWriter::new(),
            report_dir: std::env::temp_dir(),
        }
    }
}

impl TestDeps {
    /// Assemble real services over the configured mocks. The repositories are
    /// shared between the services, as in production wiring.
    pub fn into_state(self) -> web::Data<HttpState> {
        let users: Arc<MockUserRepository> = Arc::new(self.users);
        let payments: Arc<MockPaymentRepository> = Arc::new(self.payments);
        let fee = FeeSchedule::default();

        let reports = Arc::new(ReportService::new(
            users.clone(),
            payments.clone(),
            Arc::new(self.writer),
            fee.clone(),
        ));
        let accounts = Arc::new(AccountService::new(
            users.clone(),
            Arc::new(self.mailer),
            auth_config(),
        ));

        let fees = Arc::new(FeeService::new(
            fee,
            FeeServiceDeps {
                users,
                payments,
                intents: Arc::new(self.intents),
                gateway: Arc::new(self.gateway),
                mailer: Arc::new(self.fee_mailer),
                reports: reports.clone(),
            },
        ));

        web::Data::new(HttpState {
            accounts,
            fees,
            reports,
            report_dir: self.report_dir,
        })
    }
}
