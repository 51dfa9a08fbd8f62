//! Ports: async trait seams between the domain and its adapters.
//!
//! Every external collaborator (store, gateway, mail API, report file) sits
//! behind one of these traits so services can be exercised against mocks.

mod gateway;
mod intent_repository;
mod mailer;
mod payment_repository;
mod report_writer;
mod user_repository;

pub use gateway::{GatewayError, GatewayOrder, PaymentGateway};
pub use intent_repository::{PaymentIntentRepository, PaymentIntentRepositoryError};
pub use mailer::{Mailer, MailerError, Notification};
pub use payment_repository::{PaymentRepository, PaymentRepositoryError};
pub use report_writer::{ReportWriter, ReportWriterError};
pub use user_repository::{UserRepository, UserRepositoryError};

#[cfg(test)]
pub use gateway::MockPaymentGateway;
#[cfg(test)]
pub use intent_repository::MockPaymentIntentRepository;
#[cfg(test)]
pub use mailer::MockMailer;
#[cfg(test)]
pub use payment_repository::MockPaymentRepository;
#[cfg(test)]
pub use report_writer::MockReportWriter;
#[cfg(test)]
pub use user_repository::MockUserRepository;
