//! Domain model and services, independent of HTTP and persistence.
//!
//! Adapters depend on this module; it depends on nothing outside the ports it
//! declares in [`ports`].

pub mod accounts;
pub mod auth;
pub mod effects;
pub mod error;
pub mod fees;
pub mod payment;
pub mod period;
pub mod ports;
pub mod report;
pub mod user;

pub use accounts::{AccountService, LoginSession, NewRegistration};
pub use auth::{AccessClaims, AuthConfig, AuthError};
pub use error::{Error, ErrorCode};
pub use fees::{
    ConfirmedPayment, DashboardStats, FeeService, FeeServiceDeps, PaymentConfirmation,
    PaymentInitiation, ReminderOutcome,
};
pub use payment::{FeeSchedule, NewPayment, NewPaymentIntent, Payment, PaymentWithPayer};
pub use period::FeePeriod;
pub use report::{ReportService, ReportSnapshot};
pub use user::{NewUser, Role, User, UserAccount};
