//! Port for the durable payment ledger.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::payment::{NewPayment, Payment, PaymentWithPayer};
use crate::domain::period::FeePeriod;

/// Persistence errors raised by payment ledger adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentRepositoryError {
    /// Repository connection could not be established.
    #[error("payment repository connection failed: {message}")]
    Connection {
        /// Adapter-level detail.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("payment repository query failed: {message}")]
    Query {
        /// Adapter-level detail.
        message: String,
    },
    /// Insert hit the paid-period uniqueness index; the period is already
    /// settled. Callers treat this as idempotent success.
    #[error("a paid payment already exists for this period")]
    DuplicatePaidPeriod,
}

impl PaymentRepositoryError {
    /// Connection error with the given detail.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Query error with the given detail.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Store of finalised payments. Rows are create-once and never mutated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// The paid payment covering `(user, period)`, if one exists.
    async fn find_paid(
        &self,
        user_id: Uuid,
        period: FeePeriod,
    ) -> Result<Option<Payment>, PaymentRepositoryError>;

    /// Insert a finalised payment.
    async fn insert(&self, payment: NewPayment) -> Result<Payment, PaymentRepositoryError>;

    /// One user's payments, newest first.
    async fn history_for_user(&self, user_id: Uuid)
    -> Result<Vec<Payment>, PaymentRepositoryError>;

    /// All payments joined with payer details, newest first.
    async fn history_all(&self) -> Result<Vec<PaymentWithPayer>, PaymentRepositoryError>;

    /// Every payment row; feeds the report builder.
    async fn list_all(&self) -> Result<Vec<Payment>, PaymentRepositoryError>;

    /// Distinct members with a payment reconciled during `year`.
    async fn distinct_paid_members(&self, year: i32) -> Result<i64, PaymentRepositoryError>;

    /// Sum of amounts reconciled during `year`, in major units.
    async fn collection_total(&self, year: i32) -> Result<i64, PaymentRepositoryError>;
}
