//! Port for payment intent persistence.

use async_trait::async_trait;

use crate::domain::payment::{NewPaymentIntent, PaymentIntent};

/// Persistence errors raised by intent repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentIntentRepositoryError {
    /// Repository connection could not be established.
    #[error("intent repository connection failed: {message}")]
    Connection {
        /// Adapter-level detail.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("intent repository query failed: {message}")]
    Query {
        /// Adapter-level detail.
        message: String,
    },
}

impl PaymentIntentRepositoryError {
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

/// Store of in-flight checkout attempts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentIntentRepository: Send + Sync {
    /// Persist a fresh intent in the `created` state.
    async fn insert(
        &self,
        intent: NewPaymentIntent,
    ) -> Result<PaymentIntent, PaymentIntentRepositoryError>;

    /// Mark the intent owning `order_id` as paid and record the gateway
    /// payment reference.
    async fn mark_paid(
        &self,
        order_id: &str,
        payment_ref: &str,
    ) -> Result<(), PaymentIntentRepositoryError>;
}
