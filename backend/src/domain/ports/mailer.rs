//! Port for the transactional mail sender.

use async_trait::async_trait;

use crate::domain::period::FeePeriod;

/// Failures raised by mail adapters. Callers treat sends as best-effort and
/// only ever log these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailerError {
    /// The mail API could not be reached.
    #[error("mail API unreachable: {message}")]
    Transport {
        /// Adapter-level detail.
        message: String,
    },
    /// The mail API answered with a non-success status.
    #[error("mail API rejected the send ({status}): {message}")]
    Rejected {
        /// HTTP status returned by the API.
        status: u16,
        /// Response body excerpt.
        message: String,
    },
}

impl MailerError {
    /// Transport error with the given detail.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// The four templated notifications this system sends.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Sent after self-registration.
    Welcome {
        /// Recipient address.
        to: String,
        /// Recipient display name.
        name: String,
        /// Login name to echo back.
        username: String,
    },
    /// Sent when an admin creates an account; includes the issued password.
    Credentials {
        /// Recipient address.
        to: String,
        /// Recipient display name.
        name: String,
        /// Login name to echo back.
        username: String,
        /// Plaintext password issued by the admin.
        password: String,
    },
    /// Sent after a payment reconciles.
    PaymentConfirmation {
        /// Recipient address.
        to: String,
        /// Recipient display name.
        name: String,
        /// Period the payment covered.
        period: FeePeriod,
        /// Amount in major units.
        amount: i64,
    },
    /// Sent to members with an outstanding current period.
    PaymentReminder {
        /// Recipient address.
        to: String,
        /// Recipient display name.
        name: String,
        /// The due period.
        period: FeePeriod,
        /// Amount in major units.
        amount: i64,
    },
}

/// Transactional mail sender. No queue, no retry: a failed send is lost.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one notification.
    async fn send(&self, notification: Notification) -> Result<(), MailerError>;
}
