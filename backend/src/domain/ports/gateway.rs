//! Port for the external payment gateway.

use async_trait::async_trait;

/// Failures talking to or decoding responses from the gateway.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The gateway could not be reached.
    #[error("gateway unreachable: {message}")]
    Transport {
        /// Adapter-level detail.
        message: String,
    },
    /// The gateway answered with a non-success status.
    #[error("gateway rejected the request ({status}): {message}")]
    Rejected {
        /// HTTP status returned by the gateway.
        status: u16,
        /// Response body excerpt.
        message: String,
    },
    /// The gateway response could not be decoded.
    #[error("gateway response decode failed: {message}")]
    Decode {
        /// Adapter-level detail.
        message: String,
    },
}

impl GatewayError {
    /// Transport error with the given detail.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Decode error with the given detail.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// A remote order the gateway created to track one checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrder {
    /// Gateway-assigned order identifier.
    pub order_id: String,
    /// Amount in minor currency units, echoed by the gateway.
    pub amount_minor: i64,
    /// ISO currency code.
    pub currency: String,
}

/// Client for the external payment gateway.
///
/// `verify_signature` is pure (no I/O): it recomputes the HMAC locally from
/// the shared secret and compares in constant time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a remote order for `amount_minor` with a caller-supplied
    /// receipt label. Errors are fatal for the caller's current request.
    async fn create_order(
        &self,
        amount_minor: i64,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError>;

    /// Whether `signature` is the HMAC-SHA256 of `order_id|payment_ref`
    /// under the gateway shared secret.
    fn verify_signature(&self, order_id: &str, payment_ref: &str, signature: &str) -> bool;

    /// Public key identifier handed to clients to drive the checkout UI.
    fn key_id(&self) -> &str;
}
