//! Reqwest-backed payment gateway adapter.
//!
//! Owns transport details only: order creation over the gateway's REST API
//! with basic auth, and local HMAC-SHA256 callback verification. The shared
//! key secret never leaves this module.

use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use url::Url;

use crate::domain::ports::{GatewayError, GatewayOrder, PaymentGateway};

type HmacSha256 = Hmac<Sha256>;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection and credential settings for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway REST API.
    pub base_url: Url,
    /// Public key identifier, also handed to checkout clients.
    pub key_id: String,
    /// Shared secret for basic auth and callback signatures.
    pub key_secret: String,
    /// ISO currency code for created orders.
    pub currency: String,
}

/// Gateway adapter performing HTTP requests against one endpoint.
pub struct HttpPaymentGateway {
    client: Client,
    orders_url: String,
    key_id: String,
    key_secret: String,
    currency: String,
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    payment_capture: u8,
}

#[derive(Deserialize)]
struct OrderDto {
    id: String,
    amount: i64,
    currency: String,
}

impl HttpPaymentGateway {
    /// Build an adapter with the default request timeout.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        Self::with_timeout(config, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    pub fn with_timeout(config: GatewayConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        let orders_url = format!(
            "{}/v1/orders",
            config.base_url.as_str().trim_end_matches('/')
        );
        Ok(Self {
            client,
            orders_url,
            key_id: config.key_id,
            key_secret: config.key_secret,
            currency: config.currency,
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> GatewayError {
    GatewayError::transport(error.to_string())
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        let response = self
            .client
            .post(&self.orders_url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderBody {
                amount: amount_minor,
                currency: &self.currency,
                receipt,
                payment_capture: 1,
            })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let order: OrderDto = response
            .json()
            .await
            .map_err(|e| GatewayError::decode(e.to_string()))?;
        Ok(GatewayOrder {
            order_id: order.id,
            amount_minor: order.amount,
            currency: order.currency,
        })
    }

    fn verify_signature(&self, order_id: &str, payment_ref: &str, signature: &str) -> bool {
        let Ok(provided) = hex::decode(signature) else {
            return false;
        };
        // verify_slice compares in constant time.
        let Ok(mut mac) = HmacSha256::new_from_slice(self.key_secret.as_bytes()) else {
            return false;
        };
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_ref.as_bytes());
        mac.verify_slice(&provided).is_ok()
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}
