//! Payment records: provisional intents and the durable payment ledger.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::period::FeePeriod;

/// Fee amounts charged per period, in major currency units.
#[derive(Debug, Clone)]
pub struct FeeSchedule {
    /// Flat monthly fee; no proration or partial payments.
    pub monthly_fee: i64,
    /// ISO currency code sent to the gateway.
    pub currency: String,
}

impl FeeSchedule {
    /// The monthly fee in minor currency units, as gateways expect.
    pub fn monthly_fee_minor(&self) -> i64 {
        self.monthly_fee * 100
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            monthly_fee: 500,
            currency: "INR".into(),
        }
    }
}

/// Lifecycle of a payment intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum IntentStatus {
    /// Gateway order created; payment not yet confirmed.
    Created,
    /// Signed callback verified; a durable payment exists.
    Paid,
}

impl IntentStatus {
    /// Stable string form stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Paid => "paid",
        }
    }

    /// Parse the stored string form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created" => Some(Self::Created),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }
}

/// A provisional record of one checkout attempt, created before the gateway
/// confirms success. Loosely linked to [`Payment`] via (user, period).
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntent {
    /// Primary identifier.
    pub id: Uuid,
    /// Paying user.
    pub user_id: Uuid,
    /// Fee period the checkout covers.
    pub period: FeePeriod,
    /// Amount in major currency units.
    pub amount: i64,
    /// Gateway order identifier; unique per intent.
    pub order_id: String,
    /// Gateway payment identifier, filled when the callback verifies.
    pub payment_ref: Option<String>,
    /// Lifecycle state.
    pub status: IntentStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Fields for persisting a fresh intent.
#[derive(Debug, Clone)]
pub struct NewPaymentIntent {
    /// Paying user.
    pub user_id: Uuid,
    /// Fee period the checkout covers.
    pub period: FeePeriod,
    /// Amount in major currency units.
    pub amount: i64,
    /// Gateway order identifier returned by order creation.
    pub order_id: String,
}

/// The durable, authoritative record that a fee period has been paid.
/// Create-once; never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Primary identifier.
    pub id: Uuid,
    /// Paying user.
    pub user_id: Uuid,
    /// Fee period covered.
    #[serde(flatten)]
    pub period: FeePeriodFields,
    /// Amount in major currency units.
    pub amount: i64,
    /// Always `"paid"`; partial or failed payments are never persisted.
    pub status: String,
    /// Gateway payment identifier.
    pub payment_ref: String,
    /// When the payment was reconciled.
    pub paid_at: DateTime<Utc>,
}

/// Month/year pair flattened into payment JSON for API compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct FeePeriodFields {
    /// Month ordinal in `1..=12`.
    pub month: u8,
    /// Calendar year.
    pub year: i32,
}

impl From<FeePeriod> for FeePeriodFields {
    fn from(period: FeePeriod) -> Self {
        Self {
            month: period.month(),
            year: period.year(),
        }
    }
}

impl Payment {
    /// The validated fee period this payment covers.
    ///
    /// Rows are validated on the way out of the store, so this conversion
    /// cannot fail for persisted payments.
    pub fn period(&self) -> Option<FeePeriod> {
        FeePeriod::try_new(self.period.month, self.period.year).ok()
    }
}

/// Fields for inserting a finalised payment.
#[derive(Debug, Clone)]
pub struct NewPayment {
    /// Paying user.
    pub user_id: Uuid,
    /// Fee period covered.
    pub period: FeePeriod,
    /// Amount in major currency units.
    pub amount: i64,
    /// Gateway payment identifier from the verified callback.
    pub payment_ref: String,
}

/// A payment joined with payer details, for the admin history view.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentWithPayer {
    /// The payment record.
    pub payment: Payment,
    /// Payer's login name.
    pub username: String,
    /// Payer's display name.
    pub full_name: String,
    /// Payer's room assignment.
    pub room_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_schedule_defaults_match_the_hostel_tariff() {
        let fee = FeeSchedule::default();
        assert_eq!(fee.monthly_fee, 500);
        assert_eq!(fee.monthly_fee_minor(), 50_000);
        assert_eq!(fee.currency, "INR");
    }

    #[test]
    fn intent_status_round_trips() {
        for status in [IntentStatus::Created, IntentStatus::Paid] {
            assert_eq!(IntentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(IntentStatus::parse("refunded"), None);
    }

    #[test]
    fn payment_serialises_with_flattened_period() {
        let period = FeePeriod::try_new(3, 2024).expect("valid period");
        let payment = Payment {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            period: period.into(),
            amount: 500,
            status: "paid".into(),
            payment_ref: "pay_123".into(),
            paid_at: Utc::now(),
        };
        let value = serde_json::to_value(&payment).expect("serialise");
        assert_eq!(value["month"], 3);
        assert_eq!(value["year"], 2024);
        assert_eq!(value["paymentRef"], "pay_123");
        assert_eq!(payment.period(), Some(period));
    }
}
