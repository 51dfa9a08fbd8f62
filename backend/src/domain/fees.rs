//! Fee payment reconciliation: the orchestrator for the pay-fee use case.
//!
//! One service ties the stores, gateway, mailer, and report export together:
//!
//! 1. `begin_payment` checks the period is unpaid, creates a gateway order,
//!    and persists a pending intent.
//! 2. The client completes payment out of band and posts the gateway's signed
//!    callback.
//! 3. `confirm_payment` verifies the signature, finalises the payment, and
//!    kicks off the best-effort side effects (confirmation email, report
//!    refresh).
//!
//! A replayed callback for an already-settled period is answered with the
//! existing payment rather than a second row: the paid-period uniqueness
//! constraint surfaces as [`PaymentRepositoryError::DuplicatePaidPeriod`] and
//! is treated as idempotent success.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use tracing::{error, warn};
use uuid::Uuid;

use super::effects::best_effort;
use super::error::Error;
use super::payment::{FeeSchedule, NewPayment, NewPaymentIntent, Payment, PaymentWithPayer};
use super::period::FeePeriod;
use super::ports::{
    Mailer, Notification, PaymentGateway, PaymentIntentRepository, PaymentRepository,
    PaymentRepositoryError, UserRepository, UserRepositoryError,
};
use super::report::ReportService;

/// Everything the client needs to drive the gateway checkout UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInitiation {
    /// Gateway order identifier.
    pub order_id: String,
    /// Amount in minor currency units.
    pub amount_minor: i64,
    /// ISO currency code.
    pub currency: String,
    /// Gateway public key identifier.
    pub key_id: String,
}

/// The signed callback a client submits after completing checkout.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    /// Gateway order identifier from `begin_payment`.
    pub order_id: String,
    /// Gateway payment identifier.
    pub payment_ref: String,
    /// Hex HMAC-SHA256 over `order_id|payment_ref`.
    pub signature: String,
    /// Period the payment covers.
    pub period: FeePeriod,
}

/// Acknowledgment of a reconciled payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedPayment {
    /// Identifier of the durable payment row.
    pub payment_id: Uuid,
}

/// Aggregate figures for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    /// Member accounts in the system.
    pub total_students: i64,
    /// Distinct members with a payment reconciled this year.
    pub paid_members: i64,
    /// `total_students - paid_members`.
    pub due_members: i64,
    /// Sum of amounts reconciled this year, major units.
    pub total_collection: i64,
    /// `total_students × 12 × fee − total_collection`.
    pub due_amount: i64,
}

/// Result of a reminder sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderOutcome {
    /// Members without a payment for the current period.
    pub total_due: usize,
    /// Reminder emails that were accepted by the mail API.
    pub sent: usize,
}

/// Collaborators for [`FeeService`].
pub struct FeeServiceDeps {
    /// Account store.
    pub users: Arc<dyn UserRepository>,
    /// Payment ledger.
    pub payments: Arc<dyn PaymentRepository>,
    /// Intent store.
    pub intents: Arc<dyn PaymentIntentRepository>,
    /// External gateway client.
    pub gateway: Arc<dyn PaymentGateway>,
    /// Transactional mail sender.
    pub mailer: Arc<dyn Mailer>,
    /// Report export.
    pub reports: Arc<ReportService>,
}

/// The payment reconciliation service.
pub struct FeeService {
    fee: FeeSchedule,
    users: Arc<dyn UserRepository>,
    payments: Arc<dyn PaymentRepository>,
    intents: Arc<dyn PaymentIntentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    mailer: Arc<dyn Mailer>,
    reports: Arc<ReportService>,
}

fn map_user_repo_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        other => Error::internal(other.to_string()),
    }
}

fn map_payment_repo_error(error: PaymentRepositoryError) -> Error {
    match error {
        PaymentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("payment store unavailable: {message}"))
        }
        other => Error::internal(other.to_string()),
    }
}

impl FeeService {
    /// Wire the service with its fee schedule and collaborators.
    pub fn new(fee: FeeSchedule, deps: FeeServiceDeps) -> Self {
        let FeeServiceDeps {
            users,
            payments,
            intents,
            gateway,
            mailer,
            reports,
        } = deps;
        Self {
            fee,
            users,
            payments,
            intents,
            gateway,
            mailer,
            reports,
        }
    }

    /// Start a fee payment: reject already-paid periods, create a gateway
    /// order, and persist a pending intent.
    ///
    /// No intent is persisted when order creation fails.
    pub async fn begin_payment(
        &self,
        user_id: Uuid,
        period: FeePeriod,
    ) -> Result<PaymentInitiation, Error> {
        let existing = self
            .payments
            .find_paid(user_id, period)
            .await
            .map_err(map_payment_repo_error)?;
        if existing.is_some() {
            return Err(Error::conflict("this month already paid"));
        }

        let order = self
            .gateway
            .create_order(self.fee.monthly_fee_minor(), &period.receipt_label())
            .await
            .map_err(|err| {
                error!(error = %err, %user_id, %period, "gateway order creation failed");
                Error::internal("payment initialisation failed")
            })?;

        self.intents
            .insert(NewPaymentIntent {
                user_id,
                period,
                amount: self.fee.monthly_fee,
                order_id: order.order_id.clone(),
            })
            .await
            .map_err(|err| Error::internal(format!("failed to persist payment intent: {err}")))?;

        Ok(PaymentInitiation {
            order_id: order.order_id,
            amount_minor: order.amount_minor,
            currency: order.currency,
            key_id: self.gateway.key_id().to_owned(),
        })
    }

    /// Reconcile a completed checkout from the gateway's signed callback.
    ///
    /// A tampered signature mutates nothing. A verified replay for a settled
    /// period returns the existing payment.
    pub async fn confirm_payment(
        &self,
        user_id: Uuid,
        confirmation: PaymentConfirmation,
        now: DateTime<Utc>,
    ) -> Result<ConfirmedPayment, Error> {
        let PaymentConfirmation {
            order_id,
            payment_ref,
            signature,
            period,
        } = confirmation;

        if !self
            .gateway
            .verify_signature(&order_id, &payment_ref, &signature)
        {
            return Err(Error::invalid_request("invalid payment signature"));
        }

        let payment = match self
            .payments
            .insert(NewPayment {
                user_id,
                period,
                amount: self.fee.monthly_fee,
                payment_ref: payment_ref.clone(),
            })
            .await
        {
            Ok(payment) => payment,
            Err(PaymentRepositoryError::DuplicatePaidPeriod) => self
                .payments
                .find_paid(user_id, period)
                .await
                .map_err(map_payment_repo_error)?
                .ok_or_else(|| {
                    Error::internal("duplicate paid period reported but no payment found")
                })?,
            Err(err) => return Err(Error::internal(format!("failed to record payment: {err}"))),
        };

        // Only after the durable insert: the payment row is authoritative, and
        // a failed insert must not leave the intent marked paid.
        best_effort(
            "mark payment intent paid",
            self.intents.mark_paid(&order_id, &payment_ref),
        )
        .await;

        self.post_confirmation_effects(user_id, period, payment.amount, now)
            .await;

        Ok(ConfirmedPayment {
            payment_id: payment.id,
        })
    }

    /// Side effects after a successful reconciliation: confirmation email and
    /// report refresh. Never fails the caller.
    async fn post_confirmation_effects(
        &self,
        user_id: Uuid,
        period: FeePeriod,
        amount: i64,
        now: DateTime<Utc>,
    ) {
        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => {
                best_effort(
                    "payment confirmation email",
                    self.mailer.send(Notification::PaymentConfirmation {
                        to: user.email,
                        name: user.full_name,
                        period,
                        amount,
                    }),
                )
                .await;
            }
            Ok(None) => warn!(%user_id, "paid user not found; skipping confirmation email"),
            Err(err) => warn!(error = %err, %user_id, "user lookup failed; skipping confirmation email"),
        }

        best_effort("report refresh", self.reports.refresh(now)).await;
    }

    /// Aggregate dashboard figures for the year containing `now`.
    pub async fn dashboard_stats(&self, now: DateTime<Utc>) -> Result<DashboardStats, Error> {
        let year = now.year();
        let total_students = self
            .users
            .count_members()
            .await
            .map_err(map_user_repo_error)?;
        let paid_members = self
            .payments
            .distinct_paid_members(year)
            .await
            .map_err(map_payment_repo_error)?;
        let total_collection = self
            .payments
            .collection_total(year)
            .await
            .map_err(map_payment_repo_error)?;

        Ok(DashboardStats {
            total_students,
            paid_members,
            due_members: total_students - paid_members,
            total_collection,
            due_amount: total_students * 12 * self.fee.monthly_fee - total_collection,
        })
    }

    /// Email every member whose current period is unpaid. Individual send
    /// failures are logged and skipped; the sweep itself never fails on them.
    pub async fn send_reminders(&self, now: DateTime<Utc>) -> Result<ReminderOutcome, Error> {
        let period = FeePeriod::containing(now);
        let due = self
            .users
            .members_due_for(period)
            .await
            .map_err(map_user_repo_error)?;

        let total_due = due.len();
        let mut sent = 0;
        for member in due {
            let result = self
                .mailer
                .send(Notification::PaymentReminder {
                    to: member.email.clone(),
                    name: member.full_name.clone(),
                    period,
                    amount: self.fee.monthly_fee,
                })
                .await;
            match result {
                Ok(()) => sent += 1,
                Err(err) => {
                    warn!(error = %err, username = %member.username, "reminder email failed")
                }
            }
        }

        Ok(ReminderOutcome { total_due, sent })
    }

    /// Payment history for one member, newest first.
    pub async fn history_for_user(&self, user_id: Uuid) -> Result<Vec<Payment>, Error> {
        self.payments
            .history_for_user(user_id)
            .await
            .map_err(map_payment_repo_error)
    }

    /// Every payment joined with payer details, for the admin ledger view.
    pub async fn full_history(&self) -> Result<Vec<PaymentWithPayer>, Error> {
        self.payments
            .history_all()
            .await
            .map_err(map_payment_repo_error)
    }
}
