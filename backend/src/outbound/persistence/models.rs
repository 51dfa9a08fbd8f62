//! Row types bridging Diesel and the domain model.
//!
//! Conversions out of the store validate stringly-typed columns (role, status,
//! month) so corrupted rows surface as query errors instead of panics or
//! silently wrong domain values.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::payment::{FeePeriodFields, IntentStatus, NewPaymentIntent, PaymentIntent};
use crate::domain::ports::{
    PaymentIntentRepositoryError, PaymentRepositoryError, UserRepositoryError,
};
use crate::domain::{NewPayment, NewUser, Payment, Role, User, UserAccount};

use super::schema::{payment_intents, payments, users};

/// A full `users` row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub full_name: String,
    pub room_number: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert to a credential-free profile, validating the role column.
    pub fn into_user(self) -> Result<User, UserRepositoryError> {
        let role = Role::parse(&self.role).ok_or_else(|| {
            UserRepositoryError::query(format!("invalid role in database: {}", self.role))
        })?;
        Ok(User {
            id: self.id,
            username: self.username,
            full_name: self.full_name,
            room_number: self.room_number,
            email: self.email,
            phone: self.phone,
            role,
            created_at: self.created_at,
        })
    }

    /// Convert to a profile plus credential, for login verification.
    pub fn into_account(self) -> Result<UserAccount, UserRepositoryError> {
        let password_hash = self.password_hash.clone();
        Ok(UserAccount {
            user: self.into_user()?,
            password_hash,
        })
    }
}

/// Insertable `users` row; `created_at` comes from the column default.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub full_name: String,
    pub room_number: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<NewUser> for NewUserRow {
    fn from(user: NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            role: user.role.as_str().to_owned(),
            full_name: user.full_name,
            room_number: user.room_number,
            email: user.email,
            phone: user.phone,
        }
    }
}

/// A full `payments` row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PaymentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub amount: i64,
    pub status: String,
    pub payment_ref: String,
    pub paid_at: DateTime<Utc>,
}

fn month_ordinal(month: i32) -> Result<u8, PaymentRepositoryError> {
    u8::try_from(month)
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| {
            PaymentRepositoryError::query(format!("invalid month in database: {month}"))
        })
}

impl PaymentRow {
    /// Convert to a domain payment, validating the month column.
    pub fn into_payment(self) -> Result<Payment, PaymentRepositoryError> {
        Ok(Payment {
            id: self.id,
            user_id: self.user_id,
            period: FeePeriodFields {
                month: month_ordinal(self.month)?,
                year: self.year,
            },
            amount: self.amount,
            status: self.status,
            payment_ref: self.payment_ref,
            paid_at: self.paid_at,
        })
    }
}

/// Insertable `payments` row; `status` and `paid_at` come from the column
/// defaults.
#[derive(Debug, Insertable)]
#[diesel(table_name = payments)]
pub struct NewPaymentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub amount: i64,
    pub payment_ref: String,
}

impl From<NewPayment> for NewPaymentRow {
    fn from(payment: NewPayment) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: payment.user_id,
            month: i32::from(payment.period.month()),
            year: payment.period.year(),
            amount: payment.amount,
            payment_ref: payment.payment_ref,
        }
    }
}

/// A full `payment_intents` row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = payment_intents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IntentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub amount: i64,
    pub order_id: String,
    pub payment_ref: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl IntentRow {
    /// Convert to a domain intent, validating period and status columns.
    pub fn into_intent(self) -> Result<PaymentIntent, PaymentIntentRepositoryError> {
        let month = u8::try_from(self.month)
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or_else(|| {
                PaymentIntentRepositoryError::query(format!(
                    "invalid month in database: {}",
                    self.month
                ))
            })?;
        let period = crate::domain::FeePeriod::try_new(month, self.year).map_err(|e| {
            PaymentIntentRepositoryError::query(format!("invalid period in database: {e}"))
        })?;
        let status = IntentStatus::parse(&self.status).ok_or_else(|| {
            PaymentIntentRepositoryError::query(format!(
                "invalid intent status in database: {}",
                self.status
            ))
        })?;
        Ok(PaymentIntent {
            id: self.id,
            user_id: self.user_id,
            period,
            amount: self.amount,
            order_id: self.order_id,
            payment_ref: self.payment_ref,
            status,
            created_at: self.created_at,
        })
    }
}

/// Insertable `payment_intents` row; `created_at` comes from the column
/// default.
#[derive(Debug, Insertable)]
#[diesel(table_name = payment_intents)]
pub struct NewIntentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub amount: i64,
    pub order_id: String,
    pub status: String,
}

impl From<NewPaymentIntent> for NewIntentRow {
    fn from(intent: NewPaymentIntent) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: intent.user_id,
            month: i32::from(intent.period.month()),
            year: intent.period.year(),
            amount: intent.amount,
            order_id: intent.order_id,
            status: IntentStatus::Created.as_str().to_owned(),
        }
    }
}
