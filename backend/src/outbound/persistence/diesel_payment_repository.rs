//! PostgreSQL-backed `PaymentRepository` implementation using Diesel.
//!
//! The paid-period uniqueness constraint lives in a partial unique index on
//! `(user_id, month, year) where status = 'paid'`; a violation surfaces as
//! [`PaymentRepositoryError::DuplicatePaidPeriod`] so the service layer can
//! treat replays as idempotent.
//!
//! Year-scoped aggregates (`distinct_paid_members`, `collection_total`) are
//! bounded by `paid_at`, matching the dashboard's "collected this year"
//! reading; the report instead groups by the fee period a payment covers.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use diesel::dsl::count_distinct;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{PaymentRepository, PaymentRepositoryError};
use crate::domain::{FeePeriod, NewPayment, Payment, PaymentWithPayer};

use super::error_map::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewPaymentRow, PaymentRow};
use super::pool::DbPool;
use super::schema::{payments, users};

/// Diesel-backed implementation of the `PaymentRepository` port.
#[derive(Clone)]
pub struct DieselPaymentRepository {
    pool: DbPool,
}

impl DieselPaymentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> PaymentRepositoryError {
    map_diesel_error(
        error,
        PaymentRepositoryError::query,
        PaymentRepositoryError::connection,
    )
}

/// Inclusive start and exclusive end of a calendar year, UTC.
fn year_bounds(year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>), PaymentRepositoryError> {
    let start = Utc
        .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| PaymentRepositoryError::query(format!("invalid year: {year}")))?;
    let end = Utc
        .with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| PaymentRepositoryError::query(format!("invalid year: {year}")))?;
    Ok((start, end))
}

#[async_trait]
impl PaymentRepository for DieselPaymentRepository {
    async fn find_paid(
        &self,
        user_id: Uuid,
        period: FeePeriod,
    ) -> Result<Option<Payment>, PaymentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, PaymentRepositoryError::connection))?;

        let row: Option<PaymentRow> = payments::table
            .filter(payments::user_id.eq(user_id))
            .filter(payments::month.eq(i32::from(period.month())))
            .filter(payments::year.eq(period.year()))
            .filter(payments::status.eq("paid"))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;
        row.map(PaymentRow::into_payment).transpose()
    }

    async fn insert(&self, payment: NewPayment) -> Result<Payment, PaymentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, PaymentRepositoryError::connection))?;

        let row: PaymentRow = diesel::insert_into(payments::table)
            .values(NewPaymentRow::from(payment))
            .get_result(&mut conn)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PaymentRepositoryError::DuplicatePaidPeriod
                } else {
                    map_error(e)
                }
            })?;
        row.into_payment()
    }

    async fn history_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Payment>, PaymentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, PaymentRepositoryError::connection))?;

        let rows: Vec<PaymentRow> = payments::table
            .filter(payments::user_id.eq(user_id))
            .order(payments::paid_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        rows.into_iter().map(PaymentRow::into_payment).collect()
    }

    async fn history_all(&self) -> Result<Vec<PaymentWithPayer>, PaymentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, PaymentRepositoryError::connection))?;

        let rows: Vec<(PaymentRow, String, String, String)> = payments::table
            .inner_join(users::table)
            .select((
                PaymentRow::as_select(),
                users::username,
                users::full_name,
                users::room_number,
            ))
            .order(payments::paid_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_error)?;

        rows.into_iter()
            .map(|(row, username, full_name, room_number)| {
                Ok(PaymentWithPayer {
                    payment: row.into_payment()?,
                    username,
                    full_name,
                    room_number,
                })
            })
            .collect()
    }

    async fn list_all(&self) -> Result<Vec<Payment>, PaymentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, PaymentRepositoryError::connection))?;

        let rows: Vec<PaymentRow> = payments::table
            .order(payments::paid_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        rows.into_iter().map(PaymentRow::into_payment).collect()
    }

    async fn distinct_paid_members(&self, year: i32) -> Result<i64, PaymentRepositoryError> {
        let (start, end) = year_bounds(year)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, PaymentRepositoryError::connection))?;

        payments::table
            .filter(payments::status.eq("paid"))
            .filter(payments::paid_at.ge(start))
            .filter(payments::paid_at.lt(end))
            .select(count_distinct(payments::user_id))
            .get_result(&mut conn)
            .await
            .map_err(map_error)
    }

    async fn collection_total(&self, year: i32) -> Result<i64, PaymentRepositoryError> {
        let (start, end) = year_bounds(year)?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, PaymentRepositoryError::connection))?;

        // Summed in Rust: amounts are modest and this sidesteps SUM's numeric
        // return type.
        let amounts: Vec<i64> = payments::table
            .filter(payments::status.eq("paid"))
            .filter(payments::paid_at.ge(start))
            .filter(payments::paid_at.lt(end))
            .select(payments::amount)
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(amounts.into_iter().sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_bounds_cover_exactly_one_calendar_year() {
        let (start, end) = year_bounds(2024).expect("valid year");
        assert_eq!(start.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }
}
