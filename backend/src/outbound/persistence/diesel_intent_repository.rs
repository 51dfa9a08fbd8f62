//! PostgreSQL-backed `PaymentIntentRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::payment::{NewPaymentIntent, PaymentIntent};
use crate::domain::ports::{PaymentIntentRepository, PaymentIntentRepositoryError};

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::{IntentRow, NewIntentRow};
use super::pool::DbPool;
use super::schema::payment_intents;

/// Diesel-backed implementation of the `PaymentIntentRepository` port.
#[derive(Clone)]
pub struct DieselIntentRepository {
    pool: DbPool,
}

impl DieselIntentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> PaymentIntentRepositoryError {
    map_diesel_error(
        error,
        PaymentIntentRepositoryError::query,
        PaymentIntentRepositoryError::connection,
    )
}

#[async_trait]
impl PaymentIntentRepository for DieselIntentRepository {
    async fn insert(
        &self,
        intent: NewPaymentIntent,
    ) -> Result<PaymentIntent, PaymentIntentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, PaymentIntentRepositoryError::connection))?;

        let row: IntentRow = diesel::insert_into(payment_intents::table)
            .values(NewIntentRow::from(intent))
            .get_result(&mut conn)
            .await
            .map_err(map_error)?;
        row.into_intent()
    }

    async fn mark_paid(
        &self,
        order_id: &str,
        payment_ref: &str,
    ) -> Result<(), PaymentIntentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, PaymentIntentRepositoryError::connection))?;

        let updated = diesel::update(
            payment_intents::table.filter(payment_intents::order_id.eq(order_id)),
        )
        .set((
            payment_intents::status.eq("paid"),
            payment_intents::payment_ref.eq(Some(payment_ref)),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_error)?;

        // The durable payment is authoritative; a missing intent is worth a
        // log line but not a failure.
        if updated == 0 {
            warn!(order_id, "no intent found for verified order");
        }
        Ok(())
    }
}
