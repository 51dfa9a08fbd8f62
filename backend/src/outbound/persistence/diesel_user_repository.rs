//! PostgreSQL-backed `UserRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{FeePeriod, NewUser, User, UserAccount};

use super::error_map::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::{payments, users};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserRepositoryError::connection))?;

        let row: UserRow = diesel::insert_into(users::table)
            .values(NewUserRow::from(user))
            .get_result(&mut conn)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    UserRepositoryError::DuplicateUsername
                } else {
                    map_error(e)
                }
            })?;
        row.into_user()
    }

    async fn find_account(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserRepositoryError::connection))?;

        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;
        row.map(UserRow::into_account).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserRepositoryError::connection))?;

        let row: Option<UserRow> = users::table
            .find(id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?;
        row.map(UserRow::into_user).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserRepositoryError::connection))?;

        let rows: Vec<UserRow> = users::table
            .order(users::username.asc())
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn count_members(&self) -> Result<i64, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserRepositoryError::connection))?;

        users::table
            .filter(users::role.eq("member"))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_error)
    }

    async fn members_due_for(&self, period: FeePeriod) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| map_pool_error(e, UserRepositoryError::connection))?;

        let paid_users = payments::table
            .filter(payments::month.eq(i32::from(period.month())))
            .filter(payments::year.eq(period.year()))
            .filter(payments::status.eq("paid"))
            .select(payments::user_id);

        let rows: Vec<UserRow> = users::table
            .filter(users::role.eq("member"))
            .filter(users::id.ne_all(paid_users))
            .order(users::username.asc())
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        rows.into_iter().map(UserRow::into_user).collect()
    }
}
