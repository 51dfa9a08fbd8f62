//! Port for user persistence adapters.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::period::FeePeriod;
use crate::domain::user::{NewUser, User, UserAccount};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection {
        /// Adapter-level detail.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query {
        /// Adapter-level detail.
        message: String,
    },
    /// Insert collided with an existing username.
    #[error("username already exists")]
    DuplicateUsername,
}

impl UserRepositoryError {
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

/// Store of registered accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account and return the stored record.
    async fn insert(&self, user: NewUser) -> Result<User, UserRepositoryError>;

    /// Fetch an account with credential material by login name.
    async fn find_account(&self, username: &str)
    -> Result<Option<UserAccount>, UserRepositoryError>;

    /// Fetch a profile by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError>;

    /// All accounts, admins included.
    async fn list(&self) -> Result<Vec<User>, UserRepositoryError>;

    /// Number of member (non-admin) accounts.
    async fn count_members(&self) -> Result<i64, UserRepositoryError>;

    /// Members without a finalised payment for `period`.
    async fn members_due_for(&self, period: FeePeriod) -> Result<Vec<User>, UserRepositoryError>;
}
