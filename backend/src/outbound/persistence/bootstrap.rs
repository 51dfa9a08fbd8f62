//! Startup tasks: embedded migrations and the default admin seed.
//!
//! Migrations run over a synchronous connection inside `spawn_blocking`;
//! `diesel_migrations` has no async harness and startup is the one place a
//! blocking connection is acceptable.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::auth;
use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{NewUser, Role};

/// All migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Login name of the seeded admin account.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Failures during startup bootstrap. These are fatal: the process should not
/// serve traffic over an unmigrated schema or without an admin account.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Applying migrations failed.
    #[error("migration failed: {0}")]
    Migration(String),
    /// Creating the default admin failed.
    #[error("admin seed failed: {0}")]
    Seed(String),
    /// The blocking migration task panicked.
    #[error("bootstrap task failed: {0}")]
    Join(String),
}

/// Apply any pending migrations.
pub async fn run_migrations(database_url: &str) -> Result<(), BootstrapError> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut conn =
            PgConnection::establish(&url).map_err(|e| BootstrapError::Migration(e.to_string()))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| BootstrapError::Migration(e.to_string()))?;
        if !applied.is_empty() {
            info!(count = applied.len(), "applied pending migrations");
        }
        Ok(())
    })
    .await
    .map_err(|e| BootstrapError::Join(e.to_string()))?
}

/// Create the default admin account if no account named
/// [`DEFAULT_ADMIN_USERNAME`] exists yet.
pub async fn seed_admin(
    users: &dyn UserRepository,
    password: &str,
) -> Result<(), BootstrapError> {
    let existing = users
        .find_account(DEFAULT_ADMIN_USERNAME)
        .await
        .map_err(|e| BootstrapError::Seed(e.to_string()))?;
    if existing.is_some() {
        return Ok(());
    }

    let password_hash =
        auth::hash_password(password).map_err(|e| BootstrapError::Seed(e.to_string()))?;
    let result = users
        .insert(NewUser {
            username: DEFAULT_ADMIN_USERNAME.into(),
            password_hash,
            role: Role::Admin,
            full_name: "System Admin".into(),
            room_number: "A-001".into(),
            email: "admin@hostel.local".into(),
            phone: None,
        })
        .await;

    match result {
        Ok(_) => {
            info!(username = DEFAULT_ADMIN_USERNAME, "seeded default admin account");
            Ok(())
        }
        // Lost a race with a concurrent boot; the account exists either way.
        Err(UserRepositoryError::DuplicateUsername) => Ok(()),
        Err(e) => Err(BootstrapError::Seed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::domain::ports::MockUserRepository;
    use crate::domain::user::UserAccount;
    use chrono::Utc;
    use uuid::Uuid;

    fn admin_account() -> UserAccount {
        UserAccount {
            user: User {
                id: Uuid::new_v4(),
                username: DEFAULT_ADMIN_USERNAME.into(),
                full_name: "System Admin".into(),
                room_number: "A-001".into(),
                email: "admin@hostel.local".into(),
                phone: None,
                role: Role::Admin,
                created_at: Utc::now(),
            },
            password_hash: "$argon2id$stub".into(),
        }
    }

    #[tokio::test]
    async fn seed_is_skipped_when_the_admin_exists() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_account()
            .return_once(|_| Ok(Some(admin_account())));
        users.expect_insert().times(0);

        seed_admin(&users, "admin123").await.expect("seed");
    }

    #[tokio::test]
    async fn seed_creates_an_admin_with_a_hashed_password() {
        let mut users = MockUserRepository::new();
        users.expect_find_account().return_once(|_| Ok(None));
        users
            .expect_insert()
            .withf(|new| {
                new.username == DEFAULT_ADMIN_USERNAME
                    && new.role == Role::Admin
                    && new.room_number == "A-001"
                    && new.password_hash.starts_with("$argon2")
            })
            .return_once(|_| Ok(admin_account().user));

        seed_admin(&users, "admin123").await.expect("seed");
    }

    #[tokio::test]
    async fn a_seed_race_is_not_an_error() {
        let mut users = MockUserRepository::new();
        users.expect_find_account().return_once(|_| Ok(None));
        users
            .expect_insert()
            .return_once(|_| Err(UserRepositoryError::DuplicateUsername));

        seed_admin(&users, "admin123").await.expect("seed race");
    }
}
