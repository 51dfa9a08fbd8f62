//! Account management: login, self-registration, admin-created accounts, and
//! the student roster.
//!
//! Login failures are deliberately non-distinguishing: an unknown username and
//! a wrong password produce the same error, so the endpoint does not leak
//! which usernames exist.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use super::auth::{self, AuthConfig, AuthError};
use super::effects::best_effort;
use super::error::Error;
use super::ports::{Mailer, Notification, UserRepository, UserRepositoryError};
use super::user::{NewUser, Role, User};

/// A successful login: the bearer token plus the display fields the client
/// shows immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    /// Signed access token.
    pub token: String,
    /// Role of the authenticated account.
    pub role: Role,
    /// Login name.
    pub username: String,
    /// Display name.
    pub full_name: String,
}

/// Fields for a new account, before hashing. Shared by self-registration and
/// admin creation.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    /// Desired login name.
    pub username: String,
    /// Plaintext password; hashed before it reaches a repository.
    pub password: String,
    /// Display name.
    pub full_name: String,
    /// Hostel room assignment.
    pub room_number: String,
    /// Notification address.
    pub email: String,
    /// Optional contact number.
    pub phone: Option<String>,
}

impl NewRegistration {
    /// Reject empty required fields, naming the first offender in `details`.
    fn validate(&self) -> Result<(), Error> {
        let required = [
            ("username", &self.username),
            ("password", &self.password),
            ("fullName", &self.full_name),
            ("roomNumber", &self.room_number),
            ("email", &self.email),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::invalid_request("missing required field")
                    .with_details(json!({ "field": field })));
            }
        }
        Ok(())
    }
}

fn map_user_repo_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserRepositoryError::DuplicateUsername => Error::conflict("username already taken"),
        other => Error::internal(other.to_string()),
    }
}

/// The account management service.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    mailer: Arc<dyn Mailer>,
    auth: AuthConfig,
}

impl AccountService {
    /// Wire the service with its collaborators.
    pub fn new(users: Arc<dyn UserRepository>, mailer: Arc<dyn Mailer>, auth: AuthConfig) -> Self {
        Self {
            users,
            mailer,
            auth,
        }
    }

    /// Verify credentials and issue an access token.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginSession, Error> {
        let account = self
            .users
            .find_account(username)
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::unauthorized(AuthError::InvalidCredentials.to_string()))?;

        let verified = auth::verify_password(password, &account.password_hash)
            .map_err(|e| Error::internal(format!("credential verification failed: {e}")))?;
        if !verified {
            return Err(Error::unauthorized(
                AuthError::InvalidCredentials.to_string(),
            ));
        }

        let user = account.user;
        let token = auth::issue_token(user.id, &user.username, user.role, &self.auth)
            .map_err(|e| Error::internal(format!("token issuance failed: {e}")))?;

        Ok(LoginSession {
            token,
            role: user.role,
            username: user.username,
            full_name: user.full_name,
        })
    }

    /// Self-registration: creates a member account and sends a welcome email.
    pub async fn register(&self, registration: NewRegistration) -> Result<User, Error> {
        let user = self.create_account(&registration).await?;
        best_effort(
            "welcome email",
            self.mailer.send(Notification::Welcome {
                to: user.email.clone(),
                name: user.full_name.clone(),
                username: user.username.clone(),
            }),
        )
        .await;
        Ok(user)
    }

    /// Admin-created account: like [`Self::register`] but the credentials
    /// email echoes the issued password so the admin can hand it over.
    pub async fn create_member(&self, registration: NewRegistration) -> Result<User, Error> {
        let password = registration.password.clone();
        let user = self.create_account(&registration).await?;
        best_effort(
            "credentials email",
            self.mailer.send(Notification::Credentials {
                to: user.email.clone(),
                name: user.full_name.clone(),
                username: user.username.clone(),
                password,
            }),
        )
        .await;
        Ok(user)
    }

    async fn create_account(&self, registration: &NewRegistration) -> Result<User, Error> {
        registration.validate()?;

        let password_hash = auth::hash_password(&registration.password)
            .map_err(|e| Error::internal(format!("password hashing failed: {e}")))?;

        self.users
            .insert(NewUser {
                username: registration.username.clone(),
                password_hash,
                role: Role::Member,
                full_name: registration.full_name.clone(),
                room_number: registration.room_number.clone(),
                email: registration.email.clone(),
                phone: registration.phone.clone(),
            })
            .await
            .map_err(|err| {
                if !matches!(err, UserRepositoryError::DuplicateUsername) {
                    warn!(error = %err, username = %registration.username, "account creation failed");
                }
                map_user_repo_error(err)
            })
    }

    /// All member accounts, for the admin roster.
    pub async fn list_students(&self) -> Result<Vec<User>, Error> {
        let users = self.users.list().await.map_err(map_user_repo_error)?;
        Ok(users
            .into_iter()
            .filter(|u| u.role == Role::Member)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::{MockMailer, MockUserRepository};
    use crate::domain::user::UserAccount;
    use chrono::Utc;
    use mockall::predicate::eq;
    use uuid::Uuid;

    fn auth_config() -> AuthConfig {
        AuthConfig::new("test-secret")
    }

    fn account(username: &str, password: &str) -> UserAccount {
        UserAccount {
            user: User {
                id: Uuid::new_v4(),
                username: username.into(),
                full_name: "Asha Rao".into(),
                room_number: "B-204".into(),
                email: "asha@example.com".into(),
                phone: None,
                role: Role::Member,
                created_at: Utc::now(),
            },
            password_hash: auth::hash_password(password).expect("hash"),
        }
    }

    fn registration() -> NewRegistration {
        NewRegistration {
            username: "asha".into(),
            password: "hunter2".into(),
            full_name: "Asha Rao".into(),
            room_number: "B-204".into(),
            email: "asha@example.com".into(),
            phone: Some("555-0100".into()),
        }
    }

    fn service(users: MockUserRepository, mailer: MockMailer) -> AccountService {
        AccountService::new(Arc::new(users), Arc::new(mailer), auth_config())
    }

    #[tokio::test]
    async fn login_issues_a_decodable_token() {
        let stored = account("asha", "hunter2");
        let user_id = stored.user.id;
        let mut users = MockUserRepository::new();
        users
            .expect_find_account()
            .with(eq("asha"))
            .return_once(move |_| Ok(Some(stored)));

        let session = service(users, MockMailer::new())
            .login("asha", "hunter2")
            .await
            .expect("login");

        assert_eq!(session.username, "asha");
        assert_eq!(session.role, Role::Member);
        let claims = auth::decode_token(&session.token, &auth_config()).expect("decode");
        assert_eq!(claims.user_id().expect("subject"), user_id);
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_are_indistinguishable() {
        let mut users = MockUserRepository::new();
        users.expect_find_account().returning(|_| Ok(None));
        let unknown = service(users, MockMailer::new())
            .login("ghost", "whatever")
            .await
            .expect_err("unknown user");

        let mut users = MockUserRepository::new();
        users
            .expect_find_account()
            .return_once(|_| Ok(Some(account("asha", "hunter2"))));
        let wrong = service(users, MockMailer::new())
            .login("asha", "not-hunter2")
            .await
            .expect_err("wrong password");

        assert_eq!(unknown.code(), ErrorCode::Unauthorized);
        assert_eq!(wrong.code(), ErrorCode::Unauthorized);
        assert_eq!(unknown.message(), wrong.message());
    }

    #[tokio::test]
    async fn register_hashes_the_password_and_sends_a_welcome() {
        let mut users = MockUserRepository::new();
        users
            .expect_insert()
            .withf(|new| {
                new.username == "asha"
                    && new.role == Role::Member
                    && new.password_hash.starts_with("$argon2")
            })
            .returning(|new| {
                Ok(User {
                    id: Uuid::new_v4(),
                    username: new.username,
                    full_name: new.full_name,
                    room_number: new.room_number,
                    email: new.email,
                    phone: new.phone,
                    role: new.role,
                    created_at: Utc::now(),
                })
            });
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|note| {
                matches!(
                    note,
                    Notification::Welcome { to, username, .. }
                        if to == "asha@example.com" && username == "asha"
                )
            })
            .returning(|_| Ok(()));

        let user = service(users, mailer)
            .register(registration())
            .await
            .expect("register");
        assert_eq!(user.role, Role::Member);
    }

    #[tokio::test]
    async fn register_rejects_a_missing_field_with_its_name() {
        let mut incomplete = registration();
        incomplete.email = "  ".into();
        let mut users = MockUserRepository::new();
        users.expect_insert().times(0);

        let error = service(users, MockMailer::new())
            .register(incomplete)
            .await
            .expect_err("missing email");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.details().expect("details")["field"], "email");
    }

    #[tokio::test]
    async fn register_reports_a_taken_username_as_conflict() {
        let mut users = MockUserRepository::new();
        users
            .expect_insert()
            .returning(|_| Err(UserRepositoryError::DuplicateUsername));
        let mut mailer = MockMailer::new();
        mailer.expect_send().times(0);

        let error = service(users, mailer)
            .register(registration())
            .await
            .expect_err("duplicate");

        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn create_member_echoes_the_issued_password_in_the_credentials_email() {
        let mut users = MockUserRepository::new();
        users.expect_insert().returning(|new| {
            Ok(User {
                id: Uuid::new_v4(),
                username: new.username,
                full_name: new.full_name,
                room_number: new.room_number,
                email: new.email,
                phone: new.phone,
                role: new.role,
                created_at: Utc::now(),
            })
        });
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|note| {
                matches!(
                    note,
                    Notification::Credentials { password, .. } if password == "hunter2"
                )
            })
            .returning(|_| Ok(()));

        service(users, mailer)
            .create_member(registration())
            .await
            .expect("create member");
    }

    #[tokio::test]
    async fn list_students_excludes_admin_accounts() {
        let mut users = MockUserRepository::new();
        users.expect_list().returning(|| {
            Ok(vec![
                account("asha", "x").user,
                User {
                    role: Role::Admin,
                    ..account("admin", "x").user
                },
            ])
        });

        let students = service(users, MockMailer::new())
            .list_students()
            .await
            .expect("list");
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].username, "asha");
    }
}
