//! User accounts: identity, role, and profile data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Access role attached to every account.
///
/// Members pay fees; admins additionally manage accounts, reporting, and
/// reminders. The bootstrap seed creates exactly one admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Hostel administrator.
    Admin,
    /// Fee-paying resident.
    Member,
}

impl Role {
    /// Stable string form as stored in the database and token claims.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Parse the stored string form; unknown values are rejected at the
    /// persistence boundary.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "member" => Some(Self::Member),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered account without credential material.
///
/// The password hash never travels on this type; adapters that need it use
/// [`UserAccount`].
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Primary identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// Hostel room assignment.
    pub room_number: String,
    /// Notification address.
    pub email: String,
    /// Optional contact number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Access role.
    pub role: Role,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

/// A user together with their stored credential, for login verification only.
#[derive(Debug, Clone)]
pub struct UserAccount {
    /// The profile.
    pub user: User,
    /// Argon2id hash in PHC string format.
    pub password_hash: String,
}

/// Fields for creating an account. The password is already hashed by the time
/// this reaches a repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Unique login name.
    pub username: String,
    /// Argon2id hash in PHC string format.
    pub password_hash: String,
    /// Access role.
    pub role: Role,
    /// Display name.
    pub full_name: String,
    /// Hostel room assignment.
    pub room_number: String,
    /// Notification address.
    pub email: String,
    /// Optional contact number.
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_string_forms_round_trip() {
        for role in [Role::Admin, Role::Member] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn user_serialises_camel_case_without_phone_when_absent() {
        let user = User {
            id: Uuid::nil(),
            username: "asha".into(),
            full_name: "Asha Rao".into(),
            room_number: "B-204".into(),
            email: "asha@example.com".into(),
            phone: None,
            role: Role::Member,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).expect("serialise");
        assert_eq!(value["fullName"], "Asha Rao");
        assert_eq!(value["role"], "member");
        assert!(value.get("phone").is_none());
    }
}
