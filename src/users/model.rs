use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::entity::{SoftDeletable, Stamped};

/// Ordered user roles. A higher rank carries more privileges; authorization
/// compares ranks with `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, sqlx::Type)]
#[repr(i32)]
pub enum Role {
    User = 1,
    Admin = 2,
}

impl TryFrom<i32> for Role {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Role::User),
            2 => Ok(Role::Admin),
            other => Err(format!("unknown role rank {other}")),
        }
    }
}

// Roles travel as their numeric rank, in JSON bodies and in token claims.
impl Serialize for Role {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(*self as i32)
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i32::deserialize(deserializer)?;
        Role::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// User record in the database. Never serialized directly; clients see the
/// `PublicUser` projection instead, so the password hash stays internal.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password: String, // argon2 hash
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub is_deleted: bool,
}

impl User {
    /// A not-yet-persisted user; the store assigns the id, the persistence
    /// hooks the timestamps.
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: Role,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: 0,
            email: email.into(),
            username: username.into(),
            password: password_hash.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            role,
            created_at: now,
            updated_at: now,
            is_deleted: false,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Stamped for User {
    fn stamp_created(&mut self, now: OffsetDateTime) {
        self.created_at = now;
    }
    fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = now;
    }
}

impl SoftDeletable for User {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// Clears the credential and rewrites the unique keys to a deterministic
    /// freed form, so the original email/username become available to new
    /// registrations while the record stays in storage.
    fn mark_deleted(&mut self) {
        self.password.clear();
        self.email = format!("(deleted-{}){}", self.id, self.email);
        self.username = format!("(deleted-{}){}", self.id, self.username);
        self.is_deleted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::before_delete;

    fn sample_user() -> User {
        let mut user = User::new(
            "jane@example.com",
            "janedoe",
            "$argon2$fake",
            "Jane",
            "Doe",
            Role::User,
        );
        user.id = 42;
        user
    }

    #[test]
    fn full_name_joins_first_and_last() {
        assert_eq!(sample_user().full_name(), "Jane Doe");
    }

    #[test]
    fn soft_delete_clears_password_and_frees_unique_slots() {
        let mut user = sample_user();
        before_delete(&mut user);

        assert!(user.is_deleted);
        assert!(user.password.is_empty());
        assert_eq!(user.email, "(deleted-42)jane@example.com");
        assert_eq!(user.username, "(deleted-42)janedoe");
        // names survive so the API can still report who was removed
        assert_eq!(user.full_name(), "Jane Doe");
    }

    #[test]
    fn role_ranks_are_ordered() {
        assert!(Role::Admin > Role::User);
        assert_eq!(Role::User as i32, 1);
        assert_eq!(Role::Admin as i32, 2);
    }

    #[test]
    fn role_round_trips_through_its_rank() {
        assert_eq!(Role::try_from(2), Ok(Role::Admin));
        assert!(Role::try_from(3).is_err());

        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "2");
        let role: Role = serde_json::from_str("1").unwrap();
        assert_eq!(role, Role::User);
        assert!(serde_json::from_str::<Role>("9").is_err());
    }
}
