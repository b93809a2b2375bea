//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_user_id, UserValidationError};

/// User identifier - opaque, caller-assigned, never generated by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        validate_user_id(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User entity
///
/// Serialized in camelCase, which is also the inbound event wire format.
/// The password is stored exactly as given; hashing is not a concern of this
/// layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    password: String,
    last_active_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl User {
    /// Create a user from all of its attributes
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        last_active_at: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            password: password.into(),
            last_active_at,
            created_at,
        }
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn last_active_at(&self) -> DateTime<Utc> {
        self.last_active_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the user has been idle since before `threshold`
    pub fn is_inactive_since(&self, threshold: DateTime<Utc>) -> bool {
        self.last_active_at < threshold
    }

    // Mutators

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    /// Record activity at the given instant
    pub fn record_activity(&mut self, at: DateTime<Utc>) {
        self.last_active_at = at;
    }

    /// Carry over the creation timestamp of the stored record on update
    pub fn restore_created_at(&mut self, created_at: DateTime<Utc>) {
        self.created_at = created_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_user(id: &str) -> User {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        User::new(UserId::new(id).unwrap(), "Ann", "ann@x.com", "p", at, at)
    }

    #[test]
    fn test_user_id_valid() {
        let id = UserId::new("u1").unwrap();
        assert_eq!(id.as_str(), "u1");
        assert_eq!(id.to_string(), "u1");
    }

    #[test]
    fn test_user_id_invalid() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("has space").is_err());
    }

    #[test]
    fn test_user_deserializes_wire_format() {
        let json = r#"{
            "id": "u1",
            "name": "Ann",
            "email": "ann@x.com",
            "password": "p",
            "lastActiveAt": "2024-01-01T00:00:00Z",
            "createdAt": "2024-01-01T00:00:00Z"
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user, create_test_user("u1"));
    }

    #[test]
    fn test_user_deserialize_rejects_empty_id() {
        let json = r#"{
            "id": "",
            "name": "Ann",
            "email": "ann@x.com",
            "password": "p",
            "lastActiveAt": "2024-01-01T00:00:00Z",
            "createdAt": "2024-01-01T00:00:00Z"
        }"#;

        assert!(serde_json::from_str::<User>(json).is_err());
    }

    #[test]
    fn test_user_serializes_camel_case() {
        let json = serde_json::to_value(create_test_user("u1")).unwrap();
        assert_eq!(json["lastActiveAt"], "2024-01-01T00:00:00Z");
        assert_eq!(json["createdAt"], "2024-01-01T00:00:00Z");
        assert_eq!(json["password"], "p");
    }

    #[test]
    fn test_inactivity() {
        let mut user = create_test_user("u1");
        let threshold = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert!(user.is_inactive_since(threshold));

        user.record_activity(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap());
        assert!(!user.is_inactive_since(threshold));

        // Strictly before: activity exactly at the threshold is not stale
        user.record_activity(threshold);
        assert!(!user.is_inactive_since(threshold));
    }
}
