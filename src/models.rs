//! Core domain records shared by services and routes.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Account role. Serialized lowercase on the wire and in token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Teacher,
    Student,
    Parent,
}

impl UserRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Student => "student",
            Self::Parent => "parent",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "teacher" => Some(Self::Teacher),
            "student" => Some(Self::Student),
            "parent" => Some(Self::Parent),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored account. `password_hash` is an argon2 PHC string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

/// Fields required to create an account. The password is still plaintext here.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub role: UserRole,
}

/// Public view of a user, safe to return from the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Teacher).unwrap(), "\"teacher\"");
        let parsed: UserRole = serde_json::from_str("\"parent\"").unwrap();
        assert_eq!(parsed, UserRole::Parent);
    }

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!(UserRole::parse(" ADMIN "), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("Student"), Some(UserRole::Student));
        assert_eq!(UserRole::parse("principal"), None);
    }

    #[test]
    fn profile_omits_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@b.ke".into(),
            first_name: "Amina".into(),
            last_name: "Otieno".into(),
            password_hash: "$argon2id$secret".into(),
            role: UserRole::Teacher,
            is_active: true,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(UserProfile::from(&user)).unwrap();
        assert_eq!(json["role"], "teacher");
        assert!(json.get("password_hash").is_none());
    }
}
