//! Users, authentication tokens and the student/teacher profiles attached to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ClassId, StudentId, SubjectId, TeacherId, UserId};

/// Image path used until a user uploads their own profile picture.
pub const DEFAULT_PROFILE_IMAGE: &str = "images/default.png";

/// Account of anybody who can log in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_active: bool,
    /// Staff users act as administrators (meetup management, talk removal).
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Insertable user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
}

/// Opaque API token. A user owns at most one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub key: String,
    pub user_id: UserId,
    pub created: DateTime<Utc>,
}

/// Pending password reset. A user has at most one; requesting again replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordReset {
    pub key: String,
    pub user_id: UserId,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub user_id: UserId,
    pub class_id: ClassId,
    pub profile_image_url: String,
    pub info: String,
    /// Pending e-mail activation key; cleared once the account is activated.
    pub activation_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub user_id: UserId,
    pub class_id: ClassId,
    pub profile_image_url: String,
    pub info: String,
    pub activation_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub user_id: UserId,
    pub subject_id: SubjectId,
    pub profile_image_url: String,
    pub info: String,
}

#[derive(Debug, Clone)]
pub struct NewTeacher {
    pub user_id: UserId,
    pub subject_id: SubjectId,
    pub profile_image_url: String,
    pub info: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: &str, last: &str) -> User {
        User {
            id: UserId(1),
            username: "u".into(),
            email: String::new(),
            first_name: first.into(),
            last_name: last.into(),
            password_hash: "secret".into(),
            is_active: true,
            is_staff: false,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_full_name_trims_missing_parts() {
        assert_eq!(user("Ivan", "Petrov").full_name(), "Ivan Petrov");
        assert_eq!(user("Ivan", "").full_name(), "Ivan");
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let json = serde_json::to_value(user("a", "b")).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
