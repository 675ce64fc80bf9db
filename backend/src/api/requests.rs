//! Request payloads.
//!
//! Field-level limits are declared with `validator` attributes; rules that
//! need storage access (unknown class, duplicate submission, ...) live in the
//! service layer. Update payloads double as create payloads: every field is
//! optional and creation checks presence of the required ones.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Reference to a class by its number and letter, e.g. `{"number": 10, "letter": "A"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRef {
    pub number: i32,
    pub letter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 30))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    pub class: ClassRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 6, max = 128))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetRequest {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PasswordResetConfirmRequest {
    #[validate(length(min = 1))]
    pub key: String,
    #[validate(length(min = 6, max = 128))]
    pub new_password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileUpdateRequest {
    #[validate(length(max = 30))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 2048))]
    pub info: Option<String>,
    #[validate(length(max = 255))]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GradeRequest {
    #[validate(range(min = 2, max = 6))]
    pub value: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ExamPayload {
    pub class: Option<ClassRef>,
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 60))]
    pub topic: Option<String>,
    #[validate(length(max = 1000))]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct HomeworkPayload {
    pub class: Option<ClassRef>,
    pub deadline: Option<NaiveDate>,
    #[validate(length(max = 256))]
    pub details: Option<String>,
    #[validate(url)]
    pub materials_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SubmissionPayload {
    #[validate(length(min = 1, max = 2048))]
    pub content: Option<String>,
    #[validate(url)]
    pub solution_url: Option<String>,
    /// Only honoured for teachers.
    pub checked: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MaterialPayload {
    #[validate(length(max = 150))]
    pub title: Option<String>,
    #[validate(length(max = 150))]
    pub section: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    #[validate(range(min = 8, max = 12))]
    pub class_number: Option<i32>,
    #[validate(url)]
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewsPayload {
    #[validate(length(min = 3, max = 100))]
    pub title: Option<String>,
    #[validate(length(min = 5, max = 10000))]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CommentPayload {
    #[validate(length(min = 1, max = 2048))]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MeetupPayload {
    pub date: Option<DateTime<Utc>>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TalkPayload {
    #[validate(length(min = 3, max = 500))]
    pub topic: Option<String>,
    #[validate(length(min = 5, max = 10000))]
    pub description: Option<String>,
    #[validate(url)]
    pub video_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_talk_payload_limits() {
        let ok = TalkPayload {
            topic: Some("Rust".into()),
            description: Some("ownership".into()),
            video_url: None,
        };
        assert!(ok.validate().is_ok());

        let short = TalkPayload {
            topic: Some("a".into()),
            ..ok.clone()
        };
        let errors = short.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("topic"));
    }

    #[test]
    fn test_grade_range() {
        assert!(GradeRequest { value: 6 }.validate().is_ok());
        assert!(GradeRequest { value: 1 }.validate().is_err());
        assert!(GradeRequest { value: 7 }.validate().is_err());
    }

    #[test]
    fn test_register_requires_email() {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "ivan",
            "email": "not-an-email",
            "password": "secret1",
            "class": {"number": 10, "letter": "A"}
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }
}
