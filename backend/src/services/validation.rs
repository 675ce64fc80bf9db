//! Request validation helpers.
//!
//! Payload structs declare their limits with `validator`; this module renders
//! the resulting errors with the wording API clients already understand
//! ("Ensure this field has at least 3 characters.") and provides the checks
//! that cannot be expressed as derive attributes.

use chrono::NaiveDate;
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

use super::error::{FieldErrors, ServiceError, ServiceResult};
use crate::models::{ClassLetter, CLASS_NUMBERS};

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const DATE_IN_PAST: &str = "The date must not be in the past.";

/// Run derive validation and convert failures into [`ServiceError::Validation`].
pub fn validate<T: Validate>(payload: &T) -> ServiceResult<()> {
    payload
        .validate()
        .map_err(|errors| ServiceError::Validation(field_errors(&errors)))
}

pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    for (field, list) in errors.field_errors() {
        let messages = list.iter().map(message).collect();
        out.insert(field.to_string(), messages);
    }
    out
}

fn message(error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    let param = |name: &str| error.params.get(name).map(number);
    match error.code.as_ref() {
        "length" => {
            let actual = error
                .params
                .get("value")
                .and_then(Value::as_str)
                .map(|v| v.chars().count());
            match (param("min"), param("max"), actual) {
                (Some(_), _, Some(0)) => BLANK.to_string(),
                (Some(min), _, Some(len)) if (len as f64) < parse(&min) => {
                    format!("Ensure this field has at least {} characters.", min)
                }
                (_, Some(max), _) => {
                    format!("Ensure this field has no more than {} characters.", max)
                }
                (Some(min), None, _) => {
                    format!("Ensure this field has at least {} characters.", min)
                }
                _ => "Invalid length.".to_string(),
            }
        }
        "range" => {
            let actual = error.params.get("value").and_then(Value::as_f64);
            match (param("min"), param("max"), actual) {
                (Some(min), _, Some(v)) if v < parse(&min) => {
                    format!("Ensure this value is greater than or equal to {}.", min)
                }
                (_, Some(max), _) => {
                    format!("Ensure this value is less than or equal to {}.", max)
                }
                (Some(min), None, _) => {
                    format!("Ensure this value is greater than or equal to {}.", min)
                }
                _ => "Value out of range.".to_string(),
            }
        }
        "email" => "Enter a valid email address.".to_string(),
        "url" => "Enter a valid URL.".to_string(),
        other => other.to_string(),
    }
}

// Integers print without a trailing ".0" whatever numeric type the param had.
fn number(value: &Value) -> String {
    match value.as_i64() {
        Some(n) => n.to_string(),
        None => match value.as_f64() {
            Some(f) if f.fract() == 0.0 => (f as i64).to_string(),
            Some(f) => f.to_string(),
            None => value.to_string(),
        },
    }
}

fn parse(rendered: &str) -> f64 {
    rendered.parse().unwrap_or(f64::MAX)
}

/// Accumulates errors for checks that run after derive validation.
#[derive(Debug, Default)]
pub struct Checks {
    errors: FieldErrors,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Returns the value or records "This field is required.".
    pub fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, REQUIRED);
        }
        value
    }

    pub fn not_in_past(&mut self, field: &str, date: Option<NaiveDate>, today: NaiveDate) {
        if matches!(date, Some(d) if d < today) {
            self.add(field, DATE_IN_PAST);
        }
    }

    /// Parse a `{number, letter}` class reference. Existence is checked by the caller.
    pub fn class_ref(&mut self, field: &str, number: i32, letter: &str) -> Option<ClassLetter> {
        if !CLASS_NUMBERS.contains(&number) {
            self.add(field, format!("\"{}\" is not a valid class number.", number));
            return None;
        }
        match letter.parse::<ClassLetter>() {
            Ok(letter) => Some(letter),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> ServiceResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(self.errors))
        }
    }
}

/// Take a field already checked with [`Checks::required`].
pub fn require<T>(field: &str, value: Option<T>) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::field(field, REQUIRED))
}

/// Run derive validation and then `extra` checks, reporting all failures together.
pub fn validate_with<T, F>(payload: &T, extra: F) -> ServiceResult<()>
where
    T: Validate,
    F: FnOnce(&mut Checks),
{
    let mut checks = Checks::new();
    if let Err(errors) = payload.validate() {
        checks.errors = field_errors(&errors);
    }
    extra(&mut checks);
    checks.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{GradeRequest, NewsPayload, TalkPayload};

    #[test]
    fn test_length_messages() {
        let payload = TalkPayload {
            topic: Some("ab".into()),
            description: Some("x".repeat(10_001)),
            video_url: None,
        };
        let err = validate(&payload).unwrap_err();
        let ServiceError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors["topic"],
            vec!["Ensure this field has at least 3 characters.".to_string()]
        );
        assert_eq!(
            errors["description"],
            vec!["Ensure this field has no more than 10000 characters.".to_string()]
        );
    }

    #[test]
    fn test_range_messages() {
        let Err(ServiceError::Validation(errors)) = validate(&GradeRequest { value: 1 }) else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors["value"],
            vec!["Ensure this value is greater than or equal to 2.".to_string()]
        );

        let Err(ServiceError::Validation(errors)) = validate(&GradeRequest { value: 9 }) else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors["value"],
            vec!["Ensure this value is less than or equal to 6.".to_string()]
        );
    }

    #[test]
    fn test_checks_are_merged_with_derive_errors() {
        let payload = NewsPayload {
            title: Some("no".into()),
            content: None,
        };
        let result = validate_with(&payload, |checks| {
            checks.required("content", payload.content.as_ref());
        });
        let Err(ServiceError::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("title"));
        assert_eq!(errors["content"], vec![REQUIRED.to_string()]);
    }

    #[test]
    fn test_class_ref() {
        let mut checks = Checks::new();
        assert_eq!(checks.class_ref("class", 10, "B"), Some(ClassLetter::B));
        assert!(checks.is_empty());
        assert_eq!(checks.class_ref("class", 13, "B"), None);
        assert_eq!(checks.class_ref("class", 9, "Q"), None);
        assert!(!checks.is_empty());
    }

    #[test]
    fn test_not_in_past() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let mut checks = Checks::new();
        checks.not_in_past("date", NaiveDate::from_ymd_opt(2024, 5, 10), today);
        assert!(checks.is_empty());
        checks.not_in_past("date", NaiveDate::from_ymd_opt(2024, 5, 9), today);
        assert!(checks.finish().is_err());
    }
}
