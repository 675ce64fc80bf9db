//! Service layer error type.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::db::repository::RepositoryError;

/// Field name to list of human readable messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub type ServiceResult<T> = Result<T, ServiceError>;

pub const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
pub const INVALID_TOKEN: &str = "Invalid token.";
pub const NO_PERMISSION: &str = "You do not have permission to perform this action.";

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or unknown credentials.
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated but refused by a business rule that answers 401.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid input.")]
    Validation(FieldErrors),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    pub fn not_authenticated() -> Self {
        Self::Unauthenticated(NOT_AUTHENTICATED.to_string())
    }

    pub fn invalid_token() -> Self {
        Self::Unauthenticated(INVALID_TOKEN.to_string())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound("Not found.".to_string())
    }

    /// Single field validation failure.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        Self::Validation(errors)
    }

    /// Failure that does not belong to a single field.
    pub fn non_field(message: impl Into<String>) -> Self {
        Self::field("non_field_errors", message)
    }

    /// Lift repository "not found" into the service variant, keep the rest.
    pub fn from_lookup(err: RepositoryError) -> Self {
        if err.is_not_found() {
            Self::not_found()
        } else {
            Self::Repository(err)
        }
    }
}

/// Turn repository misses into 404s while propagating everything else.
pub(crate) trait LookupExt<T> {
    fn or_not_found(self) -> ServiceResult<T>;
}

impl<T> LookupExt<T> for Result<T, RepositoryError> {
    fn or_not_found(self) -> ServiceResult<T> {
        self.map_err(ServiceError::from_lookup)
    }
}

/// Same as [`LookupExt`] for `find_*` queries that return `Option`.
pub(crate) trait FindExt<T> {
    fn found(self) -> ServiceResult<T>;
}

impl<T> FindExt<T> for Result<Option<T>, RepositoryError> {
    fn found(self) -> ServiceResult<T> {
        self?.ok_or_else(ServiceError::not_found)
    }
}

/// Report unique constraint violations as a validation error on `field`.
pub(crate) trait ConflictExt<T> {
    fn conflict_on(self, field: &str) -> ServiceResult<T>;
}

impl<T> ConflictExt<T> for Result<T, RepositoryError> {
    fn conflict_on(self, field: &str) -> ServiceResult<T> {
        self.map_err(|err| match err {
            RepositoryError::Conflict { message, .. } => ServiceError::field(field, message),
            other => ServiceError::from_lookup(other),
        })
    }
}
