//! Service layer for business logic and orchestration.
//!
//! Services sit between the HTTP handlers and the repository. They resolve
//! the caller's permissions for each action, enforce the business rules
//! (one submission per student, author-only edits, locked checked
//! submissions, vote toggling) and render response views. Every operation
//! is generic over [`FullRepository`](crate::db::repository::FullRepository)
//! so it runs unchanged against any storage backend.

pub mod accounts;
pub mod error;
pub mod exams;
pub mod grades;
pub mod homeworks;
pub mod materials;
pub mod news;
pub mod pagination;
pub mod permissions;
pub mod render;
pub mod school;
pub mod seed;
pub mod talks;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::{FieldErrors, ServiceError, ServiceResult};
pub use news::NewsScope;
pub use pagination::{Page, PageRequest};
pub use permissions::{Action, Permission, Principal, Resource, Role};
pub use talks::MeetupWhen;
