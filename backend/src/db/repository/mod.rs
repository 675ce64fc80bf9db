//! Repository trait definitions for database operations.
//!
//! Storage access is split into focused traits so each backend implementation
//! stays readable and services only depend on what they use.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`accounts`]: Users, tokens, student and teacher profiles
//! - [`school`]: Classes, subjects and grades
//! - [`coursework`]: Exams, homeworks, submissions and materials
//! - [`news`]: News and comments
//! - [`meetups`]: Meetups, talks and talk votes
//!
//! # Convenience Trait Bound
//!
//! For functions that need all repository capabilities, use the [`FullRepository`] trait bound:
//!
//! ```ignore
//! async fn my_service<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     let subjects = repo.list_subjects().await?;
//!     let talks = repo.list_talks(meetup_id).await?;
//!     Ok(())
//! }
//! ```

pub mod accounts;
pub mod coursework;
pub mod error;
pub mod meetups;
pub mod news;
pub mod school;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use accounts::AccountRepository;
pub use coursework::{CourseworkRepository, ExamFilter, HomeworkFilter, SubmissionFilter};
pub use meetups::{MeetupFilter, MeetupRepository};
pub use news::{NewsFilter, NewsRepository};
pub use school::{GradeFilter, SchoolRepository};

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type that implements all five
/// repository traits.
pub trait FullRepository:
    AccountRepository + SchoolRepository + CourseworkRepository + NewsRepository + MeetupRepository
{
}

impl<T> FullRepository for T where
    T: AccountRepository
        + SchoolRepository
        + CourseworkRepository
        + NewsRepository
        + MeetupRepository
{
}
