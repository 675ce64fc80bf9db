//! School structure repository trait: classes, subjects and grades.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{
    Class, ClassId, ClassLetter, Grade, NewGrade, StudentId, Subject, SubjectId,
};

/// Grade selection. Unset fields do not filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradeFilter {
    pub subject_id: Option<SubjectId>,
    pub student_id: Option<StudentId>,
}

#[async_trait]
pub trait SchoolRepository: Send + Sync {
    /// Create a class; `Conflict` if the (number, letter) pair already exists.
    async fn create_class(&self, number: i32, letter: ClassLetter) -> RepositoryResult<Class>;

    async fn get_class(&self, id: ClassId) -> RepositoryResult<Class>;

    async fn find_class(&self, number: i32, letter: ClassLetter)
        -> RepositoryResult<Option<Class>>;

    /// Classes ordered by (number, letter), optionally restricted to one number.
    async fn list_classes(&self, number: Option<i32>) -> RepositoryResult<Vec<Class>>;

    /// Create a subject; `Conflict` if the title is taken.
    async fn create_subject(&self, title: &str) -> RepositoryResult<Subject>;

    async fn get_subject(&self, id: SubjectId) -> RepositoryResult<Subject>;

    async fn find_subject_by_title(&self, title: &str) -> RepositoryResult<Option<Subject>>;

    /// Subjects ordered by title.
    async fn list_subjects(&self) -> RepositoryResult<Vec<Subject>>;

    async fn create_grade(&self, grade: NewGrade) -> RepositoryResult<Grade>;

    /// Grades matching `filter`, newest first.
    async fn list_grades(&self, filter: GradeFilter) -> RepositoryResult<Vec<Grade>>;
}
