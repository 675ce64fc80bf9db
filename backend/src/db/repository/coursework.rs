//! Coursework repository trait: exams, homeworks, submissions and materials.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::models::{
    ClassId, Exam, ExamId, Homework, HomeworkId, Material, MaterialId, NewExam, NewHomework,
    NewMaterial, NewSubmission, StudentId, SubjectId, Submission, SubmissionId, TeacherId,
};

/// Exam selection. Unset fields do not filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExamFilter {
    pub class_id: Option<ClassId>,
    pub author_id: Option<TeacherId>,
    /// Only exams on or after this date.
    pub from_date: Option<NaiveDate>,
}

/// Homework selection. Unset fields do not filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomeworkFilter {
    pub class_id: Option<ClassId>,
    pub author_id: Option<TeacherId>,
    /// Only homeworks whose deadline is on or after this date.
    pub from_deadline: Option<NaiveDate>,
}

/// Submission selection within one homework.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionFilter {
    pub homework_id: HomeworkId,
    pub student_id: Option<StudentId>,
    pub checked: Option<bool>,
}

impl SubmissionFilter {
    pub fn for_homework(homework_id: HomeworkId) -> Self {
        Self {
            homework_id,
            student_id: None,
            checked: None,
        }
    }
}

/// Repository trait for coursework.
///
/// Update methods persist every mutable field of the passed entity and
/// return the stored row. Delete methods return `NotFound` for unknown ids.
#[async_trait]
pub trait CourseworkRepository: Send + Sync {
    // ==================== Exams ====================

    /// `Conflict` if the topic is already used by another exam.
    async fn create_exam(&self, exam: NewExam) -> RepositoryResult<Exam>;
    async fn get_exam(&self, id: ExamId) -> RepositoryResult<Exam>;
    async fn update_exam(&self, exam: &Exam) -> RepositoryResult<Exam>;
    async fn delete_exam(&self, id: ExamId) -> RepositoryResult<()>;
    /// Ordered by (date, subject, class).
    async fn list_exams(&self, filter: ExamFilter) -> RepositoryResult<Vec<Exam>>;

    // ==================== Homeworks ====================

    async fn create_homework(&self, homework: NewHomework) -> RepositoryResult<Homework>;
    async fn get_homework(&self, id: HomeworkId) -> RepositoryResult<Homework>;
    async fn update_homework(&self, homework: &Homework) -> RepositoryResult<Homework>;
    /// Deletes the homework together with its submissions.
    async fn delete_homework(&self, id: HomeworkId) -> RepositoryResult<()>;
    /// Ordered by (deadline descending, class, subject).
    async fn list_homeworks(&self, filter: HomeworkFilter) -> RepositoryResult<Vec<Homework>>;

    // ==================== Submissions ====================

    /// `Conflict` if the student already submitted for this homework.
    async fn create_submission(&self, submission: NewSubmission) -> RepositoryResult<Submission>;
    async fn get_submission(&self, id: SubmissionId) -> RepositoryResult<Submission>;
    async fn update_submission(&self, submission: &Submission) -> RepositoryResult<Submission>;
    /// Newest first.
    async fn list_submissions(&self, filter: SubmissionFilter)
        -> RepositoryResult<Vec<Submission>>;

    // ==================== Materials ====================

    async fn create_material(&self, material: NewMaterial) -> RepositoryResult<Material>;
    async fn get_material(&self, id: MaterialId) -> RepositoryResult<Material>;
    async fn update_material(&self, material: &Material) -> RepositoryResult<Material>;
    async fn delete_material(&self, id: MaterialId) -> RepositoryResult<()>;
    /// Ordered by (class number, id).
    async fn list_materials(&self, subject_id: Option<SubjectId>)
        -> RepositoryResult<Vec<Material>>;
}
