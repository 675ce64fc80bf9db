//! Exams, homeworks, homework submissions and study materials.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{
    ClassId, ExamId, HomeworkId, MaterialId, StudentId, SubjectId, SubmissionId, TeacherId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    pub id: ExamId,
    pub subject_id: SubjectId,
    pub class_id: ClassId,
    pub date: NaiveDate,
    pub topic: String,
    pub details: String,
    pub author_id: TeacherId,
}

#[derive(Debug, Clone)]
pub struct NewExam {
    pub subject_id: SubjectId,
    pub class_id: ClassId,
    pub date: NaiveDate,
    pub topic: String,
    pub details: String,
    pub author_id: TeacherId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Homework {
    pub id: HomeworkId,
    pub subject_id: SubjectId,
    pub class_id: ClassId,
    pub deadline: NaiveDate,
    pub details: String,
    pub materials_url: Option<String>,
    pub author_id: TeacherId,
}

#[derive(Debug, Clone)]
pub struct NewHomework {
    pub subject_id: SubjectId,
    pub class_id: ClassId,
    pub deadline: NaiveDate,
    pub details: String,
    pub materials_url: Option<String>,
    pub author_id: TeacherId,
}

/// A student's answer to a homework. Once `checked` the student can no longer edit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub homework_id: HomeworkId,
    pub student_id: StudentId,
    pub content: String,
    pub solution_url: Option<String>,
    pub checked: bool,
    pub posted_on: DateTime<Utc>,
    pub edited: bool,
    pub last_edited_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub homework_id: HomeworkId,
    pub student_id: StudentId,
    pub content: String,
    pub solution_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub title: String,
    pub section: String,
    pub content: String,
    pub class_number: i32,
    pub subject_id: SubjectId,
    pub video_url: Option<String>,
    pub author_id: TeacherId,
}

#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub title: String,
    pub section: String,
    pub content: String,
    pub class_number: i32,
    pub subject_id: SubjectId,
    pub video_url: Option<String>,
    pub author_id: TeacherId,
}
