//! Response views rendered by the service layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    Class, ClassId, ClassLetter, CommentId, ExamId, GradeId, HomeworkId, MaterialId, MeetupId,
    NewsId, Subject, SubjectId, SubmissionId, TalkId, User, UserId,
};

/// Public part of a user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// Author of a piece of content. E-mail is left out on purpose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorView {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for AuthorView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassView {
    pub id: ClassId,
    pub number: i32,
    pub letter: ClassLetter,
}

impl From<&Class> for ClassView {
    fn from(class: &Class) -> Self {
        Self {
            id: class.id,
            number: class.number,
            letter: class.letter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectView {
    pub id: SubjectId,
    pub title: String,
}

impl From<&Subject> for SubjectView {
    fn from(subject: &Subject) -> Self {
        Self {
            id: subject.id,
            title: subject.title.clone(),
        }
    }
}

/// Body returned by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserInfo,
    pub token: String,
    pub is_teacher: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfileView {
    pub user: UserInfo,
    pub class: ClassView,
    pub profile_image_url: String,
    pub info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherProfileView {
    pub user: UserInfo,
    pub subject: SubjectView,
    pub profile_image_url: String,
    pub info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileView {
    Teacher(TeacherProfileView),
    Student(StudentProfileView),
    /// Accounts without a school role (e.g. meetup administrators).
    Member { user: UserInfo },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: ProfileView,
    pub is_teacher: bool,
    pub can_edit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeView {
    pub id: GradeId,
    pub value: i32,
    pub subject: SubjectView,
    pub student: AuthorView,
    pub posted_on: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamView {
    pub id: ExamId,
    pub subject: SubjectView,
    pub class: ClassView,
    pub date: NaiveDate,
    pub topic: String,
    pub details: String,
    pub author: AuthorView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeworkView {
    pub id: HomeworkId,
    pub subject: SubjectView,
    pub class: ClassView,
    pub deadline: NaiveDate,
    pub details: String,
    pub materials_url: Option<String>,
    pub author: AuthorView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionView {
    pub id: SubmissionId,
    pub homework_id: HomeworkId,
    pub student: AuthorView,
    pub content: String,
    pub solution_url: Option<String>,
    pub checked: bool,
    pub posted_on: DateTime<Utc>,
    pub edited: bool,
    pub last_edited_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialView {
    pub id: MaterialId,
    pub title: String,
    pub section: String,
    pub content: String,
    pub class_number: i32,
    pub subject: SubjectView,
    pub video_url: Option<String>,
    pub author: AuthorView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: CommentId,
    pub posted_by: AuthorView,
    pub content: String,
    pub posted_on: DateTime<Utc>,
    pub edited: bool,
    pub last_edited_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsView {
    pub id: NewsId,
    pub title: String,
    pub content: String,
    pub class_number: i32,
    pub class_letter: Option<ClassLetter>,
    pub posted_on: DateTime<Utc>,
    pub author: AuthorView,
    pub comments: Vec<CommentView>,
    pub edited: bool,
    pub last_edited_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalkView {
    pub id: TalkId,
    pub meetup_id: MeetupId,
    pub author: AuthorView,
    pub topic: String,
    pub description: String,
    pub video_url: Option<String>,
    pub votes_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetupView {
    pub id: MeetupId,
    pub date: DateTime<Utc>,
    pub description: String,
    pub talks: Vec<TalkView>,
}

/// Classes grouped by number, serialized as `{"8": [...], "9": [...]}`.
pub type ClassesByNumber = std::collections::BTreeMap<i32, Vec<ClassView>>;
