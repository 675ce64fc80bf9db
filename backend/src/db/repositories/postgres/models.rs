use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use super::schema::{
    auth_tokens, classes, comments, exams, grades, homeworks, materials, meetups, news,
    password_resets, students, subjects, submissions, talks, teachers, users,
};
use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::models::{
    AuthToken, Class, ClassId, ClassLetter, Comment, CommentId, Exam, ExamId, Grade, GradeId,
    Homework, HomeworkId, Material, MaterialId, Meetup, MeetupId, NewComment, NewExam, NewGrade,
    NewHomework, NewMaterial, NewMeetup, NewNews, NewStudent, NewSubmission, NewTalk, NewTeacher,
    NewUser, News, NewsId, PasswordReset, Student, StudentId, Subject, SubjectId, Submission, SubmissionId, Talk,
    TalkId, Teacher, TeacherId, User, UserId,
};

fn parse_letter(raw: &str) -> RepositoryResult<ClassLetter> {
    raw.parse::<ClassLetter>()
        .map_err(RepositoryError::validation)
}

// ==================== Accounts ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId(row.id),
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            is_active: row.is_active,
            is_staff: row.is_staff,
            date_joined: row.date_joined,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
}

impl From<NewUser> for NewUserRow {
    fn from(user: NewUser) -> Self {
        NewUserRow {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            is_active: user.is_active,
            is_staff: user.is_staff,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = auth_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AuthTokenRow {
    pub key: String,
    pub user_id: i64,
    pub created: DateTime<Utc>,
}

impl From<AuthTokenRow> for AuthToken {
    fn from(row: AuthTokenRow) -> Self {
        AuthToken {
            key: row.key,
            user_id: UserId(row.user_id),
            created: row.created,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = password_resets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PasswordResetRow {
    pub key: String,
    pub user_id: i64,
    pub created: DateTime<Utc>,
}

impl From<PasswordResetRow> for PasswordReset {
    fn from(row: PasswordResetRow) -> Self {
        PasswordReset {
            key: row.key,
            user_id: UserId(row.user_id),
            created: row.created,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StudentRow {
    pub id: i64,
    pub user_id: i64,
    pub class_id: i64,
    pub profile_image_url: String,
    pub info: String,
    pub activation_key: Option<String>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            id: StudentId(row.id),
            user_id: UserId(row.user_id),
            class_id: ClassId(row.class_id),
            profile_image_url: row.profile_image_url,
            info: row.info,
            activation_key: row.activation_key,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = students)]
pub struct NewStudentRow {
    pub user_id: i64,
    pub class_id: i64,
    pub profile_image_url: String,
    pub info: String,
    pub activation_key: Option<String>,
}

impl From<NewStudent> for NewStudentRow {
    fn from(student: NewStudent) -> Self {
        NewStudentRow {
            user_id: student.user_id.value(),
            class_id: student.class_id.value(),
            profile_image_url: student.profile_image_url,
            info: student.info,
            activation_key: student.activation_key,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = teachers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TeacherRow {
    pub id: i64,
    pub user_id: i64,
    pub subject_id: i64,
    pub profile_image_url: String,
    pub info: String,
}

impl From<TeacherRow> for Teacher {
    fn from(row: TeacherRow) -> Self {
        Teacher {
            id: TeacherId(row.id),
            user_id: UserId(row.user_id),
            subject_id: SubjectId(row.subject_id),
            profile_image_url: row.profile_image_url,
            info: row.info,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = teachers)]
pub struct NewTeacherRow {
    pub user_id: i64,
    pub subject_id: i64,
    pub profile_image_url: String,
    pub info: String,
}

impl From<NewTeacher> for NewTeacherRow {
    fn from(teacher: NewTeacher) -> Self {
        NewTeacherRow {
            user_id: teacher.user_id.value(),
            subject_id: teacher.subject_id.value(),
            profile_image_url: teacher.profile_image_url,
            info: teacher.info,
        }
    }
}

// ==================== School ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = classes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ClassRow {
    pub id: i64,
    pub number: i32,
    pub letter: String,
}

impl TryFrom<ClassRow> for Class {
    type Error = RepositoryError;

    fn try_from(row: ClassRow) -> RepositoryResult<Self> {
        Ok(Class {
            id: ClassId(row.id),
            number: row.number,
            letter: parse_letter(&row.letter)?,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = subjects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubjectRow {
    pub id: i64,
    pub title: String,
}

impl From<SubjectRow> for Subject {
    fn from(row: SubjectRow) -> Self {
        Subject {
            id: SubjectId(row.id),
            title: row.title,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = grades)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GradeRow {
    pub id: i64,
    pub value: i32,
    pub subject_id: i64,
    pub student_id: i64,
    pub posted_on: DateTime<Utc>,
}

impl From<GradeRow> for Grade {
    fn from(row: GradeRow) -> Self {
        Grade {
            id: GradeId(row.id),
            value: row.value,
            subject_id: SubjectId(row.subject_id),
            student_id: StudentId(row.student_id),
            posted_on: row.posted_on,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = grades)]
pub struct NewGradeRow {
    pub value: i32,
    pub subject_id: i64,
    pub student_id: i64,
}

impl From<NewGrade> for NewGradeRow {
    fn from(grade: NewGrade) -> Self {
        NewGradeRow {
            value: grade.value,
            subject_id: grade.subject_id.value(),
            student_id: grade.student_id.value(),
        }
    }
}

// ==================== Coursework ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = exams)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ExamRow {
    pub id: i64,
    pub subject_id: i64,
    pub class_id: i64,
    pub date: NaiveDate,
    pub topic: String,
    pub details: String,
    pub author_id: i64,
}

impl From<ExamRow> for Exam {
    fn from(row: ExamRow) -> Self {
        Exam {
            id: ExamId(row.id),
            subject_id: SubjectId(row.subject_id),
            class_id: ClassId(row.class_id),
            date: row.date,
            topic: row.topic,
            details: row.details,
            author_id: TeacherId(row.author_id),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = exams)]
pub struct NewExamRow {
    pub subject_id: i64,
    pub class_id: i64,
    pub date: NaiveDate,
    pub topic: String,
    pub details: String,
    pub author_id: i64,
}

impl From<NewExam> for NewExamRow {
    fn from(exam: NewExam) -> Self {
        NewExamRow {
            subject_id: exam.subject_id.value(),
            class_id: exam.class_id.value(),
            date: exam.date,
            topic: exam.topic,
            details: exam.details,
            author_id: exam.author_id.value(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = homeworks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HomeworkRow {
    pub id: i64,
    pub subject_id: i64,
    pub class_id: i64,
    pub deadline: NaiveDate,
    pub details: String,
    pub materials_url: Option<String>,
    pub author_id: i64,
}

impl From<HomeworkRow> for Homework {
    fn from(row: HomeworkRow) -> Self {
        Homework {
            id: HomeworkId(row.id),
            subject_id: SubjectId(row.subject_id),
            class_id: ClassId(row.class_id),
            deadline: row.deadline,
            details: row.details,
            materials_url: row.materials_url,
            author_id: TeacherId(row.author_id),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = homeworks)]
pub struct NewHomeworkRow {
    pub subject_id: i64,
    pub class_id: i64,
    pub deadline: NaiveDate,
    pub details: String,
    pub materials_url: Option<String>,
    pub author_id: i64,
}

impl From<NewHomework> for NewHomeworkRow {
    fn from(homework: NewHomework) -> Self {
        NewHomeworkRow {
            subject_id: homework.subject_id.value(),
            class_id: homework.class_id.value(),
            deadline: homework.deadline,
            details: homework.details,
            materials_url: homework.materials_url,
            author_id: homework.author_id.value(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = submissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubmissionRow {
    pub id: i64,
    pub homework_id: i64,
    pub student_id: i64,
    pub content: String,
    pub solution_url: Option<String>,
    pub checked: bool,
    pub posted_on: DateTime<Utc>,
    pub edited: bool,
    pub last_edited_on: Option<DateTime<Utc>>,
}

impl From<SubmissionRow> for Submission {
    fn from(row: SubmissionRow) -> Self {
        Submission {
            id: SubmissionId(row.id),
            homework_id: HomeworkId(row.homework_id),
            student_id: StudentId(row.student_id),
            content: row.content,
            solution_url: row.solution_url,
            checked: row.checked,
            posted_on: row.posted_on,
            edited: row.edited,
            last_edited_on: row.last_edited_on,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = submissions)]
pub struct NewSubmissionRow {
    pub homework_id: i64,
    pub student_id: i64,
    pub content: String,
    pub solution_url: Option<String>,
}

impl From<NewSubmission> for NewSubmissionRow {
    fn from(submission: NewSubmission) -> Self {
        NewSubmissionRow {
            homework_id: submission.homework_id.value(),
            student_id: submission.student_id.value(),
            content: submission.content,
            solution_url: submission.solution_url,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = materials)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MaterialRow {
    pub id: i64,
    pub title: String,
    pub section: String,
    pub content: String,
    pub class_number: i32,
    pub subject_id: i64,
    pub video_url: Option<String>,
    pub author_id: i64,
}

impl From<MaterialRow> for Material {
    fn from(row: MaterialRow) -> Self {
        Material {
            id: MaterialId(row.id),
            title: row.title,
            section: row.section,
            content: row.content,
            class_number: row.class_number,
            subject_id: SubjectId(row.subject_id),
            video_url: row.video_url,
            author_id: TeacherId(row.author_id),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = materials)]
pub struct NewMaterialRow {
    pub title: String,
    pub section: String,
    pub content: String,
    pub class_number: i32,
    pub subject_id: i64,
    pub video_url: Option<String>,
    pub author_id: i64,
}

impl From<NewMaterial> for NewMaterialRow {
    fn from(material: NewMaterial) -> Self {
        NewMaterialRow {
            title: material.title,
            section: material.section,
            content: material.content,
            class_number: material.class_number,
            subject_id: material.subject_id.value(),
            video_url: material.video_url,
            author_id: material.author_id.value(),
        }
    }
}

// ==================== News ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = news)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewsRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub class_number: i32,
    pub class_letter: Option<String>,
    pub posted_on: DateTime<Utc>,
    pub edited: bool,
    pub last_edited_on: Option<DateTime<Utc>>,
}

impl TryFrom<NewsRow> for News {
    type Error = RepositoryError;

    fn try_from(row: NewsRow) -> RepositoryResult<Self> {
        let class_letter = row.class_letter.as_deref().map(parse_letter).transpose()?;
        Ok(News {
            id: NewsId(row.id),
            title: row.title,
            content: row.content,
            author_id: UserId(row.author_id),
            class_number: row.class_number,
            class_letter,
            posted_on: row.posted_on,
            edited: row.edited,
            last_edited_on: row.last_edited_on,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = news)]
pub struct NewNewsRow {
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub class_number: i32,
    pub class_letter: Option<String>,
}

impl From<NewNews> for NewNewsRow {
    fn from(entry: NewNews) -> Self {
        NewNewsRow {
            title: entry.title,
            content: entry.content,
            author_id: entry.author_id.value(),
            class_number: entry.class_number,
            class_letter: entry.class_letter.map(|l| l.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    pub id: i64,
    pub news_id: i64,
    pub posted_by: i64,
    pub content: String,
    pub posted_on: DateTime<Utc>,
    pub edited: bool,
    pub last_edited_on: Option<DateTime<Utc>>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: CommentId(row.id),
            news_id: NewsId(row.news_id),
            posted_by: UserId(row.posted_by),
            content: row.content,
            posted_on: row.posted_on,
            edited: row.edited,
            last_edited_on: row.last_edited_on,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub struct NewCommentRow {
    pub news_id: i64,
    pub posted_by: i64,
    pub content: String,
}

impl From<NewComment> for NewCommentRow {
    fn from(comment: NewComment) -> Self {
        NewCommentRow {
            news_id: comment.news_id.value(),
            posted_by: comment.posted_by.value(),
            content: comment.content,
        }
    }
}

// ==================== Meetups ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = meetups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MeetupRow {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub description: String,
}

impl From<MeetupRow> for Meetup {
    fn from(row: MeetupRow) -> Self {
        Meetup {
            id: MeetupId(row.id),
            date: row.date,
            description: row.description,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = meetups)]
pub struct NewMeetupRow {
    pub date: DateTime<Utc>,
    pub description: String,
}

impl From<NewMeetup> for NewMeetupRow {
    fn from(meetup: NewMeetup) -> Self {
        NewMeetupRow {
            date: meetup.date,
            description: meetup.description,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = talks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TalkRow {
    pub id: i64,
    pub meetup_id: i64,
    pub author_id: i64,
    pub topic: String,
    pub description: String,
    pub video_url: Option<String>,
}

impl TalkRow {
    /// Attach the vote tally, which lives in `talk_votes`.
    pub fn into_talk(self, votes_count: i64) -> Talk {
        Talk {
            id: TalkId(self.id),
            meetup_id: MeetupId(self.meetup_id),
            author_id: UserId(self.author_id),
            topic: self.topic,
            description: self.description,
            video_url: self.video_url,
            votes_count,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = talks)]
pub struct NewTalkRow {
    pub meetup_id: i64,
    pub author_id: i64,
    pub topic: String,
    pub description: String,
    pub video_url: Option<String>,
}

impl From<NewTalk> for NewTalkRow {
    fn from(talk: NewTalk) -> Self {
        NewTalkRow {
            meetup_id: talk.meetup_id.value(),
            author_id: talk.author_id.value(),
            topic: talk.topic,
            description: talk.description,
            video_url: talk.video_url,
        }
    }
}
