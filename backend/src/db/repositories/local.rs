//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory using `BTreeMap` tables keyed by id, which keeps iteration order
//! deterministic and makes tests reproducible.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::db::repository::*;
use crate::models::*;

/// In-memory local repository.
///
/// Cloning is cheap: clones share the same underlying tables.
///
/// # Example
/// ```
/// use elsyser::db::repositories::LocalRepository;
/// use elsyser::db::repository::SchoolRepository;
///
/// # tokio_test::block_on(async {
/// let repo = LocalRepository::new();
/// repo.create_subject("Mathematics").await.unwrap();
///
/// let subjects = repo.list_subjects().await.unwrap();
/// assert_eq!(subjects.len(), 1);
/// # });
/// ```
#[derive(Clone, Default)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

#[derive(Default)]
struct LocalData {
    users: BTreeMap<UserId, User>,
    tokens: BTreeMap<String, AuthToken>,
    password_resets: BTreeMap<String, PasswordReset>,
    students: BTreeMap<StudentId, Student>,
    teachers: BTreeMap<TeacherId, Teacher>,

    classes: BTreeMap<ClassId, Class>,
    subjects: BTreeMap<SubjectId, Subject>,
    grades: BTreeMap<GradeId, Grade>,

    exams: BTreeMap<ExamId, Exam>,
    homeworks: BTreeMap<HomeworkId, Homework>,
    submissions: BTreeMap<SubmissionId, Submission>,
    materials: BTreeMap<MaterialId, Material>,

    news: BTreeMap<NewsId, News>,
    comments: BTreeMap<CommentId, Comment>,

    meetups: BTreeMap<MeetupId, Meetup>,
    talks: BTreeMap<TalkId, Talk>,
    votes: BTreeSet<(TalkId, UserId)>,

    // Single id sequence shared by every table
    last_id: i64,

    // Connection health
    unhealthy: bool,
}

impl LocalData {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn votes_for(&self, talk_id: TalkId) -> i64 {
        self.votes
            .range((talk_id, UserId(i64::MIN))..=(talk_id, UserId(i64::MAX)))
            .count() as i64
    }

    /// Sort key of a class: number, then letter.
    fn class_key(&self, id: ClassId) -> Option<(i32, ClassLetter)> {
        self.classes.get(&id).map(|c| (c.number, c.letter))
    }

    fn subject_title(&self, id: SubjectId) -> Option<&str> {
        self.subjects.get(&id).map(|s| s.title.as_str())
    }

    fn with_votes(&self, talk: &Talk) -> Talk {
        Talk {
            votes_count: self.votes_for(talk.id),
            ..talk.clone()
        }
    }
}

fn missing(entity: &str, id: impl ToString) -> RepositoryError {
    RepositoryError::not_found_entity(entity, id)
}

fn fetch<K: Ord + Copy + ToString, V: Clone>(
    table: &BTreeMap<K, V>,
    entity: &str,
    id: K,
) -> RepositoryResult<V> {
    table.get(&id).cloned().ok_or_else(|| missing(entity, id))
}

fn replace<K: Ord + Copy + ToString, V: Clone>(
    table: &mut BTreeMap<K, V>,
    entity: &str,
    id: K,
    value: &V,
) -> RepositoryResult<V> {
    match table.get_mut(&id) {
        Some(slot) => {
            *slot = value.clone();
            Ok(value.clone())
        }
        None => Err(missing(entity, id)),
    }
}

fn remove<K: Ord + Copy + ToString, V>(
    table: &mut BTreeMap<K, V>,
    entity: &str,
    id: K,
) -> RepositoryResult<()> {
    table.remove(&id).map(|_| ()).ok_or_else(|| missing(entity, id))
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().unhealthy = !healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let unhealthy = data.unhealthy;
        *data = LocalData {
            unhealthy,
            ..Default::default()
        };
    }

    /// Number of registered users.
    pub fn user_count(&self) -> usize {
        self.data.read().users.len()
    }

    /// Number of stored homeworks.
    pub fn homework_count(&self) -> usize {
        self.data.read().homeworks.len()
    }

    /// Number of votes recorded for a talk.
    pub fn vote_count(&self, talk_id: TalkId) -> i64 {
        self.data.read().votes_for(talk_id)
    }
}

#[async_trait]
impl AccountRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        if self.data.read().unhealthy {
            return Err(RepositoryError::connection("local repository marked unhealthy"));
        }
        Ok(true)
    }

    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        let mut data = self.data.write();
        if data.users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::conflict_with_context(
                "A user with that username already exists.",
                ErrorContext::new("create_user").with_entity("user"),
            ));
        }

        let id = UserId(data.next_id());
        let stored = User {
            id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            is_active: user.is_active,
            is_staff: user.is_staff,
            date_joined: Utc::now(),
        };
        data.users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<User> {
        fetch(&self.data.read().users, "user", id)
    }

    async fn find_user_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let data = self.data.read();
        Ok(data.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_users_by_email(&self, email: &str) -> RepositoryResult<Vec<User>> {
        let data = self.data.read();
        Ok(data
            .users
            .values()
            .filter(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
            .collect())
    }

    async fn update_user(&self, user: &User) -> RepositoryResult<User> {
        let mut data = self.data.write();
        if data
            .users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(RepositoryError::conflict(
                "A user with that username already exists.",
            ));
        }
        replace(&mut data.users, "user", user.id, user)
    }

    async fn get_or_create_token(
        &self,
        user_id: UserId,
        new_key: &str,
    ) -> RepositoryResult<AuthToken> {
        let mut data = self.data.write();
        if !data.users.contains_key(&user_id) {
            return Err(missing("user", user_id));
        }
        if let Some(token) = data.tokens.values().find(|t| t.user_id == user_id) {
            return Ok(token.clone());
        }

        let token = AuthToken {
            key: new_key.to_string(),
            user_id,
            created: Utc::now(),
        };
        data.tokens.insert(token.key.clone(), token.clone());
        Ok(token)
    }

    async fn find_token(&self, key: &str) -> RepositoryResult<Option<AuthToken>> {
        Ok(self.data.read().tokens.get(key).cloned())
    }

    async fn delete_token(&self, user_id: UserId) -> RepositoryResult<bool> {
        let mut data = self.data.write();
        let before = data.tokens.len();
        data.tokens.retain(|_, t| t.user_id != user_id);
        Ok(data.tokens.len() != before)
    }

    async fn replace_password_reset(
        &self,
        user_id: UserId,
        key: &str,
    ) -> RepositoryResult<PasswordReset> {
        let mut data = self.data.write();
        if !data.users.contains_key(&user_id) {
            return Err(missing("user", user_id));
        }
        data.password_resets.retain(|_, r| r.user_id != user_id);

        let reset = PasswordReset {
            key: key.to_string(),
            user_id,
            created: Utc::now(),
        };
        data.password_resets.insert(reset.key.clone(), reset.clone());
        Ok(reset)
    }

    async fn find_password_reset(&self, key: &str) -> RepositoryResult<Option<PasswordReset>> {
        Ok(self.data.read().password_resets.get(key).cloned())
    }

    async fn delete_password_reset(&self, user_id: UserId) -> RepositoryResult<bool> {
        let mut data = self.data.write();
        let before = data.password_resets.len();
        data.password_resets.retain(|_, r| r.user_id != user_id);
        Ok(data.password_resets.len() != before)
    }

    async fn create_student(&self, student: NewStudent) -> RepositoryResult<Student> {
        let mut data = self.data.write();
        if !data.users.contains_key(&student.user_id) {
            return Err(missing("user", student.user_id));
        }
        if !data.classes.contains_key(&student.class_id) {
            return Err(missing("class", student.class_id));
        }
        if data.students.values().any(|s| s.user_id == student.user_id) {
            return Err(RepositoryError::conflict("User already has a student profile"));
        }

        let id = StudentId(data.next_id());
        let stored = Student {
            id,
            user_id: student.user_id,
            class_id: student.class_id,
            profile_image_url: student.profile_image_url,
            info: student.info,
            activation_key: student.activation_key,
        };
        data.students.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_student(&self, id: StudentId) -> RepositoryResult<Student> {
        fetch(&self.data.read().students, "student", id)
    }

    async fn find_student_by_user(&self, user_id: UserId) -> RepositoryResult<Option<Student>> {
        let data = self.data.read();
        Ok(data.students.values().find(|s| s.user_id == user_id).cloned())
    }

    async fn find_student_by_activation_key(
        &self,
        key: &str,
    ) -> RepositoryResult<Option<Student>> {
        let data = self.data.read();
        Ok(data
            .students
            .values()
            .find(|s| s.activation_key.as_deref() == Some(key))
            .cloned())
    }

    async fn update_student(&self, student: &Student) -> RepositoryResult<Student> {
        let mut data = self.data.write();
        if !data.classes.contains_key(&student.class_id) {
            return Err(missing("class", student.class_id));
        }
        replace(&mut data.students, "student", student.id, student)
    }

    async fn list_students_in_class(&self, class_id: ClassId) -> RepositoryResult<Vec<Student>> {
        let data = self.data.read();
        Ok(data
            .students
            .values()
            .filter(|s| s.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn create_teacher(&self, teacher: NewTeacher) -> RepositoryResult<Teacher> {
        let mut data = self.data.write();
        if !data.users.contains_key(&teacher.user_id) {
            return Err(missing("user", teacher.user_id));
        }
        if !data.subjects.contains_key(&teacher.subject_id) {
            return Err(missing("subject", teacher.subject_id));
        }
        if data.teachers.values().any(|t| t.user_id == teacher.user_id) {
            return Err(RepositoryError::conflict("User already has a teacher profile"));
        }

        let id = TeacherId(data.next_id());
        let stored = Teacher {
            id,
            user_id: teacher.user_id,
            subject_id: teacher.subject_id,
            profile_image_url: teacher.profile_image_url,
            info: teacher.info,
        };
        data.teachers.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_teacher(&self, id: TeacherId) -> RepositoryResult<Teacher> {
        fetch(&self.data.read().teachers, "teacher", id)
    }

    async fn find_teacher_by_user(&self, user_id: UserId) -> RepositoryResult<Option<Teacher>> {
        let data = self.data.read();
        Ok(data.teachers.values().find(|t| t.user_id == user_id).cloned())
    }

    async fn update_teacher(&self, teacher: &Teacher) -> RepositoryResult<Teacher> {
        let mut data = self.data.write();
        replace(&mut data.teachers, "teacher", teacher.id, teacher)
    }
}

#[async_trait]
impl SchoolRepository for LocalRepository {
    async fn create_class(&self, number: i32, letter: ClassLetter) -> RepositoryResult<Class> {
        let mut data = self.data.write();
        if data
            .classes
            .values()
            .any(|c| c.number == number && c.letter == letter)
        {
            return Err(RepositoryError::conflict(format!(
                "Class {}{} already exists",
                number, letter
            )));
        }

        let id = ClassId(data.next_id());
        let class = Class { id, number, letter };
        data.classes.insert(id, class.clone());
        Ok(class)
    }

    async fn get_class(&self, id: ClassId) -> RepositoryResult<Class> {
        fetch(&self.data.read().classes, "class", id)
    }

    async fn find_class(
        &self,
        number: i32,
        letter: ClassLetter,
    ) -> RepositoryResult<Option<Class>> {
        let data = self.data.read();
        Ok(data
            .classes
            .values()
            .find(|c| c.number == number && c.letter == letter)
            .cloned())
    }

    async fn list_classes(&self, number: Option<i32>) -> RepositoryResult<Vec<Class>> {
        let data = self.data.read();
        let mut classes: Vec<Class> = data
            .classes
            .values()
            .filter(|c| number.map_or(true, |n| c.number == n))
            .cloned()
            .collect();
        classes.sort_by_key(|c| (c.number, c.letter));
        Ok(classes)
    }

    async fn create_subject(&self, title: &str) -> RepositoryResult<Subject> {
        let mut data = self.data.write();
        if data.subjects.values().any(|s| s.title == title) {
            return Err(RepositoryError::conflict(
                "subject with this title already exists.",
            ));
        }

        let id = SubjectId(data.next_id());
        let subject = Subject {
            id,
            title: title.to_string(),
        };
        data.subjects.insert(id, subject.clone());
        Ok(subject)
    }

    async fn get_subject(&self, id: SubjectId) -> RepositoryResult<Subject> {
        fetch(&self.data.read().subjects, "subject", id)
    }

    async fn find_subject_by_title(&self, title: &str) -> RepositoryResult<Option<Subject>> {
        let data = self.data.read();
        Ok(data.subjects.values().find(|s| s.title == title).cloned())
    }

    async fn list_subjects(&self) -> RepositoryResult<Vec<Subject>> {
        let mut subjects: Vec<Subject> = self.data.read().subjects.values().cloned().collect();
        subjects.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(subjects)
    }

    async fn create_grade(&self, grade: NewGrade) -> RepositoryResult<Grade> {
        let mut data = self.data.write();
        if !data.subjects.contains_key(&grade.subject_id) {
            return Err(missing("subject", grade.subject_id));
        }
        if !data.students.contains_key(&grade.student_id) {
            return Err(missing("student", grade.student_id));
        }

        let id = GradeId(data.next_id());
        let stored = Grade {
            id,
            value: grade.value,
            subject_id: grade.subject_id,
            student_id: grade.student_id,
            posted_on: Utc::now(),
        };
        data.grades.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_grades(&self, filter: GradeFilter) -> RepositoryResult<Vec<Grade>> {
        let data = self.data.read();
        Ok(data
            .grades
            .values()
            .rev()
            .filter(|g| filter.subject_id.map_or(true, |s| g.subject_id == s))
            .filter(|g| filter.student_id.map_or(true, |s| g.student_id == s))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CourseworkRepository for LocalRepository {
    async fn create_exam(&self, exam: NewExam) -> RepositoryResult<Exam> {
        let mut data = self.data.write();
        if data.exams.values().any(|e| e.topic == exam.topic) {
            return Err(RepositoryError::conflict("exam with this topic already exists."));
        }

        let id = ExamId(data.next_id());
        let stored = Exam {
            id,
            subject_id: exam.subject_id,
            class_id: exam.class_id,
            date: exam.date,
            topic: exam.topic,
            details: exam.details,
            author_id: exam.author_id,
        };
        data.exams.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_exam(&self, id: ExamId) -> RepositoryResult<Exam> {
        fetch(&self.data.read().exams, "exam", id)
    }

    async fn update_exam(&self, exam: &Exam) -> RepositoryResult<Exam> {
        let mut data = self.data.write();
        if data
            .exams
            .values()
            .any(|e| e.id != exam.id && e.topic == exam.topic)
        {
            return Err(RepositoryError::conflict("exam with this topic already exists."));
        }
        replace(&mut data.exams, "exam", exam.id, exam)
    }

    async fn delete_exam(&self, id: ExamId) -> RepositoryResult<()> {
        remove(&mut self.data.write().exams, "exam", id)
    }

    async fn list_exams(&self, filter: ExamFilter) -> RepositoryResult<Vec<Exam>> {
        let data = self.data.read();
        let mut exams: Vec<Exam> = data
            .exams
            .values()
            .filter(|e| filter.class_id.map_or(true, |c| e.class_id == c))
            .filter(|e| filter.author_id.map_or(true, |a| e.author_id == a))
            .filter(|e| filter.from_date.map_or(true, |d| e.date >= d))
            .cloned()
            .collect();
        exams.sort_by_key(|e| {
            (
                e.date,
                data.subject_title(e.subject_id),
                data.class_key(e.class_id),
                e.id,
            )
        });
        Ok(exams)
    }

    async fn create_homework(&self, homework: NewHomework) -> RepositoryResult<Homework> {
        let mut data = self.data.write();
        let id = HomeworkId(data.next_id());
        let stored = Homework {
            id,
            subject_id: homework.subject_id,
            class_id: homework.class_id,
            deadline: homework.deadline,
            details: homework.details,
            materials_url: homework.materials_url,
            author_id: homework.author_id,
        };
        data.homeworks.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_homework(&self, id: HomeworkId) -> RepositoryResult<Homework> {
        fetch(&self.data.read().homeworks, "homework", id)
    }

    async fn update_homework(&self, homework: &Homework) -> RepositoryResult<Homework> {
        let mut data = self.data.write();
        replace(&mut data.homeworks, "homework", homework.id, homework)
    }

    async fn delete_homework(&self, id: HomeworkId) -> RepositoryResult<()> {
        let mut data = self.data.write();
        remove(&mut data.homeworks, "homework", id)?;
        data.submissions.retain(|_, s| s.homework_id != id);
        Ok(())
    }

    async fn list_homeworks(&self, filter: HomeworkFilter) -> RepositoryResult<Vec<Homework>> {
        let data = self.data.read();
        let mut homeworks: Vec<Homework> = data
            .homeworks
            .values()
            .filter(|h| filter.class_id.map_or(true, |c| h.class_id == c))
            .filter(|h| filter.author_id.map_or(true, |a| h.author_id == a))
            .filter(|h| filter.from_deadline.map_or(true, |d| h.deadline >= d))
            .cloned()
            .collect();
        homeworks.sort_by(|a, b| {
            b.deadline
                .cmp(&a.deadline)
                .then_with(|| data.class_key(a.class_id).cmp(&data.class_key(b.class_id)))
                .then_with(|| {
                    data.subject_title(a.subject_id)
                        .cmp(&data.subject_title(b.subject_id))
                })
                .then(a.id.cmp(&b.id))
        });
        Ok(homeworks)
    }

    async fn create_submission(&self, submission: NewSubmission) -> RepositoryResult<Submission> {
        let mut data = self.data.write();
        if !data.homeworks.contains_key(&submission.homework_id) {
            return Err(missing("homework", submission.homework_id));
        }
        if data.submissions.values().any(|s| {
            s.homework_id == submission.homework_id && s.student_id == submission.student_id
        }) {
            return Err(RepositoryError::conflict_with_context(
                "Student already submitted for this homework",
                ErrorContext::new("create_submission")
                    .with_entity("homework")
                    .with_entity_id(submission.homework_id),
            ));
        }

        let id = SubmissionId(data.next_id());
        let stored = Submission {
            id,
            homework_id: submission.homework_id,
            student_id: submission.student_id,
            content: submission.content,
            solution_url: submission.solution_url,
            checked: false,
            posted_on: Utc::now(),
            edited: false,
            last_edited_on: None,
        };
        data.submissions.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_submission(&self, id: SubmissionId) -> RepositoryResult<Submission> {
        fetch(&self.data.read().submissions, "submission", id)
    }

    async fn update_submission(&self, submission: &Submission) -> RepositoryResult<Submission> {
        let mut data = self.data.write();
        replace(&mut data.submissions, "submission", submission.id, submission)
    }

    async fn list_submissions(
        &self,
        filter: SubmissionFilter,
    ) -> RepositoryResult<Vec<Submission>> {
        let data = self.data.read();
        Ok(data
            .submissions
            .values()
            .rev()
            .filter(|s| s.homework_id == filter.homework_id)
            .filter(|s| filter.student_id.map_or(true, |st| s.student_id == st))
            .filter(|s| filter.checked.map_or(true, |c| s.checked == c))
            .cloned()
            .collect())
    }

    async fn create_material(&self, material: NewMaterial) -> RepositoryResult<Material> {
        let mut data = self.data.write();
        if !data.subjects.contains_key(&material.subject_id) {
            return Err(missing("subject", material.subject_id));
        }

        let id = MaterialId(data.next_id());
        let stored = Material {
            id,
            title: material.title,
            section: material.section,
            content: material.content,
            class_number: material.class_number,
            subject_id: material.subject_id,
            video_url: material.video_url,
            author_id: material.author_id,
        };
        data.materials.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_material(&self, id: MaterialId) -> RepositoryResult<Material> {
        fetch(&self.data.read().materials, "material", id)
    }

    async fn update_material(&self, material: &Material) -> RepositoryResult<Material> {
        let mut data = self.data.write();
        replace(&mut data.materials, "material", material.id, material)
    }

    async fn delete_material(&self, id: MaterialId) -> RepositoryResult<()> {
        remove(&mut self.data.write().materials, "material", id)
    }

    async fn list_materials(
        &self,
        subject_id: Option<SubjectId>,
    ) -> RepositoryResult<Vec<Material>> {
        let data = self.data.read();
        let mut materials: Vec<Material> = data
            .materials
            .values()
            .filter(|m| subject_id.map_or(true, |s| m.subject_id == s))
            .cloned()
            .collect();
        materials.sort_by_key(|m| (m.class_number, m.id));
        Ok(materials)
    }
}

#[async_trait]
impl NewsRepository for LocalRepository {
    async fn create_news(&self, news: NewNews) -> RepositoryResult<News> {
        let mut data = self.data.write();
        if data
            .news
            .values()
            .any(|n| n.title == news.title && n.content == news.content)
        {
            return Err(RepositoryError::conflict(
                "News with this title and content already exists.",
            ));
        }

        let id = NewsId(data.next_id());
        let stored = News {
            id,
            title: news.title,
            content: news.content,
            author_id: news.author_id,
            class_number: news.class_number,
            class_letter: news.class_letter,
            posted_on: Utc::now(),
            edited: false,
            last_edited_on: None,
        };
        data.news.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_news(&self, id: NewsId) -> RepositoryResult<News> {
        fetch(&self.data.read().news, "news", id)
    }

    async fn update_news(&self, news: &News) -> RepositoryResult<News> {
        let mut data = self.data.write();
        if data
            .news
            .values()
            .any(|n| n.id != news.id && n.title == news.title && n.content == news.content)
        {
            return Err(RepositoryError::conflict(
                "News with this title and content already exists.",
            ));
        }
        replace(&mut data.news, "news", news.id, news)
    }

    async fn delete_news(&self, id: NewsId) -> RepositoryResult<()> {
        let mut data = self.data.write();
        remove(&mut data.news, "news", id)?;
        data.comments.retain(|_, c| c.news_id != id);
        Ok(())
    }

    async fn list_news(&self, filter: NewsFilter) -> RepositoryResult<Vec<News>> {
        let data = self.data.read();
        let mut news: Vec<News> = data
            .news
            .values()
            .filter(|n| filter.author_id.map_or(true, |a| n.author_id == a))
            .filter(|n| filter.class_number.map_or(true, |c| n.class_number == c))
            .filter(|n| {
                filter.class_number.is_none()
                    || filter.class_letter.map_or(true, |l| n.class_letter == Some(l))
            })
            .cloned()
            .collect();
        news.sort_by(|a, b| b.posted_on.cmp(&a.posted_on).then(b.id.cmp(&a.id)));
        Ok(news)
    }

    async fn create_comment(&self, comment: NewComment) -> RepositoryResult<Comment> {
        let mut data = self.data.write();
        if !data.news.contains_key(&comment.news_id) {
            return Err(missing("news", comment.news_id));
        }

        let id = CommentId(data.next_id());
        let stored = Comment {
            id,
            news_id: comment.news_id,
            posted_by: comment.posted_by,
            content: comment.content,
            posted_on: Utc::now(),
            edited: false,
            last_edited_on: None,
        };
        data.comments.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_comment(&self, id: CommentId) -> RepositoryResult<Comment> {
        fetch(&self.data.read().comments, "comment", id)
    }

    async fn update_comment(&self, comment: &Comment) -> RepositoryResult<Comment> {
        let mut data = self.data.write();
        replace(&mut data.comments, "comment", comment.id, comment)
    }

    async fn delete_comment(&self, id: CommentId) -> RepositoryResult<()> {
        remove(&mut self.data.write().comments, "comment", id)
    }

    async fn list_comments(&self, news_id: NewsId) -> RepositoryResult<Vec<Comment>> {
        let data = self.data.read();
        Ok(data
            .comments
            .values()
            .filter(|c| c.news_id == news_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MeetupRepository for LocalRepository {
    async fn create_meetup(&self, meetup: NewMeetup) -> RepositoryResult<Meetup> {
        let mut data = self.data.write();
        let id = MeetupId(data.next_id());
        let stored = Meetup {
            id,
            date: meetup.date,
            description: meetup.description,
        };
        data.meetups.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_meetup(&self, id: MeetupId) -> RepositoryResult<Meetup> {
        fetch(&self.data.read().meetups, "meetup", id)
    }

    async fn update_meetup(&self, meetup: &Meetup) -> RepositoryResult<Meetup> {
        let mut data = self.data.write();
        replace(&mut data.meetups, "meetup", meetup.id, meetup)
    }

    async fn delete_meetup(&self, id: MeetupId) -> RepositoryResult<()> {
        let mut data = self.data.write();
        remove(&mut data.meetups, "meetup", id)?;
        let talk_ids: BTreeSet<TalkId> = data
            .talks
            .values()
            .filter(|t| t.meetup_id == id)
            .map(|t| t.id)
            .collect();
        data.talks.retain(|tid, _| !talk_ids.contains(tid));
        data.votes.retain(|(tid, _)| !talk_ids.contains(tid));
        Ok(())
    }

    async fn list_meetups(&self, filter: MeetupFilter) -> RepositoryResult<Vec<Meetup>> {
        let data = self.data.read();
        let mut meetups: Vec<Meetup> = data
            .meetups
            .values()
            .filter(|m| filter.before.map_or(true, |b| m.date < b))
            .filter(|m| filter.after.map_or(true, |a| m.date >= a))
            .cloned()
            .collect();
        meetups.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(meetups)
    }

    async fn create_talk(&self, talk: NewTalk) -> RepositoryResult<Talk> {
        let mut data = self.data.write();
        if !data.meetups.contains_key(&talk.meetup_id) {
            return Err(missing("meetup", talk.meetup_id));
        }

        let id = TalkId(data.next_id());
        let stored = Talk {
            id,
            meetup_id: talk.meetup_id,
            author_id: talk.author_id,
            topic: talk.topic,
            description: talk.description,
            video_url: talk.video_url,
            votes_count: 0,
        };
        data.talks.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_talk(&self, id: TalkId) -> RepositoryResult<Talk> {
        let data = self.data.read();
        let talk = fetch(&data.talks, "talk", id)?;
        Ok(data.with_votes(&talk))
    }

    async fn update_talk(&self, talk: &Talk) -> RepositoryResult<Talk> {
        let mut data = self.data.write();
        let stored = replace(&mut data.talks, "talk", talk.id, talk)?;
        Ok(data.with_votes(&stored))
    }

    async fn delete_talk(&self, id: TalkId) -> RepositoryResult<()> {
        let mut data = self.data.write();
        remove(&mut data.talks, "talk", id)?;
        data.votes.retain(|(tid, _)| *tid != id);
        Ok(())
    }

    async fn list_talks(&self, meetup_id: MeetupId) -> RepositoryResult<Vec<Talk>> {
        let data = self.data.read();
        let mut talks: Vec<Talk> = data
            .talks
            .values()
            .filter(|t| t.meetup_id == meetup_id)
            .map(|t| data.with_votes(t))
            .collect();
        talks.sort_by(|a, b| b.votes_count.cmp(&a.votes_count).then(a.id.cmp(&b.id)));
        Ok(talks)
    }

    async fn add_vote(&self, talk_id: TalkId, user_id: UserId) -> RepositoryResult<bool> {
        let mut data = self.data.write();
        if !data.talks.contains_key(&talk_id) {
            return Err(missing("talk", talk_id));
        }
        Ok(data.votes.insert((talk_id, user_id)))
    }

    async fn remove_vote(&self, talk_id: TalkId, user_id: UserId) -> RepositoryResult<bool> {
        let mut data = self.data.write();
        if !data.talks.contains_key(&talk_id) {
            return Err(missing("talk", talk_id));
        }
        Ok(data.votes.remove(&(talk_id, user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "hash".to_string(),
            is_active: true,
            is_staff: false,
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let repo = LocalRepository::new();
        repo.create_user(new_user("ivan")).await.unwrap();
        let err = repo.create_user(new_user("ivan")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_token_is_created_once() {
        let repo = LocalRepository::new();
        let user = repo.create_user(new_user("ivan")).await.unwrap();

        let first = repo.get_or_create_token(user.id, "k1").await.unwrap();
        let second = repo.get_or_create_token(user.id, "k2").await.unwrap();
        assert_eq!(first.key, "k1");
        assert_eq!(second.key, "k1");

        assert!(repo.delete_token(user.id).await.unwrap());
        assert!(repo.find_token("k1").await.unwrap().is_none());
        assert!(!repo.delete_token(user.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_password_reset_replaces_previous_key() {
        let repo = LocalRepository::new();
        let user = repo.create_user(new_user("ivan")).await.unwrap();

        repo.replace_password_reset(user.id, "r1").await.unwrap();
        repo.replace_password_reset(user.id, "r2").await.unwrap();
        assert!(repo.find_password_reset("r1").await.unwrap().is_none());
        assert_eq!(
            repo.find_password_reset("r2").await.unwrap().unwrap().user_id,
            user.id
        );

        assert!(repo.delete_password_reset(user.id).await.unwrap());
        assert!(repo.find_password_reset("r2").await.unwrap().is_none());
        assert!(repo
            .replace_password_reset(UserId(999), "r3")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_users_by_email_ignore_case() {
        let repo = LocalRepository::new();
        let ivan = repo.create_user(new_user("ivan")).await.unwrap();
        repo.create_user(new_user("maria")).await.unwrap();

        let found = repo
            .find_users_by_email(&ivan.email.to_uppercase())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ivan.id);
        assert!(repo.find_users_by_email("nobody@example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_classes_are_sorted() {
        let repo = LocalRepository::new();
        repo.create_class(11, ClassLetter::B).await.unwrap();
        repo.create_class(8, ClassLetter::G).await.unwrap();
        repo.create_class(8, ClassLetter::A).await.unwrap();

        let labels: Vec<String> = repo
            .list_classes(None)
            .await
            .unwrap()
            .iter()
            .map(Class::label)
            .collect();
        assert_eq!(labels, vec!["8A", "8G", "11B"]);

        repo.create_class(8, ClassLetter::V).await.unwrap();
        repo.create_class(8, ClassLetter::B).await.unwrap();
        let eights: Vec<String> = repo
            .list_classes(Some(8))
            .await
            .unwrap()
            .iter()
            .map(Class::label)
            .collect();
        assert_eq!(eights, vec!["8A", "8B", "8G", "8V"]);

        assert!(repo.create_class(8, ClassLetter::A).await.is_err());
    }

    #[tokio::test]
    async fn test_one_submission_per_student() {
        let repo = LocalRepository::new();
        let subject = repo.create_subject("Math").await.unwrap();
        let class = repo.create_class(10, ClassLetter::A).await.unwrap();
        let user = repo.create_user(new_user("student")).await.unwrap();
        let student = repo
            .create_student(NewStudent {
                user_id: user.id,
                class_id: class.id,
                profile_image_url: DEFAULT_PROFILE_IMAGE.to_string(),
                info: String::new(),
                activation_key: None,
            })
            .await
            .unwrap();
        let homework = repo
            .create_homework(NewHomework {
                subject_id: subject.id,
                class_id: class.id,
                deadline: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                details: "read".into(),
                materials_url: None,
                author_id: TeacherId(99),
            })
            .await
            .unwrap();

        let submission = NewSubmission {
            homework_id: homework.id,
            student_id: student.id,
            content: "done".into(),
            solution_url: None,
        };
        repo.create_submission(submission.clone()).await.unwrap();
        let err = repo.create_submission(submission).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict { .. }));

        repo.delete_homework(homework.id).await.unwrap();
        let left = repo
            .list_submissions(SubmissionFilter::for_homework(homework.id))
            .await
            .unwrap();
        assert!(left.is_empty());
    }

    fn exam(subject_id: SubjectId, class_id: ClassId, date: NaiveDate, topic: &str) -> NewExam {
        NewExam {
            subject_id,
            class_id,
            date,
            topic: topic.into(),
            details: String::new(),
            author_id: TeacherId(99),
        }
    }

    #[tokio::test]
    async fn test_exams_follow_subject_title_then_class() {
        let repo = LocalRepository::new();
        let zoology = repo.create_subject("Zoology").await.unwrap();
        let art = repo.create_subject("Art").await.unwrap();
        let v = repo.create_class(10, ClassLetter::V).await.unwrap();
        let g = repo.create_class(10, ClassLetter::G).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2030, 5, 20).unwrap();

        repo.create_exam(exam(zoology.id, g.id, day, "zoology 10G")).await.unwrap();
        repo.create_exam(exam(art.id, v.id, day, "art 10V")).await.unwrap();
        repo.create_exam(exam(art.id, g.id, day, "art 10G")).await.unwrap();
        repo.create_exam(exam(zoology.id, v.id, day - Duration::days(1), "earlier"))
            .await
            .unwrap();

        let topics: Vec<String> = repo
            .list_exams(ExamFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.topic)
            .collect();
        assert_eq!(topics, vec!["earlier", "art 10G", "art 10V", "zoology 10G"]);
    }

    #[tokio::test]
    async fn test_homeworks_follow_deadline_then_class_then_subject() {
        let repo = LocalRepository::new();
        let zoology = repo.create_subject("Zoology").await.unwrap();
        let art = repo.create_subject("Art").await.unwrap();
        let eleven = repo.create_class(11, ClassLetter::A).await.unwrap();
        let ten = repo.create_class(10, ClassLetter::B).await.unwrap();
        let day = NaiveDate::from_ymd_opt(2030, 5, 20).unwrap();

        for (subject_id, class_id, deadline, details) in [
            (art.id, eleven.id, day, "art 11A"),
            (zoology.id, ten.id, day, "zoology 10B"),
            (art.id, ten.id, day, "art 10B"),
            (art.id, ten.id, day + Duration::days(3), "later"),
        ] {
            repo.create_homework(NewHomework {
                subject_id,
                class_id,
                deadline,
                details: details.into(),
                materials_url: None,
                author_id: TeacherId(99),
            })
            .await
            .unwrap();
        }

        let details: Vec<String> = repo
            .list_homeworks(HomeworkFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.details)
            .collect();
        assert_eq!(details, vec!["later", "art 10B", "zoology 10B", "art 11A"]);
    }

    #[tokio::test]
    async fn test_delete_news_removes_comments() {
        let repo = LocalRepository::new();
        let author = repo.create_user(new_user("author")).await.unwrap();
        let mut news_ids = Vec::new();
        for title in ["kept", "dropped"] {
            let news = repo
                .create_news(NewNews {
                    title: title.into(),
                    content: "content".into(),
                    author_id: author.id,
                    class_number: 10,
                    class_letter: Some(ClassLetter::A),
                })
                .await
                .unwrap();
            news_ids.push(news.id);
        }
        let kept = repo
            .create_comment(NewComment {
                news_id: news_ids[0],
                posted_by: author.id,
                content: "stays".into(),
            })
            .await
            .unwrap();
        let dropped = repo
            .create_comment(NewComment {
                news_id: news_ids[1],
                posted_by: author.id,
                content: "goes".into(),
            })
            .await
            .unwrap();

        repo.delete_news(news_ids[1]).await.unwrap();

        assert!(repo.get_comment(dropped.id).await.unwrap_err().is_not_found());
        assert!(repo.list_comments(news_ids[1]).await.unwrap().is_empty());
        assert_eq!(repo.get_comment(kept.id).await.unwrap().content, "stays");
    }

    #[tokio::test]
    async fn test_delete_meetup_removes_talks_and_votes() {
        let repo = LocalRepository::new();
        let voter = repo.create_user(new_user("voter")).await.unwrap();
        let mut meetups = Vec::new();
        let mut talks = Vec::new();
        for days in [1, 2] {
            let meetup = repo
                .create_meetup(NewMeetup {
                    date: Utc::now() + Duration::days(days),
                    description: String::new(),
                })
                .await
                .unwrap();
            let talk = repo
                .create_talk(NewTalk {
                    meetup_id: meetup.id,
                    author_id: voter.id,
                    topic: "topic".into(),
                    description: "description".into(),
                    video_url: None,
                })
                .await
                .unwrap();
            repo.add_vote(talk.id, voter.id).await.unwrap();
            meetups.push(meetup.id);
            talks.push(talk.id);
        }

        repo.delete_meetup(meetups[0]).await.unwrap();

        assert!(repo.get_talk(talks[0]).await.unwrap_err().is_not_found());
        assert_eq!(repo.vote_count(talks[0]), 0);
        assert!(repo.add_vote(talks[0], voter.id).await.unwrap_err().is_not_found());
        assert_eq!(repo.list_talks(meetups[1]).await.unwrap().len(), 1);
        assert_eq!(repo.vote_count(talks[1]), 1);
    }

    #[tokio::test]
    async fn test_talks_sorted_by_votes() {
        let repo = LocalRepository::new();
        let meetup = repo
            .create_meetup(NewMeetup {
                date: Utc::now() + Duration::days(1),
                description: String::new(),
            })
            .await
            .unwrap();
        let author = repo.create_user(new_user("speaker")).await.unwrap();
        let mut talk_ids = Vec::new();
        for topic in ["first", "second"] {
            let talk = repo
                .create_talk(NewTalk {
                    meetup_id: meetup.id,
                    author_id: author.id,
                    topic: topic.into(),
                    description: "description".into(),
                    video_url: None,
                })
                .await
                .unwrap();
            talk_ids.push(talk.id);
        }

        assert!(repo.add_vote(talk_ids[1], author.id).await.unwrap());
        assert!(!repo.add_vote(talk_ids[1], author.id).await.unwrap());

        let talks = repo.list_talks(meetup.id).await.unwrap();
        assert_eq!(talks[0].topic, "second");
        assert_eq!(talks[0].votes_count, 1);
        assert_eq!(talks[1].votes_count, 0);

        assert!(repo.remove_vote(talk_ids[1], author.id).await.unwrap());
        assert_eq!(repo.vote_count(talk_ids[1]), 0);

        repo.delete_meetup(meetup.id).await.unwrap();
        assert!(repo.get_talk(talk_ids[0]).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_health_toggle() {
        let repo = LocalRepository::new();
        assert!(repo.health_check().await.unwrap());
        repo.set_healthy(false);
        assert!(repo.health_check().await.is_err());
    }
}
