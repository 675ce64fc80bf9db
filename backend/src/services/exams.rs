//! Exams: teachers schedule them, students see the upcoming ones of their class.

use chrono::Utc;

use crate::api::{ExamPayload, ExamView};
use crate::db::repository::{ExamFilter, FullRepository};
use crate::models::{ExamId, NewExam};

use super::error::{ConflictExt, LookupExt, ServiceResult};
use super::pagination::{Page, PageRequest};
use super::permissions::{authorize, ensure_author, Action, Principal, Resource, Role};
use super::render::{self, render_all};
use super::school::resolve_class;
use super::validation::{require, validate_with};

/// Students get upcoming exams of their class, teachers the ones they wrote.
pub async fn list_exams<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    page: PageRequest,
) -> ServiceResult<Page<ExamView>> {
    let principal = authorize(principal, Resource::Exam, Action::List)?;
    let filter = match &principal.role {
        Role::Student(student) => ExamFilter {
            class_id: Some(student.class_id),
            from_date: Some(Utc::now().date_naive()),
            ..Default::default()
        },
        Role::Teacher(teacher) => ExamFilter {
            author_id: Some(teacher.id),
            ..Default::default()
        },
        Role::Member => ExamFilter::default(),
    };

    let exams = page.apply(repo.list_exams(filter).await?)?;
    let results = render_all!(repo, exams.results, render::exam);
    Ok(exams.with_results(results))
}

pub async fn get_exam<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    id: ExamId,
) -> ServiceResult<ExamView> {
    authorize(principal, Resource::Exam, Action::Retrieve)?;
    let exam = repo.get_exam(id).await.or_not_found()?;
    render::exam(repo, &exam).await
}

pub async fn create_exam<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    payload: ExamPayload,
) -> ServiceResult<ExamView> {
    let principal = authorize(principal, Resource::Exam, Action::Create)?;
    let teacher = principal.teacher()?;

    let today = Utc::now().date_naive();
    validate_with(&payload, |checks| {
        checks.required("class", payload.class.as_ref());
        checks.required("date", payload.date);
        checks.required("topic", payload.topic.as_ref());
        checks.not_in_past("date", payload.date, today);
    })?;

    let class_ref = require("class", payload.class)?;
    let date = require("date", payload.date)?;
    let topic = require("topic", payload.topic)?;
    let class = resolve_class(repo, "class", &class_ref).await?;

    let exam = repo
        .create_exam(NewExam {
            subject_id: teacher.subject_id,
            class_id: class.id,
            date,
            topic,
            details: payload.details.unwrap_or_default(),
            author_id: teacher.id,
        })
        .await
        .conflict_on("topic")?;

    log::info!("Exam {} scheduled for {} on {}", exam.id, class.label(), exam.date);
    render::exam(repo, &exam).await
}

/// Partial update by the author.
pub async fn update_exam<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    id: ExamId,
    payload: ExamPayload,
) -> ServiceResult<ExamView> {
    let principal = authorize(principal, Resource::Exam, Action::Update)?;
    let teacher = principal.teacher()?;

    let mut exam = repo.get_exam(id).await.or_not_found()?;
    ensure_author(exam.author_id == teacher.id)?;

    let today = Utc::now().date_naive();
    validate_with(&payload, |checks| {
        checks.not_in_past("date", payload.date, today);
    })?;

    if let Some(class_ref) = &payload.class {
        exam.class_id = resolve_class(repo, "class", class_ref).await?.id;
    }
    if let Some(date) = payload.date {
        exam.date = date;
    }
    if let Some(topic) = payload.topic {
        exam.topic = topic;
    }
    if let Some(details) = payload.details {
        exam.details = details;
    }

    let exam = repo.update_exam(&exam).await.conflict_on("topic")?;
    render::exam(repo, &exam).await
}

pub async fn delete_exam<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    id: ExamId,
) -> ServiceResult<()> {
    let principal = authorize(principal, Resource::Exam, Action::Destroy)?;
    let teacher = principal.teacher()?;

    let exam = repo.get_exam(id).await.or_not_found()?;
    ensure_author(exam.author_id == teacher.id)?;

    repo.delete_exam(id).await.or_not_found()?;
    log::info!("Exam {} deleted by teacher {}", id, teacher.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ClassRef;
    use crate::services::error::ServiceError;
    use crate::services::fixtures::fixture;
    use chrono::Duration;

    fn payload(topic: &str, days_ahead: i64) -> ExamPayload {
        ExamPayload {
            class: Some(ClassRef {
                number: 10,
                letter: "A".into(),
            }),
            date: Some(Utc::now().date_naive() + Duration::days(days_ahead)),
            topic: Some(topic.into()),
            details: None,
        }
    }

    #[tokio::test]
    async fn test_anonymous_cannot_list() {
        let f = fixture().await;
        let err = list_exams(&f.repo, None, PageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_create_uses_teacher_subject() {
        let f = fixture().await;
        let exam = create_exam(&f.repo, Some(&f.teacher), payload("Derivatives", 5))
            .await
            .unwrap();
        assert_eq!(exam.subject.id, f.subject_id);
        assert_eq!(exam.author.username, "teacher");
        assert_eq!(exam.class.number, 10);
    }

    #[tokio::test]
    async fn test_missing_fields_reported_together() {
        let f = fixture().await;
        let Err(ServiceError::Validation(errors)) =
            create_exam(&f.repo, Some(&f.teacher), ExamPayload::default()).await
        else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("class"));
        assert!(errors.contains_key("date"));
        assert!(errors.contains_key("topic"));
    }

    #[tokio::test]
    async fn test_duplicate_topic() {
        let f = fixture().await;
        create_exam(&f.repo, Some(&f.teacher), payload("Integrals", 5))
            .await
            .unwrap();
        let Err(ServiceError::Validation(errors)) =
            create_exam(&f.repo, Some(&f.teacher), payload("Integrals", 6)).await
        else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("topic"));
    }

    #[tokio::test]
    async fn test_students_see_own_class_only() {
        let f = fixture().await;
        create_exam(&f.repo, Some(&f.teacher), payload("Vectors", 2))
            .await
            .unwrap();

        let page = list_exams(&f.repo, Some(&f.student), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.count, 1);

        let page = list_exams(&f.repo, Some(&f.outsider), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.count, 0);

        let page = list_exams(&f.repo, Some(&f.other_teacher), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.count, 0);
    }

    #[tokio::test]
    async fn test_only_author_deletes() {
        let f = fixture().await;
        let exam = create_exam(&f.repo, Some(&f.teacher), payload("Limits", 2))
            .await
            .unwrap();

        let err = delete_exam(&f.repo, Some(&f.other_teacher), exam.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        delete_exam(&f.repo, Some(&f.teacher), exam.id).await.unwrap();
        assert!(matches!(
            get_exam(&f.repo, Some(&f.student), exam.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
