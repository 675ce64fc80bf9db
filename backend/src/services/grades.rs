//! Grades per subject and student.

use crate::api::{GradeRequest, GradeView};
use crate::db::repository::{FullRepository, GradeFilter};
use crate::models::{NewGrade, SubjectId, UserId};

use super::error::{FindExt, LookupExt, ServiceError, ServiceResult};
use super::permissions::{authorize, Action, Principal, Resource};
use super::render::{self, render_all};
use super::validation::validate;

pub async fn list_subject_grades<R: FullRepository + ?Sized>(
    repo: &R,
    subject_id: SubjectId,
) -> ServiceResult<Vec<GradeView>> {
    let grades = repo
        .list_grades(GradeFilter {
            subject_id: Some(subject_id),
            student_id: None,
        })
        .await?;
    Ok(render_all!(repo, grades, render::grade))
}

/// Grades of one student. Students may only look at their own.
pub async fn list_student_grades<R: FullRepository + ?Sized>(
    repo: &R,
    principal: &Principal,
    subject_id: SubjectId,
    user_id: UserId,
) -> ServiceResult<Vec<GradeView>> {
    repo.get_user(user_id).await.or_not_found()?;
    let student = repo.find_student_by_user(user_id).await.found()?;

    if let Ok(own) = principal.student() {
        if own.id != student.id {
            return Err(ServiceError::unauthorized(
                "You can view only your own grades.",
            ));
        }
    }

    let grades = repo
        .list_grades(GradeFilter {
            subject_id: Some(subject_id),
            student_id: Some(student.id),
        })
        .await?;
    Ok(render_all!(repo, grades, render::grade))
}

pub async fn create_grade<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    subject_id: SubjectId,
    user_id: UserId,
    request: GradeRequest,
) -> ServiceResult<GradeView> {
    let principal = authorize(principal, Resource::Grade, Action::Create)?;
    let teacher = principal.teacher()?;

    let subject = repo.get_subject(subject_id).await.or_not_found()?;
    repo.get_user(user_id).await.or_not_found()?;
    let student = repo.find_student_by_user(user_id).await.found()?;

    if subject.id != teacher.subject_id {
        return Err(ServiceError::unauthorized(
            "You can only post grades for your subject.",
        ));
    }
    validate(&request)?;

    let grade = repo
        .create_grade(NewGrade {
            value: request.value,
            subject_id: subject.id,
            student_id: student.id,
        })
        .await?;

    log::info!(
        "Teacher {} graded student {} in '{}' with {}",
        teacher.id,
        student.id,
        subject.title,
        grade.value
    );
    render::grade(repo, &grade).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::fixture;

    #[tokio::test]
    async fn test_teacher_grades_own_subject() {
        let f = fixture().await;
        let grade = create_grade(
            &f.repo,
            Some(&f.teacher),
            f.subject_id,
            f.student.user.id,
            GradeRequest { value: 6 },
        )
        .await
        .unwrap();
        assert_eq!(grade.value, 6);
        assert_eq!(grade.student.username, "student");

        let err = create_grade(
            &f.repo,
            Some(&f.other_teacher),
            f.subject_id,
            f.student.user.id,
            GradeRequest { value: 3 },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
        assert_eq!(err.to_string(), "You can only post grades for your subject.");
    }

    #[tokio::test]
    async fn test_students_post_nothing() {
        let f = fixture().await;
        let err = create_grade(
            &f.repo,
            Some(&f.student),
            f.subject_id,
            f.classmate.user.id,
            GradeRequest { value: 6 },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_students_view_only_own_grades() {
        let f = fixture().await;
        for value in [4, 5] {
            create_grade(
                &f.repo,
                Some(&f.teacher),
                f.subject_id,
                f.student.user.id,
                GradeRequest { value },
            )
            .await
            .unwrap();
        }

        let own = list_student_grades(&f.repo, &f.student, f.subject_id, f.student.user.id)
            .await
            .unwrap();
        assert_eq!(own.len(), 2);
        assert_eq!(own[0].value, 5);

        let err = list_student_grades(&f.repo, &f.classmate, f.subject_id, f.student.user.id)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "You can view only your own grades.");

        let all = list_subject_grades(&f.repo, f.subject_id).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_value() {
        let f = fixture().await;
        let Err(ServiceError::Validation(errors)) = create_grade(
            &f.repo,
            Some(&f.teacher),
            f.subject_id,
            f.student.user.id,
            GradeRequest { value: 7 },
        )
        .await
        else {
            panic!("expected validation error");
        };
        assert!(errors.contains_key("value"));
    }
}
