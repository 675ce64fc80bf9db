//! Homeworks and the student submissions nested under them.

use chrono::Utc;

use crate::api::{HomeworkPayload, HomeworkView, SubmissionPayload, SubmissionView};
use crate::db::repository::{FullRepository, HomeworkFilter, RepositoryError, SubmissionFilter};
use crate::models::{Homework, HomeworkId, NewHomework, NewSubmission, Submission, SubmissionId};

use super::error::{LookupExt, ServiceError, ServiceResult, NO_PERMISSION};
use super::pagination::{Page, PageRequest};
use super::permissions::{authorize, ensure_author, Action, Principal, Resource, Role};
use super::render::{self, render_all};
use super::school::resolve_class;
use super::validation::{require, validate_with};

pub const ONE_SUBMISSION: &str = "You can submit only one submission.";
pub const ALREADY_CHECKED: &str = "Submission is already checked.";

// ==================== Homeworks ====================

pub async fn list_homeworks<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    page: PageRequest,
) -> ServiceResult<Page<HomeworkView>> {
    let principal = authorize(principal, Resource::Homework, Action::List)?;
    let filter = match &principal.role {
        Role::Student(student) => HomeworkFilter {
            class_id: Some(student.class_id),
            from_deadline: Some(Utc::now().date_naive()),
            ..Default::default()
        },
        Role::Teacher(teacher) => HomeworkFilter {
            author_id: Some(teacher.id),
            ..Default::default()
        },
        Role::Member => HomeworkFilter::default(),
    };

    let homeworks = page.apply(repo.list_homeworks(filter).await?)?;
    let results = render_all!(repo, homeworks.results, render::homework);
    Ok(homeworks.with_results(results))
}

pub async fn get_homework<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    id: HomeworkId,
) -> ServiceResult<HomeworkView> {
    authorize(principal, Resource::Homework, Action::Retrieve)?;
    let homework = repo.get_homework(id).await.or_not_found()?;
    render::homework(repo, &homework).await
}

pub async fn create_homework<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    payload: HomeworkPayload,
) -> ServiceResult<HomeworkView> {
    let principal = authorize(principal, Resource::Homework, Action::Create)?;
    let teacher = principal.teacher()?;

    let today = Utc::now().date_naive();
    validate_with(&payload, |checks| {
        checks.required("class", payload.class.as_ref());
        checks.required("deadline", payload.deadline);
        checks.required("details", payload.details.as_ref());
        checks.not_in_past("deadline", payload.deadline, today);
    })?;

    let class = resolve_class(repo, "class", &require("class", payload.class)?).await?;
    let homework = repo
        .create_homework(NewHomework {
            subject_id: teacher.subject_id,
            class_id: class.id,
            deadline: require("deadline", payload.deadline)?,
            details: require("details", payload.details)?,
            materials_url: payload.materials_url,
            author_id: teacher.id,
        })
        .await?;

    log::info!(
        "Homework {} for {} due {}",
        homework.id,
        class.label(),
        homework.deadline
    );
    render::homework(repo, &homework).await
}

pub async fn update_homework<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    id: HomeworkId,
    payload: HomeworkPayload,
) -> ServiceResult<HomeworkView> {
    let principal = authorize(principal, Resource::Homework, Action::Update)?;
    let teacher = principal.teacher()?;

    let mut homework = repo.get_homework(id).await.or_not_found()?;
    ensure_author(homework.author_id == teacher.id)?;

    let today = Utc::now().date_naive();
    validate_with(&payload, |checks| {
        checks.not_in_past("deadline", payload.deadline, today);
    })?;

    if let Some(class_ref) = &payload.class {
        homework.class_id = resolve_class(repo, "class", class_ref).await?.id;
    }
    if let Some(deadline) = payload.deadline {
        homework.deadline = deadline;
    }
    if let Some(details) = payload.details {
        homework.details = details;
    }
    if payload.materials_url.is_some() {
        homework.materials_url = payload.materials_url;
    }

    let homework = repo.update_homework(&homework).await?;
    render::homework(repo, &homework).await
}

/// Deletes the homework together with its submissions.
pub async fn delete_homework<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    id: HomeworkId,
) -> ServiceResult<()> {
    let principal = authorize(principal, Resource::Homework, Action::Destroy)?;
    let teacher = principal.teacher()?;

    let homework = repo.get_homework(id).await.or_not_found()?;
    ensure_author(homework.author_id == teacher.id)?;

    repo.delete_homework(id).await.or_not_found()?;
    log::info!("Homework {} deleted by teacher {}", id, teacher.id);
    Ok(())
}

// ==================== Submissions ====================

async fn submission_of<R: FullRepository + ?Sized>(
    repo: &R,
    homework: &Homework,
    id: SubmissionId,
) -> ServiceResult<Submission> {
    let submission = repo.get_submission(id).await.or_not_found()?;
    if submission.homework_id != homework.id {
        return Err(ServiceError::not_found());
    }
    Ok(submission)
}

/// Teachers get the unchecked submissions, students only their own.
pub async fn list_submissions<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    homework_id: HomeworkId,
) -> ServiceResult<Vec<SubmissionView>> {
    let principal = authorize(principal, Resource::Submission, Action::List)?;
    let homework = repo.get_homework(homework_id).await.or_not_found()?;

    let mut filter = SubmissionFilter::for_homework(homework.id);
    match &principal.role {
        Role::Teacher(_) => filter.checked = Some(false),
        Role::Student(student) => filter.student_id = Some(student.id),
        Role::Member => return Err(ServiceError::forbidden(NO_PERMISSION)),
    }

    let submissions = repo.list_submissions(filter).await?;
    Ok(render_all!(repo, submissions, render::submission))
}

pub async fn get_submission<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    homework_id: HomeworkId,
    id: SubmissionId,
) -> ServiceResult<SubmissionView> {
    let principal = authorize(principal, Resource::Submission, Action::Retrieve)?;
    let homework = repo.get_homework(homework_id).await.or_not_found()?;
    let submission = submission_of(repo, &homework, id).await?;

    let allowed = match &principal.role {
        Role::Teacher(_) => true,
        Role::Student(student) => submission.student_id == student.id,
        Role::Member => false,
    };
    if !allowed {
        return Err(ServiceError::forbidden(NO_PERMISSION));
    }
    render::submission(repo, &submission).await
}

pub async fn create_submission<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    homework_id: HomeworkId,
    payload: SubmissionPayload,
) -> ServiceResult<SubmissionView> {
    let principal = authorize(principal, Resource::Submission, Action::Create)?;
    let student = principal.student()?;
    let homework = repo.get_homework(homework_id).await.or_not_found()?;

    let mut existing = SubmissionFilter::for_homework(homework.id);
    existing.student_id = Some(student.id);
    if !repo.list_submissions(existing).await?.is_empty() {
        return Err(ServiceError::forbidden(ONE_SUBMISSION));
    }

    validate_with(&payload, |checks| {
        checks.required("content", payload.content.as_ref());
    })?;

    let submission = repo
        .create_submission(NewSubmission {
            homework_id: homework.id,
            student_id: student.id,
            content: require("content", payload.content)?,
            solution_url: payload.solution_url,
        })
        .await
        .map_err(|err| match err {
            RepositoryError::Conflict { .. } => ServiceError::forbidden(ONE_SUBMISSION),
            other => other.into(),
        })?;

    log::info!(
        "Student {} submitted homework {}",
        student.id,
        homework.id
    );
    render::submission(repo, &submission).await
}

/// Students edit their own unchecked submission; teachers mark submissions checked.
pub async fn update_submission<R: FullRepository + ?Sized>(
    repo: &R,
    principal: Option<&Principal>,
    homework_id: HomeworkId,
    id: SubmissionId,
    payload: SubmissionPayload,
) -> ServiceResult<SubmissionView> {
    let principal = authorize(principal, Resource::Submission, Action::Update)?;
    let homework = repo.get_homework(homework_id).await.or_not_found()?;
    let mut submission = submission_of(repo, &homework, id).await?;

    match &principal.role {
        Role::Student(student) => {
            ensure_author(submission.student_id == student.id)?;
            if submission.checked {
                return Err(ServiceError::forbidden(ALREADY_CHECKED));
            }
            validate_with(&payload, |_| {})?;
            if let Some(content) = payload.content {
                submission.content = content;
            }
            if payload.solution_url.is_some() {
                submission.solution_url = payload.solution_url;
            }
        }
        Role::Teacher(teacher) => {
            if let Some(checked) = payload.checked {
                submission.checked = checked;
                log::info!(
                    "Teacher {} marked submission {} checked={}",
                    teacher.id,
                    submission.id,
                    checked
                );
            }
        }
        Role::Member => return Err(ServiceError::forbidden(NO_PERMISSION)),
    }

    submission.edited = true;
    submission.last_edited_on = Some(Utc::now());
    let submission = repo.update_submission(&submission).await?;
    render::submission(repo, &submission).await
}
